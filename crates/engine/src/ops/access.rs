//! Existence and authorization checks shared by the engine operations.
//!
//! Every "is this actor allowed" rule lives here or in its single calling
//! operation, never in the transport layer.

use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{EngineError, ResultEngine, categories, offers, posts};

use super::Engine;

impl Engine {
    pub(super) async fn require_post_by_id(
        &self,
        db: &DatabaseTransaction,
        post_id: i32,
    ) -> ResultEngine<posts::Model> {
        posts::Entity::find_by_id(post_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("post not found".to_string()))
    }

    /// Loads a post and verifies the actor owns it.
    pub(super) async fn require_post_owner(
        &self,
        db: &DatabaseTransaction,
        post_id: i32,
        user_id: i32,
    ) -> ResultEngine<posts::Model> {
        let model = self.require_post_by_id(db, post_id).await?;
        if model.author_id != user_id {
            return Err(EngineError::Forbidden("not your post".to_string()));
        }
        Ok(model)
    }

    pub(super) async fn require_offer_by_id(
        &self,
        db: &DatabaseTransaction,
        offer_id: i32,
    ) -> ResultEngine<offers::Model> {
        offers::Entity::find_by_id(offer_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("offer not found".to_string()))
    }

    pub(super) async fn require_category_exists(
        &self,
        db: &DatabaseTransaction,
        category_id: i32,
    ) -> ResultEngine<()> {
        let exists = categories::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::InvalidArgument(
                "category not found".to_string(),
            ));
        }
        Ok(())
    }

    /// Validates a child-post reference for an offer: the post must exist,
    /// must differ from the parent, and must belong to the offering user.
    pub(super) async fn resolve_child_post(
        &self,
        db: &DatabaseTransaction,
        parent_post_id: i32,
        author_id: i32,
        child_post_id: i32,
    ) -> ResultEngine<posts::Model> {
        if child_post_id == parent_post_id {
            return Err(EngineError::InvalidArgument(
                "child post must differ from the post being offered on".to_string(),
            ));
        }
        let model = posts::Entity::find_by_id(child_post_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::InvalidArgument("child post not found".to_string()))?;
        if model.author_id != author_id {
            return Err(EngineError::Forbidden("not your child post".to_string()));
        }
        Ok(model)
    }
}
