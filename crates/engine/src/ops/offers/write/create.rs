use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    Consideration, CreateOfferCmd, EngineError, Offer, OfferStatus, PostStatus, ResultEngine,
    items::normalize_items, offers,
};

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Creates a `pending` offer against an open post.
    ///
    /// The post itself is not touched: creation has no side effect beyond the
    /// insert. Items are normalized (an all-invalid list yields a zero-item
    /// offer, not an error); a child-post reference is validated for
    /// existence, non-self-reference and ownership.
    pub async fn create_offer(&self, cmd: CreateOfferCmd) -> ResultEngine<Offer> {
        with_tx!(self, |db_tx| {
            let post = self.require_post_by_id(&db_tx, cmd.post_id).await?;
            if !PostStatus::try_from(post.status.as_str())?.accepts_offers() {
                return Err(EngineError::Conflict(
                    "post is not open for offers".to_string(),
                ));
            }

            let (child_post_id, drafts) = match cmd.consideration {
                Consideration::ChildPost(child_post_id) => {
                    self.resolve_child_post(&db_tx, cmd.post_id, cmd.author_id, child_post_id)
                        .await?;
                    (Some(child_post_id), Vec::new())
                }
                Consideration::Items(raw) => (None, normalize_items(raw)),
            };

            let offer_model = offers::ActiveModel {
                post_id: ActiveValue::Set(cmd.post_id),
                author_id: ActiveValue::Set(cmd.author_id),
                child_post_id: ActiveValue::Set(child_post_id),
                message: ActiveValue::Set(cmd.message),
                status: ActiveValue::Set(OfferStatus::Pending.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            self.insert_offer_items(&db_tx, offer_model.id, drafts)
                .await?;

            self.load_offer(&db_tx, offer_model.id).await
        })
    }
}
