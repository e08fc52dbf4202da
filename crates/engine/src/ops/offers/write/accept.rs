use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, OfferStatus, PostStatus, ResultEngine, Trade, TradeStatus, offers, posts, trades,
};

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Accepts an offer and settles the post, all in one transaction:
    ///
    /// 1. the target offer becomes `accepted`
    /// 2. every other pending offer on the post becomes `rejected`
    /// 3. a trade row is inserted
    /// 4. the post becomes `traded`
    /// 5. a linked child post, if any, is settled the same way (its pending
    ///    offers rejected too), closing both sides of a two-way listing
    ///
    /// Only the post owner may accept. Concurrent accepts on the same post
    /// race on the status-guarded updates and the unique trade index; the
    /// loser observes `Conflict` and the transaction rolls back whole.
    pub async fn accept_offer(&self, offer_id: i32, acting_user_id: i32) -> ResultEngine<Trade> {
        with_tx!(self, |db_tx| {
            let offer = self.require_offer_by_id(&db_tx, offer_id).await?;
            let post = self.require_post_by_id(&db_tx, offer.post_id).await?;
            if post.author_id != acting_user_id {
                return Err(EngineError::Forbidden(
                    "only the post owner can accept an offer".to_string(),
                ));
            }
            if OfferStatus::try_from(offer.status.as_str())? != OfferStatus::Pending {
                return Err(EngineError::Conflict(
                    "only pending offers can be accepted".to_string(),
                ));
            }

            self.transition_offer(&db_tx, offer.id, OfferStatus::Accepted)
                .await?;
            self.reject_pending_offers(&db_tx, post.id, Some(offer.id))
                .await?;

            let trade_model = trades::ActiveModel {
                post_id: ActiveValue::Set(post.id),
                offer_id: ActiveValue::Set(offer.id),
                agreed_at: ActiveValue::Set(Utc::now()),
                status: ActiveValue::Set(TradeStatus::Completed.as_str().to_string()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            self.settle_post(&db_tx, post.id).await?;

            if let Some(child_post_id) = offer.child_post_id {
                self.settle_post(&db_tx, child_post_id).await?;
                self.reject_pending_offers(&db_tx, child_post_id, None)
                    .await?;
            }

            Trade::try_from(trade_model)
        })
    }

    /// Moves one offer out of `pending`, guarded on it still being pending.
    ///
    /// Zero affected rows means a concurrent transition won the race.
    pub(in crate::ops) async fn transition_offer(
        &self,
        db: &DatabaseTransaction,
        offer_id: i32,
        to: OfferStatus,
    ) -> ResultEngine<()> {
        let result = offers::Entity::update_many()
            .col_expr(offers::Column::Status, Expr::value(to.as_str()))
            .filter(offers::Column::Id.eq(offer_id))
            .filter(offers::Column::Status.eq(OfferStatus::Pending.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(EngineError::Conflict(
                "offer is no longer pending".to_string(),
            ));
        }
        Ok(())
    }

    /// Bulk-rejects the pending offers on a post, optionally sparing one.
    pub(in crate::ops) async fn reject_pending_offers(
        &self,
        db: &DatabaseTransaction,
        post_id: i32,
        excluding: Option<i32>,
    ) -> ResultEngine<()> {
        let mut update = offers::Entity::update_many()
            .col_expr(
                offers::Column::Status,
                Expr::value(OfferStatus::Rejected.as_str()),
            )
            .filter(offers::Column::PostId.eq(post_id))
            .filter(offers::Column::Status.eq(OfferStatus::Pending.as_str()));
        if let Some(offer_id) = excluding {
            update = update.filter(offers::Column::Id.ne(offer_id));
        }
        update.exec(db).await?;
        Ok(())
    }

    /// Marks a post `traded`, guarded on it not being settled or withdrawn
    /// already, and bumps its updated timestamp.
    pub(in crate::ops) async fn settle_post(
        &self,
        db: &DatabaseTransaction,
        post_id: i32,
    ) -> ResultEngine<()> {
        let result = posts::Entity::update_many()
            .col_expr(
                posts::Column::Status,
                Expr::value(PostStatus::Traded.as_str()),
            )
            .col_expr(posts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(posts::Column::Id.eq(post_id))
            .filter(posts::Column::Status.is_in([
                PostStatus::Open.as_str(),
                PostStatus::Trading.as_str(),
            ]))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(EngineError::Conflict("post is already settled".to_string()));
        }
        Ok(())
    }
}
