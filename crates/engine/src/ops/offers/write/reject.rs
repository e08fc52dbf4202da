use sea_orm::TransactionTrait;

use crate::{EngineError, Offer, OfferStatus, ResultEngine};

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Rejects one offer (post owner only). Sibling offers and the post are
    /// untouched.
    pub async fn reject_offer(&self, offer_id: i32, acting_user_id: i32) -> ResultEngine<Offer> {
        with_tx!(self, |db_tx| {
            let offer = self.require_offer_by_id(&db_tx, offer_id).await?;
            let post = self.require_post_by_id(&db_tx, offer.post_id).await?;
            if post.author_id != acting_user_id {
                return Err(EngineError::Forbidden(
                    "only the post owner can reject an offer".to_string(),
                ));
            }
            if OfferStatus::try_from(offer.status.as_str())? != OfferStatus::Pending {
                return Err(EngineError::Conflict(
                    "only pending offers can be rejected".to_string(),
                ));
            }

            self.transition_offer(&db_tx, offer.id, OfferStatus::Rejected)
                .await?;

            self.load_offer(&db_tx, offer.id).await
        })
    }
}
