use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    Consideration, EngineError, Offer, OfferStatus, ResultEngine, UpdateOfferCmd,
    items::normalize_items, offers,
};

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Edits a pending offer (author only).
    ///
    /// Supplying a consideration replaces the whole traded side atomically:
    /// existing items are deleted before the normalized replacements are
    /// inserted, and the child-post link is set or cleared in the same
    /// transaction. A replacement that normalizes to zero items leaves the
    /// offer with zero items.
    pub async fn update_offer(&self, cmd: UpdateOfferCmd) -> ResultEngine<Offer> {
        with_tx!(self, |db_tx| {
            let offer = self.require_offer_by_id(&db_tx, cmd.offer_id).await?;
            if offer.author_id != cmd.acting_user_id {
                return Err(EngineError::Forbidden("not your offer".to_string()));
            }
            if OfferStatus::try_from(offer.status.as_str())? != OfferStatus::Pending {
                return Err(EngineError::Conflict(
                    "only pending offers can be edited".to_string(),
                ));
            }

            let offer_id = offer.id;
            let post_id = offer.post_id;
            let author_id = offer.author_id;
            let current_message = offer.message.clone();
            let mut active: offers::ActiveModel = offer.into();

            // Always write the message column so the UPDATE is never empty.
            active.message = ActiveValue::Set(cmd.message.unwrap_or(current_message));

            match cmd.consideration {
                Some(Consideration::Items(raw)) => {
                    self.delete_offer_items(&db_tx, offer_id).await?;
                    self.insert_offer_items(&db_tx, offer_id, normalize_items(raw))
                        .await?;
                    active.child_post_id = ActiveValue::Set(None);
                }
                Some(Consideration::ChildPost(child_post_id)) => {
                    self.resolve_child_post(&db_tx, post_id, author_id, child_post_id)
                        .await?;
                    self.delete_offer_items(&db_tx, offer_id).await?;
                    active.child_post_id = ActiveValue::Set(Some(child_post_id));
                }
                None => {}
            }

            active.update(&db_tx).await?;

            self.load_offer(&db_tx, offer_id).await
        })
    }
}
