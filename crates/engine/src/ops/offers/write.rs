mod accept;
mod create;
mod reject;
mod update;

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{ResultEngine, items, items::ItemDraft, items::ItemOwnerKind};

use super::super::Engine;

impl Engine {
    /// Deletes every item attached to an offer.
    pub(in crate::ops) async fn delete_offer_items(
        &self,
        db: &DatabaseTransaction,
        offer_id: i32,
    ) -> ResultEngine<()> {
        items::Entity::delete_many()
            .filter(items::Column::OwnerKind.eq(ItemOwnerKind::Offer.as_str()))
            .filter(items::Column::OwnerId.eq(offer_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Inserts normalized item drafts under an offer.
    pub(in crate::ops) async fn insert_offer_items(
        &self,
        db: &DatabaseTransaction,
        offer_id: i32,
        drafts: Vec<ItemDraft>,
    ) -> ResultEngine<()> {
        for draft in drafts {
            draft
                .into_model(ItemOwnerKind::Offer, offer_id)
                .insert(db)
                .await?;
        }
        Ok(())
    }
}
