use std::collections::HashMap;

use sea_orm::{
    DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Item, Offer, OfferStatus, PostRef, ResultEngine, UserRef, items, offers, posts,
    users,
};

use super::super::{Engine, clamp_page, with_tx};

/// Filters for listing offers. Present filters AND-combine; absent ones are
/// omitted, not defaulted.
#[derive(Clone, Debug, Default)]
pub struct OfferListFilter {
    /// Offers made *on* this post.
    pub post_id: Option<i32>,
    /// Offers made *by* this user.
    pub author_id: Option<i32>,
    /// Offers that put this post on the table as the traded side.
    pub child_post_id: Option<i32>,
    pub status: Option<OfferStatus>,
}

/// One page of offers plus the total count for the filter.
#[derive(Clone, Debug)]
pub struct OfferPage {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub offers: Vec<Offer>,
}

fn apply_offer_filters(
    mut query: Select<offers::Entity>,
    filter: &OfferListFilter,
) -> Select<offers::Entity> {
    if let Some(post_id) = filter.post_id {
        query = query.filter(offers::Column::PostId.eq(post_id));
    }
    if let Some(author_id) = filter.author_id {
        query = query.filter(offers::Column::AuthorId.eq(author_id));
    }
    if let Some(child_post_id) = filter.child_post_id {
        query = query.filter(offers::Column::ChildPostId.eq(child_post_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(offers::Column::Status.eq(status.as_str()));
    }
    query
}

impl Engine {
    /// Lists offers matching `filter`, newest first (ties broken by id
    /// descending, so pages stay stable).
    pub async fn list_offers(
        &self,
        filter: &OfferListFilter,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> ResultEngine<OfferPage> {
        let (limit, offset) = clamp_page(limit, offset);
        with_tx!(self, |db_tx| {
            let query = apply_offer_filters(offers::Entity::find(), filter);
            let total = query.clone().count(&db_tx).await?;

            let rows = query
                .order_by_desc(offers::Column::CreatedAt)
                .order_by_desc(offers::Column::Id)
                .limit(limit)
                .offset(offset)
                .all(&db_tx)
                .await?;
            let offers = self.hydrate_offers(&db_tx, rows).await?;

            Ok(OfferPage {
                total,
                limit,
                offset,
                offers,
            })
        })
    }

    /// Returns the full offer projection, or `NotFound`.
    pub async fn offer_by_id(&self, offer_id: i32) -> ResultEngine<Offer> {
        with_tx!(self, |db_tx| self.load_offer(&db_tx, offer_id).await)
    }

    /// Loads one offer with items and display references inside an open
    /// transaction.
    pub(in crate::ops) async fn load_offer(
        &self,
        db: &DatabaseTransaction,
        offer_id: i32,
    ) -> ResultEngine<Offer> {
        let model = self.require_offer_by_id(db, offer_id).await?;
        let mut offers = self.hydrate_offers(db, vec![model]).await?;
        offers
            .pop()
            .ok_or_else(|| EngineError::NotFound("offer not found".to_string()))
    }

    /// Attaches items, author and post references to raw offer rows.
    ///
    /// Batched: one query per related table regardless of page size.
    pub(in crate::ops) async fn hydrate_offers(
        &self,
        db: &DatabaseTransaction,
        models: Vec<offers::Model>,
    ) -> ResultEngine<Vec<Offer>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let offer_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let author_ids: Vec<i32> = models.iter().map(|m| m.author_id).collect();
        let mut post_ids: Vec<i32> = models.iter().map(|m| m.post_id).collect();
        post_ids.extend(models.iter().filter_map(|m| m.child_post_id));

        let item_models = items::Entity::find()
            .filter(items::Column::OwnerKind.eq(items::ItemOwnerKind::Offer.as_str()))
            .filter(items::Column::OwnerId.is_in(offer_ids))
            .order_by_asc(items::Column::Id)
            .all(db)
            .await?;
        let mut items_by_offer: HashMap<i32, Vec<Item>> = HashMap::new();
        for model in item_models {
            items_by_offer
                .entry(model.owner_id)
                .or_default()
                .push(Item::from(model));
        }

        let users_by_id: HashMap<i32, UserRef> = users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|user| {
                (
                    user.id,
                    UserRef {
                        id: user.id,
                        username: user.username,
                    },
                )
            })
            .collect();

        let posts_by_id: HashMap<i32, PostRef> = posts::Entity::find()
            .filter(posts::Column::Id.is_in(post_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|post| {
                (
                    post.id,
                    PostRef {
                        id: post.id,
                        title: post.title,
                        author_id: post.author_id,
                    },
                )
            })
            .collect();

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let mut offer = Offer::try_from(model)?;
            offer.items = items_by_offer.remove(&offer.id).unwrap_or_default();
            offer.author = users_by_id.get(&offer.author_id).cloned();
            offer.post = posts_by_id.get(&offer.post_id).cloned();
            offer.child_post = offer
                .child_post_id
                .and_then(|id| posts_by_id.get(&id).cloned());
            out.push(offer);
        }
        Ok(out)
    }
}
