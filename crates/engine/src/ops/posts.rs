//! Post operations: owner CRUD, listing, and the read-side detail
//! projection.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    CreatePostCmd, EngineError, Item, Offer, OfferStatus, Post, PostStatus, ResultEngine,
    UpdatePostCmd, items, items::ItemOwnerKind, items::normalize_items, offers, posts, trades,
    users,
};

use super::{Engine, clamp_page, normalize_required_text, with_tx};

/// Filters for listing posts. Present filters AND-combine.
#[derive(Clone, Debug, Default)]
pub struct PostListFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    /// Substring match against title or description.
    pub q: Option<String>,
}

/// One listing row: the post plus denormalized author and offer count.
#[derive(Clone, Debug)]
pub struct PostSummary {
    pub id: i32,
    pub author_id: i32,
    pub username: Option<String>,
    pub title: String,
    pub description: String,
    pub status: PostStatus,
    pub category_id: i32,
    pub offer_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of post summaries plus the total count for the filter.
#[derive(Clone, Debug)]
pub struct PostPage {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub posts: Vec<PostSummary>,
}

/// Offer count per status, for the detail projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OfferStatusCount {
    pub status: OfferStatus,
    pub count: u64,
}

/// The full detail projection for one post.
#[derive(Clone, Debug)]
pub struct PostDetail {
    pub post: Post,
    pub username: Option<String>,
    /// Counts over all offers touching the post from either direction
    /// (as the post being offered on, or as the traded child post).
    pub offer_summary: Vec<OfferStatusCount>,
    /// Offers that used this post as the traded side of a two-way listing.
    pub linked_offers: Vec<Offer>,
}

impl Engine {
    /// Creates an `open` post with its items. At least one valid item is
    /// required; the category must exist.
    pub async fn create_post(&self, cmd: CreatePostCmd) -> ResultEngine<Post> {
        let title = normalize_required_text(&cmd.title, "title")?;
        let drafts = normalize_items(cmd.items);
        if drafts.is_empty() {
            return Err(EngineError::InvalidArgument(
                "at least one item is required".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_category_exists(&db_tx, cmd.category_id).await?;

            let now = Utc::now();
            let post_model = posts::ActiveModel {
                author_id: ActiveValue::Set(cmd.author_id),
                title: ActiveValue::Set(title),
                description: ActiveValue::Set(cmd.description),
                status: ActiveValue::Set(PostStatus::Open.as_str().to_string()),
                category_id: ActiveValue::Set(cmd.category_id),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            for draft in drafts {
                draft
                    .into_model(ItemOwnerKind::Post, post_model.id)
                    .insert(&db_tx)
                    .await?;
            }

            self.load_post(&db_tx, post_model.id).await
        })
    }

    /// Updates owner-editable fields. Owners may toggle `open`/`closed`;
    /// settlement states are reserved to the engine, and a settled post
    /// cannot be reopened.
    pub async fn update_post(&self, cmd: UpdatePostCmd) -> ResultEngine<Post> {
        with_tx!(self, |db_tx| {
            let post = self
                .require_post_owner(&db_tx, cmd.post_id, cmd.acting_user_id)
                .await?;
            let current = PostStatus::try_from(post.status.as_str())?;

            if let Some(next) = cmd.status {
                match next {
                    PostStatus::Trading | PostStatus::Traded => {
                        return Err(EngineError::InvalidArgument(
                            "status can only be set to open or closed".to_string(),
                        ));
                    }
                    PostStatus::Open | PostStatus::Closed => {
                        if matches!(current, PostStatus::Trading | PostStatus::Traded) {
                            return Err(EngineError::Conflict(
                                "post is already settled".to_string(),
                            ));
                        }
                    }
                }
            }

            let post_id = post.id;
            let mut active: posts::ActiveModel = post.into();
            if let Some(title) = cmd.title {
                active.title = ActiveValue::Set(normalize_required_text(&title, "title")?);
            }
            if let Some(description) = cmd.description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(status) = cmd.status {
                active.status = ActiveValue::Set(status.as_str().to_string());
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;

            self.load_post(&db_tx, post_id).await
        })
    }

    /// Deletes a post with its items and the offers made on it. A settled
    /// post stays: the trade references it. Offers that used this post as
    /// their child keep their row with the link cleared.
    pub async fn delete_post(&self, post_id: i32, acting_user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let post = self
                .require_post_owner(&db_tx, post_id, acting_user_id)
                .await?;
            if PostStatus::try_from(post.status.as_str())? == PostStatus::Traded {
                return Err(EngineError::Conflict("post is already settled".to_string()));
            }
            let settled = trades::Entity::find()
                .filter(trades::Column::PostId.eq(post.id))
                .one(&db_tx)
                .await?
                .is_some();
            if settled {
                return Err(EngineError::Conflict("post has a settled trade".to_string()));
            }

            let offer_ids: Vec<i32> = offers::Entity::find()
                .filter(offers::Column::PostId.eq(post.id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|offer| offer.id)
                .collect();
            if !offer_ids.is_empty() {
                items::Entity::delete_many()
                    .filter(items::Column::OwnerKind.eq(ItemOwnerKind::Offer.as_str()))
                    .filter(items::Column::OwnerId.is_in(offer_ids))
                    .exec(&db_tx)
                    .await?;
                offers::Entity::delete_many()
                    .filter(offers::Column::PostId.eq(post.id))
                    .exec(&db_tx)
                    .await?;
            }

            offers::Entity::update_many()
                .col_expr(offers::Column::ChildPostId, Expr::value(None::<i32>))
                .filter(offers::Column::ChildPostId.eq(post.id))
                .exec(&db_tx)
                .await?;

            items::Entity::delete_many()
                .filter(items::Column::OwnerKind.eq(ItemOwnerKind::Post.as_str()))
                .filter(items::Column::OwnerId.eq(post.id))
                .exec(&db_tx)
                .await?;
            posts::Entity::delete_by_id(post.id).exec(&db_tx).await?;

            Ok(())
        })
    }

    /// Lists posts matching `filter`, most recently updated first.
    pub async fn list_posts(
        &self,
        filter: &PostListFilter,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> ResultEngine<PostPage> {
        let (limit, offset) = clamp_page(limit, offset);
        with_tx!(self, |db_tx| {
            let mut query = posts::Entity::find();
            if let Some(status) = filter.status {
                query = query.filter(posts::Column::Status.eq(status.as_str()));
            }
            if let Some(author_id) = filter.author_id {
                query = query.filter(posts::Column::AuthorId.eq(author_id));
            }
            if let Some(category_id) = filter.category_id {
                query = query.filter(posts::Column::CategoryId.eq(category_id));
            }
            if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
                query = query.filter(
                    Condition::any()
                        .add(posts::Column::Title.contains(q))
                        .add(posts::Column::Description.contains(q)),
                );
            }

            let total = query.clone().count(&db_tx).await?;
            let rows = query
                .order_by_desc(posts::Column::UpdatedAt)
                .order_by_desc(posts::Column::Id)
                .limit(limit)
                .offset(offset)
                .all(&db_tx)
                .await?;

            let post_ids: Vec<i32> = rows.iter().map(|post| post.id).collect();
            let author_ids: Vec<i32> = rows.iter().map(|post| post.author_id).collect();

            let offer_counts: HashMap<i32, i64> = if post_ids.is_empty() {
                HashMap::new()
            } else {
                offers::Entity::find()
                    .select_only()
                    .column(offers::Column::PostId)
                    .column_as(offers::Column::Id.count(), "count")
                    .filter(offers::Column::PostId.is_in(post_ids))
                    .group_by(offers::Column::PostId)
                    .into_tuple::<(i32, i64)>()
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .collect()
            };

            let usernames: HashMap<i32, String> = users::Entity::find()
                .filter(users::Column::Id.is_in(author_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|user| (user.id, user.username))
                .collect();

            let mut summaries = Vec::with_capacity(rows.len());
            for row in rows {
                summaries.push(PostSummary {
                    id: row.id,
                    author_id: row.author_id,
                    username: usernames.get(&row.author_id).cloned(),
                    title: row.title,
                    description: row.description,
                    status: PostStatus::try_from(row.status.as_str())?,
                    category_id: row.category_id,
                    offer_count: offer_counts.get(&row.id).copied().unwrap_or(0) as u64,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                });
            }

            Ok(PostPage {
                total,
                limit,
                offset,
                posts: summaries,
            })
        })
    }

    /// Builds the detail projection for one post inside a single read
    /// transaction, so a concurrent accept can never produce a torn view.
    pub async fn post_detail(&self, post_id: i32) -> ResultEngine<PostDetail> {
        with_tx!(self, |db_tx| {
            let post = self.load_post(&db_tx, post_id).await?;
            let username = users::Entity::find_by_id(post.author_id)
                .one(&db_tx)
                .await?
                .map(|user| user.username);

            let count_rows: Vec<(String, i64)> = offers::Entity::find()
                .select_only()
                .column(offers::Column::Status)
                .column_as(offers::Column::Id.count(), "count")
                .filter(
                    Condition::any()
                        .add(offers::Column::PostId.eq(post_id))
                        .add(offers::Column::ChildPostId.eq(post_id)),
                )
                .group_by(offers::Column::Status)
                .into_tuple()
                .all(&db_tx)
                .await?;
            let mut offer_summary = Vec::with_capacity(count_rows.len());
            for (status, count) in count_rows {
                offer_summary.push(OfferStatusCount {
                    status: OfferStatus::try_from(status.as_str())?,
                    count: count.max(0) as u64,
                });
            }

            let linked_rows = offers::Entity::find()
                .filter(offers::Column::ChildPostId.eq(post_id))
                .order_by_desc(offers::Column::CreatedAt)
                .order_by_desc(offers::Column::Id)
                .limit(100)
                .all(&db_tx)
                .await?;
            let linked_offers = self.hydrate_offers(&db_tx, linked_rows).await?;

            Ok(PostDetail {
                post,
                username,
                offer_summary,
                linked_offers,
            })
        })
    }

    /// Loads one post with its items inside an open transaction.
    pub(in crate::ops) async fn load_post(
        &self,
        db: &DatabaseTransaction,
        post_id: i32,
    ) -> ResultEngine<Post> {
        let model = self.require_post_by_id(db, post_id).await?;
        let mut post = Post::try_from(model)?;
        post.items = items::Entity::find()
            .filter(items::Column::OwnerKind.eq(ItemOwnerKind::Post.as_str()))
            .filter(items::Column::OwnerId.eq(post_id))
            .order_by_asc(items::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(Item::from)
            .collect();
        Ok(post)
    }
}
