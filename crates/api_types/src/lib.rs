use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod item {
    use super::*;

    /// Item fields as accepted on post/offer creation.
    ///
    /// Entries without a non-empty name are dropped server-side; condition
    /// defaults to `"unspecified"` and quantity to 1.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub name: String,
        pub description: Option<String>,
        pub condition: Option<String>,
        pub image_url: Option<String>,
        pub quantity: Option<i32>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub condition: String,
        pub image_url: Option<String>,
        pub quantity: i32,
    }
}

pub mod post {
    use super::*;
    use crate::item::{ItemNew, ItemView};
    use crate::offer::{OfferStatus, OfferView};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PostStatus {
        Open,
        Trading,
        Traded,
        Closed,
    }

    /// Query parameters for `GET /posts`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PostListQuery {
        pub status: Option<PostStatus>,
        pub author_id: Option<i32>,
        pub category_id: Option<i32>,
        /// Substring match against title or description.
        pub q: Option<String>,
        pub limit: Option<u64>,
        pub offset: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostNew {
        pub title: String,
        pub description: Option<String>,
        pub category_id: i32,
        pub items: Vec<ItemNew>,
    }

    /// Owner edit. `status` accepts only `open`/`closed`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PostUpdate {
        pub title: Option<String>,
        pub description: Option<String>,
        pub status: Option<PostStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostView {
        pub id: i32,
        pub author_id: i32,
        pub title: String,
        pub description: String,
        pub status: PostStatus,
        pub category_id: i32,
        /// RFC3339 timestamps in UTC.
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub items: Vec<ItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostSummaryView {
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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostListResponse {
        pub total: u64,
        pub limit: u64,
        pub offset: u64,
        pub posts: Vec<PostSummaryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OfferStatusCountView {
        pub status: OfferStatus,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostDetailResponse {
        pub post: PostView,
        pub username: Option<String>,
        /// Counts over all offers touching the post from either direction.
        pub offer_summary: Vec<OfferStatusCountView>,
        /// Offers that used this post as the traded side.
        pub linked_offers: Vec<OfferView>,
    }
}

pub mod offer {
    use super::*;
    use crate::item::{ItemNew, ItemView};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OfferStatus {
        Pending,
        Accepted,
        Rejected,
    }

    /// Query parameters for `GET /offers`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OfferListQuery {
        pub post_id: Option<i32>,
        pub author_id: Option<i32>,
        pub child_post_id: Option<i32>,
        pub status: Option<OfferStatus>,
        pub limit: Option<u64>,
        pub offset: Option<u64>,
    }

    /// Body for `POST /offers`.
    ///
    /// `items` and `child_post_id` are mutually exclusive; supplying both is
    /// a 400.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OfferNew {
        pub post_id: i32,
        pub message: Option<String>,
        pub items: Option<Vec<ItemNew>>,
        pub child_post_id: Option<i32>,
    }

    /// Body for `PATCH /offers/{id}` (author only, pending only).
    ///
    /// Supplying `items` replaces the item list wholesale and clears any
    /// child-post link; `items: []` clears both. Supplying `child_post_id`
    /// drops the items and links the post instead.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OfferUpdate {
        pub message: Option<String>,
        pub items: Option<Vec<ItemNew>>,
        pub child_post_id: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRefView {
        pub id: i32,
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostRefView {
        pub id: i32,
        pub title: String,
        pub author_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OfferView {
        pub id: i32,
        pub post_id: i32,
        pub author_id: i32,
        pub child_post_id: Option<i32>,
        pub message: String,
        pub status: OfferStatus,
        /// RFC3339 timestamp in UTC.
        pub created_at: DateTime<Utc>,
        pub items: Vec<ItemView>,
        pub author: Option<UserRefView>,
        pub post: Option<PostRefView>,
        pub child_post: Option<PostRefView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OfferListResponse {
        pub total: u64,
        pub limit: u64,
        pub offset: u64,
        pub offers: Vec<OfferView>,
    }
}

pub mod trade {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TradeStatus {
        Pending,
        Completed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TradeView {
        pub id: i32,
        pub post_id: i32,
        pub offer_id: i32,
        /// RFC3339 timestamp in UTC.
        pub agreed_at: DateTime<Utc>,
        pub status: TradeStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TradeListResponse {
        pub trades: Vec<TradeView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i32,
        pub name: String,
        pub post_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub username: String,
    }
}
