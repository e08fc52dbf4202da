//! Posts: listings of items a user wants to trade away.
//!
//! A post is owned by its author and moves through `open → traded` when an
//! offer on it is accepted, or `open → closed` when the owner withdraws it.
//! Only the engine settles a post; owners never set `trading`/`traded`
//! directly.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Item};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Open,
    Trading,
    Traded,
    Closed,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Trading => "trading",
            Self::Traded => "traded",
            Self::Closed => "closed",
        }
    }

    /// A settled or withdrawn post accepts no further offers.
    pub fn accepts_offers(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl TryFrom<&str> for PostStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "trading" => Ok(Self::Trading),
            "traded" => Ok(Self::Traded),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid post status: {other}"
            ))),
        }
    }
}

/// A post with its items, as returned by engine reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub description: String,
    pub status: PostStatus,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub category_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::offers::Entity")]
    Offers,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Post {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            description: model.description,
            status: PostStatus::try_from(model.status.as_str())?,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            items: Vec::new(),
        })
    }
}
