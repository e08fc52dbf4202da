//! Offers: proposals made by a user against somebody else's post.
//!
//! The traded consideration is a tagged value: either a loose item list or a
//! reference to the author's own "child" post. The two shapes are mutually
//! exclusive by construction; see [`Consideration`].
//!
//! Status moves `pending → accepted` or `pending → rejected`, both terminal.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Item, NewItem};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for OfferStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid offer status: {other}"
            ))),
        }
    }
}

/// What the offering user puts on the table.
///
/// `Items(vec![])` is a valid, empty consideration (items are optional
/// enrichment); it is also how an existing child-post link is cleared on
/// update. A "both items and child post" state is not representable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Consideration {
    Items(Vec<NewItem>),
    ChildPost(i32),
}

/// Denormalized author reference for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i32,
    pub username: String,
}

/// Denormalized post reference for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
}

/// An offer with its items and display references, as returned by engine
/// reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offer {
    pub id: i32,
    pub post_id: i32,
    pub author_id: i32,
    pub child_post_id: Option<i32>,
    pub message: String,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<Item>,
    pub author: Option<UserRef>,
    pub post: Option<PostRef>,
    pub child_post: Option<PostRef>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub post_id: i32,
    pub author_id: i32,
    pub child_post_id: Option<i32>,
    pub message: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::posts::Entity",
        from = "Column::PostId",
        to = "super::posts::Column::Id"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::posts::Entity",
        from = "Column::ChildPostId",
        to = "super::posts::Column::Id"
    )]
    ChildPost,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Offer {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            post_id: model.post_id,
            author_id: model.author_id,
            child_post_id: model.child_post_id,
            message: model.message,
            status: OfferStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            items: Vec::new(),
            author: None,
            post: None,
            child_post: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for status in [
            OfferStatus::Pending,
            OfferStatus::Accepted,
            OfferStatus::Rejected,
        ] {
            assert_eq!(OfferStatus::try_from(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(matches!(
            OfferStatus::try_from("withdrawn"),
            Err(EngineError::InvalidArgument(_))
        ));
    }
}
