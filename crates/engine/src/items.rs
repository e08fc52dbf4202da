//! Trade items.
//!
//! An [`Item`] is one physical thing attached to a parent record: the goods a
//! post lists, or the goods an offer puts on the table. Both parents share a
//! single table; `owner_kind`/`owner_id` select the parent.
//!
//! Items never exist on their own. They are deleted with their parent, and
//! offer items are replaced wholesale on edit.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Condition stored when the caller did not provide one.
pub(crate) const DEFAULT_CONDITION: &str = "unspecified";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ItemOwnerKind {
    Post,
    Offer,
}

impl ItemOwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Offer => "offer",
        }
    }
}

impl TryFrom<&str> for ItemOwnerKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "post" => Ok(Self::Post),
            "offer" => Ok(Self::Offer),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid item owner kind: {other}"
            ))),
        }
    }
}

/// A stored item, as returned in post and offer projections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub condition: String,
    pub image_url: Option<String>,
    pub quantity: i32,
}

/// Caller-supplied item fields, before normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub condition: Option<String>,
    pub image_url: Option<String>,
    pub quantity: Option<i32>,
}

/// A normalized item ready for insertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub condition: String,
    pub image_url: Option<String>,
    pub quantity: i32,
}

/// Normalizes raw items: entries without a non-empty name are dropped, names
/// are trimmed, condition falls back to [`DEFAULT_CONDITION`] and quantity to
/// 1 when absent or non-positive.
pub(crate) fn normalize_items(items: Vec<NewItem>) -> Vec<ItemDraft> {
    items
        .into_iter()
        .filter_map(|item| {
            let name = item.name.trim();
            if name.is_empty() {
                return None;
            }
            Some(ItemDraft {
                name: name.to_string(),
                description: item.description,
                condition: item
                    .condition
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
                image_url: item.image_url,
                quantity: item.quantity.filter(|q| *q > 0).unwrap_or(1),
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_kind: String,
    pub owner_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub condition: String,
    pub image_url: Option<String>,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            condition: model.condition,
            image_url: model.image_url,
            quantity: model.quantity,
        }
    }
}

impl ItemDraft {
    /// Builds the row for this draft under the given parent.
    pub(crate) fn into_model(self, owner_kind: ItemOwnerKind, owner_id: i32) -> ActiveModel {
        ActiveModel {
            owner_kind: ActiveValue::Set(owner_kind.as_str().to_string()),
            owner_id: ActiveValue::Set(owner_id),
            name: ActiveValue::Set(self.name),
            description: ActiveValue::Set(self.description),
            condition: ActiveValue::Set(self.condition),
            image_url: ActiveValue::Set(self.image_url),
            quantity: ActiveValue::Set(self.quantity),
            ..Default::default()
        }
    }
}
