use std::collections::HashMap;

use sea_orm::{QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{ResultEngine, categories, posts};

use super::{Engine, with_tx};

/// A category with the number of posts filed under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
    pub post_count: u64,
}

impl Engine {
    /// Lists all categories with post counts, ordered by name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<CategorySummary>> {
        with_tx!(self, |db_tx| {
            let rows = categories::Entity::find()
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;

            let counts: HashMap<i32, i64> = posts::Entity::find()
                .select_only()
                .column(posts::Column::CategoryId)
                .column_as(posts::Column::Id.count(), "count")
                .group_by(posts::Column::CategoryId)
                .into_tuple::<(i32, i64)>()
                .all(&db_tx)
                .await?
                .into_iter()
                .collect();

            Ok(rows
                .into_iter()
                .map(|category| CategorySummary {
                    post_count: counts.get(&category.id).copied().unwrap_or(0) as u64,
                    id: category.id,
                    name: category.name,
                })
                .collect())
        })
    }
}
