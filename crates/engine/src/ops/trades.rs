//! Trade ledger reads.
//!
//! The ledger is append-only: rows are created inside `accept_offer` and
//! these queries are the only other access path.

use sea_orm::{
    Condition, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Query},
};

use crate::{ResultEngine, Trade, offers, posts, trades};

use super::{Engine, with_tx};

impl Engine {
    /// Trades settling a given post, newest first.
    pub async fn trades_for_post(&self, post_id: i32) -> ResultEngine<Vec<Trade>> {
        with_tx!(self, |db_tx| {
            self.require_post_by_id(&db_tx, post_id).await?;
            let rows = trades::Entity::find()
                .filter(trades::Column::PostId.eq(post_id))
                .order_by_desc(trades::Column::AgreedAt)
                .order_by_desc(trades::Column::Id)
                .all(&db_tx)
                .await?;
            rows.into_iter()
                .map(Trade::try_from)
                .collect::<ResultEngine<Vec<Trade>>>()
        })
    }

    /// Trades touching a user from either side: settlements of their posts,
    /// or settlements won by their offers. Newest first.
    pub async fn trades_for_user(&self, user_id: i32) -> ResultEngine<Vec<Trade>> {
        with_tx!(self, |db_tx| {
            let posts_by_user = Query::select()
                .column(posts::Column::Id)
                .from(posts::Entity)
                .and_where(Expr::col(posts::Column::AuthorId).eq(user_id))
                .to_owned();
            let offers_by_user = Query::select()
                .column(offers::Column::Id)
                .from(offers::Entity)
                .and_where(Expr::col(offers::Column::AuthorId).eq(user_id))
                .to_owned();

            let rows = trades::Entity::find()
                .filter(
                    Condition::any()
                        .add(trades::Column::PostId.in_subquery(posts_by_user))
                        .add(trades::Column::OfferId.in_subquery(offers_by_user)),
                )
                .order_by_desc(trades::Column::AgreedAt)
                .order_by_desc(trades::Column::Id)
                .all(&db_tx)
                .await?;
            rows.into_iter()
                .map(Trade::try_from)
                .collect::<ResultEngine<Vec<Trade>>>()
        })
    }
}
