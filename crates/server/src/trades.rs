//! Trade ledger API endpoints (read-only; the ledger is append-only and
//! rows are created inside the accept transaction).

use api_types::trade::{TradeListResponse, TradeStatus as ApiTradeStatus, TradeView};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState, user::AuthUser};

pub(crate) fn trade_view(trade: engine::Trade) -> TradeView {
    TradeView {
        id: trade.id,
        post_id: trade.post_id,
        offer_id: trade.offer_id,
        agreed_at: trade.agreed_at,
        status: match trade.status {
            engine::TradeStatus::Pending => ApiTradeStatus::Pending,
            engine::TradeStatus::Completed => ApiTradeStatus::Completed,
        },
    }
}

pub async fn list_for_post(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<TradeListResponse>, ServerError> {
    let trades = state.engine.trades_for_post(id).await?;
    Ok(Json(TradeListResponse {
        trades: trades.into_iter().map(trade_view).collect(),
    }))
}

pub async fn list_mine(
    auth: AuthUser,
    State(state): State<ServerState>,
) -> Result<Json<TradeListResponse>, ServerError> {
    let trades = state.engine.trades_for_user(auth.0.id).await?;
    Ok(Json(TradeListResponse {
        trades: trades.into_iter().map(trade_view).collect(),
    }))
}
