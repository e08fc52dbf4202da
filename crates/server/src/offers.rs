//! Offers API endpoints

use api_types::item::{ItemNew, ItemView};
use api_types::offer::{
    OfferListQuery, OfferListResponse, OfferNew, OfferStatus as ApiOfferStatus, OfferUpdate,
    OfferView, PostRefView, UserRefView,
};
use api_types::trade::TradeView;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, trades, user::AuthUser};

pub(crate) fn map_offer_status(status: engine::OfferStatus) -> ApiOfferStatus {
    match status {
        engine::OfferStatus::Pending => ApiOfferStatus::Pending,
        engine::OfferStatus::Accepted => ApiOfferStatus::Accepted,
        engine::OfferStatus::Rejected => ApiOfferStatus::Rejected,
    }
}

fn map_offer_status_from(status: ApiOfferStatus) -> engine::OfferStatus {
    match status {
        ApiOfferStatus::Pending => engine::OfferStatus::Pending,
        ApiOfferStatus::Accepted => engine::OfferStatus::Accepted,
        ApiOfferStatus::Rejected => engine::OfferStatus::Rejected,
    }
}

pub(crate) fn map_item(item: engine::Item) -> ItemView {
    ItemView {
        id: item.id,
        name: item.name,
        description: item.description,
        condition: item.condition,
        image_url: item.image_url,
        quantity: item.quantity,
    }
}

pub(crate) fn map_item_new(item: ItemNew) -> engine::NewItem {
    engine::NewItem {
        name: item.name,
        description: item.description,
        condition: item.condition,
        image_url: item.image_url,
        quantity: item.quantity,
    }
}

pub(crate) fn offer_view(offer: engine::Offer) -> OfferView {
    OfferView {
        id: offer.id,
        post_id: offer.post_id,
        author_id: offer.author_id,
        child_post_id: offer.child_post_id,
        message: offer.message,
        status: map_offer_status(offer.status),
        created_at: offer.created_at,
        items: offer.items.into_iter().map(map_item).collect(),
        author: offer.author.map(|author| UserRefView {
            id: author.id,
            username: author.username,
        }),
        post: offer.post.map(post_ref_view),
        child_post: offer.child_post.map(post_ref_view),
    }
}

fn post_ref_view(post: engine::PostRef) -> PostRefView {
    PostRefView {
        id: post.id,
        title: post.title,
        author_id: post.author_id,
    }
}

/// The traded side of an offer body: a loose item list or a child post,
/// never both.
fn map_consideration(
    items: Option<Vec<ItemNew>>,
    child_post_id: Option<i32>,
) -> Result<Option<engine::Consideration>, ServerError> {
    match (items, child_post_id) {
        (Some(_), Some(_)) => Err(ServerError::Generic(
            "items and child_post_id are mutually exclusive".to_string(),
        )),
        (Some(items), None) => Ok(Some(engine::Consideration::Items(
            items.into_iter().map(map_item_new).collect(),
        ))),
        (None, Some(child_post_id)) => Ok(Some(engine::Consideration::ChildPost(child_post_id))),
        (None, None) => Ok(None),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OfferListQuery>,
) -> Result<Json<OfferListResponse>, ServerError> {
    let filter = engine::OfferListFilter {
        post_id: query.post_id,
        author_id: query.author_id,
        child_post_id: query.child_post_id,
        status: query.status.map(map_offer_status_from),
    };

    let page = state
        .engine
        .list_offers(&filter, query.limit, query.offset)
        .await?;

    Ok(Json(OfferListResponse {
        total: page.total,
        limit: page.limit,
        offset: page.offset,
        offers: page.offers.into_iter().map(offer_view).collect(),
    }))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<OfferView>, ServerError> {
    let offer = state.engine.offer_by_id(id).await?;
    Ok(Json(offer_view(offer)))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<ServerState>,
    Json(payload): Json<OfferNew>,
) -> Result<(StatusCode, Json<OfferView>), ServerError> {
    let consideration = map_consideration(payload.items, payload.child_post_id)?
        .unwrap_or(engine::Consideration::Items(Vec::new()));

    let offer = state
        .engine
        .create_offer(engine::CreateOfferCmd {
            post_id: payload.post_id,
            author_id: auth.0.id,
            message: payload.message.unwrap_or_default(),
            consideration,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(offer_view(offer))))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<OfferUpdate>,
) -> Result<Json<OfferView>, ServerError> {
    let consideration = map_consideration(payload.items, payload.child_post_id)?;

    let offer = state
        .engine
        .update_offer(engine::UpdateOfferCmd {
            offer_id: id,
            acting_user_id: auth.0.id,
            message: payload.message,
            consideration,
        })
        .await?;

    Ok(Json(offer_view(offer)))
}

pub async fn accept(
    auth: AuthUser,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<TradeView>), ServerError> {
    let trade = state.engine.accept_offer(id, auth.0.id).await?;
    Ok((StatusCode::CREATED, Json(trades::trade_view(trade))))
}

pub async fn reject(
    auth: AuthUser,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<OfferView>, ServerError> {
    let offer = state.engine.reject_offer(id, auth.0.id).await?;
    Ok(Json(offer_view(offer)))
}
