//! Posts API endpoints

use api_types::post::{
    OfferStatusCountView, PostDetailResponse, PostListQuery, PostListResponse, PostNew,
    PostStatus as ApiPostStatus, PostSummaryView, PostUpdate, PostView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    ServerError, offers,
    offers::{map_item, map_item_new, map_offer_status},
    server::ServerState,
    user::AuthUser,
};

fn map_post_status(status: engine::PostStatus) -> ApiPostStatus {
    match status {
        engine::PostStatus::Open => ApiPostStatus::Open,
        engine::PostStatus::Trading => ApiPostStatus::Trading,
        engine::PostStatus::Traded => ApiPostStatus::Traded,
        engine::PostStatus::Closed => ApiPostStatus::Closed,
    }
}

fn map_post_status_from(status: ApiPostStatus) -> engine::PostStatus {
    match status {
        ApiPostStatus::Open => engine::PostStatus::Open,
        ApiPostStatus::Trading => engine::PostStatus::Trading,
        ApiPostStatus::Traded => engine::PostStatus::Traded,
        ApiPostStatus::Closed => engine::PostStatus::Closed,
    }
}

fn post_view(post: engine::Post) -> PostView {
    PostView {
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        description: post.description,
        status: map_post_status(post.status),
        category_id: post.category_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
        items: post.items.into_iter().map(map_item).collect(),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PostListResponse>, ServerError> {
    let filter = engine::PostListFilter {
        status: query.status.map(map_post_status_from),
        author_id: query.author_id,
        category_id: query.category_id,
        q: query.q,
    };

    let page = state
        .engine
        .list_posts(&filter, query.limit, query.offset)
        .await?;

    let posts = page
        .posts
        .into_iter()
        .map(|post| PostSummaryView {
            id: post.id,
            author_id: post.author_id,
            username: post.username,
            title: post.title,
            description: post.description,
            status: map_post_status(post.status),
            category_id: post.category_id,
            offer_count: post.offer_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
        .collect();

    Ok(Json(PostListResponse {
        total: page.total,
        limit: page.limit,
        offset: page.offset,
        posts,
    }))
}

pub async fn get_detail(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<PostDetailResponse>, ServerError> {
    let detail = state.engine.post_detail(id).await?;

    Ok(Json(PostDetailResponse {
        post: post_view(detail.post),
        username: detail.username,
        offer_summary: detail
            .offer_summary
            .into_iter()
            .map(|entry| OfferStatusCountView {
                status: map_offer_status(entry.status),
                count: entry.count,
            })
            .collect(),
        linked_offers: detail
            .linked_offers
            .into_iter()
            .map(offers::offer_view)
            .collect(),
    }))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<ServerState>,
    Json(payload): Json<PostNew>,
) -> Result<(StatusCode, Json<PostView>), ServerError> {
    let post = state
        .engine
        .create_post(engine::CreatePostCmd {
            author_id: auth.0.id,
            title: payload.title,
            description: payload.description.unwrap_or_default(),
            category_id: payload.category_id,
            items: payload.items.into_iter().map(map_item_new).collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(post_view(post))))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<PostUpdate>,
) -> Result<Json<PostView>, ServerError> {
    let post = state
        .engine
        .update_post(engine::UpdatePostCmd {
            post_id: id,
            acting_user_id: auth.0.id,
            title: payload.title,
            description: payload.description,
            status: payload.status.map(map_post_status_from),
        })
        .await?;

    Ok(Json(post_view(post)))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_post(id, auth.0.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
