//! Categories API endpoint

use api_types::category::{CategoryListResponse, CategoryView};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state.engine.list_categories().await?;
    Ok(Json(CategoryListResponse {
        categories: categories
            .into_iter()
            .map(|category| CategoryView {
                id: category.id,
                name: category.name,
                post_count: category.post_count,
            })
            .collect(),
    }))
}
