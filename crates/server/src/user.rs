//! The users entity, Basic-auth resolution, and registration.

use api_types::user::{UserNew, UserView};
use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use chrono::Utc;
use engine::EngineError;
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    pub password: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The acting user, resolved from Basic credentials.
///
/// Handlers that take this extractor reject unauthenticated requests with
/// 401; everything beyond identity (ownership, state checks) is the engine's
/// concern.
pub struct AuthUser(pub Model);

impl FromRequestParts<ServerState> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(auth) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| StatusCode::UNAUTHORIZED)?;
        if auth.username().is_empty() || auth.password().is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let user = Entity::find()
            .filter(Column::Username.eq(auth.username()))
            .filter(Column::Password.eq(auth.password()))
            .one(&state.db)
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        user.map(AuthUser).ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Registers a new user.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let username = payload.username.trim().to_string();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ServerError::Generic(
            "username and password are required".to_string(),
        ));
    }

    let exists = Entity::find()
        .filter(Column::Username.eq(username.clone()))
        .one(&state.db)
        .await
        .map_err(|err| ServerError::Engine(EngineError::Database(err)))?
        .is_some();
    if exists {
        return Err(ServerError::Engine(EngineError::Conflict(
            "username already taken".to_string(),
        )));
    }

    let user = ActiveModel {
        username: ActiveValue::Set(username),
        password: ActiveValue::Set(payload.password),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|err| ServerError::Engine(EngineError::Database(err)))?;

    Ok((
        StatusCode::CREATED,
        Json(UserView {
            id: user.id,
            username: user.username,
        }),
    ))
}
