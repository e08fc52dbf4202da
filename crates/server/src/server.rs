use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{categories, offers, posts, trades, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Builds the application router.
///
/// Reads (listings, details, categories) are public. Writes resolve the
/// acting user from Basic credentials via the [`user::AuthUser`] extractor;
/// every domain-level authorization decision stays inside the engine.
pub fn app(engine: Engine, db: DatabaseConnection) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    Router::new()
        .route("/posts", get(posts::list).post(posts::create))
        .route(
            "/posts/{id}",
            get(posts::get_detail)
                .patch(posts::update)
                .delete(posts::delete),
        )
        .route("/posts/{id}/trades", get(trades::list_for_post))
        .route("/offers", get(offers::list).post(offers::create))
        .route("/offers/{id}", get(offers::get_by_id).patch(offers::update))
        .route("/offers/{id}/accept", post(offers::accept))
        .route("/offers/{id}/reject", post(offers::reject))
        .route("/trades/mine", get(trades::list_mine))
        .route("/categories", get(categories::list))
        .route("/users", post(user::register))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, db)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
