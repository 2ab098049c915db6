pub mod table;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::game::{ActionRequest, ErrorBody, GameStateSnapshot};
use table::{RoundAdvance, Table, TableConfig, TableError};

/// The server hosts a single table; starting a game replaces it.
#[derive(Clone)]
struct AppState {
    table: Arc<Mutex<Option<Table>>>,
    config: TableConfig,
}

impl AppState {
    fn new(config: TableConfig) -> Self {
        Self {
            table: Arc::new(Mutex::new(None)),
            config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("No active game")]
    NoActiveGame,
    #[error(transparent)]
    Table(#[from] TableError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

pub async fn serve(addr: SocketAddr, config: TableConfig) -> Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "table server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Runs the server on an ephemeral loopback port in the background.
pub async fn spawn_local(config: TableConfig) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(config);
    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            warn!(error = %err, "local table server stopped");
        }
    });
    info!(%addr, "local table server started");
    Ok((addr, handle))
}

pub fn router(config: TableConfig) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/start_game", post(start_game))
        .route("/action", post(apply_action))
        .route("/next_round", post(next_round))
        .route("/game_state", get(game_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(config))
}

async fn health() -> &'static str {
    "ok"
}

async fn start_game(State(state): State<AppState>) -> Json<GameStateSnapshot> {
    let mut table = Table::new(state.config.clone());
    let snapshot = table.start_game();
    *state.table.lock() = Some(table);
    Json(snapshot)
}

async fn apply_action(
    State(state): State<AppState>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<GameStateSnapshot>, ApiError> {
    let mut guard = state.table.lock();
    let table = guard.as_mut().ok_or(ApiError::NoActiveGame)?;
    Ok(Json(table.process_action(req.action, req.amount)?))
}

async fn next_round(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut guard = state.table.lock();
    let table = guard.as_mut().ok_or(ApiError::NoActiveGame)?;
    let response = match table.next_round()? {
        RoundAdvance::Dealt(snapshot) => Json(snapshot).into_response(),
        RoundAdvance::Finished(summary) => Json(summary).into_response(),
    };
    Ok(response)
}

async fn game_state(State(state): State<AppState>) -> Result<Json<GameStateSnapshot>, ApiError> {
    let guard = state.table.lock();
    let table = guard.as_ref().ok_or(ApiError::NoActiveGame)?;
    Ok(Json(table.snapshot(table.is_finished())))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::game::ActionKind;

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn actions_without_a_game_are_rejected() {
        let app = router(TableConfig::default());
        let response = app
            .oneshot(post_json("/action", r#"{"action":"call"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "No active game");
    }

    #[tokio::test]
    async fn oversized_raise_reports_the_stack() {
        let app = router(TableConfig {
            seed: Some(9),
            ..TableConfig::default()
        });
        let started = app
            .clone()
            .oneshot(post_json("/start_game", ""))
            .await
            .unwrap();
        assert_eq!(started.status(), StatusCode::OK);

        let request = serde_json::to_string(&ActionRequest::new(ActionKind::Raise, Some(5000)))
            .unwrap();
        let response = app.oneshot(post_json("/action", &request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Cannot raise more than your stack ($990)");
    }
}
