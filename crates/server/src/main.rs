use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use server_api::{list_technologists, submit_join, ApiContext};
use shared::{
    domain::TechnologistEntry,
    error::{ApiError, ErrorCode},
    protocol::{JoinSubmission, JoinSubmissionReceipt},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

const MAX_JOIN_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    if let Some(seed_path) = settings.roster_seed.as_deref() {
        seed_roster_if_empty(&storage, seed_path).await?;
    }

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "directory server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/technologists", get(http_list_technologists))
        .route("/api/join", post(http_submit_join))
        .layer(RequestBodyLimitLayer::new(MAX_JOIN_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_technologists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TechnologistEntry>>, (StatusCode, Json<ApiError>)> {
    let roster = list_technologists(&state.api).await.map_err(reject)?;
    Ok(Json(roster))
}

async fn http_submit_join(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JoinSubmission>,
) -> Result<(StatusCode, Json<JoinSubmissionReceipt>), (StatusCode, Json<ApiError>)> {
    let submission_id = submit_join(&state.api, &req).await.map_err(reject)?;
    Ok((
        StatusCode::CREATED,
        Json(JoinSubmissionReceipt { submission_id }),
    ))
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}

/// One-time roster bootstrap: when the members table is empty and a seed
/// file is configured, load it as a JSON array of roster entries.
async fn seed_roster_if_empty(storage: &Storage, seed_path: &str) -> anyhow::Result<()> {
    if storage.count_members().await? > 0 {
        return Ok(());
    }

    let raw = match std::fs::read_to_string(seed_path) {
        Ok(raw) => raw,
        Err(error) => {
            warn!(seed_path, %error, "roster seed file unreadable; starting with an empty roster");
            return Ok(());
        }
    };

    let entries: Vec<TechnologistEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse roster seed file '{seed_path}'"))?;
    for entry in &entries {
        storage.insert_member(entry).await?;
    }
    info!(count = entries.len(), seed_path, "seeded roster from file");
    Ok(())
}
