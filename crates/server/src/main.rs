use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{DocumentSnapshot, ItemFields},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::load_settings;

const MAX_BODY_BYTES: usize = 16 * 1024;

type HttpResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let database_url = settings.database_url;
    let pool = storage::open_pool(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { pool },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, %database_url, "document store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/collections/:collection/documents",
            get(http_list_documents),
        )
        .route(
            "/collections/:collection/documents/:id",
            get(http_get_document)
                .put(http_put_document)
                .delete(http_delete_document),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn http_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(err.code), Json(err))
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match storage::health_check(&state.api.pool).await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            error!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn http_list_documents(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> HttpResult<Json<Vec<DocumentSnapshot>>> {
    api::list_documents(&state.api, &collection)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_get_document(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> HttpResult<Json<DocumentSnapshot>> {
    api::get_document(&state.api, &collection, id)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_put_document(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(fields): Json<ItemFields>,
) -> HttpResult<Json<DocumentSnapshot>> {
    let document = api::put_document(&state.api, &collection, id, fields)
        .await
        .map_err(http_error)?;
    info!(%collection, id = %document.id, quantity = document.fields.quantity.get(), "document put");
    Ok(Json(document))
}

async fn http_delete_document(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> HttpResult<StatusCode> {
    api::delete_document(&state.api, &collection, id.clone())
        .await
        .map_err(http_error)?;
    info!(%collection, %id, "document deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
