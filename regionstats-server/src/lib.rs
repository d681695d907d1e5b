use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use regionstats_common::{ErrorResponse, MetricsQuery, MetricsResponse, RegionStatsError};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

pub mod aggregate;
pub mod config;
pub mod store;

use aggregate::aggregate;
use config::{ServerConfig, MAX_BODY_SIZE};
use store::TelemetryStore;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TelemetryStore>,
}

impl AppState {
    pub fn new(store: TelemetryStore) -> Self {
        Self { store: Arc::new(store) }
    }
}

/// RegionStats Server
pub struct Server {
    config: ServerConfig,
    store: TelemetryStore,
}

impl Server {
    /// Create a new server over an already loaded store
    pub fn new(config: ServerConfig, store: TelemetryStore) -> Self {
        Self { config, store }
    }

    /// Get the server's configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Create the application router with the given state
    pub fn create_router(state: AppState) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);

        Router::new()
            .route("/", post(handle_metrics))
            .fallback(handle_fallback)
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .layer(cors)
            .layer(map_response(json_options_body))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the server, signalling `ready_tx` with the bound address once accepting connections
    pub async fn run(self, ready_tx: tokio::sync::oneshot::Sender<SocketAddr>) -> Result<(), Box<dyn std::error::Error>> {
        let state = AppState::new(self.store);
        let app = Self::create_router(state);
        let listener = tokio::net::TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        ready_tx.send(local_addr).ok();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

/// Transport wrapper so request errors render as `{"error": ...}` with 400.
pub struct ApiError(pub RegionStatsError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, self.0.to_string())
    }
}

fn parse_query(body: &[u8]) -> Result<MetricsQuery, RegionStatsError> {
    serde_json::from_slice(body).map_err(|e| RegionStatsError::MalformedBody(e.to_string()))
}

/// Handler for POST / — aggregates the requested regions against the store.
/// The body is decoded without regard to `Content-Type`.
pub async fn handle_metrics(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    let body = match body {
        Ok(b) => b,
        Err(rejection) => {
            debug!(status = %rejection.status(), "rejecting unreadable metrics request body");
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    let query = match parse_query(&body) {
        Ok(q) => q,
        Err(e) => {
            debug!(error = %e, "rejecting malformed metrics request");
            return ApiError(e).into_response();
        }
    };

    match aggregate(&query, &state.store) {
        Ok(metrics) => (StatusCode::OK, Json(MetricsResponse { metrics })).into_response(),
        Err(e) => {
            debug!(error = %e, "rejecting incomplete metrics request");
            ApiError(e).into_response()
        }
    }
}

/// Unmatched routes. `OPTIONS` on any path never reaches here: the CORS layer answers it.
pub async fn handle_fallback() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// Replaces the body of every `OPTIONS` response with `{}`, keeping status and CORS headers.
pub async fn json_options_body(method: Method, response: Response) -> Response {
    if method != Method::OPTIONS {
        return response;
    }
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::from_parts(parts, Body::from("{}"))
}
