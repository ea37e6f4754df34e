//! HTTP API server: axum router and request handlers.
//!
//! Handlers lock the shared engine, apply the request and answer with a
//! snapshot of the resulting state. The render thread holds the same lock
//! for one tick at a time, so a request always sees a whole frame's worth
//! of state.
//!
//! ## Rust concepts
//! - axum extractors: `State`, `Query`
//! - `Arc<Mutex<T>>` shared with a plain `std::thread`
//! - `tower-http` services for static files, tracing and CORS

use crate::Color;
use crate::control::{ControlIntent, ControlQuery};
use crate::driver::BoxedDriver;
use crate::engine::{SharedEngine, lock_engine};
use crate::network::NetworkInfo;
use crate::state::{Effect, StateSnapshot};
use axum::Router;
use axum::extract::{Query, State};
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// ── App State ────────────────────────────────────────────────────────

/// Shared application state, passed to every handler via axum's `State` extractor.
///
/// Rust concept: CLONE for Arc
/// axum clones the state for each request, so the engine sits behind an
/// `Arc` and cloning only bumps a counter.
#[derive(Clone)]
pub struct AppState {
    /// The effect engine (render thread ticks it, handlers mutate it)
    pub engine: SharedEngine<BoxedDriver>,
    /// Which address to report to clients
    pub network: NetworkInfo,
    /// Directory holding the browser control panel
    pub web_dir: PathBuf,
}

// ── OpenAPI Documentation ────────────────────────────────────────────

#[derive(OpenApi)]
#[openapi(
    paths(get_state, get_control),
    components(schemas(StateSnapshot, Effect, Color)),
    tags(
        (name = "strip", description = "LED strip state and control"),
    ),
    info(
        title = "LED Strip API",
        version = env!("CARGO_PKG_VERSION"),
        description = "HTTP API for controlling an addressable LED strip"
    )
)]
pub struct ApiDoc;

// ── Router ───────────────────────────────────────────────────────────

/// Build the axum router: the two API endpoints, docs, and the control
/// panel as a static fallback.
pub fn create_router(state: AppState) -> Router {
    if !state.web_dir.is_dir() {
        tracing::warn!(
            "Control panel directory {} not found, only the API will be served",
            state.web_dir.display()
        );
    }

    let control_panel = ServeDir::new(&state.web_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .merge(
            SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", ApiDoc::openapi())
                .config(utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"]).validator_url("none")),
        )
        .route("/api/state", get(get_state))
        .route("/api/control", get(get_control))
        .fallback_service(control_panel)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Handlers ─────────────────────────────────────────────────────────

/// GET /api/state: return the current strip state
#[utoipa::path(
    get,
    path = "/api/state",
    tag = "strip",
    responses(
        (status = 200, description = "Current strip state", body = StateSnapshot)
    )
)]
async fn get_state(State(state): State<AppState>) -> Json<StateSnapshot> {
    let snapshot = lock_engine(&state.engine)
        .state()
        .snapshot(state.network.current_ip());
    Json(snapshot)
}

/// GET /api/control: change mode, brightness, pixel count and/or color
///
/// Every parameter is optional. Values that do not parse are ignored,
/// numbers are clamped into range and only the first of a repeated key
/// counts, so this never fails.
#[utoipa::path(
    get,
    path = "/api/control",
    tag = "strip",
    params(ControlQuery),
    responses(
        (status = 200, description = "Strip state after applying the request", body = StateSnapshot)
    )
)]
async fn get_control(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<StateSnapshot> {
    let intent = ControlIntent::from_query(&ControlQuery::from_pairs(pairs));

    let (changed, snapshot) = {
        let mut engine = lock_engine(&state.engine);
        let changed = intent.apply(&mut *engine);
        (changed, engine.state().snapshot(state.network.current_ip()))
    };

    if changed {
        match serde_json::to_string(&snapshot) {
            Ok(payload) => tracing::info!("State updated via web UI: {}", payload),
            Err(e) => tracing::warn!("State updated, but could not encode it: {}", e),
        }
    }

    Json(snapshot)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
