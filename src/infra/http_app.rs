use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{any_service, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::contact::ContactService;
use crate::core::dispatch::Dispatcher;
use crate::infra::config::ServerConfig;
use crate::infra::mcp;

/// Everything the HTTP front serves.
#[derive(Clone)]
pub struct AppParts {
    pub dispatcher: Dispatcher,
    pub contact: Arc<ContactService>,
}

/// Empty list: same-origin only. `*`: any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
    };
    CorsLayer::new()
        .allow_origin(allow)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// `/healthz`, `/api/health`, streamable MCP at `/mcp`, the contact form, and
/// unless `deprecate_rest` is set, the JSON-RPC shim at `/v1/rpc`.
pub fn build_app(parts: AppParts, cfg: &ServerConfig) -> Router {
    let session_mgr = Arc::new(mcp::LocalSessionManager::default());
    let mcp_service = mcp::make_streamable_http_service(parts.dispatcher.clone(), session_mgr);

    let mut app = Router::new()
        .route("/healthz", get(api::health::liveness))
        .route("/api/health", get(api::health::health))
        .route_service("/mcp", any_service(mcp_service))
        .merge(
            Router::new()
                .route("/api/contact", post(api::contact::submit))
                .with_state(parts.contact),
        );

    if cfg.deprecate_rest {
        tracing::info!("REST shim disabled; /v1/rpc not mounted");
    } else {
        app = app.merge(
            Router::new()
                .route("/v1/rpc", post(api::rpc::http))
                .with_state(parts.dispatcher),
        );
    }

    app.layer(cors_layer(&cfg.cors_origins)).layer(TraceLayer::new_for_http())
}
