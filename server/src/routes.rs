//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page request passes the route guard, then falls through to the
//! built front-end bundle. Unknown paths get `index.html` so client-side
//! routes resolve.

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::EdgeConfig;
use crate::guard::route_guard;

pub fn app(config: &EdgeConfig) -> Router {
    let index = ServeFile::new(config.assets_dir.join("index.html"));
    let assets = ServeDir::new(&config.assets_dir)
        .append_index_html_on_directories(true)
        .not_found_service(index);

    Router::new()
        .route("/healthz", get(healthz))
        .fallback_service(assets)
        .layer(middleware::from_fn(route_guard))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
