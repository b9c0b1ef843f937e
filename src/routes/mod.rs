//! Router assembly.

mod common;
mod entry;

pub use common::common_routes;
pub use entry::entry_routes;

use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub const API_PREFIX: &str = "/api/v1";

/// Default request body limit in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// Full application: common routes at the root, entries under `/api/v1`, with request
/// tracing and a body size limit.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(API_PREFIX, entry_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
}
