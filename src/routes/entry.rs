//! Entry CRUD routes.

use crate::handlers::entry::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

/// `/entries` and `/entries/:id`; PUT and PATCH both map to the partial update.
pub fn entry_routes(state: AppState) -> Router {
    Router::new()
        .route("/entries", get(list).post(create))
        .route(
            "/entries/:id",
            get(read).patch(update).put(update).delete(delete_handler),
        )
        .with_state(state)
}
