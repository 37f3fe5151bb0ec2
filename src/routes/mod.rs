use axum::Router;
use tower_http::services::ServeDir;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
///
/// Anything the API does not claim falls through to the static client
/// bundle on disk.
pub fn router(state: SharedState) -> Router<()> {
    let static_dir = state.config().static_dir.clone();

    health::router()
        .merge(websocket::router())
        .merge(docs::router())
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
}
