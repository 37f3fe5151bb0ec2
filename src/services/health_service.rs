use crate::{dto::health::HealthResponse, state::SharedState};

/// Snapshot the process health together with the live registry counts.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(state.room_count(), state.connection_count())
}
