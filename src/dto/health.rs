use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status; this process is either serving or gone.
    pub status: String,
    /// Number of live rooms.
    pub rooms: usize,
    /// Number of live client connections.
    pub connections: usize,
}

impl HealthResponse {
    /// Create a health response with the current registry counts.
    pub fn ok(rooms: usize, connections: usize) -> Self {
        Self {
            status: "ok".to_string(),
            rooms,
            connections,
        }
    }
}
