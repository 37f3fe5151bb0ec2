use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Durbar Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::dto::game::PlayerSummary,
            crate::dto::game::PlayerRoundSummary,
            crate::dto::game::ChatEntry,
            crate::state::roles::Role,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "WebSocket operations for game clients"),
    )
)]
pub struct ApiDoc;
