/// Room chat relay with a bounded backlog.
pub mod chat_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Room membership, host failover, and language handling.
pub mod room_service;
/// Round state machine driving: roles, votes, scores, timers.
pub mod round_service;
/// Peer-connection signaling relay for voice chat.
pub mod signaling_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
