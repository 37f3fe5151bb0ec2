//! Room chat: bounded backlog plus broadcast.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dto::{format_system_time, game::ChatEntry, ws::ServerMessage},
    error::ServiceError,
    services::websocket_service::broadcast_to_room,
    state::SharedState,
};

/// Append a message to the room's backlog and relay it to everyone.
///
/// The backlog is capped (oldest evicted first) and replayed verbatim to
/// players who join later.
pub async fn relay(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
    text: String,
) -> Result<(), ServiceError> {
    let room_id = bound_room.ok_or(ServiceError::NotInRoom)?;
    let room = state
        .room(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.into()))?;

    let mut room_guard = room.lock().await;
    let sender_name = room_guard
        .players
        .get(&connection_id)
        .map(|player| player.name.clone())
        .unwrap_or_else(|| "unknown player".into());

    let entry = ChatEntry {
        sender_name,
        text,
        timestamp: format_system_time(SystemTime::now()),
    };

    room_guard.push_chat(entry.clone());
    broadcast_to_room(state, &room_guard, &ServerMessage::ChatMessage { entry });

    Ok(())
}
