//! Stateless relay of peer-connection negotiation between room members.
//!
//! The server only checks that sender and target share a room; payloads are
//! forwarded verbatim and never inspected. The actual media flows directly
//! between peers — this process is never in that path.

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::ws::ServerMessage,
    error::ServiceError,
    services::websocket_service::{broadcast_to_room_except, send_to_connection},
    state::SharedState,
};

/// Announce to the rest of the room that a peer accepts voice connections.
pub async fn voice_ready(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
) -> Result<(), ServiceError> {
    fan_out_presence(
        state,
        connection_id,
        bound_room,
        ServerMessage::UserReadyForVoice {
            from_id: connection_id,
        },
    )
    .await
}

/// Announce to the rest of the room that a peer left voice chat.
pub async fn voice_stop(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
) -> Result<(), ServiceError> {
    fan_out_presence(
        state,
        connection_id,
        bound_room,
        ServerMessage::UserDisconnectedVoice {
            from_id: connection_id,
        },
    )
    .await
}

/// Forward a peer-connection offer to one participant.
pub async fn forward_offer(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
    to_id: Uuid,
    offer: Value,
) -> Result<(), ServiceError> {
    forward_to_peer(
        state,
        connection_id,
        bound_room,
        to_id,
        ServerMessage::Offer {
            from_id: connection_id,
            offer,
        },
    )
    .await
}

/// Forward a peer-connection answer to one participant.
pub async fn forward_answer(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
    to_id: Uuid,
    answer: Value,
) -> Result<(), ServiceError> {
    forward_to_peer(
        state,
        connection_id,
        bound_room,
        to_id,
        ServerMessage::Answer {
            from_id: connection_id,
            answer,
        },
    )
    .await
}

/// Forward an ICE candidate to one participant.
pub async fn forward_candidate(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
    to_id: Uuid,
    candidate: Value,
) -> Result<(), ServiceError> {
    forward_to_peer(
        state,
        connection_id,
        bound_room,
        to_id,
        ServerMessage::IceCandidate {
            from_id: connection_id,
            candidate,
        },
    )
    .await
}

async fn fan_out_presence(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
    message: ServerMessage,
) -> Result<(), ServiceError> {
    let room_id = bound_room.ok_or(ServiceError::NotInRoom)?;
    let room = state
        .room(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.into()))?;

    let room_guard = room.lock().await;
    broadcast_to_room_except(state, &room_guard, connection_id, &message);
    Ok(())
}

async fn forward_to_peer(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
    to_id: Uuid,
    message: ServerMessage,
) -> Result<(), ServiceError> {
    let room_id = bound_room.ok_or(ServiceError::NotInRoom)?;
    let room = state
        .room(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.into()))?;

    let room_guard = room.lock().await;
    if !room_guard.players.contains_key(&connection_id)
        || !room_guard.players.contains_key(&to_id)
    {
        // A negotiation frame for a peer that already left; drop it quietly.
        warn!(room = %room_id, from = %connection_id, to = %to_id, "dropping signal for absent peer");
        return Ok(());
    }
    drop(room_guard);

    send_to_connection(state, to_id, &message);
    Ok(())
}
