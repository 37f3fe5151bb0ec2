//! Room membership: creation, joining, language, and disconnect handling.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::{
        game::PlayerSummary,
        ws::ServerMessage,
    },
    error::ServiceError,
    services::{
        round_service,
        websocket_service::{broadcast_to_room, broadcast_to_room_except, send_to_connection},
    },
    state::{RoomPhase, SharedState},
};

/// Open a fresh room with the caller as sole player and host.
pub async fn create_room(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: &mut Option<String>,
    name: String,
) -> Result<(), ServiceError> {
    if bound_room.is_some() {
        return Err(ServiceError::InvalidState("already in a room".into()));
    }

    let room = state.create_room(connection_id, name)?;
    let room_guard = room.lock().await;
    *bound_room = Some(room_guard.id.clone());

    info!(room = %room_guard.id, id = %connection_id, "room created");

    send_to_connection(
        state,
        connection_id,
        &ServerMessage::RoomCreated {
            room_id: room_guard.id.clone(),
            language: room_guard.language.clone(),
            is_host: true,
        },
    );
    broadcast_to_room(
        state,
        &room_guard,
        &ServerMessage::PlayerListUpdate {
            players: PlayerSummary::roster(&room_guard),
        },
    );

    Ok(())
}

/// Enter an existing room, replaying the chat backlog to the joiner.
pub async fn join_room(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: &mut Option<String>,
    room_id: &str,
    name: String,
) -> Result<(), ServiceError> {
    if bound_room.is_some() {
        return Err(ServiceError::InvalidState("already in a room".into()));
    }

    // Room ids are handed out uppercase; accept any case from the client.
    let room_id = room_id.to_ascii_uppercase();
    let room = state
        .room(&room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.clone()))?;

    let auto_start = {
        let mut room_guard = room.lock().await;
        if room_guard.is_full() {
            return Err(ServiceError::RoomFull);
        }
        if room_guard.machine.phase() != RoomPhase::Lobby {
            return Err(ServiceError::GameInProgress);
        }

        room_guard.add_player(connection_id, name);
        *bound_room = Some(room_id.clone());

        info!(room = %room_id, id = %connection_id, "player joined");

        send_to_connection(
            state,
            connection_id,
            &ServerMessage::RoomJoined {
                room_id: room_id.clone(),
                language: room_guard.language.clone(),
                is_host: false,
            },
        );
        send_to_connection(
            state,
            connection_id,
            &ServerMessage::LoadChatHistory {
                messages: room_guard.chat_history.iter().cloned().collect(),
            },
        );
        broadcast_to_room(
            state,
            &room_guard,
            &ServerMessage::PlayerListUpdate {
                players: PlayerSummary::roster(&room_guard),
            },
        );

        state.config().auto_start
            && room_guard.current_round == 0
            && room_guard.player_count() >= state.config().min_players
    };

    // The first round starts the moment the lobby fills, in the auto-start
    // variant. Re-locks the room, so it runs after the guard is released.
    if auto_start {
        round_service::start_round(state, &room_id).await;
    }

    Ok(())
}

/// Host-only language switch; a silent no-op for anyone else.
pub async fn set_language(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
    language: String,
) -> Result<(), ServiceError> {
    let room_id = bound_room.ok_or(ServiceError::NotInRoom)?;
    let room = state
        .room(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.into()))?;

    let mut room_guard = room.lock().await;
    if room_guard.host_id != connection_id {
        debug!(room = %room_id, id = %connection_id, "ignoring language change from non-host");
        return Ok(());
    }

    room_guard.language = language.clone();
    broadcast_to_room(state, &room_guard, &ServerMessage::LanguageChanged { language });

    Ok(())
}

/// Clean up after an abruptly departed connection.
///
/// Fans out the voice-presence notice, removes the player, reassigns the
/// host seat when needed, aborts a round that fell below the minimum, and
/// destroys the room once it empties.
pub async fn handle_disconnect(state: &SharedState, connection_id: Uuid, room_id: &str) {
    let Some(room) = state.room(room_id) else {
        return;
    };

    let mut room_guard = room.lock().await;

    broadcast_to_room_except(
        state,
        &room_guard,
        connection_id,
        &ServerMessage::UserDisconnectedVoice {
            from_id: connection_id,
        },
    );

    let new_host = room_guard.remove_player(connection_id);
    info!(room = %room_id, id = %connection_id, "player left");

    if room_guard.player_count() == 0 {
        drop(room_guard);
        state.remove_room(room_id);
        info!(room = %room_id, "room emptied; destroyed");
        return;
    }

    if let Some(host_id) = new_host {
        send_to_connection(state, host_id, &ServerMessage::SetHost { is_host: true });
        info!(room = %room_id, host = %host_id, "host reassigned");
    }

    broadcast_to_room(
        state,
        &room_guard,
        &ServerMessage::PlayerListUpdate {
            players: PlayerSummary::roster(&room_guard),
        },
    );

    if room_guard.machine.round_active()
        && room_guard.player_count() < state.config().min_players
    {
        broadcast_to_room(
            state,
            &room_guard,
            &ServerMessage::Error {
                message: "the game was stopped because too few players remain".into(),
            },
        );
        round_service::end_game_locked(state, &mut room_guard);
    }
}
