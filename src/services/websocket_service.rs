use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ServerMessage},
    error::ServiceError,
    services::{chat_service, room_service, round_service, signaling_service},
    state::{ClientConnection, SharedState, room::Room},
};

/// Handle the full lifecycle for an individual game WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id = Uuid::new_v4();
    state.register_connection(ClientConnection {
        id: connection_id,
        tx: outbound_tx.clone(),
    });
    info!(id = %connection_id, "client connected");

    // Room this socket is bound to; set by createRoom/joinRoom.
    let mut bound_room: Option<String> = None;

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientMessage::from_json_str(&text) {
                Ok(frame) => dispatch(&state, connection_id, &mut bound_room, frame).await,
                Err(err) => {
                    warn!(id = %connection_id, error = %err, "failed to parse or validate client frame");
                    send_to_connection(
                        &state,
                        connection_id,
                        &ServerMessage::Error {
                            message: err.to_string(),
                        },
                    );
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %connection_id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    if let Some(room_id) = bound_room.take() {
        room_service::handle_disconnect(&state, connection_id, &room_id).await;
    }
    state.remove_connection(connection_id);
    info!(id = %connection_id, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Route one parsed frame to the service that owns it, replying with an
/// `error`/`serverFull` notice when the operation is rejected.
async fn dispatch(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: &mut Option<String>,
    frame: ClientMessage,
) {
    let result = match frame {
        ClientMessage::CreateRoom { name } => {
            room_service::create_room(state, connection_id, bound_room, name).await
        }
        ClientMessage::JoinRoom { room_id, name } => {
            room_service::join_room(state, connection_id, bound_room, &room_id, name).await
        }
        ClientMessage::SetLanguage { language } => {
            room_service::set_language(state, connection_id, bound_room.as_deref(), language).await
        }
        ClientMessage::StartGame => {
            round_service::start_game(state, connection_id, bound_room.as_deref()).await
        }
        ClientMessage::SubmitVote { target_id } => {
            round_service::submit_vote(state, connection_id, bound_room.as_deref(), target_id).await
        }
        ClientMessage::ChatMessage { text } => {
            chat_service::relay(state, connection_id, bound_room.as_deref(), text).await
        }
        ClientMessage::VoiceReady => {
            signaling_service::voice_ready(state, connection_id, bound_room.as_deref()).await
        }
        ClientMessage::VoiceStop => {
            signaling_service::voice_stop(state, connection_id, bound_room.as_deref()).await
        }
        ClientMessage::Offer { to_id, offer } => {
            signaling_service::forward_offer(
                state,
                connection_id,
                bound_room.as_deref(),
                to_id,
                offer,
            )
            .await
        }
        ClientMessage::Answer { to_id, answer } => {
            signaling_service::forward_answer(
                state,
                connection_id,
                bound_room.as_deref(),
                to_id,
                answer,
            )
            .await
        }
        ClientMessage::IceCandidate { to_id, candidate } => {
            signaling_service::forward_candidate(
                state,
                connection_id,
                bound_room.as_deref(),
                to_id,
                candidate,
            )
            .await
        }
        ClientMessage::Unknown => {
            warn!(id = %connection_id, "ignoring unknown client frame");
            Ok(())
        }
    };

    if let Err(err) = result {
        let reply = match err {
            ServiceError::ServerFull => ServerMessage::ServerFull {
                message: err.to_string(),
            },
            _ => ServerMessage::Error {
                message: err.to_string(),
            },
        };
        send_to_connection(state, connection_id, &reply);
    }
}

/// Serialize a payload and push it onto the provided writer channel.
///
/// Serialization failure is a bug in this crate, not the peer; it is logged
/// and swallowed. A closed channel means the client is gone and the socket
/// loop is already winding down, so that is swallowed too.
pub fn send_json<T>(tx: &mpsc::UnboundedSender<Message>, value: &T)
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    match serde_json::to_string(value) {
        Ok(payload) => {
            let _ = tx.send(Message::Text(payload.into()));
        }
        Err(err) => {
            warn!(error = %err, "failed to serialize outbound frame `{value:?}`");
        }
    }
}

/// Push a payload to one connection, if it is still alive.
pub fn send_to_connection<T>(state: &SharedState, id: Uuid, value: &T)
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    if let Some(connection) = state.connection(id) {
        send_json(&connection.tx, value);
    }
}

/// Push a payload to every player of a (locked) room.
pub fn broadcast_to_room<T>(state: &SharedState, room: &Room, value: &T)
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    for id in room.players.keys() {
        send_to_connection(state, *id, value);
    }
}

/// Push a payload to every player of a (locked) room except one.
pub fn broadcast_to_room_except<T>(state: &SharedState, room: &Room, except: Uuid, value: &T)
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    for id in room.players.keys() {
        if *id != except {
            send_to_connection(state, *id, value);
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
