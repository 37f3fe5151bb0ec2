use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationError;

use crate::{
    dto::{
        game::{ChatEntry, PlayerRoundSummary, PlayerSummary},
        validation::{validate_chat_text, validate_display_name, validate_room_id},
    },
    state::roles::Role,
};

/// Error produced when an inbound frame cannot be accepted.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame was not valid JSON for any known message.
    #[error("malformed frame: {0}")]
    Parse(#[from] serde_json::Error),
    /// The frame parsed but carried an unacceptable payload.
    #[error("invalid frame: {0}")]
    Validation(String),
}

impl From<ValidationError> for FrameError {
    fn from(err: ValidationError) -> Self {
        let message = err
            .message
            .as_deref()
            .map(str::to_owned)
            .unwrap_or_else(|| err.code.to_string());
        FrameError::Validation(message)
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from game clients over the WebSocket.
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Open a fresh room with the caller as host.
    CreateRoom {
        /// Display name of the creator.
        name: String,
    },
    /// Enter an existing room by id.
    JoinRoom {
        /// Target room id; matched case-insensitively.
        room_id: String,
        /// Display name of the joiner.
        name: String,
    },
    /// Host-only: switch the room's locale tag.
    SetLanguage {
        /// New locale tag, broadcast with every state update.
        language: String,
    },
    /// Host-only: begin the first round.
    StartGame,
    /// Vote for the player suspected to be the thief.
    SubmitVote {
        /// Connection id of the suspected player.
        target_id: Uuid,
    },
    /// Say something to the room.
    ChatMessage {
        /// Message body.
        text: String,
    },
    /// Announce readiness to receive peer voice connections.
    VoiceReady,
    /// Announce leaving voice chat.
    VoiceStop,
    /// Relay a peer-connection offer to one participant.
    Offer {
        /// Target participant.
        to_id: Uuid,
        /// Opaque negotiation payload; never inspected.
        #[schema(value_type = Object)]
        offer: serde_json::Value,
    },
    /// Relay a peer-connection answer to one participant.
    Answer {
        /// Target participant.
        to_id: Uuid,
        /// Opaque negotiation payload; never inspected.
        #[schema(value_type = Object)]
        answer: serde_json::Value,
    },
    /// Relay an ICE candidate to one participant.
    IceCandidate {
        /// Target participant.
        to_id: Uuid,
        /// Opaque negotiation payload; never inspected.
        #[schema(value_type = Object)]
        candidate: serde_json::Value,
    },
    /// Any message type this server does not know.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse and validate a raw text frame.
    pub fn from_json_str(text: &str) -> Result<Self, FrameError> {
        let message: Self = serde_json::from_str(text)?;
        message.validate()?;
        Ok(message)
    }

    fn validate(&self) -> Result<(), FrameError> {
        match self {
            ClientMessage::CreateRoom { name } => validate_display_name(name)?,
            ClientMessage::JoinRoom { room_id, name } => {
                validate_room_id(room_id)?;
                validate_display_name(name)?;
            }
            ClientMessage::ChatMessage { text } => validate_chat_text(text)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Messages pushed to game clients over the WebSocket.
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Private reply to a successful `createRoom`.
    RoomCreated {
        /// Id of the new room, to be shared with other players.
        room_id: String,
        /// Locale tag the room starts with.
        language: String,
        /// Always true for the creator.
        is_host: bool,
    },
    /// Private reply to a successful `joinRoom`.
    RoomJoined {
        /// Id of the joined room.
        room_id: String,
        /// Locale tag currently chosen by the host.
        language: String,
        /// Always false for a joiner.
        is_host: bool,
    },
    /// Broadcast whenever the player set changes.
    PlayerListUpdate {
        /// Current roster in join order.
        players: Vec<PlayerSummary>,
    },
    /// Private: the role assigned to this player for the new round.
    YourRole {
        /// The player's own role; nobody else's is ever sent.
        role: Role,
    },
    /// Private: host status granted (on failover).
    SetHost {
        /// Whether the receiver now controls the room.
        is_host: bool,
    },
    /// Broadcast at the start of every round.
    NewRound {
        /// Round number, starting at 1.
        round: u32,
        /// Rounds per game.
        max_rounds: u32,
        /// Locale tag chosen by the host.
        language: String,
    },
    /// Broadcast after each accepted vote; counts only, never identities.
    VoteUpdate {
        /// Human-readable progress line.
        message: String,
        /// Votes received so far this round.
        votes_cast: usize,
        /// Votes expected this round (everyone but the thief).
        votes_expected: usize,
    },
    /// Broadcast once per round after resolution.
    RoundResult {
        /// Full roster with roles revealed, updated scores and narrations.
        players: Vec<PlayerRoundSummary>,
        /// Whether the accused was the thief (with quorum).
        caught: bool,
        /// Display name of the accused, if any votes were cast.
        accused_name: Option<String>,
        /// Display name of this round's thief.
        thief_name: Option<String>,
        /// Points the thief banked by escaping; 0 on a catch.
        winner_points_delta: i32,
        /// Locale tag chosen by the host.
        language: String,
    },
    /// Broadcast when the final round resolves or the game is cut short.
    GameEnd {
        /// Top-scoring player, first-joined wins ties; `None` in an empty room.
        winner: Option<PlayerSummary>,
        /// Final roster with totals.
        final_scores: Vec<PlayerSummary>,
        /// Locale tag chosen by the host.
        language: String,
    },
    /// Broadcast relay of one chat message.
    ChatMessage {
        /// The relayed entry.
        entry: ChatEntry,
    },
    /// Private replay of the room's chat backlog on join.
    LoadChatHistory {
        /// Backlog in chronological order, bounded.
        messages: Vec<ChatEntry>,
    },
    /// Broadcast when the host switches the room language.
    LanguageChanged {
        /// The new locale tag.
        language: String,
    },
    /// Private notice that the last operation failed.
    Error {
        /// User-facing explanation.
        message: String,
    },
    /// Private notice that the server cannot take more rooms.
    ServerFull {
        /// User-facing explanation.
        message: String,
    },
    /// Fan-out: a peer is ready for voice connections.
    UserReadyForVoice {
        /// The announcing peer.
        from_id: Uuid,
    },
    /// Fan-out: a peer left voice chat or disconnected.
    UserDisconnectedVoice {
        /// The departing peer.
        from_id: Uuid,
    },
    /// Relayed peer-connection offer.
    Offer {
        /// Originating peer.
        from_id: Uuid,
        /// Opaque negotiation payload; forwarded verbatim.
        #[schema(value_type = Object)]
        offer: serde_json::Value,
    },
    /// Relayed peer-connection answer.
    Answer {
        /// Originating peer.
        from_id: Uuid,
        /// Opaque negotiation payload; forwarded verbatim.
        #[schema(value_type = Object)]
        answer: serde_json::Value,
    },
    /// Relayed ICE candidate.
    IceCandidate {
        /// Originating peer.
        from_id: Uuid,
        /// Opaque negotiation payload; forwarded verbatim.
        #[schema(value_type = Object)]
        candidate: serde_json::Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_event_names_match_the_client_contract() {
        let msg = ClientMessage::from_json_str(r#"{"type":"createRoom","name":"Asha"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::CreateRoom { name } if name == "Asha"));

        let msg =
            ClientMessage::from_json_str(r#"{"type":"joinRoom","roomId":"AB12","name":"Ravi"}"#)
                .unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { room_id, .. } if room_id == "AB12"));

        let msg = ClientMessage::from_json_str(r#"{"type":"startGame"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::StartGame));
    }

    #[test]
    fn unknown_types_fall_back_to_unknown() {
        let msg = ClientMessage::from_json_str(r#"{"type":"teleport"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Unknown));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ClientMessage::from_json_str("not json"),
            Err(FrameError::Parse(_))
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err =
            ClientMessage::from_json_str(r#"{"type":"createRoom","name":"  "}"#).unwrap_err();
        assert!(matches!(err, FrameError::Validation(_)));
    }

    #[test]
    fn bad_room_id_is_rejected() {
        let err = ClientMessage::from_json_str(
            r#"{"type":"joinRoom","roomId":"TOOLONG","name":"Ravi"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::Validation(_)));
    }

    #[test]
    fn signaling_payloads_pass_through_opaquely() {
        let raw = r#"{"type":"offer","toId":"6f9fd02d-4f09-4f2b-b3f6-6e1c1b3a0a01","offer":{"sdp":"v=0...","kind":"offer"}}"#;
        let msg = ClientMessage::from_json_str(raw).unwrap();
        let ClientMessage::Offer { offer, .. } = msg else {
            panic!("expected an offer");
        };
        assert_eq!(offer["kind"], "offer");
    }

    #[test]
    fn outbound_frames_are_tagged_camel_case() {
        let frame = serde_json::to_value(ServerMessage::NewRound {
            round: 2,
            max_rounds: 10,
            language: "gu".into(),
        })
        .unwrap();
        assert_eq!(frame["type"], "newRound");
        assert_eq!(frame["maxRounds"], 10);

        let frame = serde_json::to_value(ServerMessage::SetHost { is_host: true }).unwrap();
        assert_eq!(frame["type"], "setHost");
        assert_eq!(frame["isHost"], true);
    }
}
