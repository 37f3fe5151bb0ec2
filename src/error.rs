use thiserror::Error;

use crate::state::InvalidTransition;

/// Recoverable game-layer errors.
///
/// Every variant is surfaced to the offending connection as a user-facing
/// `error` (or `serverFull`) event; none of them abort a room or the
/// process. The `Display` text is the message the client sees.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested room id does not exist.
    #[error("room `{0}` does not exist")]
    RoomNotFound(String),
    /// The room already holds the maximum number of players.
    #[error("the room is full")]
    RoomFull,
    /// A round is active and the room cannot be joined right now.
    #[error("a game is already in progress; wait for it to finish")]
    GameInProgress,
    /// The caller tried a host-only operation.
    #[error("only the host can do that")]
    NotHost,
    /// Too few players for the requested operation.
    #[error("at least {required} players are needed")]
    InsufficientPlayers {
        /// Configured minimum player count.
        required: usize,
    },
    /// A vote targeted a player that is not in the room.
    #[error("invalid vote target: {0}")]
    InvalidVoteTarget(String),
    /// The caller is not bound to any room.
    #[error("join a room first")]
    NotInRoom,
    /// The server reached its room capacity.
    #[error("the server is full; try again later")]
    ServerFull,
    /// Operation cannot be performed in the current phase.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}
