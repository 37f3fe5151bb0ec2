use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    roles::Role,
    room::{Player, Room},
};

/// Public view of a player inside lobby/list broadcasts.
///
/// Deliberately omits the current role: roles travel only through the
/// private `yourRole` event until a round resolves.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Connection id of the player.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Running total across rounds.
    pub total_score: i32,
    /// Whether this player controls the room.
    pub is_host: bool,
    /// Narration of the player's last round outcome.
    pub round_message: String,
    /// Whether this player has voted in the active round.
    pub has_voted: bool,
}

impl PlayerSummary {
    fn from_player(player: &Player, has_voted: bool) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            total_score: player.total_score,
            is_host: player.is_host,
            round_message: player.round_message.clone(),
            has_voted,
        }
    }

    /// Snapshot the whole room in join order.
    pub fn roster(room: &Room) -> Vec<Self> {
        room.players
            .values()
            .map(|player| Self::from_player(player, room.votes.contains_key(&player.id)))
            .collect()
    }
}

/// Per-player line of a round result, with the role revealed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRoundSummary {
    /// Connection id of the player.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// The role held this round; revealed now that the round is over.
    pub role: Option<Role>,
    /// Updated running total.
    pub total_score: i32,
    /// Narration of what this round meant for the player.
    pub round_message: String,
}

impl PlayerRoundSummary {
    /// Snapshot the room in join order while roles are still assigned.
    pub fn roster(room: &Room) -> Vec<Self> {
        room.players
            .values()
            .map(|player| Self {
                id: player.id,
                name: player.name.clone(),
                role: player.role,
                total_score: player.total_score,
                round_message: player.round_message.clone(),
            })
            .collect()
    }
}

/// A single relayed chat message, immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    /// Display name of the sender at relay time.
    pub sender_name: String,
    /// Message body, relayed verbatim.
    pub text: String,
    /// RFC 3339 timestamp stamped at relay time.
    pub timestamp: String,
}
