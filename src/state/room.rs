use std::collections::VecDeque;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::game::ChatEntry,
    state::{roles::Role, state_machine::RoomStateMachine},
};

/// Per-connection participant tracked inside a room.
#[derive(Debug, Clone)]
pub struct Player {
    /// Connection id doubling as the player id for the session.
    pub id: Uuid,
    /// Display name chosen on create/join.
    pub name: String,
    /// Running total across rounds; only scoring mutates it.
    pub total_score: i32,
    /// Court role for the active round, `None` outside of one.
    pub role: Option<Role>,
    /// Whether this player currently controls the room.
    pub is_host: bool,
    /// Narration of the player's last round outcome, overwritten each round.
    pub round_message: String,
}

impl Player {
    /// Build a fresh player with a zeroed score and no role.
    pub fn new(id: Uuid, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            total_score: 0,
            role: None,
            is_host,
            round_message: String::new(),
        }
    }
}

/// An isolated game session: players, round progress, votes, and chat.
///
/// A room is owned by the registry and only ever mutated behind its own
/// lock, so plain fields are safe here.
#[derive(Debug)]
pub struct Room {
    /// Short opaque identifier, unique among live rooms.
    pub id: String,
    /// Participants keyed by connection id; insertion order is join order.
    pub players: IndexMap<Uuid, Player>,
    /// Current host; always a key of `players` while the room is non-empty.
    pub host_id: Uuid,
    /// Rounds played so far; 0 until the first role assignment.
    pub current_round: u32,
    /// Rounds per game.
    pub max_rounds: u32,
    /// Phase machine; `Voting` is the only phase with live roles.
    pub machine: RoomStateMachine,
    /// Votes of the active round, voter id -> target id.
    pub votes: IndexMap<Uuid, Uuid>,
    /// Holder of the thief role for the active round.
    pub thief_id: Option<Uuid>,
    /// Locale tag chosen by the host, echoed in state broadcasts.
    pub language: String,
    /// Bounded chat backlog replayed to late joiners.
    pub chat_history: VecDeque<ChatEntry>,
    chat_limit: usize,
    max_players: usize,
}

impl Room {
    /// Create a room with its creator as sole player and host.
    pub fn new(id: String, host_id: Uuid, host_name: String, config: &AppConfig) -> Self {
        let mut players = IndexMap::new();
        players.insert(host_id, Player::new(host_id, host_name, true));

        Self {
            id,
            players,
            host_id,
            current_round: 0,
            max_rounds: config.max_rounds,
            machine: RoomStateMachine::new(),
            votes: IndexMap::new(),
            thief_id: None,
            language: config.default_language.clone(),
            chat_history: VecDeque::new(),
            chat_limit: config.chat_history_limit,
            max_players: config.max_players,
        }
    }

    /// Number of players currently in the room.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// True once the room reached its capacity.
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    /// Add a (non-host) player. The caller has already checked capacity.
    pub fn add_player(&mut self, id: Uuid, name: String) {
        self.players.insert(id, Player::new(id, name, false));
    }

    /// Remove a player. When the host leaves and anyone remains, the next
    /// player in join order inherits the host seat; the new host id is
    /// returned so the caller can notify them.
    pub fn remove_player(&mut self, id: Uuid) -> Option<Uuid> {
        let was_host = self.host_id == id;
        self.players.shift_remove(&id);
        self.votes.shift_remove(&id);

        if !was_host || self.players.is_empty() {
            return None;
        }

        let (new_host_id, new_host) = self.players.get_index_mut(0)?;
        new_host.is_host = true;
        self.host_id = *new_host_id;
        Some(self.host_id)
    }

    /// Number of players expected to vote this round (everyone but the thief).
    pub fn expected_voters(&self) -> usize {
        match self.thief_id {
            Some(thief) if self.players.contains_key(&thief) => self.players.len() - 1,
            _ => self.players.len(),
        }
    }

    /// Append a chat entry, evicting the oldest once the backlog is full.
    pub fn push_chat(&mut self, entry: ChatEntry) {
        self.chat_history.push_back(entry);
        while self.chat_history.len() > self.chat_limit {
            self.chat_history.pop_front();
        }
    }

    /// Drop all per-round role state.
    pub fn clear_roles(&mut self) {
        for player in self.players.values_mut() {
            player.role = None;
        }
        self.thief_id = None;
    }

    /// Reset round progress so the room can host a fresh game.
    pub fn reset_game(&mut self) {
        self.current_round = 0;
        self.votes.clear();
        self.clear_roles();
    }
}
