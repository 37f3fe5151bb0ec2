pub mod roles;
pub mod room;
pub mod scoring;
pub mod state_machine;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::{DashMap, mapref::entry::Entry};
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use crate::{config::AppConfig, error::ServiceError, state::room::Room};

pub use self::state_machine::{InvalidTransition, RoomEvent, RoomPhase, RoomStateMachine};

/// Cheaply clonable handle to the process-wide state.
pub type SharedState = Arc<AppState>;

/// Length of the opaque room identifiers handed to players.
const ROOM_ID_LEN: usize = 4;

#[derive(Clone)]
/// Handle used to push messages to a connected client.
pub struct ClientConnection {
    /// Ephemeral connection id; doubles as the player id inside a room.
    pub id: Uuid,
    /// Writer-task channel for this client's socket.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state: the room registry and the connection table.
///
/// The registry has exclusive ownership of every [`Room`]; all mutation
/// funnels through the `Arc<Mutex<Room>>` handles it hands out, which keeps
/// the single-writer-per-room invariant explicit. Rooms are independent of
/// one another and never share a lock.
pub struct AppState {
    config: AppConfig,
    rooms: DashMap<String, Arc<Mutex<Room>>>,
    connections: DashMap<Uuid, ClientConnection>,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            rooms: DashMap::new(),
            connections: DashMap::new(),
        })
    }

    /// Immutable game tuning loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Register a freshly upgraded client socket.
    pub fn register_connection(&self, connection: ClientConnection) {
        self.connections.insert(connection.id, connection);
    }

    /// Drop a client socket from the table once its handler winds down.
    pub fn remove_connection(&self, id: Uuid) {
        self.connections.remove(&id);
    }

    /// Look up the outbound handle for a connection, if it is still alive.
    pub fn connection(&self, id: Uuid) -> Option<ClientConnection> {
        self.connections.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of live client connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Look up a live room by id.
    pub fn room(&self, id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.get(id).map(|entry| entry.value().clone())
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Create a room with `host_id` as its sole player and host.
    ///
    /// Fails with [`ServiceError::ServerFull`] once the configured room cap
    /// is reached; id collisions retry until a free slot is claimed.
    pub fn create_room(
        &self,
        host_id: Uuid,
        host_name: String,
    ) -> Result<Arc<Mutex<Room>>, ServiceError> {
        if self.rooms.len() >= self.config.max_rooms {
            return Err(ServiceError::ServerFull);
        }

        loop {
            let id = generate_room_id();
            match self.rooms.entry(id.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let room = Arc::new(Mutex::new(Room::new(
                        id,
                        host_id,
                        host_name,
                        &self.config,
                    )));
                    slot.insert(room.clone());
                    return Ok(room);
                }
            }
        }
    }

    /// Destroy a room. Called once its player set empties.
    pub fn remove_room(&self, id: &str) {
        self.rooms.remove(id);
    }
}

/// Produce a short uppercase alphanumeric room id.
fn generate_room_id() -> String {
    let mut rng = rand::rng();
    (0..ROOM_ID_LEN)
        .map(|_| (rng.sample(Alphanumeric) as char).to_ascii_uppercase())
        .collect()
}
