//! The round engine: role assignment, voting, resolution, and the timers
//! that move a room from one phase to the next.
//!
//! Every scheduled transition captures the room machine's version and
//! re-checks it under the room lock when the timer fires, so a timer that
//! outlived its round (disconnects, aborts, an early all-voted resolution)
//! degrades to a no-op instead of corrupting a later round.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        game::{PlayerRoundSummary, PlayerSummary},
        ws::ServerMessage,
    },
    error::ServiceError,
    services::websocket_service::{broadcast_to_room, send_to_connection},
    state::{
        RoomEvent, RoomPhase, SharedState,
        roles::{self, THIEF_ESCAPE_BONUS},
        room::Room,
        scoring,
    },
};

/// Deferred phase transitions a timer can carry.
#[derive(Debug, Clone, Copy)]
enum TimerAction {
    /// The voting window elapsed; unvoted players abstain.
    VoteTimeout,
    /// The intermission elapsed; the next round begins.
    NextRound,
    /// The intermission after the final round elapsed; the game ends.
    EndGame,
}

/// Host-issued start of the first round.
pub async fn start_game(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
) -> Result<(), ServiceError> {
    let room_id = bound_room.ok_or(ServiceError::NotInRoom)?;
    let room = state
        .room(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.into()))?;

    let mut room_guard = room.lock().await;
    if room_guard.host_id != connection_id {
        return Err(ServiceError::NotHost);
    }
    if room_guard.machine.phase() != RoomPhase::Lobby {
        return Err(ServiceError::InvalidState("a game is already running".into()));
    }
    let required = state.config().min_players;
    if room_guard.player_count() < required {
        return Err(ServiceError::InsufficientPlayers { required });
    }

    start_round_locked(state, &mut room_guard);
    Ok(())
}

/// Begin a round on a room that is not currently locked by the caller.
/// No-op when the room is gone; used by timers and the auto-start hook.
pub async fn start_round(state: &SharedState, room_id: &str) {
    let Some(room) = state.room(room_id) else {
        return;
    };
    let mut room_guard = room.lock().await;
    start_round_locked(state, &mut room_guard);
}

/// Record one vote, broadcast the running tally, and resolve early once
/// every expected voter has spoken.
pub async fn submit_vote(
    state: &SharedState,
    connection_id: Uuid,
    bound_room: Option<&str>,
    target_id: Uuid,
) -> Result<(), ServiceError> {
    let room_id = bound_room.ok_or(ServiceError::NotInRoom)?;
    let room = state
        .room(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.into()))?;

    let mut room_guard = room.lock().await;
    if !room_guard.machine.round_active() {
        return Err(ServiceError::InvalidState("no round is running".into()));
    }
    let Some(voter) = room_guard.players.get(&connection_id) else {
        return Err(ServiceError::NotInRoom);
    };
    let voter_name = voter.name.clone();

    // The thief does not get a say in the hunt for the thief.
    if room_guard.thief_id == Some(connection_id) {
        debug!(room = %room_id, id = %connection_id, "dropping thief vote");
        return Ok(());
    }
    if !room_guard.players.contains_key(&target_id) {
        return Err(ServiceError::InvalidVoteTarget(target_id.to_string()));
    }

    // Last write wins when a voter changes their mind.
    room_guard.votes.insert(connection_id, target_id);

    let votes_cast = room_guard.votes.len();
    let votes_expected = room_guard.expected_voters();
    broadcast_to_room(
        state,
        &room_guard,
        &ServerMessage::VoteUpdate {
            message: format!("{voter_name} has voted ({votes_cast}/{votes_expected})"),
            votes_cast,
            votes_expected,
        },
    );

    if votes_cast >= votes_expected {
        resolve_round_locked(state, &mut room_guard);
    }

    Ok(())
}

/// Start a round on an already-locked room.
///
/// Checks player count and round budget first: too few players aborts back
/// to the lobby with a notice, an exhausted budget ends the game instead.
fn start_round_locked(state: &SharedState, room: &mut Room) {
    let required = state.config().min_players;
    if room.player_count() < required {
        broadcast_to_room(
            state,
            room,
            &ServerMessage::Error {
                message: format!("not enough players to continue; at least {required} needed"),
            },
        );
        if room.machine.phase() != RoomPhase::Lobby {
            end_game_locked(state, room);
        }
        return;
    }

    if room.current_round >= room.max_rounds {
        end_game_locked(state, room);
        return;
    }

    if let Err(err) = room.machine.apply(RoomEvent::StartRound) {
        warn!(room = %room.id, error = %err, "refusing to start a round");
        return;
    }

    room.current_round += 1;
    room.votes.clear();
    room.clear_roles();

    let player_ids: Vec<Uuid> = room.players.keys().copied().collect();
    let Some(assignment) = roles::assign_roles(&player_ids) else {
        // Player count was checked above; reaching this is a bug. Fall back
        // to the lobby rather than leave a half-started round behind.
        warn!(room = %room.id, "role assignment failed; aborting round");
        let _ = room.machine.apply(RoomEvent::Abort);
        room.current_round -= 1;
        return;
    };

    for (id, role) in &assignment {
        if let Some(player) = room.players.get_mut(id) {
            player.role = Some(*role);
        }
        if *role == roles::Role::Thief {
            room.thief_id = Some(*id);
        }
        // Each player learns their own role and nothing else.
        send_to_connection(state, *id, &ServerMessage::YourRole { role: *role });
    }

    broadcast_to_room(
        state,
        room,
        &ServerMessage::NewRound {
            round: room.current_round,
            max_rounds: room.max_rounds,
            language: room.language.clone(),
        },
    );

    info!(
        room = %room.id,
        round = room.current_round,
        players = room.player_count(),
        "round started"
    );

    schedule_transition(
        state,
        room,
        Duration::from_secs(state.config().vote_timeout_secs),
        TimerAction::VoteTimeout,
    );
}

/// Tally the votes, apply scores, broadcast the result, and schedule what
/// comes next. Must only run while the room is in the voting phase.
fn resolve_round_locked(state: &SharedState, room: &mut Room) {
    if !room.machine.round_active() {
        return;
    }

    let accused = scoring::resolve_accused(&room.votes);
    let accused_name = accused.and_then(|(id, _)| room.players.get(&id).map(|p| p.name.clone()));
    let caught = match (accused, room.thief_id) {
        (Some((accused_id, count)), Some(thief_id)) => {
            accused_id == thief_id && count >= state.config().catch_quorum
        }
        _ => false,
    };

    let thief_name = room
        .thief_id
        .and_then(|id| room.players.get(&id))
        .map(|p| p.name.clone());
    if thief_name.is_none() {
        // The thief vanished mid-round; emit the best result we still have.
        warn!(room = %room.id, "no thief present at resolution");
    }

    scoring::apply_round_scores(&mut room.players, caught);
    let players = PlayerRoundSummary::roster(room);

    if let Err(err) = room.machine.apply(RoomEvent::Resolve) {
        warn!(room = %room.id, error = %err, "round resolution raced a transition");
        return;
    }
    room.votes.clear();
    room.clear_roles();

    broadcast_to_room(
        state,
        room,
        &ServerMessage::RoundResult {
            players,
            caught,
            accused_name,
            thief_name,
            winner_points_delta: if caught { 0 } else { THIEF_ESCAPE_BONUS },
            language: room.language.clone(),
        },
    );

    info!(
        room = %room.id,
        round = room.current_round,
        caught,
        "round resolved"
    );

    let action = if room.current_round >= room.max_rounds {
        TimerAction::EndGame
    } else {
        TimerAction::NextRound
    };
    schedule_transition(
        state,
        room,
        Duration::from_secs(state.config().intermission_secs),
        action,
    );
}

/// Broadcast the final standings and reset the room for a fresh game.
///
/// Safe to call from any phase: an active round is aborted, a finished one
/// is closed out, and a lobby room just re-broadcasts its standings.
pub(crate) fn end_game_locked(state: &SharedState, room: &mut Room) {
    match room.machine.phase() {
        RoomPhase::Intermission => {
            let _ = room.machine.apply(RoomEvent::Finish);
        }
        RoomPhase::Voting => {
            let _ = room.machine.apply(RoomEvent::Abort);
        }
        RoomPhase::Lobby => {}
    }

    let final_scores = PlayerSummary::roster(room);
    let winner = scoring::winner(&room.players)
        .and_then(|w| final_scores.iter().find(|s| s.id == w.id).cloned());

    broadcast_to_room(
        state,
        room,
        &ServerMessage::GameEnd {
            winner,
            final_scores,
            language: room.language.clone(),
        },
    );

    room.reset_game();
    info!(room = %room.id, "game ended");
}

/// Spawn a guarded timer that re-enters the round engine.
///
/// The room may be destroyed or transitioned by the time the timer fires;
/// both cases degrade to a no-op via the existence and version checks.
fn schedule_transition(state: &SharedState, room: &Room, delay: Duration, action: TimerAction) {
    let state = state.clone();
    let room_id = room.id.clone();
    let version = room.machine.version();

    tokio::spawn(async move {
        sleep(delay).await;

        let Some(room) = state.room(&room_id) else {
            return;
        };
        let mut room_guard = room.lock().await;
        if room_guard.machine.version() != version {
            debug!(room = %room_id, ?action, "stale timer; skipping");
            return;
        }

        match action {
            TimerAction::VoteTimeout => resolve_round_locked(&state, &mut room_guard),
            TimerAction::NextRound => start_round_locked(&state, &mut room_guard),
            TimerAction::EndGame => end_game_locked(&state, &mut room_guard),
        }
    });
}
