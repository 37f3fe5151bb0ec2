//! Pure round-outcome arithmetic: vote tallies, score updates, winner pick.
//!
//! Scoring follows the flat-bonus policy: a caught thief pays out a fixed
//! bonus to every court role (king 100, minister 75, queen 50, soldier 25)
//! while an escaped thief banks a flat 100. Totals only ever increase.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::state::{
    roles::{Role, THIEF_ESCAPE_BONUS},
    room::Player,
};

/// Tally the votes and pick the accused.
///
/// Returns the target with the strictly highest count together with that
/// count, or `None` when no votes were cast. Ties resolve to the target
/// that reached the maximum first in vote insertion order.
pub fn resolve_accused(votes: &IndexMap<Uuid, Uuid>) -> Option<(Uuid, usize)> {
    let mut tally: IndexMap<Uuid, usize> = IndexMap::new();
    for target in votes.values() {
        *tally.entry(*target).or_insert(0) += 1;
    }

    let mut best: Option<(Uuid, usize)> = None;
    for (target, count) in tally {
        match best {
            Some((_, max)) if count <= max => {}
            _ => best = Some((target, count)),
        }
    }
    best
}

/// Apply one round's score deltas and narration to every player.
///
/// Pure over the room's player set: deterministic, additive only, and the
/// `round_message` of each player is overwritten with a short explanation
/// of what the round meant for them.
pub fn apply_round_scores(players: &mut IndexMap<Uuid, Player>, caught: bool) {
    for player in players.values_mut() {
        let Some(role) = player.role else {
            // A player without a role joined mid-bookkeeping; leave them be.
            player.round_message = String::new();
            continue;
        };

        let delta = match role {
            Role::Thief if !caught => THIEF_ESCAPE_BONUS,
            Role::Thief => 0,
            court if caught => court.catch_bonus(),
            _ => 0,
        };
        player.total_score += delta;

        player.round_message = match (role, caught) {
            (Role::Thief, true) => "The thief was caught".into(),
            (Role::Thief, false) => "The thief escaped".into(),
            (Role::King, true) => "Helped catch the thief".into(),
            (Role::King, false) => "The thief got away".into(),
            (Role::Minister, true) => "Judged rightly".into(),
            (Role::Minister, false) => "Judged wrongly".into(),
            _ => "Cast a vote".into(),
        };
    }
}

/// Pick the game winner: highest total score, first joined wins ties.
pub fn winner(players: &IndexMap<Uuid, Player>) -> Option<&Player> {
    let mut best: Option<&Player> = None;
    for player in players.values() {
        match best {
            Some(current) if player.total_score <= current.total_score => {}
            _ => best = Some(player),
        }
    }
    best
}
