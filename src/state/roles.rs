//! Court roles and the per-round role assignment.

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Court role held by a player for the duration of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Leads the court; earns the largest bonus when the thief is caught.
    King,
    /// Member of the court.
    Queen,
    /// The court's judge.
    Minister,
    /// Filler role handed out in rooms larger than four.
    Soldier,
    /// The role everyone else is hunting. Does not vote.
    Thief,
}

impl Role {
    /// Points banked by this role when the thief is caught.
    pub fn catch_bonus(self) -> i32 {
        match self {
            Role::King => 100,
            Role::Minister => 75,
            Role::Queen => 50,
            Role::Soldier => 25,
            Role::Thief => 0,
        }
    }
}

/// Points the thief banks when the round ends without a catch.
pub const THIEF_ESCAPE_BONUS: i32 = 100;

/// Assign one round's roles to `player_ids`.
///
/// Builds the role multiset (the four base roles plus `N - 4` soldiers),
/// Fisher-Yates shuffles it, and zips it with the ids in order, so every
/// permutation of the multiset is equally likely. Returns `None` when fewer
/// than four ids are supplied; callers must not start a round in that case.
pub fn assign_roles(player_ids: &[Uuid]) -> Option<IndexMap<Uuid, Role>> {
    if player_ids.len() < 4 {
        return None;
    }

    let mut roles = vec![Role::King, Role::Queen, Role::Minister, Role::Thief];
    roles.resize(player_ids.len(), Role::Soldier);

    let mut rng = rand::rng();
    roles.shuffle(&mut rng);

    Some(player_ids.iter().copied().zip(roles).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn refuses_fewer_than_four_players() {
        assert!(assign_roles(&ids(0)).is_none());
        assert!(assign_roles(&ids(3)).is_none());
    }

    #[test]
    fn exact_role_multiset_for_every_room_size() {
        for n in 4..=8 {
            let players = ids(n);
            let assignment = assign_roles(&players).unwrap();

            assert_eq!(assignment.len(), n);
            for id in &players {
                assert!(assignment.contains_key(id));
            }

            let count = |role: Role| assignment.values().filter(|r| **r == role).count();
            assert_eq!(count(Role::King), 1, "one king in a room of {n}");
            assert_eq!(count(Role::Queen), 1, "one queen in a room of {n}");
            assert_eq!(count(Role::Minister), 1, "one minister in a room of {n}");
            assert_eq!(count(Role::Thief), 1, "one thief in a room of {n}");
            assert_eq!(count(Role::Soldier), n - 4, "fillers in a room of {n}");
        }
    }

    #[test]
    fn assignment_is_roughly_uniform() {
        // Each of four players should hold the thief role in about a quarter
        // of many trials. A wide tolerance keeps the test deterministic in
        // practice while still catching a broken shuffle.
        const TRIALS: usize = 4000;
        let players = ids(4);
        let mut thief_counts: IndexMap<Uuid, usize> =
            players.iter().map(|id| (*id, 0usize)).collect();

        for _ in 0..TRIALS {
            let assignment = assign_roles(&players).unwrap();
            let thief = assignment
                .iter()
                .find(|(_, role)| **role == Role::Thief)
                .map(|(id, _)| *id)
                .unwrap();
            *thief_counts.get_mut(&thief).unwrap() += 1;
        }

        let expected = TRIALS / 4;
        for (id, count) in thief_counts {
            assert!(
                count > expected / 2 && count < expected * 2,
                "player {id} was thief {count} times, expected around {expected}"
            );
        }
    }

    #[test]
    fn catch_bonuses_rank_the_court() {
        assert!(Role::King.catch_bonus() > Role::Minister.catch_bonus());
        assert!(Role::Minister.catch_bonus() > Role::Queen.catch_bonus());
        assert!(Role::Queen.catch_bonus() > Role::Soldier.catch_bonus());
        assert_eq!(Role::Thief.catch_bonus(), 0);
    }
}
