use thiserror::Error;

/// High-level phases a room can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Waiting for players; no round is running and the room can be joined.
    Lobby,
    /// A round is active: roles are assigned and votes are being collected.
    Voting,
    /// A round was resolved; the next round (or the game end) is scheduled.
    Intermission,
}

/// Events that can be applied to a room's phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// Roles were assigned and a new round begins.
    StartRound,
    /// Votes were tallied and the round outcome was computed.
    Resolve,
    /// The final round was played; return to the lobby.
    Finish,
    /// The round (or the scheduled follow-up) cannot continue; back to the lobby.
    Abort,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the machine was in when the invalid event was received.
    pub from: RoomPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoomEvent,
}

/// Phase machine driving the round flow of a single room.
///
/// The `version` counter increments on every applied transition. Scheduled
/// timers capture it when they are spawned and compare it again when they
/// fire, so a timer that outlived its round degrades to a no-op.
#[derive(Debug, Clone)]
pub struct RoomStateMachine {
    phase: RoomPhase,
    version: u64,
}

impl Default for RoomStateMachine {
    fn default() -> Self {
        Self {
            phase: RoomPhase::Lobby,
            version: 0,
        }
    }
}

impl RoomStateMachine {
    /// Create a new machine initialised in the lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Current version; bumped by every applied transition.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True while a round is strictly between role assignment and resolution.
    pub fn round_active(&self) -> bool {
        self.phase == RoomPhase::Voting
    }

    /// Apply an event, moving to the next phase and bumping the version.
    pub fn apply(&mut self, event: RoomEvent) -> Result<RoomPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Compute the phase an event would lead to, if the transition is valid.
    fn compute_transition(&self, event: RoomEvent) -> Result<RoomPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (RoomPhase::Lobby, RoomEvent::StartRound) => RoomPhase::Voting,
            (RoomPhase::Intermission, RoomEvent::StartRound) => RoomPhase::Voting,
            (RoomPhase::Voting, RoomEvent::Resolve) => RoomPhase::Intermission,
            (RoomPhase::Intermission, RoomEvent::Finish) => RoomPhase::Lobby,
            (RoomPhase::Voting, RoomEvent::Abort) => RoomPhase::Lobby,
            (RoomPhase::Intermission, RoomEvent::Abort) => RoomPhase::Lobby,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_lobby() {
        let sm = RoomStateMachine::new();
        assert_eq!(sm.phase(), RoomPhase::Lobby);
        assert!(!sm.round_active());
    }

    #[test]
    fn full_happy_path_through_a_game() {
        let mut sm = RoomStateMachine::new();

        assert_eq!(sm.apply(RoomEvent::StartRound).unwrap(), RoomPhase::Voting);
        assert!(sm.round_active());
        assert_eq!(
            sm.apply(RoomEvent::Resolve).unwrap(),
            RoomPhase::Intermission
        );
        assert!(!sm.round_active());
        assert_eq!(sm.apply(RoomEvent::StartRound).unwrap(), RoomPhase::Voting);
        assert_eq!(
            sm.apply(RoomEvent::Resolve).unwrap(),
            RoomPhase::Intermission
        );
        assert_eq!(sm.apply(RoomEvent::Finish).unwrap(), RoomPhase::Lobby);
    }

    #[test]
    fn abort_returns_to_lobby_from_voting() {
        let mut sm = RoomStateMachine::new();
        sm.apply(RoomEvent::StartRound).unwrap();
        assert_eq!(sm.apply(RoomEvent::Abort).unwrap(), RoomPhase::Lobby);
    }

    #[test]
    fn abort_returns_to_lobby_from_intermission() {
        let mut sm = RoomStateMachine::new();
        sm.apply(RoomEvent::StartRound).unwrap();
        sm.apply(RoomEvent::Resolve).unwrap();
        assert_eq!(sm.apply(RoomEvent::Abort).unwrap(), RoomPhase::Lobby);
    }

    #[test]
    fn invalid_transition_returns_error() {
        let mut sm = RoomStateMachine::new();
        let err = sm.apply(RoomEvent::Resolve).unwrap_err();
        assert_eq!(err.from, RoomPhase::Lobby);
        assert_eq!(err.event, RoomEvent::Resolve);
        // The failed apply must not move the phase or the version.
        assert_eq!(sm.phase(), RoomPhase::Lobby);
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn version_increments_on_every_transition() {
        let mut sm = RoomStateMachine::new();
        assert_eq!(sm.version(), 0);
        sm.apply(RoomEvent::StartRound).unwrap();
        assert_eq!(sm.version(), 1);
        sm.apply(RoomEvent::Resolve).unwrap();
        assert_eq!(sm.version(), 2);
        sm.apply(RoomEvent::Finish).unwrap();
        assert_eq!(sm.version(), 3);
    }

    #[test]
    fn finish_requires_intermission() {
        let mut sm = RoomStateMachine::new();
        assert!(sm.apply(RoomEvent::Finish).is_err());
        sm.apply(RoomEvent::StartRound).unwrap();
        assert!(sm.apply(RoomEvent::Finish).is_err());
    }
}
