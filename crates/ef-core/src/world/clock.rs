//! The world clock: a single monotonically increasing turn counter.
//!
//! Day/night phase, the quarter-day ambient check, and the closing-time
//! window are all derived from the raw counter; nothing else mutates it.

use serde::{Deserialize, Serialize};

use crate::consts::{
    CLOSING_TURN, CLOSING_WARN_FINAL, CLOSING_WARN_FIRST, DAY_CYCLE, WORLD_SWEEP_INTERVAL,
};

/// Phase of the in-game day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    Day,
    Night,
}

/// Stage of the closing-time sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClosingStage {
    Open,
    FirstWarning,
    FinalWarning,
    Closed,
}

/// The global turn counter.
///
/// Strictly increasing; only the scheduler calls [`WorldClock::advance`],
/// and only a game load may ever set it backwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldClock {
    turn: u32,
}

impl WorldClock {
    pub fn new() -> Self {
        Self { turn: 0 }
    }

    /// Restore a clock from a saved turn count.
    pub fn from_turn(turn: u32) -> Self {
        Self { turn }
    }

    /// Current turn.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Advance by one tick. Called once per completed scheduler pass.
    pub fn advance(&mut self) {
        self.turn += 1;
    }

    /// Whether the world-event sweep runs on this tick.
    pub fn is_sweep_turn(&self) -> bool {
        self.turn % WORLD_SWEEP_INTERVAL == 0
    }

    /// Day or night, from the position within the day cycle.
    pub fn day_phase(&self) -> DayPhase {
        if self.turn % DAY_CYCLE < DAY_CYCLE / 2 {
            DayPhase::Day
        } else {
            DayPhase::Night
        }
    }

    /// True exactly on a dawn or dusk boundary tick.
    pub fn is_day_boundary(&self) -> bool {
        self.turn % (DAY_CYCLE / 2) == 0
    }

    /// True exactly at dawn.
    pub fn is_dawn(&self) -> bool {
        self.turn % DAY_CYCLE == 0
    }

    /// Quarter-day ambient check boundary.
    pub fn is_quarter_day(&self) -> bool {
        self.turn % (DAY_CYCLE / 4) == 0
    }

    /// Where this turn falls in the closing-time sequence.
    pub fn closing_stage(&self) -> ClosingStage {
        if self.turn >= CLOSING_TURN {
            ClosingStage::Closed
        } else if self.turn >= CLOSING_TURN - CLOSING_WARN_FINAL {
            ClosingStage::FinalWarning
        } else if self.turn >= CLOSING_TURN - CLOSING_WARN_FIRST {
            ClosingStage::FirstWarning
        } else {
            ClosingStage::Open
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_monotonic() {
        let mut clock = WorldClock::new();
        for expected in 1..100 {
            clock.advance();
            assert_eq!(clock.turn(), expected);
        }
    }

    #[test]
    fn sweep_gating() {
        let mut clock = WorldClock::new();
        let mut sweeps = 0;
        for _ in 0..100 {
            clock.advance();
            if clock.is_sweep_turn() {
                sweeps += 1;
            }
        }
        assert_eq!(sweeps, 10);
    }

    #[test]
    fn day_night_halves() {
        let day = WorldClock::from_turn(10);
        assert_eq!(day.day_phase(), DayPhase::Day);
        let night = WorldClock::from_turn(DAY_CYCLE / 2 + 10);
        assert_eq!(night.day_phase(), DayPhase::Night);
    }

    #[test]
    fn closing_stages_ordered() {
        assert_eq!(WorldClock::from_turn(0).closing_stage(), ClosingStage::Open);
        assert_eq!(
            WorldClock::from_turn(CLOSING_TURN - CLOSING_WARN_FIRST).closing_stage(),
            ClosingStage::FirstWarning
        );
        assert_eq!(
            WorldClock::from_turn(CLOSING_TURN - CLOSING_WARN_FINAL).closing_stage(),
            ClosingStage::FinalWarning
        );
        assert_eq!(
            WorldClock::from_turn(CLOSING_TURN).closing_stage(),
            ClosingStage::Closed
        );
    }
}
