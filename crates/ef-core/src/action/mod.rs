//! Player commands and the input boundary.

pub mod cycle;

use serde::{Deserialize, Serialize};

use crate::gameloop::SimulationState;
use crate::monster::MonsterId;
use crate::player::RestMode;

/// Movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// Get the delta (dx, dy) for this direction.
    pub const fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }
}

/// One interpreted player command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    Run(Direction),
    /// Pass the turn in place.
    Stay,
    Search,
    ToggleSearchMode,
    Rest(RestMode),
    /// Repeat a command `count` times (digging-style persistence).
    Repeat {
        command: Box<Command>,
        count: u16,
    },
    Attack(MonsterId),
    Cast {
        spell: usize,
        target: Option<MonsterId>,
    },
    Eat(usize),
    Drop(usize),
    PickUp,
    Activate(usize),
    ZapRod(usize),
    TakeStairs,
    Save,
    Quit,
}

/// Where interpreted commands come from.
///
/// The UI owns keybindings and menus; the core only ever asks for the next
/// command (blocking) or whether any key is waiting (non-blocking, used to
/// interrupt multi-turn activities).
pub trait CommandSource {
    fn next_command(&mut self, state: &SimulationState) -> Command;

    /// Non-blocking check for a pending keypress.
    fn poll_interrupt(&mut self) -> bool {
        false
    }
}

/// Result of dispatching one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action took this much energy (floored at `MIN_ENERGY_USE`).
    Energy(i32),
    /// The command could not resolve; the turn is free.
    Free,
}

/// A scripted command source for tests and replays.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    commands: Vec<Command>,
    next: usize,
    /// Pretend a key is waiting on every interrupt poll.
    pub key_waiting: bool,
}

impl ScriptedInput {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands,
            next: 0,
            key_waiting: false,
        }
    }
}

impl CommandSource for ScriptedInput {
    fn next_command(&mut self, _state: &SimulationState) -> Command {
        let cmd = self.commands.get(self.next).cloned().unwrap_or(Command::Quit);
        self.next += 1;
        cmd
    }

    fn poll_interrupt(&mut self) -> bool {
        self.key_waiting
    }
}
