//! Input handling - convert key events to commands.
//!
//! Vi-style movement keys plus a handful of single-key actions; commands
//! needing a selection (cast, eat, drop) are prompted for in app.rs.

use crossterm::event::{KeyCode, KeyEvent};
use ef_core::action::{Command, Direction};
use ef_core::player::RestMode;

/// Convert a key event to a game command, where no further input is needed.
pub fn key_to_command(key: KeyEvent) -> Option<Command> {
    match key.code {
        // Vi keys
        KeyCode::Char('h') => Some(Command::Move(Direction::West)),
        KeyCode::Char('j') => Some(Command::Move(Direction::South)),
        KeyCode::Char('k') => Some(Command::Move(Direction::North)),
        KeyCode::Char('l') => Some(Command::Move(Direction::East)),
        KeyCode::Char('y') => Some(Command::Move(Direction::NorthWest)),
        KeyCode::Char('u') => Some(Command::Move(Direction::NorthEast)),
        KeyCode::Char('b') => Some(Command::Move(Direction::SouthWest)),
        KeyCode::Char('n') => Some(Command::Move(Direction::SouthEast)),

        // Capital Vi keys for running
        KeyCode::Char('H') => Some(Command::Run(Direction::West)),
        KeyCode::Char('J') => Some(Command::Run(Direction::South)),
        KeyCode::Char('K') => Some(Command::Run(Direction::North)),
        KeyCode::Char('L') => Some(Command::Run(Direction::East)),
        KeyCode::Char('Y') => Some(Command::Run(Direction::NorthWest)),
        KeyCode::Char('U') => Some(Command::Run(Direction::NorthEast)),
        KeyCode::Char('B') => Some(Command::Run(Direction::SouthWest)),
        KeyCode::Char('N') => Some(Command::Run(Direction::SouthEast)),

        // Arrow keys
        KeyCode::Up => Some(Command::Move(Direction::North)),
        KeyCode::Down => Some(Command::Move(Direction::South)),
        KeyCode::Left => Some(Command::Move(Direction::West)),
        KeyCode::Right => Some(Command::Move(Direction::East)),

        KeyCode::Char('.') => Some(Command::Stay),
        KeyCode::Char(',') => Some(Command::PickUp),
        KeyCode::Char('>') => Some(Command::TakeStairs),
        KeyCode::Char('s') => Some(Command::Search),
        KeyCode::Char('#') => Some(Command::ToggleSearchMode),

        // Rest modes
        KeyCode::Char('R') => Some(Command::Rest(RestMode::UntilHealed)),
        KeyCode::Char('&') => Some(Command::Rest(RestMode::UntilRested)),

        // Meta
        KeyCode::Char('S') => Some(Command::Save),
        KeyCode::Char('Q') => Some(Command::Quit),

        _ => None,
    }
}

/// Map a selection letter to an inventory/spell index.
pub fn letter_to_index(c: char) -> Option<usize> {
    if c.is_ascii_lowercase() {
        Some(c as usize - 'a' as usize)
    } else {
        None
    }
}
