//! ef-core: the Emberfall simulation core.
//!
//! Everything that makes a turn happen lives here: the energy-based turn
//! scheduler, the timed-status registry, the once-per-ten-ticks world-event
//! sweep, the player action cycle, and spell-cast resolution. There is no
//! I/O besides the save boundary; the UI drives the loop through the
//! [`action::CommandSource`] trait and drains messages and redraw flags
//! after each turn.

pub mod action;
pub mod magic;
pub mod monster;
pub mod object;
pub mod player;
pub mod world;

mod consts;
mod gameloop;
mod rng;

pub use consts::*;
pub use gameloop::{GameLoop, SimulationState};
pub use rng::GameRng;
