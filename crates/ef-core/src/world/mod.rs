//! World-level state: clock, level surface, options, flags, the periodic
//! event sweep, and the save boundary.

pub mod clock;
pub mod errors;
pub mod flags;
pub mod level;
pub mod options;
pub mod process;
pub mod save;

pub use clock::{ClosingStage, DayPhase, WorldClock};
pub use errors::SaveError;
pub use flags::{Flags, RedrawFlags};
pub use level::{Level, Locale, ManaRune, Pos};
pub use options::Options;
pub use process::process_world;
