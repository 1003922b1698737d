//! Scheduler control flags and outbound redraw notifications.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Control flags read and written by the scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Flags {
    /// Set when the current level loop must be abandoned (death, stairs,
    /// recall firing, quit). The scheduler exits mid-state; nothing is
    /// rolled back.
    pub leaving: bool,

    /// Set by anything noteworthy; cancels resting, running and repeats.
    pub disturb: bool,

    /// Set when the player has chosen to quit the game entirely.
    pub quitting: bool,

    /// Set when a save has been requested (autosave or closing time).
    pub save_requested: bool,

    /// Forced save-and-quit (closing time reached).
    pub forced_quit: bool,
}

impl Flags {
    /// Stop any multi-turn activity and note the disturbance.
    pub fn disturb(&mut self) {
        self.disturb = true;
    }

    /// Consume the disturb signal, returning whether it was set.
    pub fn take_disturb(&mut self) -> bool {
        core::mem::take(&mut self.disturb)
    }
}

bitflags! {
    /// Outbound display-refresh notifications.
    ///
    /// The core accumulates these; the UI drains them after each player
    /// turn. Purely fire-and-forget, never read back by game logic.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RedrawFlags: u32 {
        const HP      = 1 << 0;
        const MANA    = 1 << 1;
        const FOOD    = 1 << 2;
        const SPEED   = 1 << 3;
        const STATUS  = 1 << 4;
        const CUT     = 1 << 5;
        const STUN    = 1 << 6;
        const POISON  = 1 << 7;
        const MAP     = 1 << 8;
        const EQUIP   = 1 << 9;
        const INVEN   = 1 << 10;
        const STATE   = 1 << 11;
        const TITLE   = 1 << 12;
    }
}

// Manual serde impl for RedrawFlags
impl Serialize for RedrawFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RedrawFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(RedrawFlags::from_bits_truncate(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_disturb_clears() {
        let mut flags = Flags::default();
        flags.disturb();
        assert!(flags.take_disturb());
        assert!(!flags.take_disturb());
    }

    #[test]
    fn redraw_bits_accumulate() {
        let mut rd = RedrawFlags::empty();
        rd |= RedrawFlags::HP;
        rd |= RedrawFlags::MANA;
        assert!(rd.contains(RedrawFlags::HP | RedrawFlags::MANA));
        assert!(!rd.contains(RedrawFlags::MAP));
    }
}
