//! Game options carried with the save.

use serde::{Deserialize, Serialize};

/// Player-tunable and debug options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Wizard (debug) mode: extra diagnostics, no score.
    pub wizard: bool,

    /// Autosave every `autosave_freq` world sweeps (0 disables).
    pub autosave_freq: u32,

    /// Stop resting/running on any monster appearing in view.
    pub disturb_near: bool,

    /// Show the level feeling as soon as it unlocks.
    pub show_feelings: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            wizard: false,
            autosave_freq: 50,
            disturb_near: true,
            show_feelings: true,
        }
    }
}

impl Options {
    /// Ticks between autosaves, or None when disabled.
    pub fn autosave_interval(&self) -> Option<u32> {
        if self.autosave_freq == 0 {
            None
        } else {
            Some(self.autosave_freq * crate::consts::WORLD_SWEEP_INTERVAL)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autosave_interval_scales_by_sweep() {
        let mut opts = Options::default();
        opts.autosave_freq = 3;
        assert_eq!(opts.autosave_interval(), Some(30));
        opts.autosave_freq = 0;
        assert_eq!(opts.autosave_interval(), None);
    }
}
