//! Timed-status registry.
//!
//! Every actor condition with a remaining duration lives here as one named
//! integer counter. Counters are clamped to `0..=MAX_STATUS`; crossing to
//! exactly zero produces the end-of-status notice exactly once. Most kinds
//! decay automatically in the world-event sweep; a few (poison, stun, cut,
//! recall) are only changed by specific events.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::consts::MAX_STATUS;

/// The fixed set of timed statuses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumCount,
)]
#[repr(u8)]
pub enum StatusKind {
    // Event-driven counters (not touched by the generic decay sweep)
    Poisoned,
    Stunned,
    Cut,
    Recall,

    // Harmful decaying counters
    Blind,
    Confused,
    Afraid,
    Paralyzed,
    Image,
    Slow,

    // Beneficial decaying counters
    Fast,
    SeeInvisible,
    Telepathy,
    SuperStealth,
    TimedInfra,
    ElementalAttack,
    ProtEvil,
    MagicDefense,
    Hero,
    Berserk,
    Blessed,
    Shield,
    OpposeAcid,
    OpposeElec,
    OpposeFire,
    OpposeCold,
    OpposePois,
}

impl StatusKind {
    /// Whether the generic sweep decays this counter automatically.
    pub const fn decays_in_sweep(&self) -> bool {
        !matches!(
            self,
            StatusKind::Poisoned | StatusKind::Stunned | StatusKind::Cut | StatusKind::Recall
        )
    }

    /// Beneficial statuses are eligible for the enhanced-magic slow-decay
    /// skip (every other sweep).
    pub const fn is_beneficial(&self) -> bool {
        matches!(
            self,
            StatusKind::Fast
                | StatusKind::SeeInvisible
                | StatusKind::Telepathy
                | StatusKind::SuperStealth
                | StatusKind::TimedInfra
                | StatusKind::ElementalAttack
                | StatusKind::ProtEvil
                | StatusKind::MagicDefense
                | StatusKind::Hero
                | StatusKind::Berserk
                | StatusKind::Blessed
                | StatusKind::Shield
                | StatusKind::OpposeAcid
                | StatusKind::OpposeElec
                | StatusKind::OpposeFire
                | StatusKind::OpposeCold
                | StatusKind::OpposePois
        )
    }

    /// Message when the status begins.
    pub const fn start_message(&self) -> Option<&'static str> {
        Some(match self {
            StatusKind::Poisoned => "You are poisoned!",
            StatusKind::Stunned => "You have been stunned.",
            StatusKind::Cut => "You have been given a cut.",
            StatusKind::Recall => "The air about you becomes charged...",
            StatusKind::Blind => "You are blind!",
            StatusKind::Confused => "You are confused!",
            StatusKind::Afraid => "You are terrified!",
            StatusKind::Paralyzed => "You are paralyzed!",
            StatusKind::Image => "You feel drugged!",
            StatusKind::Slow => "You feel yourself moving slower!",
            StatusKind::Fast => "You feel yourself moving faster!",
            StatusKind::SeeInvisible => "Your eyes feel very sensitive!",
            StatusKind::Telepathy => "You feel your consciousness expand!",
            StatusKind::SuperStealth => "You are mantled in shadow!",
            StatusKind::TimedInfra => "Your eyes begin to tingle!",
            StatusKind::ElementalAttack => "Your hands crackle with power!",
            StatusKind::ProtEvil => "You feel safe from evil!",
            StatusKind::MagicDefense => "You feel magically protected.",
            StatusKind::Hero => "You feel like a hero!",
            StatusKind::Berserk => "You feel like a killing machine!",
            StatusKind::Blessed => "You feel righteous!",
            StatusKind::Shield => "A mystic shield forms around your body!",
            StatusKind::OpposeAcid => "You feel resistant to acid!",
            StatusKind::OpposeElec => "You feel resistant to electricity!",
            StatusKind::OpposeFire => "You feel resistant to fire!",
            StatusKind::OpposeCold => "You feel resistant to cold!",
            StatusKind::OpposePois => "You feel resistant to poison!",
        })
    }

    /// Message when the status runs out.
    pub const fn end_message(&self) -> Option<&'static str> {
        match self {
            StatusKind::Poisoned => Some("You are no longer poisoned."),
            StatusKind::Stunned => Some("You are no longer stunned."),
            StatusKind::Cut => Some("You are no longer bleeding."),
            // Recall firing has its own teleport handling in the sweep.
            StatusKind::Recall => None,
            StatusKind::Blind => Some("You can see again."),
            StatusKind::Confused => Some("You feel less confused now."),
            StatusKind::Afraid => Some("You feel bolder now."),
            StatusKind::Paralyzed => Some("You can move again."),
            StatusKind::Image => Some("You can see clearly again."),
            StatusKind::Slow => Some("You feel yourself speed up."),
            StatusKind::Fast => Some("You feel yourself slow down."),
            StatusKind::SeeInvisible => Some("Your eyes feel less sensitive."),
            StatusKind::Telepathy => Some("Your consciousness contracts again."),
            StatusKind::SuperStealth => Some("You are exposed to common sight once more."),
            StatusKind::TimedInfra => Some("Your eyes stop tingling."),
            StatusKind::ElementalAttack => Some("Your hands return to normal."),
            StatusKind::ProtEvil => Some("You no longer feel safe from evil."),
            StatusKind::MagicDefense => Some("Your magical defenses fall."),
            StatusKind::Hero => Some("The heroism wears off."),
            StatusKind::Berserk => Some("You feel less berserk."),
            StatusKind::Blessed => Some("The prayer has expired."),
            StatusKind::Shield => Some("Your mystic shield crumbles away."),
            StatusKind::OpposeAcid => Some("You feel less resistant to acid."),
            StatusKind::OpposeElec => Some("You feel less resistant to electricity."),
            StatusKind::OpposeFire => Some("You feel less resistant to fire."),
            StatusKind::OpposeCold => Some("You feel less resistant to cold."),
            StatusKind::OpposePois => Some("You feel less resistant to poison."),
        }
    }
}

/// Result of changing a status counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusDelta {
    /// Counter went from zero to positive.
    pub started: bool,
    /// Counter went from positive to exactly zero.
    pub ended: bool,
}

impl StatusDelta {
    pub const fn changed(&self) -> bool {
        self.started || self.ended
    }
}

/// The per-actor bag of timed-status counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBag {
    counters: [i32; StatusKind::COUNT],
}

impl StatusBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter (0 means inactive).
    pub fn get(&self, kind: StatusKind) -> i32 {
        self.counters[kind as usize]
    }

    /// Whether a status is currently active.
    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind) > 0
    }

    /// Set a counter, clamped to `0..=MAX_STATUS`.
    ///
    /// Reports start/end transitions so the caller can emit each notice
    /// exactly once; re-setting an already active status reports neither.
    pub fn set(&mut self, kind: StatusKind, value: i32) -> StatusDelta {
        let old = self.counters[kind as usize];
        let new = value.clamp(0, MAX_STATUS);
        self.counters[kind as usize] = new;
        StatusDelta {
            started: old == 0 && new > 0,
            ended: old > 0 && new == 0,
        }
    }

    /// Reduce a counter by `by`, saturating at zero.
    pub fn dec(&mut self, kind: StatusKind, by: i32) -> StatusDelta {
        let old = self.counters[kind as usize];
        self.set(kind, old - by.max(0))
    }

    /// Extend a counter by `by` (never shortens).
    pub fn add(&mut self, kind: StatusKind, by: i32) -> StatusDelta {
        let old = self.counters[kind as usize];
        self.set(kind, old.saturating_add(by.max(0)))
    }

    /// Iterate all kinds with their current values.
    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, i32)> + '_ {
        StatusKind::iter().map(|k| (k, self.get(k)))
    }

    /// Whether any harmful condition is active (used by rest-until-rested).
    pub fn any_affliction(&self) -> bool {
        StatusKind::iter()
            .filter(|k| !k.is_beneficial() && *k != StatusKind::Recall)
            .any(|k| self.has(k))
    }
}
