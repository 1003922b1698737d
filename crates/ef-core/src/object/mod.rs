//! Item surface consumed by the simulation core.
//!
//! The full object data model (generation, identification, pricing) lives
//! outside this core. What the turn loop needs from an item is small:
//! `pval` (charges or light fuel), `timeout` (activation recharge), the
//! attribute and curse flag bitsets, and stacking for the rod recharge
//! model.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Non-curse item attributes the core reads.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ObjectFlags: u32 {
        /// Cannot be force-dropped by pack-overflow handling.
        const STICKY       = 1 << 0;
        /// Artifact light sources never burn fuel.
        const ARTIFACT     = 1 << 1;
        /// Doubles HP regeneration, 1.5x SP regeneration.
        const REGEN        = 1 << 2;
        /// Halves food consumption.
        const SLOW_DIGEST  = 1 << 3;
        /// Increases food consumption.
        const FAST_DIGEST  = 1 << 4;
        /// Suppresses the periodic Black Breath warning.
        const SOUL_WARD    = 1 << 5;
        /// Has an activatable power governed by `timeout`.
        const ACTIVATABLE  = 1 << 6;
    }
}

bitflags! {
    /// Curse triggers sampled probabilistically by the world-event sweep.
    ///
    /// The sweep only reads these; the single bit it writes back is the
    /// matching `notice` bit once a curse has visibly fired.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CurseFlags: u32 {
        const TELEPORT      = 1 << 0;
        const AGGRAVATE     = 1 << 1;
        const POISON        = 1 << 2;
        const POISON_CLOUD  = 1 << 3;
        const WOUNDS        = 1 << 4;
        const HALLUCINATE   = 1 << 5;
        const DROP_WEAPON   = 1 << 6;
        const SUMMON_DEMON  = 1 << 7;
        const SUMMON_UNDEAD = 1 << 8;
        const PARALYZE      = 1 << 9;
        const DRAIN_EXP     = 1 << 10;
        const DRAIN_MANA    = 1 << 11;
        const DRAIN_STAT    = 1 << 12;
        const DRAIN_CHARGE  = 1 << 13;
        const ATTRACT       = 1 << 14;
        const SLOW_REGEN    = 1 << 15;
    }
}

// Manual serde impls for the flag bitsets
impl Serialize for ObjectFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(ObjectFlags::from_bits_truncate(bits))
    }
}

impl Serialize for CurseFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CurseFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(CurseFlags::from_bits_truncate(bits))
    }
}

/// Broad object classes the core distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Weapon,
    Bow,
    Armor,
    Shield,
    Helm,
    Cloak,
    Ring,
    Amulet,
    Torch,
    Lantern,
    Rod,
    Wand,
    Staff,
    Potion,
    Scroll,
    Food,
}

impl ObjectKind {
    /// Whether this kind is a wieldable light source.
    pub const fn is_light(&self) -> bool {
        matches!(self, ObjectKind::Torch | ObjectKind::Lantern)
    }
}

/// One item instance (or stack).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub kind: ObjectKind,
    pub name: String,
    /// Stack size.
    pub number: u8,
    /// Charges, or remaining light fuel for torches and lanterns.
    pub pval: i32,
    /// Turns until the activation (or rod stack) is recharged.
    pub timeout: i32,
    /// Per-unit recharge time for rods.
    pub recharge_time: i32,
    pub flags: ObjectFlags,
    pub curses: CurseFlags,
    /// Curse bits whose existence the wearer has witnessed.
    pub notice: CurseFlags,
}

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        let (name, pval, recharge_time) = match kind {
            ObjectKind::Torch => ("wooden torch", 5_000, 0),
            ObjectKind::Lantern => ("brass lantern", 7_500, 0),
            ObjectKind::Rod => ("rod", 0, 60),
            _ => ("item", 0, 0),
        };
        Self {
            kind,
            name: name.to_string(),
            number: 1,
            pval,
            timeout: 0,
            recharge_time,
            flags: ObjectFlags::empty(),
            curses: CurseFlags::empty(),
            notice: CurseFlags::empty(),
        }
    }

    pub fn named(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new(kind)
        }
    }

    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_curses(mut self, curses: CurseFlags) -> Self {
        self.curses |= curses;
        self
    }

    /// Whether pack-overflow handling may force-drop this item.
    pub fn droppable(&self) -> bool {
        !self.flags.contains(ObjectFlags::STICKY)
    }

    /// Record that a curse on this item has visibly fired.
    ///
    /// Returns true the first time a given curse is noticed, so the sweep
    /// can narrate discovery once rather than every proc.
    pub fn notice_curse(&mut self, curse: CurseFlags) -> bool {
        let fresh = !self.notice.contains(curse);
        self.notice |= curse;
        fresh
    }

    /// Tick one unit of recharge on an activatable item.
    ///
    /// Returns true when the item has just finished recharging.
    pub fn recharge_tick(&mut self) -> bool {
        if self.timeout > 0 {
            self.timeout -= 1;
            self.timeout == 0
        } else {
            false
        }
    }

    /// Tick recharge on a rod stack.
    ///
    /// A stack shares one `timeout` pool; the number of units currently
    /// charging is `ceil(timeout / recharge_time)`, and each charging unit
    /// contributes one point of recovery per tick.
    pub fn rod_recharge_tick(&mut self) -> bool {
        if self.kind != ObjectKind::Rod || self.timeout <= 0 || self.recharge_time <= 0 {
            return false;
        }
        let charging = (self.timeout + self.recharge_time - 1) / self.recharge_time;
        self.timeout = (self.timeout - charging).max(0);
        self.timeout == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticky_blocks_forced_drop() {
        let obj = Object::new(ObjectKind::Weapon).with_flags(ObjectFlags::STICKY);
        assert!(!obj.droppable());
        assert!(Object::new(ObjectKind::Weapon).droppable());
    }

    #[test]
    fn curse_notice_fires_once() {
        let mut obj = Object::new(ObjectKind::Ring).with_curses(CurseFlags::TELEPORT);
        assert!(obj.notice_curse(CurseFlags::TELEPORT));
        assert!(!obj.notice_curse(CurseFlags::TELEPORT));
        assert!(obj.notice_curse(CurseFlags::AGGRAVATE));
    }

    #[test]
    fn rod_stack_recharges_in_parallel() {
        let mut rod = Object::new(ObjectKind::Rod);
        rod.number = 3;
        rod.recharge_time = 10;
        // Three units fired: 30 points of timeout outstanding.
        rod.timeout = 30;

        // ceil(30/10) = 3 units charging, so 3 points recovered per tick.
        rod.rod_recharge_tick();
        assert_eq!(rod.timeout, 27);

        // Once below one unit's worth, only one unit is still charging.
        rod.timeout = 7;
        rod.rod_recharge_tick();
        assert_eq!(rod.timeout, 6);
    }

    #[test]
    fn rod_recharge_reports_completion() {
        let mut rod = Object::new(ObjectKind::Rod);
        rod.recharge_time = 10;
        rod.timeout = 1;
        assert!(rod.rod_recharge_tick());
        assert!(!rod.rod_recharge_tick());
    }

    #[test]
    fn activation_recharge_completion() {
        let mut obj = Object::new(ObjectKind::Amulet).with_flags(ObjectFlags::ACTIVATABLE);
        obj.timeout = 2;
        assert!(!obj.recharge_tick());
        assert!(obj.recharge_tick());
        assert!(!obj.recharge_tick());
    }
}
