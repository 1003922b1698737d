//! The player actor.

pub mod status;

use serde::{Deserialize, Serialize};

use crate::action::Direction;
use crate::consts::{
    extract_energy, A_CON, INVEN_PACK, NORMAL_SPEED, NUM_STATS, PY_FOOD_FULL, PY_FOOD_MAX,
};
use crate::object::Object;
use crate::world::clock::DayPhase;
use crate::world::level::Pos;
use status::{StatusBag, StatusKind};

/// How long a rest was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestMode {
    /// Rest a fixed number of turns.
    Turns(i32),
    /// Rest until HP and SP are both full.
    UntilHealed,
    /// Rest until healed and every affliction has cleared.
    UntilRested,
    /// Rest until the next dawn or dusk boundary.
    UntilDaybreak,
}

/// Multi-turn activity state.
///
/// The classic sources treat resting/running as flags re-checked every
/// scheduler pass rather than real suspension; this is that state machine
/// made explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activity {
    #[default]
    Idle,
    Resting(RestMode),
    Running(Direction),
    Repeating(u16),
}

impl Activity {
    pub const fn is_idle(&self) -> bool {
        matches!(self, Activity::Idle)
    }

    pub const fn is_resting(&self) -> bool {
        matches!(self, Activity::Resting(_))
    }
}

/// An assumed shape. Sunrise forces a return to true form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Form {
    Bat,
    Wolf,
    Mist,
}

/// Innate and class abilities the turn loop consults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Abilities {
    /// Casting energy discount scaling with level margin.
    pub fast_cast: bool,
    /// Heals a fraction of max HP on successful casts.
    pub harmony: bool,
    /// +1 on poison/stun/cut recovery.
    pub hardy: bool,
    /// Statuses recover at double rate; recovery adjustment x1.5.
    pub divine_recovery: bool,
    /// Beneficial statuses decay every other sweep only.
    pub enhanced_magic: bool,
    /// Innate regeneration (stacks with the item flag).
    pub regeneration: bool,
    /// Carries the Black Breath.
    pub black_breath: bool,
}

/// The player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub level: i32,
    pub exp: i32,

    /// Current and maximum stats (STR, INT, WIS, DEX, CON, CHR).
    pub stat_cur: [i32; NUM_STATS],
    pub stat_max: [i32; NUM_STATS],

    pub chp: i32,
    pub mhp: i32,
    /// Fixed-point fraction carried between regeneration passes.
    pub chp_frac: u32,

    pub csp: i32,
    pub msp: i32,
    pub csp_frac: u32,

    /// Base speed rating before haste/slow statuses.
    pub base_speed: u8,

    /// Banked action energy; acting requires `ENERGY_TO_ACT`.
    pub energy: i32,
    /// Energy cost of the action just taken.
    pub energy_use: i32,

    /// Food counter, `0..=PY_FOOD_MAX`.
    pub food: i32,

    pub statuses: StatusBag,
    pub abilities: Abilities,
    /// Currently assumed shape, if any.
    pub form: Option<Form>,
    pub activity: Activity,
    /// Turns spent in the current rest, for the 16-turn poll granularity.
    pub rest_turns: u32,
    /// Day phase when an until-daybreak rest began; the rest ends once the
    /// phase differs. Player actions land every several ticks, so testing
    /// for the exact boundary tick would usually miss it.
    pub rest_phase: Option<DayPhase>,
    /// Actively searching (counts as resting for regeneration).
    pub searching: bool,

    pub pos: Pos,
    /// Depth the word of recall returns to.
    pub recall_depth: u32,

    pub inventory: Vec<Object>,
    pub equipment: Vec<Object>,

    /// Bitmask of spells successfully cast at least once.
    pub spell_worked: u64,
    /// The two specialty power pools with above-linear drain.
    pub heighten_power: i32,
    pub speed_boost: i32,

    pub is_dead: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: 1,
            exp: 0,
            stat_cur: [10; NUM_STATS],
            stat_max: [10; NUM_STATS],
            chp: 20,
            mhp: 20,
            chp_frac: 0,
            csp: 10,
            msp: 10,
            csp_frac: 0,
            base_speed: NORMAL_SPEED,
            energy: 0,
            energy_use: 0,
            food: PY_FOOD_FULL - 1,
            statuses: StatusBag::new(),
            abilities: Abilities::default(),
            form: None,
            activity: Activity::Idle,
            rest_turns: 0,
            rest_phase: None,
            searching: false,
            pos: Pos::default(),
            recall_depth: 0,
            inventory: Vec::new(),
            equipment: Vec::new(),
            spell_worked: 0,
            heighten_power: 0,
            speed_boost: 0,
            is_dead: false,
        }
    }
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Effective speed rating after haste/slow and the speed-boost pool.
    pub fn speed(&self) -> u8 {
        let mut speed = self.base_speed as i32;
        if self.statuses.has(StatusKind::Fast) {
            speed += 10;
        }
        if self.statuses.has(StatusKind::Slow) {
            speed -= 10;
        }
        if self.speed_boost > 0 {
            speed += (self.speed_boost / 20).min(10);
        }
        speed.clamp(0, 199) as u8
    }

    /// Energy gained per scheduler tick.
    pub fn energy_gain(&self) -> i32 {
        extract_energy(self.speed())
    }

    /// Whether HP and SP are both at maximum.
    pub fn fully_healed(&self) -> bool {
        self.chp >= self.mhp && self.csp >= self.msp
    }

    /// Heal up to `amount` HP; returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.max(0).min(self.mhp - self.chp);
        self.chp += healed;
        healed
    }

    /// Reduce a stat's current value by `loss` points.
    ///
    /// Permanent drains lower the maximum too. Values saturate at 3; this
    /// never fails.
    pub fn dec_stat(&mut self, stat: usize, loss: i32, permanent: bool) {
        let cur = &mut self.stat_cur[stat];
        *cur = (*cur - loss.max(0)).max(3);
        if permanent {
            let max = &mut self.stat_max[stat];
            *max = (*max - loss.max(0)).max(3);
        }
    }

    /// Constitution-derived recovery adjustment for poison/stun/cut.
    pub fn recovery_adjustment(&self) -> i32 {
        let con = self.stat_cur[A_CON];
        let base = match con {
            i32::MIN..=6 => 0,
            7..=14 => 1,
            15..=17 => 2,
            18..=21 => 3,
            22..=25 => 4,
            _ => 5,
        };
        let mut adj = base + if self.abilities.hardy { 1 } else { 0 };
        if self.abilities.divine_recovery {
            adj = adj * 3 / 2;
        }
        adj.max(1)
    }

    /// Gain `amount` of food, clamped to the maximum.
    pub fn feed(&mut self, amount: i32) {
        self.food = (self.food + amount.max(0)).min(PY_FOOD_MAX);
    }

    /// Whether the pack holds more than it has slots for.
    pub fn pack_overflowing(&self) -> bool {
        self.inventory.len() > INVEN_PACK
    }

    /// Stop any multi-turn activity.
    pub fn cancel_activity(&mut self) {
        self.activity = Activity::Idle;
        self.rest_turns = 0;
        self.rest_phase = None;
    }

    /// The wielded light source, if any.
    pub fn light_source_mut(&mut self) -> Option<&mut Object> {
        self.equipment.iter_mut().find(|o| o.kind.is_light())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Object, ObjectKind};

    #[test]
    fn speed_reflects_haste_and_slow() {
        let mut p = Player::default();
        assert_eq!(p.speed(), NORMAL_SPEED);
        p.statuses.set(StatusKind::Fast, 10);
        assert_eq!(p.speed(), NORMAL_SPEED + 10);
        p.statuses.set(StatusKind::Slow, 10);
        assert_eq!(p.speed(), NORMAL_SPEED);
    }

    #[test]
    fn dec_stat_saturates_at_three() {
        let mut p = Player::default();
        p.dec_stat(A_CON, 100, false);
        assert_eq!(p.stat_cur[A_CON], 3);
        assert_eq!(p.stat_max[A_CON], 10);
        p.dec_stat(A_CON, 2, true);
        assert_eq!(p.stat_max[A_CON], 8);
    }

    #[test]
    fn recovery_adjustment_traits() {
        let mut p = Player::default();
        assert_eq!(p.recovery_adjustment(), 1);
        p.abilities.hardy = true;
        assert_eq!(p.recovery_adjustment(), 2);
        p.abilities.divine_recovery = true;
        assert_eq!(p.recovery_adjustment(), 3);
    }

    #[test]
    fn pack_overflow_threshold() {
        let mut p = Player::default();
        for _ in 0..INVEN_PACK {
            p.inventory.push(Object::new(ObjectKind::Potion));
        }
        assert!(!p.pack_overflowing());
        p.inventory.push(Object::new(ObjectKind::Potion));
        assert!(p.pack_overflowing());
    }
}
