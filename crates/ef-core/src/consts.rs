//! Core simulation constants.
//!
//! Unit system: an actor may act once its energy accumulator reaches
//! [`ENERGY_TO_ACT`]; one scheduler pass is one game tick, and ten ticks
//! make one world-event unit.

/// Energy an actor must bank before it is allowed to act.
pub const ENERGY_TO_ACT: i32 = 100;

/// Minimum energy an action may cost, enforced after all discounts.
pub const MIN_ENERGY_USE: i32 = 50;

/// Speed rating of an unhasted, unslowed human.
pub const NORMAL_SPEED: u8 = 110;

/// World-event sweeps run once per this many scheduler passes.
pub const WORLD_SWEEP_INTERVAL: u32 = 10;

/// Energy gained per tick, indexed by speed rating (clamped to 0..=199).
///
/// Speed 110 gains 10/tick; +10 speed gains 20/tick, so a hasted actor
/// acts twice as often. The table saturates at both ends.
#[rustfmt::skip]
pub const EXTRACT_ENERGY: [u8; 200] = [
    // Slowest
     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
     1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
     2,  2,  2,  2,  2,  2,  2,  2,  2,  2,
     2,  2,  2,  2,  2,  2,  2,  2,  2,  2,
     3,  3,  3,  3,  3,  3,  3,  3,  3,  3,
     3,  3,  3,  3,  3,  3,  3,  3,  3,  3,
     3,  3,  3,  4,  4,  4,  4,  4,  4,  4,
     4,  4,  4,  4,  4,  4,  4,  5,  5,  5,
     5,  5,  5,  5,  5,  6,  6,  6,  6,  6,
     6,  7,  7,  7,  7,  7,  8,  8,  8,  9,
    // Normal (speed 110 = index 110)
    10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
    20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
    30, 31, 32, 33, 34, 35, 36, 36, 37, 37,
    38, 38, 39, 39, 40, 40, 40, 41, 41, 41,
    42, 42, 42, 43, 43, 43, 44, 44, 44, 44,
    45, 45, 45, 45, 45, 46, 46, 46, 46, 46,
    47, 47, 47, 47, 47, 48, 48, 48, 48, 48,
    49, 49, 49, 49, 49, 49, 49, 49, 49, 49,
    49, 49, 49, 49, 49, 49, 49, 49, 49, 49,
    49, 49, 49, 49, 49, 49, 49, 49, 49, 49,
];

/// Energy gained per tick for a given speed rating (pure lookup).
pub const fn extract_energy(speed: u8) -> i32 {
    let idx = if speed as usize >= EXTRACT_ENERGY.len() {
        EXTRACT_ENERGY.len() - 1
    } else {
        speed as usize
    };
    EXTRACT_ENERGY[idx] as i32
}

/// Upper clamp for every timed-status counter.
pub const MAX_STATUS: i32 = 10_000;

/// Inventory slots before the pack overflows.
pub const INVEN_PACK: usize = 23;

/// Poison above this counts as the severe damage tier.
pub const POISON_SEVERE: i32 = 300;
/// Poison above this (and at or below severe) is the moderate tier.
pub const POISON_MODERATE: i32 = 100;

/// Cut above this is a mortal wound: heavy bleeding, no natural healing.
pub const CUT_MORTAL: i32 = 1_000;
/// Cut above this is a severe wound.
pub const CUT_SEVERE: i32 = 200;

/// Stun above this is heavy stun (worse casting penalty).
pub const STUN_HEAVY: i32 = 50;

/// Food counter limits and thresholds.
pub const PY_FOOD_MAX: i32 = 15_000;
pub const PY_FOOD_FULL: i32 = 10_000;
pub const PY_FOOD_ALERT: i32 = 2_000;
pub const PY_FOOD_WEAK: i32 = 1_000;
pub const PY_FOOD_FAINT: i32 = 500;
pub const PY_FOOD_STARVE: i32 = 100;

/// Regeneration rates (scaled; see `world::process::regen_hp`).
pub const PY_REGEN_NORMAL: i32 = 197;
pub const PY_REGEN_WEAK: i32 = 98;
pub const PY_REGEN_FAINT: i32 = 33;
/// Fixed-point bases added before the >>16 extraction.
pub const PY_REGEN_HPBASE: i32 = 1_442;
pub const PY_REGEN_MNBASE: i32 = 524;

/// Number of game ticks from one dawn to the next.
pub const DAY_CYCLE: u32 = 100_000;

/// Closing time: the world ends at this turn.
pub const CLOSING_TURN: u32 = 2_000_000;
/// First and final closing warnings precede the end by these margins.
pub const CLOSING_WARN_FIRST: u32 = 3_000;
pub const CLOSING_WARN_FINAL: u32 = 1_000;

/// One-in-this chance of a wandering monster per world sweep.
pub const MONSTER_ALLOC_CHANCE: u32 = 160;

/// Black Breath gnaws at the player once per this many ticks.
pub const BLACK_BREATH_INTERVAL: u32 = 5_000;

/// Live-monster arena capacity; compaction runs before this is hit.
pub const MAX_MONSTERS: usize = 1_024;

/// Ordinary resting only checks for keypresses on this turn granularity.
pub const REST_POLL_INTERVAL: u32 = 16;

/// Number of player stats (STR, INT, WIS, DEX, CON, CHR).
pub const NUM_STATS: usize = 6;

pub const A_STR: usize = 0;
pub const A_INT: usize = 1;
pub const A_WIS: usize = 2;
pub const A_DEX: usize = 3;
pub const A_CON: usize = 4;
pub const A_CHR: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_speed_gains_ten() {
        assert_eq!(extract_energy(NORMAL_SPEED), 10);
    }

    #[test]
    fn hasted_speed_doubles_gain() {
        assert_eq!(extract_energy(NORMAL_SPEED + 10), 20);
    }

    #[test]
    fn table_saturates() {
        assert_eq!(extract_energy(0), 1);
        assert_eq!(extract_energy(255), 49);
    }

    #[test]
    fn gain_is_monotonic_in_speed() {
        for s in 0..199u8 {
            assert!(extract_energy(s) <= extract_energy(s + 1));
        }
    }
}
