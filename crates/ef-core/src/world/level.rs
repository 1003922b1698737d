//! Minimal level model.
//!
//! Level layout and generation live outside the simulation core; this is
//! only the surface the core reads and writes: locale classification,
//! depth, floor-object piles, mana-rune features, and the stored recall
//! point. There is no terrain.

use serde::{Deserialize, Serialize};

use crate::object::Object;
use crate::rng::GameRng;

/// A map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance.
    pub fn distance(&self, other: Pos) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Locale classification; decides whether day/night logic applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    /// Surface town: day/night, shops, sunlight.
    Town,
    /// Underground: no daylight ever reaches here.
    Cave,
    /// Open surface wilderness: day/night applies.
    Valley,
}

impl Locale {
    /// Whether sunlight and the day cycle matter here.
    pub const fn has_daylight(&self) -> bool {
        matches!(self, Locale::Town | Locale::Valley)
    }
}

/// A mana-rune dungeon feature with its banked reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManaRune {
    pub pos: Pos,
    pub reserve: i32,
}

/// An object lying on the floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorObject {
    pub pos: Pos,
    pub obj: Object,
}

/// The core-facing view of the current level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Depth in 50-foot units; 0 is the town.
    pub depth: u32,
    pub locale: Locale,
    pub floor: Vec<FloorObject>,
    pub runes: Vec<ManaRune>,
    /// Turn on which the player arrived.
    pub entry_turn: u32,
    /// Whether the delayed level feeling has been revealed yet.
    pub feeling_revealed: bool,
    /// Danger rating computed at generation time (read-only here).
    pub danger_feeling: u8,
}

impl Level {
    /// A town level.
    pub fn town(entry_turn: u32) -> Self {
        Self {
            depth: 0,
            locale: Locale::Town,
            floor: Vec::new(),
            runes: Vec::new(),
            entry_turn,
            feeling_revealed: false,
            danger_feeling: 0,
        }
    }

    /// A cave level at the given depth.
    pub fn cave(depth: u32, entry_turn: u32, danger_feeling: u8) -> Self {
        Self {
            depth,
            locale: Locale::Cave,
            floor: Vec::new(),
            runes: Vec::new(),
            entry_turn,
            feeling_revealed: false,
            danger_feeling,
        }
    }

    /// Place an object on the floor near a position.
    ///
    /// The real pile-placement scatter is the dungeon model's concern; the
    /// core only needs "lands at or adjacent to `pos`".
    pub fn drop_near(&mut self, obj: Object, pos: Pos, rng: &mut GameRng) {
        let dx = rng.randint0(3) - 1;
        let dy = rng.randint0(3) - 1;
        self.floor.push(FloorObject {
            pos: Pos::new(pos.x + dx, pos.y + dy),
            obj,
        });
    }

    /// Mana rune at a position, if any.
    pub fn rune_at_mut(&mut self, pos: Pos) -> Option<&mut ManaRune> {
        self.runes.iter_mut().find(|r| r.pos == pos)
    }

    /// Carve a new mana rune at a position (replacing any existing one).
    pub fn set_rune(&mut self, pos: Pos, reserve: i32) {
        if let Some(rune) = self.runes.iter_mut().find(|r| r.pos == pos) {
            rune.reserve = reserve;
        } else {
            self.runes.push(ManaRune { pos, reserve });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Object, ObjectKind};

    #[test]
    fn drop_near_lands_adjacent() {
        let mut level = Level::cave(5, 0, 2);
        let mut rng = GameRng::new(7);
        let here = Pos::new(10, 10);
        for _ in 0..20 {
            level.drop_near(Object::new(ObjectKind::Torch), here, &mut rng);
        }
        assert!(level.floor.iter().all(|f| f.pos.distance(here) <= 1));
    }

    #[test]
    fn rune_replaces_in_place() {
        let mut level = Level::cave(5, 0, 2);
        let p = Pos::new(3, 3);
        level.set_rune(p, 40);
        level.set_rune(p, 15);
        assert_eq!(level.runes.len(), 1);
        assert_eq!(level.rune_at_mut(p).unwrap().reserve, 15);
    }

    #[test]
    fn locale_daylight() {
        assert!(Locale::Town.has_daylight());
        assert!(Locale::Valley.has_daylight());
        assert!(!Locale::Cave.has_daylight());
    }
}
