//! Monsters and the live-monster arena.
//!
//! Monsters are stored in an arena of `Option` slots addressed by integer
//! handles, mirroring index-based monster arrays: handles stay stable for
//! a monster's whole life, lookups are O(1), and cross-references are plain
//! handles rather than owning pointers.

use serde::{Deserialize, Serialize};

use crate::consts::{extract_energy, MAX_MONSTERS, NORMAL_SPEED};
use crate::world::level::Pos;

/// Stable handle into the monster arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonsterId(pub u16);

/// One live monster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub pos: Pos,
    pub hp: i32,
    pub maxhp: i32,
    pub speed: u8,
    /// Banked action energy.
    pub energy: i32,

    // Timed counters, decremented in the per-tick monster sweep.
    pub sleep: i32,
    pub stunned: i32,
    pub confused: i32,
    pub afraid: i32,

    /// Sunlight at dawn banishes this monster from the surface.
    pub hurt_by_light: bool,
    /// Melee damage dice (sides; one die per attack).
    pub damage_sides: i32,
}

impl Monster {
    pub fn new(name: impl Into<String>, pos: Pos) -> Self {
        Self {
            name: name.into(),
            pos,
            hp: 10,
            maxhp: 10,
            speed: NORMAL_SPEED,
            energy: 0,
            sleep: 0,
            stunned: 0,
            confused: 0,
            afraid: 0,
            hurt_by_light: false,
            damage_sides: 4,
        }
    }

    /// Energy gained per scheduler tick.
    pub fn energy_gain(&self) -> i32 {
        extract_energy(self.speed)
    }

    /// Whether the monster can take an action right now.
    pub fn can_act(&self) -> bool {
        self.sleep == 0
    }
}

/// Arena of live monsters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonsterArena {
    slots: Vec<Option<Monster>>,
}

impl MonsterArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live monsters.
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Insert a monster, compacting proactively when near capacity.
    ///
    /// Returns None when no slot can be freed; the spawn request simply
    /// fails rather than erroring.
    pub fn insert(&mut self, monster: Monster) -> Option<MonsterId> {
        if self.slots.len() >= MAX_MONSTERS * 9 / 10 {
            self.compact();
        }
        if let Some(idx) = self.slots.iter().position(|s| s.is_none()) {
            self.slots[idx] = Some(monster);
            return Some(MonsterId(idx as u16));
        }
        if self.slots.len() < MAX_MONSTERS {
            self.slots.push(Some(monster));
            return Some(MonsterId((self.slots.len() - 1) as u16));
        }
        None
    }

    /// Remove a monster, leaving its slot free for reuse.
    pub fn remove(&mut self, id: MonsterId) -> Option<Monster> {
        self.slots.get_mut(id.0 as usize)?.take()
    }

    pub fn get(&self, id: MonsterId) -> Option<&Monster> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Live monsters in index order.
    pub fn iter(&self) -> impl Iterator<Item = (MonsterId, &Monster)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|m| (MonsterId(i as u16), m)))
    }

    /// Live monster ids in index order.
    pub fn ids(&self) -> Vec<MonsterId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Drop trailing dead slots so the arena can grow again.
    ///
    /// Only trailing slots can be reclaimed without invalidating handles;
    /// interior holes are reused by `insert`.
    pub fn compact(&mut self) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
    }

    /// Remove every monster satisfying the predicate, returning the names
    /// of those removed.
    pub fn banish_where(&mut self, mut pred: impl FnMut(&Monster) -> bool) -> Vec<String> {
        let mut banished = Vec::new();
        for slot in &mut self.slots {
            if let Some(m) = slot {
                if pred(m) {
                    banished.push(m.name.clone());
                    *slot = None;
                }
            }
        }
        banished
    }

    /// Ids of monsters with strictly more banked energy than `threshold`,
    /// ordered by descending energy with arena-index order breaking ties.
    ///
    /// Index-order tie-breaking is arbitrary but deterministic; it is kept
    /// for parity with the index-based originals.
    pub fn ids_above_energy(&self, threshold: i32) -> Vec<MonsterId> {
        let mut ids: Vec<(MonsterId, i32)> = self
            .iter()
            .filter(|(_, m)| m.energy > threshold)
            .map(|(id, m)| (id, m.energy))
            .collect();
        ids.sort_by(|a, b| b.1.cmp(&a.1).then(a.0 .0.cmp(&b.0 .0)));
        ids.into_iter().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mon(energy: i32) -> Monster {
        let mut m = Monster::new("orc", Pos::new(0, 0));
        m.energy = energy;
        m
    }

    #[test]
    fn handles_stay_stable_across_removal() {
        let mut arena = MonsterArena::new();
        let a = arena.insert(mon(0)).unwrap();
        let b = arena.insert(mon(0)).unwrap();
        let c = arena.insert(mon(0)).unwrap();
        arena.remove(b);
        assert!(arena.get(a).is_some());
        assert!(arena.get(b).is_none());
        assert!(arena.get(c).is_some());

        // Freed interior slot is reused
        let d = arena.insert(mon(0)).unwrap();
        assert_eq!(d, b);
    }

    #[test]
    fn energy_ordering_with_index_tiebreak() {
        let mut arena = MonsterArena::new();
        let a = arena.insert(mon(150)).unwrap();
        let b = arena.insert(mon(200)).unwrap();
        let c = arena.insert(mon(150)).unwrap();
        let _slow = arena.insert(mon(90)).unwrap();

        let order = arena.ids_above_energy(100);
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn banish_removes_matching() {
        let mut arena = MonsterArena::new();
        let mut ghoul = mon(0);
        ghoul.hurt_by_light = true;
        arena.insert(ghoul);
        arena.insert(mon(0));

        let gone = arena.banish_where(|m| m.hurt_by_light);
        assert_eq!(gone.len(), 1);
        assert_eq!(arena.count(), 1);
    }

    #[test]
    fn compact_reclaims_trailing_slots() {
        let mut arena = MonsterArena::new();
        let a = arena.insert(mon(0)).unwrap();
        let b = arena.insert(mon(0)).unwrap();
        arena.remove(b);
        arena.compact();
        assert!(arena.get(a).is_some());
        assert_eq!(arena.count(), 1);
    }
}
