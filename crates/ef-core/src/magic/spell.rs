//! The spell table.
//!
//! Each spell row carries its casting parameters and a small effect
//! descriptor; one generic interpreter in `cast.rs` applies descriptors,
//! so adding a spell means adding data, not another dispatch arm.

use crate::player::status::StatusKind;

/// Damage elements the effect interpreter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Magic,
    Fire,
    Frost,
    Elec,
    Acid,
    Poison,
}

impl Element {
    pub const fn name(&self) -> &'static str {
        match self {
            Element::Magic => "magic",
            Element::Fire => "fire",
            Element::Frost => "frost",
            Element::Elec => "lightning",
            Element::Acid => "acid",
            Element::Poison => "poison",
        }
    }
}

/// What a spell does, as data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Damage one target: `dice`d`sides` of `element`.
    Bolt {
        dice: i32,
        sides: i32,
        element: Element,
    },
    /// Damage the target and everything within `radius` of it.
    Ball {
        dam: i32,
        radius: i32,
        element: Element,
    },
    /// Restore `dice`d`sides` hit points.
    Heal { dice: i32, sides: i32 },
    /// Grant a timed status for `base` + 1d`dice` turns.
    Status {
        kind: StatusKind,
        base: i32,
        dice: i32,
    },
    /// Grant all five elemental opposition timers.
    Resistance { base: i32, dice: i32 },
    /// Relocate the caster up to `range` squares.
    Teleport { range: i32 },
    /// Toggle the word-of-recall countdown.
    Recall,
    /// Carve a mana rune under the caster.
    CreateManaRune,
    /// Reveal the monsters on the level.
    DetectMonsters,
}

/// One spell's static parameters.
#[derive(Debug, Clone, Copy)]
pub struct Spell {
    pub name: &'static str,
    /// Minimum caster level.
    pub slevel: i32,
    /// Mana cost.
    pub smana: i32,
    /// Base failure percentage.
    pub sfail: i32,
    /// Experience multiplier granted on the first successful cast.
    pub sexp: i32,
    pub effect: Effect,
}

/// Index of the rune-creation spell; it may not draw on a rune's reserve.
pub const RUNE_SPELL: usize = 11;

/// The spell book.
pub const SPELLS: &[Spell] = &[
    Spell {
        name: "Magic Missile",
        slevel: 1,
        smana: 1,
        sfail: 22,
        sexp: 1,
        effect: Effect::Bolt {
            dice: 3,
            sides: 4,
            element: Element::Magic,
        },
    },
    Spell {
        name: "Phase Door",
        slevel: 1,
        smana: 1,
        sfail: 23,
        sexp: 1,
        effect: Effect::Teleport { range: 10 },
    },
    Spell {
        name: "Cure Light Wounds",
        slevel: 2,
        smana: 2,
        sfail: 25,
        sexp: 2,
        effect: Effect::Heal { dice: 2, sides: 8 },
    },
    Spell {
        name: "Detect Monsters",
        slevel: 2,
        smana: 1,
        sfail: 23,
        sexp: 1,
        effect: Effect::DetectMonsters,
    },
    Spell {
        name: "Lightning Bolt",
        slevel: 5,
        smana: 4,
        sfail: 30,
        sexp: 5,
        effect: Effect::Bolt {
            dice: 4,
            sides: 6,
            element: Element::Elec,
        },
    },
    Spell {
        name: "Frost Bolt",
        slevel: 8,
        smana: 5,
        sfail: 35,
        sexp: 8,
        effect: Effect::Bolt {
            dice: 6,
            sides: 6,
            element: Element::Frost,
        },
    },
    Spell {
        name: "Haste Self",
        slevel: 10,
        smana: 8,
        sfail: 45,
        sexp: 10,
        effect: Effect::Status {
            kind: StatusKind::Fast,
            base: 20,
            dice: 20,
        },
    },
    Spell {
        name: "Teleport Self",
        slevel: 12,
        smana: 8,
        sfail: 40,
        sexp: 12,
        effect: Effect::Teleport { range: 100 },
    },
    Spell {
        name: "Resistance",
        slevel: 15,
        smana: 10,
        sfail: 50,
        sexp: 20,
        effect: Effect::Resistance { base: 20, dice: 20 },
    },
    Spell {
        name: "Fire Ball",
        slevel: 18,
        smana: 12,
        sfail: 55,
        sexp: 25,
        effect: Effect::Ball {
            dam: 55,
            radius: 2,
            element: Element::Fire,
        },
    },
    Spell {
        name: "Word of Recall",
        slevel: 20,
        smana: 15,
        sfail: 60,
        sexp: 40,
        effect: Effect::Recall,
    },
    Spell {
        name: "Rune of Mana",
        slevel: 25,
        smana: 20,
        sfail: 70,
        sexp: 60,
        effect: Effect::CreateManaRune,
    },
    Spell {
        name: "Heal",
        slevel: 28,
        smana: 25,
        sfail: 70,
        sexp: 80,
        effect: Effect::Heal {
            dice: 8,
            sides: 10,
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rune_spell_index_matches_table() {
        assert_eq!(SPELLS[RUNE_SPELL].effect, Effect::CreateManaRune);
    }

    #[test]
    fn spell_levels_are_nondecreasing() {
        for pair in SPELLS.windows(2) {
            assert!(pair[0].slevel <= pair[1].slevel);
        }
    }
}
