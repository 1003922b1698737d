//! Spell data and cast resolution.

pub mod cast;
pub mod spell;

pub use cast::{cast_energy, cast_spell, spell_chance};
pub use spell::{Effect, Element, Spell, RUNE_SPELL, SPELLS};
