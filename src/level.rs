//! Level data layer.
//!
//! Describes one puzzle definition as consumed by the game engine:
//! - Terrain grid (`map`) addressed `[row][col]`, rows growing downward
//! - Entry and exit coordinates (authoritative over the `E`/`X` markers)
//! - Timer, spawn count, success threshold and release rate
//! - Per-skill usage budgets

mod map;
mod record;
mod skills;
mod validate;

pub use map::{Coord, MapError, Terrain, TerrainMap};
pub use record::LevelRecord;
pub use skills::{Skill, SkillBudget, SkillSet, UnknownSkill};
pub use validate::LevelWarning;

pub(crate) use record::parse_level;
pub(crate) use validate::{check_duplicate_names, check_markers};
