// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Lemmings: level catalog and offline asset cache for a browser puzzle game.
//!
//! This crate provides the two non-UI pieces of the game:
//! - A validated, ordered catalog of level definitions
//! - A generation-keyed read-through cache for the game's static assets
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────────────┐
//! │ Catalog          │     │ Registration                 │
//! │  └─ LevelRecord  │     │  └─ AssetCacheProxy (active) │
//! │      ├─ Terrain  │     │      ├─ CacheStorage         │
//! │      └─ Skills   │     │      └─ Network              │
//! └──────────────────┘     └──────────────────────────────┘
//! ```
//!
//! The two halves are independent: the catalog never touches the network,
//! and the cache treats the level table as an opaque asset.

pub mod cache;
pub mod catalog;
pub mod error;
pub mod level;

pub use catalog::{Catalog, load_catalog};
pub use error::{CatalogError, CatalogResult, LevelField};

// Re-export key level types at crate root for convenience
pub use level::{Coord, LevelRecord, LevelWarning, Skill, SkillBudget, SkillSet, Terrain, TerrainMap};
