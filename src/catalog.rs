//! The ordered level catalog.
//!
//! The bundled table is embedded at compile time and parsed on first use.
//! Catalog order, not the level name, identifies a level.

use crate::error::{CatalogError, CatalogResult};
use crate::level::{LevelRecord, LevelWarning, check_duplicate_names, check_markers, parse_level};
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Level table shipped with the game.
const BUILTIN_LEVELS: &str = include_str!("../data/levels.json");

static BUILTIN: OnceLock<CatalogResult<Catalog>> = OnceLock::new();

/// Load and validate the bundled level table.
///
/// Every call parses the table afresh and returns an independent catalog.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedLevel`] for the first record that breaks
/// the data model.
pub fn load_catalog() -> CatalogResult<Catalog> {
    Catalog::from_json(BUILTIN_LEVELS)
}

/// An immutable, validated sequence of levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    levels: Vec<LevelRecord>,
    warnings: Vec<LevelWarning>,
}

impl Catalog {
    /// Parse and validate a level table.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the text is not a JSON array and
    /// [`CatalogError::MalformedLevel`] for the first invalid record.
    pub fn from_json(text: &str) -> CatalogResult<Self> {
        let records: Vec<Value> = serde_json::from_str(text)?;

        let levels = records
            .iter()
            .enumerate()
            .map(|(index, value)| parse_level(index, value))
            .collect::<CatalogResult<Vec<_>>>()?;

        let mut warnings: Vec<LevelWarning> = levels
            .iter()
            .enumerate()
            .flat_map(|(index, level)| check_markers(index, level))
            .collect();
        warnings.extend(check_duplicate_names(&levels));
        warnings.sort_by_key(LevelWarning::index);

        for warning in &warnings {
            warn!("{warning}");
        }
        debug!(
            "loaded {} levels with {} warnings",
            levels.len(),
            warnings.len()
        );

        Ok(Self { levels, warnings })
    }

    /// Read, parse and validate a level table file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, otherwise as
    /// [`Catalog::from_json`].
    pub fn from_path(path: &Path) -> CatalogResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// The bundled catalog, loaded once per process.
    ///
    /// # Errors
    ///
    /// Returns the load error if the bundled table is invalid.
    pub fn builtin() -> CatalogResult<&'static Catalog> {
        BUILTIN
            .get_or_init(load_catalog)
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True if the catalog has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LevelRecord> {
        self.levels.get(index)
    }

    /// Level at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IndexOutOfRange`] if `index >= len()`.
    pub fn get_level(&self, index: usize) -> CatalogResult<&LevelRecord> {
        self.levels.get(index).ok_or(CatalogError::IndexOutOfRange {
            index,
            len: self.levels.len(),
        })
    }

    /// Iterate over levels in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, LevelRecord> {
        self.levels.iter()
    }

    /// Every level carrying `name`, with its index.
    pub fn levels_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (usize, &'a LevelRecord)> + 'a {
        self.levels
            .iter()
            .enumerate()
            .filter(move |(_, level)| level.name() == name)
    }

    /// Non-fatal findings from loading, ordered by level index.
    #[must_use]
    pub fn warnings(&self) -> &[LevelWarning] {
        &self.warnings
    }

    /// Warnings about one level.
    pub fn warnings_for(&self, index: usize) -> impl Iterator<Item = &LevelWarning> + '_ {
        self.warnings.iter().filter(move |w| w.index() == index)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a LevelRecord;
    type IntoIter = std::slice::Iter<'a, LevelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}
