//! Non-fatal consistency checks on loaded levels.
//!
//! The level table is known to disagree with itself in places: the `E`/`X`
//! markers drawn into a map are not always where `entryPoint`/`exitPoint`
//! say, and names repeat across the catalog. Neither stops a level from
//! being played, so these checks report instead of failing.

use crate::level::{Coord, LevelRecord, Terrain};
use std::collections::HashMap;
use std::fmt;

/// A suspicious but playable property of a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelWarning {
    /// The drawn marker does not sit exactly on the explicit coordinate.
    MarkerMismatch {
        /// Level index.
        index: usize,
        /// `Terrain::Entry` or `Terrain::Exit`.
        marker: Terrain,
        /// The authoritative coordinate.
        expected: Coord,
        /// Every cell carrying the marker (may be empty).
        found: Vec<Coord>,
    },
    /// Another, earlier level has the same name.
    DuplicateName {
        /// Level index.
        index: usize,
        /// Index of the first level with this name.
        first_index: usize,
        /// The shared name.
        name: String,
    },
}

impl LevelWarning {
    /// Index of the level this warning is about.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            LevelWarning::MarkerMismatch { index, .. }
            | LevelWarning::DuplicateName { index, .. } => *index,
        }
    }
}

impl fmt::Display for LevelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelWarning::MarkerMismatch {
                index,
                marker,
                expected,
                found,
            } => {
                let label = if *marker == Terrain::Entry {
                    "entry"
                } else {
                    "exit"
                };
                if found.is_empty() {
                    write!(f, "level {index}: no {label} marker, point is {expected}")
                } else {
                    let found: Vec<String> = found.iter().map(ToString::to_string).collect();
                    write!(
                        f,
                        "level {index}: {label} marker at {} but point is {expected}",
                        found.join(", ")
                    )
                }
            }
            LevelWarning::DuplicateName {
                index,
                first_index,
                name,
            } => write!(f, "level {index}: name {name:?} already used by level {first_index}"),
        }
    }
}

/// Compare the drawn markers with the explicit entry and exit points.
#[must_use]
pub(crate) fn check_markers(index: usize, level: &LevelRecord) -> Vec<LevelWarning> {
    let mut warnings = Vec::new();

    for (marker, expected) in [
        (Terrain::Entry, level.entry_point()),
        (Terrain::Exit, level.exit_point()),
    ] {
        let found: Vec<Coord> = level.map().positions_of(marker).collect();
        if found != [expected] {
            warnings.push(LevelWarning::MarkerMismatch {
                index,
                marker,
                expected,
                found,
            });
        }
    }

    warnings
}

/// Report every level whose name was already used by an earlier level.
#[must_use]
pub(crate) fn check_duplicate_names(levels: &[LevelRecord]) -> Vec<LevelWarning> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut warnings = Vec::new();

    for (index, level) in levels.iter().enumerate() {
        match first_seen.get(level.name()) {
            Some(&first_index) => warnings.push(LevelWarning::DuplicateName {
                index,
                first_index,
                name: level.name().to_string(),
            }),
            None => {
                first_seen.insert(level.name(), index);
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::parse_level;
    use serde_json::json;

    fn level(name: &str, rows: &[&str], entry: (u16, u16), exit: (u16, u16)) -> LevelRecord {
        let value = json!({
            "name": name,
            "time": 60,
            "lemmingsToRelease": 5,
            "requiredToSave": 1,
            "releaseRate": 1000,
            "entryPoint": { "x": entry.0, "y": entry.1 },
            "exitPoint": { "x": exit.0, "y": exit.1 },
            "map": rows,
            "availableSkills": {}
        });
        parse_level(0, &value).unwrap()
    }

    #[test]
    fn test_markers_consistent() {
        let l = level("a", &["1111", "1E01", "1X01", "1111"], (1, 1), (1, 2));
        assert!(check_markers(0, &l).is_empty());
    }

    #[test]
    fn test_exit_marker_offset() {
        // Same shape as the "Float and Dig" level: marker drawn left of the point.
        let l = level("a", &["11111", "1E001", "1X001", "11111"], (1, 1), (3, 2));
        let warnings = check_markers(4, &l);
        assert_eq!(
            warnings,
            vec![LevelWarning::MarkerMismatch {
                index: 4,
                marker: Terrain::Exit,
                expected: Coord::new(3, 2),
                found: vec![Coord::new(1, 2)],
            }]
        );
        assert!(warnings[0].to_string().contains("exit marker at (1, 2)"));
    }

    #[test]
    fn test_missing_and_duplicated_markers() {
        let l = level("a", &["1111", "1001", "1XX1", "1111"], (1, 1), (1, 2));
        let warnings = check_markers(0, &l);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            &warnings[0],
            LevelWarning::MarkerMismatch { marker: Terrain::Entry, found, .. } if found.is_empty()
        ));
        assert!(matches!(
            &warnings[1],
            LevelWarning::MarkerMismatch { marker: Terrain::Exit, found, .. } if found.len() == 2
        ));
    }

    #[test]
    fn test_duplicate_names() {
        let rows = ["1111", "1E01", "1X01", "1111"];
        let levels = vec![
            level("Level 1", &rows, (1, 1), (1, 2)),
            level("Level 2", &rows, (1, 1), (1, 2)),
            level("Level 1", &rows, (1, 1), (1, 2)),
            level("Level 1", &rows, (1, 1), (1, 2)),
        ];
        let warnings = check_duplicate_names(&levels);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].index(), 2);
        assert_eq!(warnings[1].index(), 3);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, LevelWarning::DuplicateName { first_index: 0, .. })));
    }
}
