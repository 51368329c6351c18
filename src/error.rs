//! Error types for loading the level catalog.

use std::fmt;
use std::path::PathBuf;

/// A field of a level record, named as it appears in the level table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelField {
    /// The record as a whole (wrong shape, unknown keys).
    Record,
    /// `name`
    Name,
    /// `time`
    Time,
    /// `lemmingsToRelease`
    LemmingsToRelease,
    /// `requiredToSave`
    RequiredToSave,
    /// `releaseRate`
    ReleaseRate,
    /// `entryPoint`
    EntryPoint,
    /// `exitPoint`
    ExitPoint,
    /// `map`
    Map,
    /// `availableSkills`
    AvailableSkills,
}

impl LevelField {
    /// Every named field, in table order.
    pub const ALL: [LevelField; 9] = [
        LevelField::Name,
        LevelField::Time,
        LevelField::LemmingsToRelease,
        LevelField::RequiredToSave,
        LevelField::ReleaseRate,
        LevelField::EntryPoint,
        LevelField::ExitPoint,
        LevelField::Map,
        LevelField::AvailableSkills,
    ];

    /// Key of this field in the level table.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            LevelField::Record => "<record>",
            LevelField::Name => "name",
            LevelField::Time => "time",
            LevelField::LemmingsToRelease => "lemmingsToRelease",
            LevelField::RequiredToSave => "requiredToSave",
            LevelField::ReleaseRate => "releaseRate",
            LevelField::EntryPoint => "entryPoint",
            LevelField::ExitPoint => "exitPoint",
            LevelField::Map => "map",
            LevelField::AvailableSkills => "availableSkills",
        }
    }
}

impl fmt::Display for LevelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors raised while loading or querying the level catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The level table is not syntactically valid, or is not an array.
    Parse {
        /// Line of the offending token (1-based, 0 if unknown).
        line: usize,
        /// Column of the offending token (1-based, 0 if unknown).
        column: usize,
        /// Parser message.
        message: String,
    },
    /// The level table could not be read.
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error message.
        message: String,
    },
    /// A level record violates the data model.
    MalformedLevel {
        /// Index of the offending record in catalog order.
        index: usize,
        /// Field that failed validation.
        field: LevelField,
        /// What is wrong with it.
        reason: String,
    },
    /// A level index outside `[0, len)` was requested.
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of levels in the catalog.
        len: usize,
    },
}

impl CatalogError {
    /// Shorthand for a [`CatalogError::MalformedLevel`].
    pub(crate) fn malformed(index: usize, field: LevelField, reason: impl Into<String>) -> Self {
        Self::MalformedLevel {
            index,
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse {
                line,
                column,
                message,
            } => write!(f, "level table is not valid JSON (line {line}, column {column}): {message}"),
            Self::Io { path, message } => {
                write!(f, "failed to read level table {}: {message}", path.display())
            }
            Self::MalformedLevel {
                index,
                field,
                reason,
            } => write!(f, "level {index}: malformed `{field}`: {reason}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "level index {index} out of range (catalog has {len} levels)")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_names_index_and_field() {
        let err = CatalogError::malformed(7, LevelField::RequiredToSave, "12 exceeds 10");
        let msg = err.to_string();
        assert!(msg.contains("level 7"));
        assert!(msg.contains("requiredToSave"));
        assert!(msg.contains("12 exceeds 10"));
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = CatalogError::IndexOutOfRange { index: 30, len: 25 };
        assert_eq!(
            err.to_string(),
            "level index 30 out of range (catalog has 25 levels)"
        );
    }

    #[test]
    fn test_parse_error_from_serde() {
        let e = serde_json::from_str::<Vec<u8>>("[1, 2").unwrap_err();
        let err = CatalogError::from(e);
        assert!(matches!(err, CatalogError::Parse { line: 1, .. }));
    }
}
