//! CLI command implementations for Lemmings.

pub(crate) mod fetch;
pub(crate) mod list;
pub(crate) mod show;
pub(crate) mod validate;

mod output;

use clap::ValueEnum;
use lemmings::cache::{CacheError, FetchError};
use lemmings::{Catalog, CatalogError};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        Self::new(e.to_string())
    }
}

/// Load the catalog from `path`, or the bundled one.
fn open_catalog(path: Option<&Path>) -> Result<Catalog, CliError> {
    let catalog = match path {
        Some(path) => Catalog::from_path(path)?,
        None => lemmings::load_catalog()?,
    };
    Ok(catalog)
}
