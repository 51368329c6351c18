//! Catalog listing command implementation.

use super::output::{JsonLevelSummary, format_summary};
use super::{CliError, OutputFormat, open_catalog};
use std::path::PathBuf;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) fn execute(catalog: Option<PathBuf>, format: OutputFormat) -> Result<(), CliError> {
    let catalog = open_catalog(catalog.as_deref())?;

    match format {
        OutputFormat::Text => {
            for (index, level) in catalog.iter().enumerate() {
                println!("{}", format_summary(index, level));
            }
            println!();
            println!(
                "{} levels, {} warnings",
                catalog.len(),
                catalog.warnings().len()
            );
        }
        OutputFormat::Json => {
            let summaries: Vec<JsonLevelSummary<'_>> = catalog
                .iter()
                .enumerate()
                .map(|(index, level)| JsonLevelSummary::from_level(index, level))
                .collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }

    Ok(())
}
