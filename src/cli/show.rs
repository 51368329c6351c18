//! Level detail command implementation.

use super::output::format_level;
use super::{CliError, open_catalog};
use std::path::PathBuf;

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or has no level at
/// `index`.
pub(crate) fn execute(index: usize, catalog: Option<PathBuf>) -> Result<(), CliError> {
    let catalog = open_catalog(catalog.as_deref())?;
    let level = catalog.get_level(index)?;

    print!("{}", format_level(index, level));

    let warnings: Vec<_> = catalog.warnings_for(index).collect();
    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in warnings {
            println!("  {warning}");
        }
    }

    Ok(())
}
