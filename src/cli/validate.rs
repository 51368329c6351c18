//! Level table validation command implementation.

use super::CliError;
use lemmings::{Catalog, CatalogError, LevelField};
use std::path::PathBuf;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the table cannot be read or any record is invalid.
pub(crate) fn execute(file: Option<PathBuf>) -> Result<(), CliError> {
    match &file {
        Some(path) => println!("Validating: {}", path.display()),
        None => println!("Validating: bundled level table"),
    }
    println!();

    let loaded = match &file {
        Some(path) => Catalog::from_path(path),
        None => lemmings::load_catalog(),
    };
    let catalog = match loaded {
        Ok(catalog) => catalog,
        Err(e) => {
            let check = match &e {
                CatalogError::MalformedLevel { index, field, .. } => {
                    format!("Level {index}: {} valid", field.key())
                }
                CatalogError::Parse { .. } => "JSON array of level records".to_string(),
                CatalogError::Io { .. } | CatalogError::IndexOutOfRange { .. } => {
                    "Level table readable".to_string()
                }
            };
            print_check(&check, false);
            return Err(e.into());
        }
    };

    print_check("JSON array of level records", true);
    for field in LevelField::ALL {
        print_check(&format!("{} present and valid", field.key()), true);
    }
    print_check("requiredToSave <= lemmingsToRelease", true);
    print_check("Uniform row width", true);
    print_check("Entry and exit inside the map", true);

    println!();
    println!("Summary:");
    println!("  Levels:       {}", catalog.len());
    println!("  Warnings:     {}", catalog.warnings().len());

    if !catalog.warnings().is_empty() {
        println!();
        println!("Warnings:");
        for warning in catalog.warnings() {
            println!("  ! {warning}");
        }
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
