//! Asset fetch command implementation.

use super::CliError;
use lemmings::cache::{
    CacheStorage, DirectoryOrigin, Method, ProxyConfig, Registration, Request, ServedFrom,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Execute the fetch command.
///
/// Serves each path through a freshly registered proxy backed by `root`.
/// When `store` is given, the cache is loaded from it first (if it exists)
/// and written back afterwards.
///
/// # Errors
///
/// Returns an error if the configuration or store cannot be read, install
/// fails, or any path could not be fetched.
pub(crate) fn execute(
    root: PathBuf,
    config: Option<PathBuf>,
    store: Option<PathBuf>,
    method: Method,
    paths: Vec<String>,
) -> Result<(), CliError> {
    let config = match config {
        Some(path) => ProxyConfig::from_path(&path)?,
        None => ProxyConfig::default(),
    };

    let storage = match &store {
        Some(path) if path.exists() => CacheStorage::load(path)?,
        _ => CacheStorage::new(),
    };

    let network = Arc::new(DirectoryOrigin::new(config.origin.clone(), root));
    let registration = Registration::new(network, Arc::new(storage));

    println!("Installing: {}", config.generation);
    let requests: Vec<Request> = paths
        .iter()
        .map(|path| Request::new(method, config.resolve(path)))
        .collect();
    let proxy = registration.register(config)?;
    println!(
        "  cached {} assets",
        registration.storage().entry_count(proxy.generation())
    );
    println!();

    let mut failures = 0usize;
    for request in &requests {
        match registration.handle(request) {
            Ok(served) => {
                let source = match served.from {
                    ServedFrom::Cache => "cache",
                    ServedFrom::Network if served.stored => "network, stored",
                    ServedFrom::Network => "network",
                };
                println!(
                    "  {} {request} ({source}, {} bytes)",
                    served.response.status,
                    served.response.body.len()
                );
            }
            Err(e) => {
                failures += 1;
                println!("  --- {request} ({e})");
            }
        }
    }

    let cached = registration.storage().requests(proxy.generation());
    println!();
    println!("Cache {} holds {} entries:", proxy.generation(), cached.len());
    for request in &cached {
        println!("  {request}");
    }

    if let Some(path) = &store {
        registration.storage().save(path)?;
        println!();
        println!("Saved cache to {}", path.display());
    }

    if failures > 0 {
        return Err(CliError::new(format!("{failures} requests failed")));
    }
    Ok(())
}
