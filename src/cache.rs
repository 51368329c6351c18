//! Offline asset cache.
//!
//! A read-through cache that sits between the game page and the network:
//! - Install: pre-fetch a fixed allow-list into a cache named after the
//!   current generation. All or nothing.
//! - Activate: drop every cache belonging to another generation.
//! - Serve: answer GET requests from the cache, otherwise from the network,
//!   keeping a copy of successful same-origin responses.
//!
//! Cached entries never expire. Bumping the generation identifier in
//! [`ProxyConfig`] is the only way to invalidate them.

mod config;
mod http;
mod network;
mod proxy;
mod registration;
mod storage;

pub use config::ProxyConfig;
pub use http::{Method, Request, Response, ResponseKind, UnknownMethod};
pub use network::{DirectoryOrigin, FetchError, Network};
pub use proxy::{AssetCacheProxy, ProxyState, Served, ServedFrom};
pub use registration::Registration;
pub use storage::CacheStorage;

use std::fmt;
use std::path::PathBuf;

/// Errors raised by cache lifecycle and storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// An allow-listed asset could not be cached during install.
    InstallFailed {
        /// Generation being installed.
        generation: String,
        /// URL that failed.
        url: String,
        /// Why it failed.
        reason: String,
    },
    /// A lifecycle step was attempted from the wrong state.
    InvalidState {
        /// State the step requires.
        expected: ProxyState,
        /// State the proxy was in.
        actual: ProxyState,
    },
    /// Reading or writing persisted storage failed.
    Storage {
        /// File involved.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// The proxy configuration could not be loaded.
    Config {
        /// File involved.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstallFailed {
                generation,
                url,
                reason,
            } => write!(f, "install of {generation} failed on {url}: {reason}"),
            Self::InvalidState { expected, actual } => {
                write!(f, "proxy is {actual}, expected {expected}")
            }
            Self::Storage { path, message } => {
                write!(f, "cache storage {}: {message}", path.display())
            }
            Self::Config { path, message } => {
                write!(f, "proxy config {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for CacheError {}
