//! Proxy configuration.

use super::CacheError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    /// Generation identifier. Changing it invalidates every cached entry on
    /// the next activation.
    pub generation: String,
    /// Scheme and host the game is served from, without a trailing slash.
    pub origin: String,
    /// Asset paths, relative to `origin`, cached at install time.
    pub allow_list: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            generation: "lemmings-game-cache-v1".to_string(),
            origin: "http://localhost".to_string(),
            allow_list: vec!["index.html".to_string(), "levels.js".to_string()],
        }
    }
}

impl ProxyConfig {
    /// Default configuration with another generation identifier.
    #[must_use]
    pub fn with_generation(generation: impl Into<String>) -> Self {
        Self {
            generation: generation.into(),
            ..Self::default()
        }
    }

    /// Load a configuration file. Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CacheError> {
        let config_error = |message: String| CacheError::Config {
            path: path.to_path_buf(),
            message,
        };
        let text = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| config_error(e.to_string()))
    }

    /// Absolute URL for a path. Absolute URLs are returned unchanged.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        if has_scheme(path) {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.origin.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Absolute URLs of the allow-list.
    #[must_use]
    pub fn allow_list_urls(&self) -> Vec<String> {
        self.allow_list.iter().map(|p| self.resolve(p)).collect()
    }

    /// Whether `url` belongs to the configured origin.
    #[must_use]
    pub fn is_same_origin(&self, url: &str) -> bool {
        let origin = self.origin.trim_end_matches('/');
        url.strip_prefix(origin)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Whether `url` starts with `scheme://`, the scheme being a letter followed
/// by letters, digits, `+`, `-` or `.`.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
