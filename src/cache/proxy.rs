//! The per-generation cache proxy and its lifecycle.

use super::config::ProxyConfig;
use super::http::{Method, Request, Response};
use super::network::{FetchError, Network};
use super::storage::CacheStorage;
use super::CacheError;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Lifecycle state of one proxy generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyState {
    /// Created, nothing fetched yet.
    Parsed,
    /// Fetching the allow-list.
    Installing,
    /// Allow-list cached, waiting to activate.
    Installed,
    /// Removing other generations.
    Activating,
    /// Intercepting requests.
    Active,
    /// Install failed, or a newer generation took over. Never serves from
    /// the cache.
    Redundant,
}

impl fmt::Display for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProxyState::Parsed => "parsed",
            ProxyState::Installing => "installing",
            ProxyState::Installed => "installed",
            ProxyState::Activating => "activating",
            ProxyState::Active => "active",
            ProxyState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServedFrom {
    /// Found in the cache; the network was not contacted.
    Cache,
    /// Fetched from the network.
    Network,
}

/// A response together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    /// The response handed back to the caller.
    pub response: Response,
    /// Where it came from.
    pub from: ServedFrom,
    /// Whether a copy was written to the cache.
    pub stored: bool,
}

/// Cache proxy for one generation.
pub struct AssetCacheProxy {
    config: ProxyConfig,
    network: Arc<dyn Network>,
    storage: Arc<CacheStorage>,
    state: RwLock<ProxyState>,
}

impl fmt::Debug for AssetCacheProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCacheProxy")
            .field("generation", &self.config.generation)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AssetCacheProxy {
    /// Create a proxy in the [`ProxyState::Parsed`] state.
    #[must_use]
    pub fn new(config: ProxyConfig, network: Arc<dyn Network>, storage: Arc<CacheStorage>) -> Self {
        Self {
            config,
            network,
            storage,
            state: RwLock::new(ProxyState::Parsed),
        }
    }

    /// The configuration this proxy was built with.
    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Generation identifier, also the name of this proxy's cache.
    #[must_use]
    pub fn generation(&self) -> &str {
        &self.config.generation
    }

    /// Storage shared with other generations.
    #[must_use]
    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProxyState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, to: ProxyState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = to;
    }

    fn transition(&self, from: ProxyState, to: ProxyState) -> Result<(), CacheError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return Err(CacheError::InvalidState {
                expected: from,
                actual: *state,
            });
        }
        *state = to;
        Ok(())
    }

    /// Take this generation out of service. It answers every later request
    /// from the network and never writes to storage again.
    pub(crate) fn retire(&self) {
        let previous = std::mem::replace(
            &mut *self.state.write().unwrap_or_else(PoisonError::into_inner),
            ProxyState::Redundant,
        );
        if previous != ProxyState::Redundant {
            info!("cache generation {} retired", self.generation());
        }
    }

    /// Fetch and cache every allow-listed asset.
    ///
    /// Assets are fetched in parallel. Every fetch must produce a `2xx`
    /// response; otherwise nothing is stored and the proxy becomes
    /// [`ProxyState::Redundant`].
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidState`] unless the proxy is
    /// [`ProxyState::Parsed`], and [`CacheError::InstallFailed`] for the first
    /// asset that could not be cached.
    pub fn install(&self) -> Result<(), CacheError> {
        self.transition(ProxyState::Parsed, ProxyState::Installing)?;
        info!("installing cache generation {}", self.generation());

        let fetched: Result<Vec<(Request, Response)>, CacheError> = self
            .config
            .allow_list_urls()
            .into_par_iter()
            .map(|url| self.fetch_for_install(Request::get(url)))
            .collect();

        match fetched {
            Ok(entries) => {
                let count = entries.len();
                self.storage.put_all(self.generation(), entries);
                self.set_state(ProxyState::Installed);
                info!(
                    "cache generation {} installed with {count} assets",
                    self.generation()
                );
                Ok(())
            }
            Err(e) => {
                self.set_state(ProxyState::Redundant);
                warn!("{e}");
                Err(e)
            }
        }
    }

    fn fetch_for_install(&self, request: Request) -> Result<(Request, Response), CacheError> {
        let failed = |reason: String| CacheError::InstallFailed {
            generation: self.config.generation.clone(),
            url: request.url.clone(),
            reason,
        };
        let response = self
            .network
            .fetch(&request)
            .map_err(|e| failed(e.reason))?;
        if !response.is_success() {
            return Err(failed(format!("status {}", response.status)));
        }
        Ok((request, response))
    }

    /// Delete every cache that belongs to another generation and start
    /// serving.
    ///
    /// Returns the names of the deleted caches.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidState`] unless the proxy is
    /// [`ProxyState::Installed`].
    pub fn activate(&self) -> Result<Vec<String>, CacheError> {
        self.transition(ProxyState::Installed, ProxyState::Activating)?;
        info!("activating cache generation {}", self.generation());

        let stale: Vec<String> = self
            .storage
            .keys()
            .into_iter()
            .filter(|name| name != self.generation())
            .collect();
        for name in &stale {
            info!("deleting old cache {name}");
            self.storage.delete(name);
        }

        self.set_state(ProxyState::Active);
        info!(
            "cache generation {} active, {} old caches removed",
            self.generation(),
            stale.len()
        );
        Ok(stale)
    }

    /// Answer a request.
    ///
    /// Only an [`ProxyState::Active`] proxy intercepts; in any other state
    /// and for every non-GET request the network is used directly, without
    /// touching the cache.
    ///
    /// # Errors
    ///
    /// A [`FetchError`] from the network is returned unchanged.
    pub fn handle(&self, request: &Request) -> Result<Served, FetchError> {
        if request.method != Method::Get || self.state() != ProxyState::Active {
            let response = self.network.fetch(request)?;
            return Ok(Served {
                response,
                from: ServedFrom::Network,
                stored: false,
            });
        }

        if let Some(response) = self.storage.match_request(self.generation(), request) {
            debug!("cache hit: {request}");
            return Ok(Served {
                response,
                from: ServedFrom::Cache,
                stored: false,
            });
        }

        debug!("cache miss: {request}");
        let response = self.network.fetch(request).inspect_err(|e| {
            warn!("{e}");
        })?;

        // Only into a cache that still exists: activation of a newer
        // generation may have deleted this one since the lookup.
        let stored = response.is_cacheable()
            && self.config.is_same_origin(&request.url)
            && self
                .storage
                .put_existing(self.generation(), request.clone(), response.clone());
        if stored {
            debug!("cached {request}");
        }

        Ok(Served {
            response,
            from: ServedFrom::Network,
            stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseKind;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory network that counts calls.
    #[derive(Debug, Default)]
    struct FakeNetwork {
        routes: HashMap<String, Response>,
        calls: AtomicUsize,
    }

    impl FakeNetwork {
        fn with(mut self, url: &str, response: Response) -> Self {
            self.routes.insert(url.to_string(), response);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Network for FakeNetwork {
        fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.routes
                .get(&request.url)
                .cloned()
                .ok_or_else(|| FetchError::new(&request.url, "connection refused"))
        }
    }

    fn shell_network() -> FakeNetwork {
        FakeNetwork::default()
            .with("http://localhost/index.html", Response::ok("<html>"))
            .with("http://localhost/levels.js", Response::ok("const gameLevels"))
    }

    fn proxy(network: &Arc<FakeNetwork>) -> AssetCacheProxy {
        AssetCacheProxy::new(
            ProxyConfig::default(),
            Arc::clone(network) as Arc<dyn Network>,
            Arc::new(CacheStorage::new()),
        )
    }

    #[test]
    fn test_lifecycle() {
        let network = Arc::new(shell_network());
        let proxy = proxy(&network);
        assert_eq!(proxy.state(), ProxyState::Parsed);
        proxy.install().unwrap();
        assert_eq!(proxy.state(), ProxyState::Installed);
        assert_eq!(proxy.storage().entry_count("lemmings-game-cache-v1"), 2);
        proxy.activate().unwrap();
        assert_eq!(proxy.state(), ProxyState::Active);
    }

    #[test]
    fn test_out_of_order_steps() {
        let network = Arc::new(shell_network());
        let proxy = proxy(&network);
        assert_eq!(
            proxy.activate(),
            Err(CacheError::InvalidState {
                expected: ProxyState::Installed,
                actual: ProxyState::Parsed
            })
        );
        proxy.install().unwrap();
        assert!(matches!(
            proxy.install(),
            Err(CacheError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_install_all_or_nothing() {
        let network = Arc::new(
            FakeNetwork::default().with("http://localhost/index.html", Response::ok("<html>")),
        );
        let proxy = proxy(&network);
        let err = proxy.install().unwrap_err();
        assert!(matches!(
            err,
            CacheError::InstallFailed { ref url, .. } if url == "http://localhost/levels.js"
        ));
        assert_eq!(proxy.state(), ProxyState::Redundant);
        assert_eq!(proxy.storage().entry_count("lemmings-game-cache-v1"), 0);
    }

    #[test]
    fn test_install_rejects_error_status() {
        let network = Arc::new(
            shell_network().with("http://localhost/levels.js", Response::new(500, "")),
        );
        let proxy = proxy(&network);
        assert!(matches!(
            proxy.install(),
            Err(CacheError::InstallFailed { ref reason, .. }) if reason == "status 500"
        ));
    }

    #[test]
    fn test_inactive_proxy_passes_through() {
        let network = Arc::new(shell_network());
        let proxy = proxy(&network);
        let served = proxy
            .handle(&Request::get("http://localhost/index.html"))
            .unwrap();
        assert_eq!(served.from, ServedFrom::Network);
        assert!(!served.stored);
        assert!(proxy.storage().keys().is_empty());
    }

    #[test]
    fn test_hit_skips_network() {
        let network = Arc::new(shell_network());
        let proxy = proxy(&network);
        proxy.install().unwrap();
        proxy.activate().unwrap();
        let before = network.calls();

        let served = proxy
            .handle(&Request::get("http://localhost/levels.js"))
            .unwrap();
        assert_eq!(served.from, ServedFrom::Cache);
        assert_eq!(served.response.body, b"const gameLevels");
        assert_eq!(network.calls(), before);
    }

    #[test]
    fn test_cross_origin_not_stored() {
        let network = Arc::new(shell_network().with(
            "https://cdn.example/font.woff",
            Response::ok("font").with_kind(ResponseKind::Cors),
        ));
        let proxy = proxy(&network);
        proxy.install().unwrap();
        proxy.activate().unwrap();

        let served = proxy
            .handle(&Request::get("https://cdn.example/font.woff"))
            .unwrap();
        assert_eq!(served.response.body, b"font");
        assert!(!served.stored);
        assert_eq!(proxy.storage().entry_count(proxy.generation()), 2);
    }

    #[test]
    fn test_install_accepts_any_success_status() {
        let network = Arc::new(
            shell_network().with("http://localhost/levels.js", Response::new(203, "const gameLevels")),
        );
        let proxy = proxy(&network);
        proxy.install().unwrap();
        assert_eq!(proxy.state(), ProxyState::Installed);
        assert_eq!(proxy.storage().entry_count(proxy.generation()), 2);
    }

    #[test]
    fn test_runtime_caching_needs_exactly_200() {
        let network = Arc::new(
            shell_network().with("http://localhost/partial.bin", Response::new(203, "x")),
        );
        let proxy = proxy(&network);
        proxy.install().unwrap();
        proxy.activate().unwrap();
        let served = proxy
            .handle(&Request::get("http://localhost/partial.bin"))
            .unwrap();
        assert!(!served.stored);
    }

    #[test]
    fn test_foreign_url_not_stored_even_if_basic() {
        let network = Arc::new(
            shell_network().with("https://cdn.example/lib.js", Response::ok("lib")),
        );
        let proxy = proxy(&network);
        proxy.install().unwrap();
        proxy.activate().unwrap();
        let served = proxy
            .handle(&Request::get("https://cdn.example/lib.js"))
            .unwrap();
        assert_eq!(served.response.kind, ResponseKind::Basic);
        assert!(!served.stored);
        assert_eq!(proxy.storage().entry_count(proxy.generation()), 2);
    }

    #[test]
    fn test_retired_proxy_passes_through() {
        let network = Arc::new(shell_network());
        let proxy = proxy(&network);
        proxy.install().unwrap();
        proxy.activate().unwrap();
        proxy.retire();
        assert_eq!(proxy.state(), ProxyState::Redundant);

        let before = network.calls();
        let served = proxy
            .handle(&Request::get("http://localhost/levels.js"))
            .unwrap();
        assert_eq!(served.from, ServedFrom::Network);
        assert_eq!(network.calls(), before + 1);
    }

    #[test]
    fn test_miss_does_not_recreate_deleted_cache() {
        let network = Arc::new(
            shell_network().with("http://localhost/late.png", Response::ok("png")),
        );
        let proxy = proxy(&network);
        proxy.install().unwrap();
        proxy.activate().unwrap();
        proxy.storage().delete(proxy.generation());

        let served = proxy
            .handle(&Request::get("http://localhost/late.png"))
            .unwrap();
        assert!(!served.stored);
        assert!(proxy.storage().keys().is_empty());
    }

    #[test]
    fn test_fetch_error_propagates() {
        let network = Arc::new(shell_network());
        let proxy = proxy(&network);
        proxy.install().unwrap();
        proxy.activate().unwrap();

        let err = proxy
            .handle(&Request::get("http://localhost/offline.html"))
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::new("http://localhost/offline.html", "connection refused")
        );
    }
}
