//! Swapping proxy generations.

use super::config::ProxyConfig;
use super::http::Request;
use super::network::{FetchError, Network};
use super::proxy::{AssetCacheProxy, Served, ServedFrom};
use super::storage::CacheStorage;
use super::CacheError;
use log::{info, warn};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Owns the active proxy and replaces it when a new generation is
/// registered.
///
/// A generation only takes over once it has installed. If installing fails
/// the previously active generation keeps serving. Registrations run one at
/// a time; a replaced generation is retired.
pub struct Registration {
    network: Arc<dyn Network>,
    storage: Arc<CacheStorage>,
    active: RwLock<Option<Arc<AssetCacheProxy>>>,
    // Held from install through the swap.
    lifecycle: Mutex<()>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.active_generation())
            .finish_non_exhaustive()
    }
}

impl Registration {
    /// Registration with nothing active.
    #[must_use]
    pub fn new(network: Arc<dyn Network>, storage: Arc<CacheStorage>) -> Self {
        Self {
            network,
            storage,
            active: RwLock::new(None),
            lifecycle: Mutex::new(()),
        }
    }

    /// Install and activate a generation, then route requests through it.
    ///
    /// Returns the new proxy.
    ///
    /// # Errors
    ///
    /// Returns the install or activation error. The previously active
    /// generation, if any, stays in place.
    pub fn register(&self, config: ProxyConfig) -> Result<Arc<AssetCacheProxy>, CacheError> {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = config.generation.clone();
        let proxy = Arc::new(AssetCacheProxy::new(
            config,
            Arc::clone(&self.network),
            Arc::clone(&self.storage),
        ));

        if let Err(e) = proxy.install() {
            match self.active_generation() {
                Some(current) => warn!("keeping cache generation {current}: {e}"),
                None => warn!("no cache generation active: {e}"),
            }
            return Err(e);
        }
        proxy.activate()?;

        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::clone(&proxy));
        if let Some(previous) = previous {
            previous.retire();
            info!(
                "cache generation {generation} replaced {}",
                previous.generation()
            );
        }
        Ok(proxy)
    }

    /// The proxy currently serving requests.
    #[must_use]
    pub fn active(&self) -> Option<Arc<AssetCacheProxy>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Generation identifier of the active proxy.
    #[must_use]
    pub fn active_generation(&self) -> Option<String> {
        self.active().map(|proxy| proxy.generation().to_string())
    }

    /// Storage shared by all generations.
    #[must_use]
    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    /// Answer a request through the active proxy, or straight from the
    /// network when nothing is active.
    ///
    /// # Errors
    ///
    /// A [`FetchError`] from the network is returned unchanged.
    pub fn handle(&self, request: &Request) -> Result<Served, FetchError> {
        match self.active() {
            Some(proxy) => proxy.handle(request),
            None => Ok(Served {
                response: self.network.fetch(request)?,
                from: ServedFrom::Network,
                stored: false,
            }),
        }
    }
}
