//! Shared server state: the cached catalog, the profile cache and the session.
//!
//! Tool handlers go through [`DirectoryState`] for everything. The catalog is
//! loaded lazily, revalidated after a TTL, and concurrent callers that find
//! the cache cold await one shared in-flight load.

use crate::config::DirectoryConfig;
use crate::directory::Session;
use crate::enquiry::LeadWriter;
use crate::error::StoreError;
use crate::profile::{self, CollegeProfile, ProfileError};
use crate::source::{Catalog, PostgrestStore, RecordSource, RecordStore, StaticDataset};
use anyhow::Context;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Maximum number of college profiles kept in memory.
const PROFILE_CACHE_SIZE: NonZeroUsize = NonZeroUsize::new(64).unwrap();

type SharedCatalogFuture = Shared<BoxFuture<'static, Arc<Catalog>>>;

/// Cache lifetimes and deployment label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSettings {
    pub catalog_ttl: Duration,
    pub profile_ttl: Duration,
    pub environment: String,
}

impl Default for StateSettings {
    fn default() -> Self {
        Self::from(&DirectoryConfig::default())
    }
}

impl From<&DirectoryConfig> for StateSettings {
    fn from(config: &DirectoryConfig) -> Self {
        Self {
            catalog_ttl: config.catalog_ttl(),
            profile_ttl: config.profile_ttl(),
            environment: config.environment.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedProfile {
    profile: Arc<CollegeProfile>,
    stored_at: Instant,
}

pub struct DirectoryState {
    source: RecordSource,
    settings: StateSettings,

    /// Last loaded catalog, possibly stale
    catalog: RwLock<Option<Arc<Catalog>>>,

    /// The load currently running, if any
    in_flight: Mutex<Option<SharedCatalogFuture>>,

    profiles: RwLock<LruCache<String, CachedProfile>>,

    session: Mutex<Session>,
}

impl std::fmt::Debug for DirectoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryState")
            .field("store_configured", &self.source.store().is_some())
            .field("dataset_rows", &self.source.dataset().len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl DirectoryState {
    pub fn new(source: RecordSource, settings: StateSettings) -> Self {
        Self {
            source,
            settings,
            catalog: RwLock::new(None),
            in_flight: Mutex::new(None),
            profiles: RwLock::new(LruCache::new(PROFILE_CACHE_SIZE)),
            session: Mutex::new(Session::new()),
        }
    }

    /// Build the store client and dataset described by `config`.
    pub async fn from_config(config: &DirectoryConfig) -> anyhow::Result<Self> {
        let store: Option<Arc<dyn RecordStore>> = match PostgrestStore::from_config(&config.store) {
            Ok(store) => {
                tracing::info!("Using record store {:?}", store);
                Some(Arc::new(store))
            }
            Err(StoreError::Unconfigured) => {
                tracing::info!("No record store configured, serving the static dataset");
                None
            }
            Err(e) => return Err(e).context("Failed to build record store client"),
        };

        let dataset = StaticDataset::load(config.resolved_dataset_path().as_deref()).await?;
        Ok(Self::new(
            RecordSource::new(store, dataset),
            StateSettings::from(config),
        ))
    }

    pub fn source(&self) -> &RecordSource {
        &self.source
    }

    pub fn settings(&self) -> &StateSettings {
        &self.settings
    }

    /// The catalog, loading it when missing or older than the TTL.
    pub async fn catalog(&self) -> Arc<Catalog> {
        if let Some(catalog) = self.fresh_catalog().await {
            tracing::debug!("Catalog cache hit ({} records)", catalog.records.len());
            return catalog;
        }

        let future = {
            let mut in_flight = self.in_flight.lock().await;
            // Another caller may have finished a load while we waited for the lock.
            if let Some(catalog) = self.fresh_catalog().await {
                return catalog;
            }
            match in_flight.as_ref() {
                Some(future) => {
                    tracing::debug!("Awaiting in-flight catalog load");
                    future.clone()
                }
                None => {
                    let source = self.source.clone();
                    let future: BoxFuture<'static, Arc<Catalog>> =
                        Box::pin(async move { Arc::new(source.load().await) });
                    let shared = future.shared();
                    *in_flight = Some(shared.clone());
                    shared
                }
            }
        };

        let catalog = future.clone().await;

        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.as_ref().is_some_and(|current| current.ptr_eq(&future)) {
                *self.catalog.write().await = Some(catalog.clone());
                *in_flight = None;
            }
        }

        catalog
    }

    /// The last loaded catalog without triggering a load, even if stale.
    pub async fn cached_catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog.read().await.clone()
    }

    async fn fresh_catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog
            .read()
            .await
            .as_ref()
            .filter(|catalog| catalog.loaded_at.elapsed() < self.settings.catalog_ttl)
            .cloned()
    }

    /// Drop the cached catalog and profiles, then load again.
    pub async fn refresh(&self) -> Arc<Catalog> {
        self.invalidate().await;
        self.catalog().await
    }

    pub async fn invalidate(&self) {
        *self.in_flight.lock().await = None;
        *self.catalog.write().await = None;
        self.profiles.write().await.clear();
        tracing::info!("Cleared catalog and profile caches");
    }

    /// Look up one college profile, consulting the LRU cache first.
    pub async fn profile(&self, id: &str) -> Result<Arc<CollegeProfile>, ProfileError> {
        let key = id.trim().to_string();
        {
            let mut cache = self.profiles.write().await;
            let cached = cache
                .get(&key)
                .map(|entry| (entry.profile.clone(), entry.stored_at));
            match cached {
                Some((profile, stored_at)) if stored_at.elapsed() < self.settings.profile_ttl => {
                    tracing::debug!("Profile cache hit for {}", key);
                    return Ok(profile);
                }
                Some(_) => {
                    cache.pop(&key);
                }
                None => {}
            }
        }

        let catalog = self.catalog().await;
        let profile = Arc::new(profile::lookup(&self.source, &catalog, &key).await?);

        self.profiles.write().await.put(
            key,
            CachedProfile {
                profile: profile.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(profile)
    }

    /// Exclusive access to the browsing session.
    pub async fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    pub fn leads(&self) -> LeadWriter<'_> {
        LeadWriter::new(self.source.store().map(|store| store.as_ref()))
    }

    /// Liveness report. Does not trigger a catalog load.
    pub async fn health(&self) -> HealthReport {
        let catalog = self.cached_catalog().await.map(|catalog| CatalogHealth {
            origin: catalog.origin.to_string(),
            records: catalog.records.len(),
            loaded_at: catalog.loaded_at_millis(),
        });
        HealthReport {
            status: "ok",
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            environment: self.settings.environment.clone(),
            store_configured: self.source.store().is_some(),
            catalog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    /// Milliseconds since the Unix epoch
    pub timestamp: u128,
    pub environment: String,
    pub store_configured: bool,
    pub catalog: Option<CatalogHealth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogHealth {
    pub origin: String,
    pub records: usize,
    pub loaded_at: u128,
}
