use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::AddressError;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory of the persistent store
    pub directory: PathBuf,
    /// Disable to run without any caching
    pub enabled: bool,
    /// Upper bound for each store operation, including the startup probe
    pub timeout_seconds: u64,
    /// Maximum number of entries in the memory tier
    pub max_memory_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("validate-address"),
            enabled: true,
            timeout_seconds: 5,
            max_memory_entries: 10_000,
        }
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, AddressError>;

/// Key-value store of validated addresses, keyed by formatted input address.
///
/// Implementations never surface errors: an unreadable entry is a miss and a
/// failed write reports `false`.
#[async_trait]
pub trait AddressCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, value: &str) -> bool;

    /// Short name of the backing store, for logs
    fn backend(&self) -> &'static str;
}

/// In-process cache backed by moka
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, String>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();

        Self { cache }
    }

    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl AddressCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> bool {
        self.cache.insert(key.to_string(), value.to_string()).await;
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Persistent cache using cacache, fronted by a memory tier.
///
/// Entries survive across runs. Every disk operation is bounded by the
/// configured timeout.
pub struct DiskCache {
    cache_dir: PathBuf,
    timeout: Duration,
    memory: MemoryCache,
}

impl DiskCache {
    pub fn new(cache_dir: PathBuf, timeout: Duration, max_memory_entries: u64) -> Self {
        Self {
            cache_dir,
            timeout,
            memory: MemoryCache::new(max_memory_entries),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.directory.clone(),
            Duration::from_secs(config.timeout_seconds),
            config.max_memory_entries,
        )
    }

    /// Read a value from disk
    pub async fn read(&self, key: &str) -> CacheResult<Option<String>> {
        let result = timeout(self.timeout, cacache::read(&self.cache_dir, key))
            .await
            .map_err(|_| AddressError::Cache(format!("Timed out reading {}", key)))?;

        match result {
            Ok(data) => String::from_utf8(data).map(Some).map_err(|e| {
                AddressError::Cache(format!("Entry {} is not valid UTF-8: {}", key, e))
            }),
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(e) => Err(AddressError::Cache(format!(
                "Failed to read from disk cache: {}",
                e
            ))),
        }
    }

    /// Write a value to disk
    pub async fn write(&self, key: &str, value: &str) -> CacheResult<()> {
        timeout(
            self.timeout,
            cacache::write(&self.cache_dir, key, value.as_bytes()),
        )
        .await
        .map_err(|_| AddressError::Cache(format!("Timed out writing {}", key)))?
        .map_err(|e| AddressError::Cache(format!("Failed to write to disk cache: {}", e)))?;

        Ok(())
    }

    /// Check the store is usable by round-tripping a throwaway entry
    pub async fn ping(&self) -> CacheResult<()> {
        timeout(self.timeout, fs::create_dir_all(&self.cache_dir))
            .await
            .map_err(|_| AddressError::Cache("Timed out creating cache directory".to_string()))?
            .map_err(|e| {
                AddressError::Cache(format!("Failed to create cache directory: {}", e))
            })?;

        let probe_key = format!("probe:{}", uuid::Uuid::new_v4());
        let probe_value = "ok";

        self.write(&probe_key, probe_value).await?;
        let read_back = self.read(&probe_key).await?;
        if let Err(e) = cacache::remove(&self.cache_dir, &probe_key).await {
            debug!(key = %probe_key, error = %e, "Failed to remove cache probe entry");
        }

        match read_back.as_deref() {
            Some(value) if value == probe_value => Ok(()),
            _ => Err(AddressError::Cache(
                "Probe entry could not be read back".to_string(),
            )),
        }
    }
}

#[async_trait]
impl AddressCache for DiskCache {
    async fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.memory.get(key).await {
            return Some(value);
        }

        match self.read(key).await {
            Ok(Some(value)) => {
                self.memory.set(key, &value).await;
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                debug!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> bool {
        self.memory.set(key, value).await;

        match self.write(key, value).await {
            Ok(()) => true,
            Err(e) => {
                debug!(key, error = %e, "Cache write failed");
                false
            }
        }
    }

    fn backend(&self) -> &'static str {
        "disk"
    }
}

/// Stand-in used when no store is reachable: every lookup misses and every
/// write is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

#[async_trait]
impl AddressCache for NullCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str) -> bool {
        false
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}

/// Open the persistent store, degrading to [`NullCache`] if it is disabled or
/// unreachable.
pub async fn connect_cache(config: &CacheConfig) -> Arc<dyn AddressCache> {
    if !config.enabled {
        info!("Caching disabled");
        return Arc::new(NullCache);
    }

    let disk = DiskCache::from_config(config);
    match disk.ping().await {
        Ok(()) => {
            debug!(directory = %config.directory.display(), "Connected to address cache");
            Arc::new(disk)
        }
        Err(e) => {
            warn!(
                directory = %config.directory.display(),
                error = %e,
                "Address cache unavailable, continuing without caching"
            );
            Arc::new(NullCache)
        }
    }
}
