/// Unit tests for the address cache
///
/// These tests verify that the caching layer correctly:
/// - Persists entries across handles on the same directory
/// - Degrades to a no-op store when the directory is unusable
/// - Keeps the memory tier bounded
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use validate_address::{
    AddressCache, AddressValidator, CacheConfig, DiskCache, MemoryCache, NullCache, connect_cache,
};

use crate::common::mocks::MockAddressApi;

fn disk_config(temp_dir: &TempDir) -> CacheConfig {
    CacheConfig {
        directory: temp_dir.path().join("cache"),
        enabled: true,
        timeout_seconds: 2,
        max_memory_entries: 100,
    }
}

#[tokio::test]
async fn test_entries_survive_new_handle() {
    let temp_dir = TempDir::new().unwrap();
    let config = disk_config(&temp_dir);

    let first = connect_cache(&config).await;
    assert_eq!(first.backend(), "disk");
    assert!(first.set("1 Empora St, Title, 11111", "Invalid Address").await);
    drop(first);

    let second = DiskCache::from_config(&config);
    assert_eq!(
        second.read("1 Empora St, Title, 11111").await.unwrap(),
        Some("Invalid Address".to_string())
    );
}

#[tokio::test]
async fn test_disabled_cache_is_null() {
    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfig {
        enabled: false,
        ..disk_config(&temp_dir)
    };

    let cache = connect_cache(&config).await;
    assert_eq!(cache.backend(), "none");
    assert!(!cache.set("key", "value").await);
    assert_eq!(cache.get("key").await, None);
    assert!(!config.directory.exists());
}

#[tokio::test]
async fn test_null_cache_always_misses() {
    let cache = NullCache;
    assert!(!cache.set("123 Main St, Springfield, 22222", "x").await);
    assert_eq!(cache.get("123 Main St, Springfield, 22222").await, None);
}

#[tokio::test]
async fn test_memory_cache_is_bounded() {
    let cache = MemoryCache::new(10);
    for n in 0..100 {
        cache.set(&format!("{} Elm St, Boston, 2110", n), "ok").await;
    }
    assert!(cache.entry_count().await <= 10);
}

#[tokio::test]
async fn test_validator_over_disk_cache() {
    let temp_dir = TempDir::new().unwrap();
    let config = disk_config(&temp_dir);
    let row = validate_address::AddressRow::new("123 Main St", "Springfield", 22222);

    let api = Arc::new(MockAddressApi::new());
    let validator = AddressValidator::new(connect_cache(&config).await, api.clone());
    validator.validate_row(&row).await;

    // A fresh process over the same directory is answered from disk
    let api_again = Arc::new(MockAddressApi::new().with_latency(Duration::from_millis(1)));
    let validator = AddressValidator::new(connect_cache(&config).await, api_again.clone());
    let pair = validator.validate_row(&row).await;

    assert_eq!(pair.output, "123 Main St, Springfield, 22222");
    assert_eq!(api.call_count(), 1);
    assert_eq!(api_again.call_count(), 0);
}
