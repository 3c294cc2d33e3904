use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use validate_address::{
    AddressApi, AddressCache, AddressValidator, BatchOrchestrator, MemoryCache, RateLimitConfig,
};

pub const HEADER: &str = "Street Address,City,Postal Code\n";

/// Sample input used across the end-to-end tests
pub const SAMPLE_ROWS: &str = "\
123 e Maine Street,Columbus,43215
1 Empora St,Title,11111
";

/// Temporary CSV directory populated with input files
pub struct CsvDir {
    pub temp_dir: TempDir,
}

impl CsvDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Write `rows` below the standard header as `name`
    pub fn write_input(&self, name: &str, rows: &str) -> PathBuf {
        self.write_raw(name, &format!("{}{}", HEADER, rows))
    }

    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.temp_dir.path().join(name)).unwrap()
    }
}

impl Default for CsvDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrator over a fresh memory cache
pub fn build_orchestrator(
    api: Arc<dyn AddressApi>,
    rate_limit: RateLimitConfig,
) -> (BatchOrchestrator, Arc<dyn AddressCache>) {
    let cache: Arc<dyn AddressCache> = Arc::new(MemoryCache::new(1_000));
    let validator = AddressValidator::new(Arc::clone(&cache), api);
    (
        BatchOrchestrator::new(Arc::new(validator), rate_limit),
        cache,
    )
}
