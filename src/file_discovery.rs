use crate::error::{AddressError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Locates input CSV files and output paths inside the CSV directory
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    csv_dir: PathBuf,
    extension: String,
}

impl FileDiscovery {
    /// Create a new FileDiscovery rooted at `csv_dir`
    pub fn new(csv_dir: impl Into<PathBuf>) -> Self {
        Self {
            csv_dir: csv_dir.into(),
            extension: "csv".to_string(),
        }
    }

    pub fn csv_dir(&self) -> &Path {
        &self.csv_dir
    }

    /// Resolve a file name against the CSV directory. Absolute paths are kept.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        self.csv_dir.join(filename)
    }

    /// Input files for this run, in processing order.
    ///
    /// With a file name, that single file must carry the CSV extension and
    /// exist. Without one, every CSV file in the directory is returned sorted
    /// by name; an empty or missing directory is an error.
    pub async fn discover_files(&self, filename: Option<&str>) -> Result<Vec<PathBuf>> {
        match filename {
            Some(name) => {
                let path = self.resolve(name);
                if !self.should_process(&path) {
                    return Err(AddressError::InvalidExtension);
                }

                match fs::metadata(&path).await {
                    Ok(metadata) if metadata.is_file() => Ok(vec![path]),
                    _ => Err(AddressError::MissingInputFile),
                }
            }
            None => {
                let mut read_dir = fs::read_dir(&self.csv_dir)
                    .await
                    .map_err(|_| AddressError::MissingInputFile)?;

                let mut files = Vec::new();
                while let Some(entry) = read_dir.next_entry().await? {
                    let entry_path = entry.path();
                    let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
                    if is_file && self.should_process(&entry_path) {
                        files.push(entry_path);
                    } else {
                        debug!(path = %entry_path.display(), "Skipping non-CSV entry");
                    }
                }

                if files.is_empty() {
                    return Err(AddressError::MissingInputFile);
                }

                files.sort();
                Ok(files)
            }
        }
    }

    /// Output path for `output_filename`, with its parent directory created
    pub async fn output_path(&self, output_filename: &str) -> Result<PathBuf> {
        let path = self.resolve(output_filename);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        Ok(path)
    }

    /// Check if a file has the CSV extension
    pub fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}
