use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Local copies of fetched CSV files, one `<name>.csv` per source.
/// A `<name>.url` file next to it records where the copy came from; a copy
/// fetched from any other URL is not served.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => default_cache_dir()?,
        };

        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", cache_dir))?;

        Ok(Self { cache_dir })
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get path to the cached CSV for a source
    pub fn csv_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", name))
    }

    /// Get path to the file recording a cached CSV's origin
    pub fn url_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.url", name))
    }

    /// Read a cached CSV, if present and fetched from `url`
    pub fn read(&self, name: &str, url: &str) -> Result<Option<Vec<u8>>> {
        let path = self.csv_path(name);
        if !path.is_file() {
            return Ok(None);
        }

        let origin = match fs::read_to_string(self.url_path(name)) {
            Ok(origin) => origin,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read cache entry: {}", name))
            }
        };
        if origin.trim() != url {
            debug!("Cached {} came from {}, wanted {}", name, origin.trim(), url);
            return Ok(None);
        }

        let bytes =
            fs::read(&path).with_context(|| format!("Failed to read cached file: {:?}", path))?;
        Ok(Some(bytes))
    }

    /// Store a CSV fetched from `url`
    pub fn store(&self, name: &str, url: &str, bytes: &[u8]) -> Result<()> {
        let path = self.csv_path(name);
        fs::write(&path, bytes).with_context(|| format!("Failed to write cache file: {:?}", path))?;
        let url_path = self.url_path(name);
        fs::write(&url_path, url)
            .with_context(|| format!("Failed to write cache file: {:?}", url_path))
    }

    /// Remove every cached CSV and its origin file, returning how many CSVs
    /// were deleted
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
                continue;
            };
            if ext == "csv" || ext == "url" {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove cache file: {:?}", path))?;
                if ext == "csv" {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

fn default_cache_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "pokedex-to-sqlite")
        .context("Could not determine cache directory")?;
    Ok(proj_dirs.cache_dir().to_path_buf())
}
