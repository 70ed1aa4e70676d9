use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info};

use super::cache::CacheManager;
use super::provider::TableProvider;
use crate::sources::DataSource;
use crate::ui::Ui;

/// Upper bound on the buffer reserved up front from `Content-Length`
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

const USER_AGENT: &str = concat!("pokedex-to-sqlite/", env!("CARGO_PKG_VERSION"));

/// Fetches source CSVs over HTTP, optionally through a local cache
pub struct HttpProvider {
    client: Client,
    cache: Option<CacheManager>,
    force: bool,
}

impl HttpProvider {
    pub fn new(cache: Option<CacheManager>, force: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            cache,
            force,
        })
    }

    /// Download a URL, reporting byte progress
    pub fn download(&self, url: &str, label: &str, ui: &mut impl Ui) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP request for {} failed: {}", url, status);
        }

        let total_size = response.content_length().unwrap_or(0);
        let mut body = Vec::with_capacity(initial_capacity(total_size));
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .with_context(|| format!("Failed to read response from {}", url))?;

            if bytes_read == 0 {
                break;
            }

            body.extend_from_slice(&buffer[..bytes_read]);
            ui.set_progress(
                body.len() as u64,
                total_size,
                format!("{} ({})", label, format_bytes(body.len() as u64)),
            );
        }

        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

impl TableProvider for HttpProvider {
    fn fetch(&mut self, source: &DataSource, ui: &mut impl Ui) -> Result<Vec<u8>> {
        if let (Some(cache), false) = (&self.cache, self.force) {
            if let Some(bytes) = cache.read(&source.name, &source.url)? {
                info!("Using cached copy of {}", source.name);
                return Ok(bytes);
            }
        }

        ui.log(format!("Downloading {}", source.url));
        let bytes = self.download(&source.url, &source.name, ui)?;

        if let Some(cache) = &self.cache {
            cache.store(&source.name, &source.url, &bytes)?;
        }

        Ok(bytes)
    }
}

/// Bytes to reserve for a body of the advertised length
fn initial_capacity(content_length: u64) -> usize {
    content_length.min(MAX_PREALLOC) as usize
}

/// Format bytes as human-readable string
fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}
