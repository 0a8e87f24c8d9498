//! Retrieval of documentation pages from the web or a local mirror.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use tracing::debug;

use crate::util::{ensure_directory, sha256_hex};

const USER_AGENT: &str = concat!("msfs-docimport/", env!("CARGO_PKG_VERSION"));

pub trait PageSource {
    /// Returns the page body at `location`. Errors are per-page retrieval failures.
    fn fetch(&self, location: &str) -> Result<String>;
}

/// Fetches `http(s)://` locations over the network and reads anything else from disk.
pub struct DocSource {
    client: Client,
    cache_dir: Option<PathBuf>,
}

impl DocSource {
    pub fn new(timeout: Duration, cache_dir: Option<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        if let Some(dir) = &cache_dir {
            ensure_directory(dir)?;
        }

        Ok(Self { client, cache_dir })
    }

    fn cache_path(&self, location: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.html", sha256_hex(location.as_bytes()))))
    }

    fn fetch_remote(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html, */*")
            .send()
            .with_context(|| format!("request failed: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "HTTP {} {}: {url}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("error")
            );
        }

        response
            .text()
            .with_context(|| format!("failed to read response body: {url}"))
    }
}

impl PageSource for DocSource {
    fn fetch(&self, location: &str) -> Result<String> {
        if !is_remote(location) {
            return fs::read_to_string(location)
                .with_context(|| format!("failed to read {location}"));
        }

        let cache_path = self.cache_path(location);
        if let Some(path) = cache_path.as_ref().filter(|path| path.exists()) {
            debug!(url = %location, cache = %path.display(), "using cached page");
            return fs::read_to_string(path)
                .with_context(|| format!("failed to read cached page {}", path.display()));
        }

        let body = self.fetch_remote(location)?;
        if let Some(path) = cache_path {
            fs::write(&path, &body)
                .with_context(|| format!("failed to write cached page {}", path.display()))?;
        }

        Ok(body)
    }
}

fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{DocSource, PageSource, is_remote};

    #[test]
    fn recognizes_remote_locations() {
        assert!(is_remote("https://docs.flightsimulator.com/html/x.htm"));
        assert!(is_remote("HTTP://example.test/"));
        assert!(!is_remote("/srv/mirror/Event_IDs.htm"));
        assert!(!is_remote("mirror/Event_IDs.htm"));
    }

    #[test]
    fn reads_local_mirror_files() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let page = dir.path().join("Event_IDs.htm");
        std::fs::write(&page, "<h2>EVENT IDs</h2>").expect("fixture should be written");

        let source = DocSource::new(Duration::from_secs(1), None).expect("source should build");
        let body = source
            .fetch(page.to_str().expect("utf-8 path"))
            .expect("local page should be readable");
        assert_eq!(body, "<h2>EVENT IDs</h2>");

        assert!(source.fetch(&dir.path().join("missing.htm").display().to_string()).is_err());
    }
}
