use anyhow::{Context, Result};
use rusqlite::Connection;
use scraper::Html;
use tracing::{error, info, warn};

use crate::edition::Edition;
use crate::extract::Selectors;
use crate::model::ImportCounts;
use crate::source::PageSource;
use crate::store::{StoreTable, ensure_table};

/// Everything one import run shares: the store, the page source, and the edition
/// being imported. Counters and warnings accumulate here for the run manifest.
pub struct ImportContext {
    pub connection: Connection,
    source: Box<dyn PageSource>,
    pub selectors: Selectors,
    pub edition: Edition,
    /// Documentation root, always ending in `/`.
    pub base_url: String,
    pub drop_tables: bool,
    pub counts: ImportCounts,
    pub warnings: Vec<String>,
}

impl ImportContext {
    pub fn new(
        connection: Connection,
        source: Box<dyn PageSource>,
        edition: Edition,
        base_url: &str,
        drop_tables: bool,
    ) -> Result<Self> {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            connection,
            source,
            selectors: Selectors::new().context("failed to compile page selectors")?,
            edition,
            base_url,
            drop_tables,
            counts: ImportCounts::default(),
            warnings: Vec::new(),
        })
    }

    /// Creates (or with `--drop`, recreates) a table before its import task.
    pub fn prepare_table(&self, table: StoreTable) -> Result<()> {
        ensure_table(&self.connection, table, self.drop_tables)
    }

    /// Fetches and parses one page. A failed fetch is counted and logged, never fatal.
    pub fn fetch_document(&mut self, location: &str) -> Option<Html> {
        self.counts.pages_requested += 1;
        info!(url = %location, "requesting page");

        match self.source.fetch(location) {
            Ok(body) => Some(Html::parse_document(&body)),
            Err(err) => {
                self.counts.pages_failed += 1;
                error!(url = %location, error = %format!("{err:#}"), "page request failed");
                self.warnings.push(format!("{location}: {err:#}"));
                None
            }
        }
    }

    pub fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}
