use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::schema::{StoreTable, ensure_table, table_exists};
use crate::util::import_timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMetaRow {
    pub table_name: String,
    pub last_update: Option<String>,
    pub from_url: Option<String>,
}

/// Stamps `table` with the current time and the location it was imported from.
pub fn record_import(connection: &Connection, table: StoreTable, source: &str) -> Result<()> {
    ensure_table(connection, StoreTable::ImportMeta, false)?;

    let timestamp = import_timestamp(Utc::now());
    connection
        .execute(
            "INSERT INTO ImportMeta (TableName, LastUpdate, FromURL) VALUES (?1, ?2, ?3)
             ON CONFLICT(TableName) DO UPDATE SET
               LastUpdate = excluded.LastUpdate,
               FromURL = excluded.FromURL",
            params![table.name(), timestamp, source],
        )
        .with_context(|| format!("failed to record import of {}", table.name()))?;

    debug!(table = table.name(), source, %timestamp, "recorded import metadata");
    Ok(())
}

/// Metadata for `table`, only when it has actually been imported.
pub fn load_import_meta(connection: &Connection, table: StoreTable) -> Result<Option<ImportMetaRow>> {
    if !table_exists(connection, StoreTable::ImportMeta.name())? {
        return Ok(None);
    }

    connection
        .query_row(
            "SELECT TableName, LastUpdate, FromURL FROM ImportMeta
             WHERE TableName = ?1 AND LastUpdate IS NOT NULL",
            [table.name()],
            |row| {
                Ok(ImportMetaRow {
                    table_name: row.get(0)?,
                    last_update: row.get(1)?,
                    from_url: row.get(2)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("failed to load import metadata for {}", table.name()))
}
