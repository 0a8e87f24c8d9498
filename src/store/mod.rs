//! SQLite persistence: schema, edition-aware upserts, import metadata and exports.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::model::SupportStatus;

mod export;
mod meta;
mod schema;
mod upsert;

pub use export::export_table;
pub use meta::{load_import_meta, record_import};
pub use schema::{StoreTable, ensure_table, table_exists};
pub use upsert::{
    apply_simvar_corrections, insert_key_macros, replace_units, upsert_key_events, upsert_simvars,
};

pub fn open_database(path: &Path) -> Result<Connection> {
    let connection = Connection::open(path)
        .with_context(|| format!("failed to open database: {}", path.display()))?;
    configure_connection(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn count_rows(connection: &Connection, table: StoreTable) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.name());
    connection
        .query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("failed to count rows in {}", table.name()))
}

impl ToSql for SupportStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for SupportStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        SupportStatus::from_i64(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}
