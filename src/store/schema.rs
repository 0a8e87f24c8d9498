use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::edition::{
    EVENTS_TABLE, IMPORT_META_TABLE, KEY_IDS_TABLE, SIMVARS_TABLE, UNITS_TABLE,
};

/// Status columns hold 0 (unsupported), 1 (supported) or 2 (deprecated) per edition.
const KEY_EVENTS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS "KeyEvents" (
      "System"      TEXT(50) NOT NULL,
      "Category"    TEXT(50) NOT NULL,
      "Name"        TEXT(50) NOT NULL,
      "Params"      TEXT(300),
      "Description" TEXT(500),
      "Multiplayer" TEXT(20),
      "MSFS_11"     NUMERIC(1) DEFAULT 0,
      "MSFS_12"     NUMERIC(1) DEFAULT 0,
      PRIMARY KEY("Name")
    );
    CREATE INDEX IF NOT EXISTS "IX_KeyEvents_System" ON "KeyEvents" ("System");
    CREATE INDEX IF NOT EXISTS "IX_KeyEvents_Category" ON "KeyEvents" ("Category");
    CREATE INDEX IF NOT EXISTS "IX_KeyEvents_MSFS_11" ON "KeyEvents" ("MSFS_11");
    CREATE INDEX IF NOT EXISTS "IX_KeyEvents_MSFS_12" ON "KeyEvents" ("MSFS_12");
"#;

const SIM_VARS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS "SimVars" (
      "System"      TEXT(50) NOT NULL,
      "Category"    TEXT(50) NOT NULL,
      "Name"        TEXT(75) NOT NULL UNIQUE,
      "Description" TEXT(500),
      "Units"       TEXT(500),
      "Settable"    NUMERIC(1) DEFAULT 0,
      "Multiplayer" TEXT(20),
      "Indexed"     NUMERIC(1) DEFAULT 0,
      "Component"   NUMERIC(1) DEFAULT 0,
      "MSFS_11"     NUMERIC(1) DEFAULT 0,
      "MSFS_12"     NUMERIC(1) DEFAULT 0,
      PRIMARY KEY("Name")
    );
    CREATE INDEX IF NOT EXISTS "IX_SimVars_System" ON "SimVars" ("System");
    CREATE INDEX IF NOT EXISTS "IX_SimVars_Category" ON "SimVars" ("Category");
    CREATE INDEX IF NOT EXISTS "IX_SimVars_Settable" ON "SimVars" ("Settable");
    CREATE INDEX IF NOT EXISTS "IX_SimVars_MSFS_11" ON "SimVars" ("MSFS_11");
    CREATE INDEX IF NOT EXISTS "IX_SimVars_MSFS_12" ON "SimVars" ("MSFS_12");
"#;

const SIM_VAR_UNITS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS "SimVarUnits" (
      "Measure"     TEXT(20) NOT NULL,
      "Name"        TEXT(50) NOT NULL UNIQUE,
      "ShortName"   TEXT(50) NOT NULL UNIQUE,
      "Aliases"     TEXT(150) NOT NULL,
      "Description" TEXT(500),
      PRIMARY KEY("Name")
    );
    CREATE INDEX IF NOT EXISTS "IX_SimVarUnits_Measure" ON "SimVarUnits" ("Measure");
    CREATE INDEX IF NOT EXISTS "IX_SimVarUnits_ShortName" ON "SimVarUnits" ("ShortName");
"#;

const KEY_EVENT_IDS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS "KeyEventIDs" (
      "KeyName"     TEXT,
      "KeyID"       INTEGER,
      "SDK_VERSION" TEXT(15),
      PRIMARY KEY("KeyName")
    );
"#;

const IMPORT_META_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS "ImportMeta" (
      "TableName"  TEXT(20) NOT NULL UNIQUE,
      "LastUpdate" DATE,
      "FromURL"    TEXT(50),
      PRIMARY KEY("TableName")
    );
    INSERT OR IGNORE INTO "ImportMeta" ("TableName")
      VALUES ('KeyEvents'), ('SimVars'), ('SimVarUnits'), ('KeyEventIDs');
"#;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StoreTable {
    KeyEvents,
    SimVars,
    SimVarUnits,
    KeyEventIds,
    ImportMeta,
}

impl StoreTable {
    pub const ALL: [StoreTable; 5] = [
        StoreTable::KeyEvents,
        StoreTable::SimVars,
        StoreTable::SimVarUnits,
        StoreTable::KeyEventIds,
        StoreTable::ImportMeta,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::KeyEvents => EVENTS_TABLE,
            Self::SimVars => SIMVARS_TABLE,
            Self::SimVarUnits => UNITS_TABLE,
            Self::KeyEventIds => KEY_IDS_TABLE,
            Self::ImportMeta => IMPORT_META_TABLE,
        }
    }

    fn ddl(self) -> &'static str {
        match self {
            Self::KeyEvents => KEY_EVENTS_DDL,
            Self::SimVars => SIM_VARS_DDL,
            Self::SimVarUnits => SIM_VAR_UNITS_DDL,
            Self::KeyEventIds => KEY_EVENT_IDS_DDL,
            Self::ImportMeta => IMPORT_META_DDL,
        }
    }

    /// `ORDER BY` clause used for exports.
    pub fn export_order(self) -> &'static str {
        match self {
            Self::KeyEvents | Self::SimVars => "System, Category, Name",
            Self::SimVarUnits => "Measure, Name",
            Self::KeyEventIds => "KeyName",
            Self::ImportMeta => "TableName",
        }
    }
}

pub fn table_exists(connection: &Connection, name: &str) -> Result<bool> {
    let count: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to look up table {name}"))?;
    Ok(count > 0)
}

/// Creates `table` when missing. With `drop`, an existing table is dropped first.
pub fn ensure_table(connection: &Connection, table: StoreTable, drop: bool) -> Result<()> {
    let name = table.name();
    let exists = table_exists(connection, name)?;

    if exists && drop {
        info!(table = name, "dropping table");
        connection
            .execute_batch(&format!("DROP TABLE IF EXISTS \"{name}\";"))
            .with_context(|| format!("failed to drop table {name}"))?;
    } else if exists {
        return Ok(());
    }

    info!(table = name, "creating table");
    connection
        .execute_batch(table.ddl())
        .with_context(|| format!("failed to create table {name}"))?;
    Ok(())
}
