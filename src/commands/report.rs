use std::io::{self, Write};

use anyhow::{Context, Result};
use regex::Regex;
use rusqlite::Connection;
use tracing::{error, info};

use crate::cli::ReportArgs;
use crate::edition::Edition;
use crate::model::SupportStatus;
use crate::store::{StoreTable, load_import_meta, open_database, table_exists};

/// Optional hand-maintained mapping of published event names to macro names.
const PUBLISHED_NAME_MAP_TABLE: &str = "PubKeyEventNameToKeyID";
const RULE: &str = "------------------";

pub fn run(args: ReportArgs) -> Result<usize> {
    let edition = Edition::from_fs24(args.fs24);
    info!(db = %args.db.db_path.display(), edition = %edition, "event report requested");

    let connection = open_database(&args.db.db_path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&connection, edition, &mut out)
}

/// Lists documented events with no KEY_* macro and macros with no documentation.
/// Returns 1 without output when either side has never been imported.
pub fn write_report<W: Write>(connection: &Connection, edition: Edition, out: &mut W) -> Result<usize> {
    let Some(events_meta) = load_import_meta(connection, StoreTable::KeyEvents)? else {
        error!("could not get import data for the KeyEvents table");
        return Ok(1);
    };
    let Some(keys_meta) = load_import_meta(connection, StoreTable::KeyEventIds)? else {
        error!("could not get import data for the KeyEventIDs table");
        return Ok(1);
    };

    let status_column = edition.status_column();
    let has_name_map = table_exists(connection, PUBLISHED_NAME_MAP_TABLE)?;

    writeln!(out, "{RULE}")?;
    writeln!(out, "Event ID Matching Report")?;
    writeln!(out, "Simulator Version: {status_column}")?;
    writeln!(
        out,
        "Event IDs imported {} from {}",
        events_meta.last_update.unwrap_or_default(),
        events_meta.from_url.unwrap_or_default()
    )?;
    writeln!(
        out,
        "KEY_* macros imported {} from {}",
        keys_meta.last_update.unwrap_or_default(),
        keys_meta.from_url.unwrap_or_default()
    )?;
    writeln!(out, "{RULE}")?;

    let name_map_filter = if has_name_map {
        format!("AND Name NOT IN (SELECT PublishedName FROM {PUBLISHED_NAME_MAP_TABLE})")
    } else {
        String::new()
    };
    let sql = format!(
        "SELECT Name, System, Category, {status_column} FROM KeyEvents
         WHERE Name NOT LIKE 'DEBUG%'
           AND {status_column} > 0
           AND Name NOT IN (SELECT KeyName FROM KeyEventIDs)
           {name_map_filter}
         ORDER BY Name"
    );
    writeln!(out, "Events which are documented but do not exist in KEY_* macros:\n")?;
    let mut statement = connection
        .prepare(&sql)
        .context("failed to prepare undocumented-macro query")?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        let system: String = row.get(1)?;
        let category: String = row.get(2)?;
        let status: SupportStatus = row.get(3)?;
        let marker = if status == SupportStatus::Deprecated { "[DEPR]" } else { "" };
        writeln!(out, "{name:45} {system} - {category:45}{marker}")?;
    }
    writeln!(out, "{RULE}\n")?;

    let name_map_filter = if has_name_map {
        format!("AND KeyName NOT IN (SELECT KeyName FROM {PUBLISHED_NAME_MAP_TABLE})")
    } else {
        String::new()
    };
    let sql = format!(
        "SELECT KeyName, KeyID, SDK_VERSION FROM KeyEventIDs
         WHERE KeyName NOT LIKE 'DEBUG%'
           AND SDK_VERSION LIKE ?1
           AND KeyName NOT IN (SELECT Name FROM KeyEvents WHERE Category NOT LIKE 'Undocumented%')
           {name_map_filter}
         ORDER BY KeyName"
    );
    writeln!(out, "Event IDs from KEY_* macros which are not documented:\n")?;
    writeln!(out, "{:50} KeyID,   SDK_VERSION", "Macro_Name,")?;
    let short_version = Regex::new(r"^(\d+\.\d+\.\d+)\.0$").context("failed to compile version regex")?;
    let mut statement = connection
        .prepare(&sql)
        .context("failed to prepare undocumented-event query")?;
    let mut rows = statement.query([edition.sdk_version_pattern()])?;
    while let Some(row) = rows.next()? {
        let key_name: String = row.get(0)?;
        let key_id: i64 = row.get(1)?;
        let version: String = row.get(2)?;
        let macro_name = format!("\"KEY_{key_name}\",");
        writeln!(
            out,
            "{macro_name:50} {key_id},   \"{}\"",
            short_version.replace(&version, "$1")
        )?;
    }
    writeln!(out, "{RULE}\n")?;

    Ok(0)
}
