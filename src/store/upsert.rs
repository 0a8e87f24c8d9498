use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::{debug, info};

use crate::extract::{UNRESOLVED_KEY_ID, key_id_for_offset};
use crate::model::{KeyEventRecord, KeyMacro, MacroValue, SimVarRecord, SimVarUnit};

/// Inserts descriptive fields on first sighting of a name; afterwards only the
/// importing edition's status column changes.
pub fn upsert_key_events(connection: &mut Connection, records: &[KeyEventRecord]) -> Result<usize> {
    let tx = connection
        .transaction()
        .context("failed to start key event transaction")?;

    for record in records {
        let entry = &record.entry;
        let sql = format!(
            "INSERT INTO KeyEvents (System, Category, Name, Params, Description, Multiplayer, {column})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(Name) DO UPDATE SET {column} = excluded.{column}",
            column = record.stamp.edition.status_column()
        );
        tx.prepare_cached(&sql)?
            .execute(params![
                entry.system,
                entry.category,
                entry.name,
                entry.params,
                entry.description,
                entry.multiplayer,
                record.stamp.status,
            ])
            .with_context(|| format!("failed to upsert key event {}", entry.name))?;
    }

    tx.commit().context("failed to commit key events")?;
    Ok(records.len())
}

pub fn upsert_simvars(connection: &mut Connection, records: &[SimVarRecord]) -> Result<usize> {
    let tx = connection
        .transaction()
        .context("failed to start simvar transaction")?;

    for record in records {
        let entry = &record.entry;
        let sql = format!(
            "INSERT INTO SimVars
               (System, Category, Name, Description, Units, Settable, Multiplayer, Indexed, Component, {column})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(Name) DO UPDATE SET {column} = excluded.{column}",
            column = record.stamp.edition.status_column()
        );
        tx.prepare_cached(&sql)?
            .execute(params![
                entry.system,
                entry.category,
                entry.name,
                entry.description,
                entry.units,
                entry.settable,
                entry.multiplayer,
                entry.indexed,
                entry.component,
                record.stamp.status,
            ])
            .with_context(|| format!("failed to upsert simvar {}", entry.name))?;
    }

    tx.commit().context("failed to commit simvars")?;
    Ok(records.len())
}

pub fn replace_units(connection: &mut Connection, units: &[SimVarUnit]) -> Result<usize> {
    let tx = connection
        .transaction()
        .context("failed to start unit transaction")?;
    {
        let mut statement = tx.prepare(
            "INSERT OR REPLACE INTO SimVarUnits (Measure, Name, ShortName, Aliases, Description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for unit in units {
            statement
                .execute(params![
                    unit.measure,
                    unit.name,
                    unit.short_name,
                    unit.aliases_column(),
                    unit.description,
                ])
                .with_context(|| format!("failed to store unit {}", unit.name))?;
        }
    }
    tx.commit().context("failed to commit units")?;
    Ok(units.len())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MacroImport {
    /// Rows actually added; names already present are ignored.
    pub inserted: usize,
    pub unresolved: usize,
}

/// Stores one header's macros in a single transaction. Aliases resolve against ids
/// already stored, including ones inserted earlier from the same header.
pub fn insert_key_macros(
    connection: &mut Connection,
    macros: &[KeyMacro],
    sdk_version: &str,
) -> Result<MacroImport> {
    let tx = connection
        .transaction()
        .context("failed to start key id transaction")?;
    let mut outcome = MacroImport::default();

    for key_macro in macros {
        let key_id = match &key_macro.value {
            MacroValue::Offset(offset) => key_id_for_offset(*offset),
            MacroValue::Alias(target) => match lookup_key_id(&tx, target)? {
                Some(id) => id,
                None => {
                    debug!(name = %key_macro.name, target = %target, "unresolved key alias");
                    outcome.unresolved += 1;
                    UNRESOLVED_KEY_ID
                }
            },
        };

        outcome.inserted += tx
            .prepare_cached(
                "INSERT OR IGNORE INTO KeyEventIDs (KeyName, KeyID, SDK_VERSION) VALUES (?1, ?2, ?3)",
            )?
            .execute(params![key_macro.name, key_id, sdk_version])
            .with_context(|| format!("failed to store key id {}", key_macro.name))?;
    }

    tx.commit().context("failed to commit key ids")?;
    Ok(outcome)
}

fn lookup_key_id(tx: &Transaction<'_>, name: &str) -> Result<Option<i64>> {
    tx.prepare_cached("SELECT KeyID FROM KeyEventIDs WHERE KeyName = ?1")?
        .query_row([name], |row| row.get(0))
        .optional()
        .with_context(|| format!("failed to look up key id {name}"))
}

/// Known documentation errors that survive every release.
const SIMVAR_CORRECTIONS: &[&str] = &[
    "UPDATE SimVars SET Units = 'Frequency BCD32' WHERE Name = 'ADF ACTIVE FREQUENCY'",
    "UPDATE SimVars SET Category = 'Reciprocal (Piston) Engine'
     WHERE Category = 'Reciprical (Piston) Engine Vars'",
];

pub fn apply_simvar_corrections(connection: &Connection) -> Result<usize> {
    let mut changed = 0;
    for sql in SIMVAR_CORRECTIONS {
        changed += connection
            .execute(sql, [])
            .context("failed to apply simvar correction")?;
    }
    if changed > 0 {
        info!(rows = changed, "applied simvar corrections");
    }
    Ok(changed)
}

