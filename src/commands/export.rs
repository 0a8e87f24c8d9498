use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{ExportArgs, ExportTable};
use crate::store::{StoreTable, export_table, open_database};

pub fn run(args: ExportArgs) -> Result<()> {
    let connection = open_database(&args.db.db_path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for table in &args.tables {
        let table = store_table(*table);
        let rows = export_table(&connection, table, &mut out)?;
        info!(table = table.name(), rows, "exported table");
    }

    out.flush().context("failed to flush export output")?;
    Ok(())
}

fn store_table(table: ExportTable) -> StoreTable {
    match table {
        ExportTable::Events => StoreTable::KeyEvents,
        ExportTable::Simvars => StoreTable::SimVars,
        ExportTable::Units => StoreTable::SimVarUnits,
        ExportTable::Keyids => StoreTable::KeyEventIds,
        ExportTable::Meta => StoreTable::ImportMeta,
    }
}
