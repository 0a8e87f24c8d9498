use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store::{StoreTable, count_rows, load_import_meta, open_database, table_exists};

pub fn run(args: StatusArgs) -> Result<()> {
    let db_path = &args.db.db_path;
    info!(path = %db_path.display(), "status requested");

    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing");
        return Ok(());
    }

    let connection = open_database(db_path)?;
    for table in StoreTable::ALL {
        if !table_exists(&connection, table.name())? {
            warn!(table = table.name(), "table missing");
            continue;
        }

        let rows = count_rows(&connection, table)?;
        if table == StoreTable::ImportMeta {
            info!(table = table.name(), rows, "table status");
            continue;
        }

        match load_import_meta(&connection, table)? {
            Some(meta) => info!(
                table = %meta.table_name,
                rows,
                last_update = %meta.last_update.unwrap_or_default(),
                from = %meta.from_url.unwrap_or_default(),
                "table status"
            ),
            None => info!(table = table.name(), rows, "table status (never imported)"),
        }
    }

    Ok(())
}
