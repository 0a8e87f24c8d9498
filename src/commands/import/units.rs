use anyhow::Result;
use tracing::info;

use super::context::ImportContext;
use crate::edition::{SIMVARS_PATH, SIMVARS_UNITS_PAGE, UNITS_HEADING};
use crate::extract::{extract_units, scan_units_page};
use crate::store::{StoreTable, record_import, replace_units};

pub fn import(ctx: &mut ImportContext) -> Result<usize> {
    ctx.prepare_table(StoreTable::SimVarUnits)?;

    let url = format!("{}{SIMVARS_PATH}{SIMVARS_UNITS_PAGE}", ctx.base_url);
    let Some(document) = ctx.fetch_document(&url) else {
        return Ok(1);
    };

    let scan = match scan_units_page(&document, &ctx.selectors, UNITS_HEADING) {
        Ok(scan) => scan,
        Err(err) => {
            ctx.warn(format!("{url}: {err:#}"));
            return Ok(1);
        }
    };
    info!(
        measures = scan.tables_found,
        skipped = scan.tables_skipped,
        "scanned units page"
    );
    ctx.counts.tables_found += scan.tables_found;
    ctx.counts.tables_skipped += scan.tables_skipped;
    for warning in &scan.warnings {
        ctx.warn(warning.clone());
    }

    let mut imported = 0;
    for table in &scan.tables {
        let units = extract_units(table, &ctx.selectors);
        let stored = replace_units(&mut ctx.connection, &units)?;
        info!(measure = %table.category, units = stored, "imported measure");
        imported += stored;
    }
    ctx.counts.units_imported += imported;

    record_import(&ctx.connection, StoreTable::SimVarUnits, &url)?;
    info!(units = imported, "finished importing simvar units");
    Ok(0)
}
