use anyhow::Result;
use tracing::info;

use super::context::ImportContext;
use crate::edition::{SIMVARS_INDEX, SIMVARS_INDEX_HEADING, SIMVARS_PATH};
use crate::extract::{SIMVAR_RULES, extract_simvars, index_links, scan_system_page};
use crate::store::{StoreTable, apply_simvar_corrections, record_import, upsert_simvars};

/// The first link under the index heading is the units page, not a system.
const INDEX_LINKS_TO_SKIP: usize = 1;

fn section_url(ctx: &ImportContext) -> String {
    format!("{}{SIMVARS_PATH}", ctx.base_url)
}

pub fn import_all(ctx: &mut ImportContext) -> Result<usize> {
    ctx.prepare_table(StoreTable::SimVars)?;

    let section = section_url(ctx);
    let index_url = format!("{section}{SIMVARS_INDEX}");
    let Some(index) = ctx.fetch_document(&index_url) else {
        return Ok(1);
    };

    let links = match index_links(
        &index,
        &ctx.selectors,
        SIMVARS_INDEX_HEADING,
        INDEX_LINKS_TO_SKIP,
    ) {
        Ok(links) => links,
        Err(err) => {
            ctx.warn(format!("{index_url}: {err:#}"));
            return Ok(1);
        }
    };
    info!(systems = links.len(), edition = %ctx.edition, "found simvar systems");

    let mut failures = 0;
    for link in &links {
        failures += import_page(ctx, &format!("{section}{link}"))?;
    }

    apply_simvar_corrections(&ctx.connection)?;
    record_import(&ctx.connection, StoreTable::SimVars, &section)?;
    info!(failures, "finished importing simvars");
    Ok(failures)
}

/// Pages may include a sub-directory, e.g. `Aircraft_SimVars/Aircraft_Fuel_Variables`.
pub fn import_pages(ctx: &mut ImportContext, pages: &[String]) -> Result<usize> {
    ctx.prepare_table(StoreTable::SimVars)?;

    let section = section_url(ctx);
    let mut failures = 0;
    for page in pages {
        let url = format!("{section}{page}.htm");
        let page_failures = import_page(ctx, &url)?;
        if page_failures == 0 {
            record_import(&ctx.connection, StoreTable::SimVars, &url)?;
        }
        failures += page_failures;
    }
    Ok(failures)
}

fn import_page(ctx: &mut ImportContext, url: &str) -> Result<usize> {
    let Some(document) = ctx.fetch_document(url) else {
        return Ok(1);
    };

    let scan = match scan_system_page(&document, &ctx.selectors, &SIMVAR_RULES) {
        Ok(scan) => scan,
        Err(err) => {
            ctx.warn(format!("{url}: {err:#}"));
            return Ok(1);
        }
    };
    info!(
        system = %scan.system,
        tables = scan.tables_found,
        skipped = scan.tables_skipped,
        "scanned simvar page"
    );
    ctx.counts.tables_found += scan.tables_found;
    ctx.counts.tables_skipped += scan.tables_skipped;
    for warning in &scan.warnings {
        ctx.warn(format!("{}: {warning}", scan.system));
    }

    let mut imported = 0;
    for table in &scan.tables {
        let extraction = extract_simvars(table, &scan.system, ctx.edition, &ctx.selectors);
        for warning in extraction.warnings {
            ctx.warn(warning);
        }
        ctx.counts.anchor_mismatches += extraction.anchor_mismatches;

        let stored = upsert_simvars(&mut ctx.connection, &extraction.records)?;
        info!(category = %table.category, simvars = stored, "imported category");
        imported += stored;
    }

    ctx.counts.simvars_imported += imported;
    info!(system = %scan.system, simvars = imported, "finished system page");
    Ok(0)
}
