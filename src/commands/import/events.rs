use anyhow::Result;
use tracing::info;

use super::context::ImportContext;
use crate::extract::{KEY_EVENT_RULES, extract_key_events, index_links, scan_system_page};
use crate::store::{StoreTable, record_import, upsert_key_events};

fn section_url(ctx: &ImportContext) -> String {
    format!("{}{}", ctx.base_url, ctx.edition.events_path())
}

/// Follows every system link on the edition's events index. Returns the failure count.
pub fn import_all(ctx: &mut ImportContext) -> Result<usize> {
    ctx.prepare_table(StoreTable::KeyEvents)?;

    let section = section_url(ctx);
    let index_url = format!("{section}{}", ctx.edition.events_index());
    let Some(index) = ctx.fetch_document(&index_url) else {
        return Ok(1);
    };

    let links = match index_links(&index, &ctx.selectors, ctx.edition.events_index_heading(), 0) {
        Ok(links) => links,
        Err(err) => {
            ctx.warn(format!("{index_url}: {err:#}"));
            return Ok(1);
        }
    };
    info!(systems = links.len(), edition = %ctx.edition, "found key event systems");

    let mut failures = 0;
    for link in &links {
        failures += import_page(ctx, &format!("{section}{link}"))?;
    }

    record_import(&ctx.connection, StoreTable::KeyEvents, &section)?;
    info!(failures, "finished importing key events");
    Ok(failures)
}

/// Imports the named system pages only; metadata records each page that succeeded.
pub fn import_pages(ctx: &mut ImportContext, pages: &[String]) -> Result<usize> {
    ctx.prepare_table(StoreTable::KeyEvents)?;

    let section = section_url(ctx);
    let mut failures = 0;
    for page in pages {
        let url = format!("{section}{page}.htm");
        let page_failures = import_page(ctx, &url)?;
        if page_failures == 0 {
            record_import(&ctx.connection, StoreTable::KeyEvents, &url)?;
        }
        failures += page_failures;
    }
    Ok(failures)
}

fn import_page(ctx: &mut ImportContext, url: &str) -> Result<usize> {
    let Some(document) = ctx.fetch_document(url) else {
        return Ok(1);
    };

    let scan = match scan_system_page(&document, &ctx.selectors, &KEY_EVENT_RULES) {
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
        "scanned key event page"
    );
    ctx.counts.tables_found += scan.tables_found;
    ctx.counts.tables_skipped += scan.tables_skipped;
    for warning in &scan.warnings {
        ctx.warn(format!("{}: {warning}", scan.system));
    }

    let mut imported = 0;
    for table in &scan.tables {
        let extraction = extract_key_events(table, &scan.system, ctx.edition, &ctx.selectors);
        for warning in extraction.warnings {
            ctx.warn(warning);
        }
        ctx.counts.anchor_mismatches += extraction.anchor_mismatches;

        let stored = upsert_key_events(&mut ctx.connection, &extraction.records)?;
        info!(category = %table.category, events = stored, "imported category");
        imported += stored;
    }

    ctx.counts.key_events_imported += imported;
    info!(system = %scan.system, events = imported, "finished system page");
    Ok(0)
}
