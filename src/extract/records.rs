use scraper::ElementRef;

use super::names::{
    NO_LINK, canonical_event_name, canonical_simvar_name, event_anchor_matches,
    simvar_anchor_matches,
};
use super::row_shape::{KEY_EVENT_LAYOUT, RowCursor, SIMVAR_LAYOUT};
use super::scanner::CategoryTable;
use super::{Selectors, element_text};
use crate::edition::Edition;
use crate::model::{KeyEventEntry, KeyEventRecord, SimVarEntry, SimVarRecord, StatusStamp};

/// Deprecated rows are painted with a background whose red channel is 255 in `rgba()`
/// notation. Only this exact signature counts.
pub const DEPRECATED_STYLE_SIGNATURE: &str = "rgba(255";

#[derive(Debug, Clone)]
pub struct TableExtraction<T> {
    pub records: Vec<T>,
    pub anchor_mismatches: usize,
    pub warnings: Vec<String>,
}

impl<T> Default for TableExtraction<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            anchor_mismatches: 0,
            warnings: Vec::new(),
        }
    }
}

pub fn has_deprecation_style(cell: ElementRef<'_>) -> bool {
    cell.value()
        .attr("style")
        .is_some_and(|style| style.contains(DEPRECATED_STYLE_SIGNATURE))
}

pub fn extract_key_events(
    table: &CategoryTable<'_>,
    system: &str,
    edition: Edition,
    selectors: &Selectors,
) -> TableExtraction<KeyEventRecord> {
    let mut extraction = TableExtraction::default();
    let mut cursor = RowCursor::new(KEY_EVENT_LAYOUT, table.nominal_columns);

    for row in table.table.select(&selectors.tr).skip(1) {
        let cells = row.select(&selectors.td).collect::<Vec<ElementRef<'_>>>();
        let Some(shaped) = cursor.advance(&cells, |cell| element_text(*cell)) else {
            continue;
        };
        let Some(name_cell) = shaped.cell(0).copied() else {
            continue;
        };

        let description = shaped.cell(2).map(|cell| element_text(*cell)).unwrap_or_default();
        let multiplayer = shaped.cell(3).map(|cell| element_text(*cell)).unwrap_or_default();
        let stamp = StatusStamp::new(
            edition,
            table.deprecated || has_deprecation_style(name_cell),
        );

        for token in name_cell.select(&selectors.code) {
            let name = canonical_event_name(&element_text(token));
            if name.is_empty() {
                extraction.warnings.push(format!(
                    "empty event name in table {} ('{}'): {}",
                    table.index,
                    table.category,
                    element_text(token)
                ));
                continue;
            }

            let anchor = anchor_id(token, selectors);
            if !event_anchor_matches(&name, &anchor) {
                extraction.anchor_mismatches += 1;
                extraction.warnings.push(format!(
                    "event name and link id do not match for name '{name}'; id '{anchor}'"
                ));
            }

            extraction.records.push(KeyEventRecord {
                entry: KeyEventEntry {
                    system: system.to_string(),
                    category: table.category.clone(),
                    name,
                    params: shaped.merged.clone(),
                    description: description.clone(),
                    multiplayer: multiplayer.clone(),
                },
                stamp,
            });
        }
    }

    extraction
}

pub fn extract_simvars(
    table: &CategoryTable<'_>,
    system: &str,
    edition: Edition,
    selectors: &Selectors,
) -> TableExtraction<SimVarRecord> {
    let mut extraction = TableExtraction::default();
    let mut cursor = RowCursor::new(SIMVAR_LAYOUT, table.nominal_columns);

    for row in table.table.select(&selectors.tr).skip(1) {
        let cells = row.select(&selectors.td).collect::<Vec<ElementRef<'_>>>();
        let Some(shaped) = cursor.advance(&cells, |cell| element_text(*cell)) else {
            continue;
        };
        let Some(name_cell) = shaped.cell(0).copied() else {
            continue;
        };

        let units = shaped.cell(2).map(|cell| element_text(*cell)).unwrap_or_default();
        let settable = shaped
            .cell(3)
            .is_some_and(|cell| cell.select(&selectors.checkmark).next().is_some());
        let multiplayer = shaped.cell(4).map(|cell| element_text(*cell)).unwrap_or_default();
        let stamp = StatusStamp::new(
            edition,
            table.deprecated || has_deprecation_style(name_cell),
        );

        for token in name_cell.select(&selectors.code) {
            let canonical = canonical_simvar_name(&element_text(token));
            if canonical.name.is_empty() {
                extraction.warnings.push(format!(
                    "empty simvar name in table {} ('{}'): {}",
                    table.index,
                    table.category,
                    element_text(token)
                ));
                continue;
            }

            let anchor = anchor_id(token, selectors);
            if !simvar_anchor_matches(&canonical.name, &anchor) {
                extraction.anchor_mismatches += 1;
                extraction.warnings.push(format!(
                    "simvar name and link id do not match for name '{}'; id '{}'",
                    canonical.name,
                    anchor.replace('_', " ")
                ));
            }

            extraction.records.push(SimVarRecord {
                entry: SimVarEntry {
                    system: system.to_string(),
                    category: table.category.clone(),
                    name: canonical.name,
                    description: shaped.merged.clone(),
                    units: units.clone(),
                    settable,
                    multiplayer: multiplayer.clone(),
                    indexed: canonical.indexed,
                    component: canonical.component,
                },
                stamp,
            });
        }
    }

    extraction
}

/// The link anchor usually precedes the `<code>` name token; sometimes it sits inside it.
fn anchor_id(token: ElementRef<'_>, selectors: &Selectors) -> String {
    let anchor = token
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "a")
        .or_else(|| token.select(&selectors.anchor).next());

    anchor
        .and_then(|element| element.value().attr("id"))
        .unwrap_or(NO_LINK)
        .to_string()
}
