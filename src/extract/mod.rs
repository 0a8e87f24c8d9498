//! Table-layout heuristics that turn SDK documentation pages and headers into records.

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};

use self::text::clean_text;

mod macros;
mod names;
mod records;
mod row_shape;
mod scanner;
mod text;
mod units;

pub use macros::{MacroParser, UNRESOLVED_KEY_ID, key_id_for_offset};
pub use records::{extract_key_events, extract_simvars};
pub use scanner::{KEY_EVENT_RULES, SIMVAR_RULES, index_links, scan_system_page, scan_units_page};
pub use units::extract_units;

/// CSS selectors shared by every page walker, compiled once per run.
pub struct Selectors {
    pub h2: Selector,
    pub tr: Selector,
    pub th: Selector,
    pub td: Selector,
    pub code: Selector,
    pub anchor: Selector,
    pub checkmark: Selector,
    pub list_links: Selector,
}

impl Selectors {
    pub fn new() -> Result<Self> {
        Ok(Self {
            h2: parse_selector("h2")?,
            tr: parse_selector("tr")?,
            th: parse_selector("th")?,
            td: parse_selector("td")?,
            code: parse_selector("code")?,
            anchor: parse_selector("a")?,
            checkmark: parse_selector("span.checkmark_circle")?,
            list_links: parse_selector("li a")?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("invalid selector `{css}`: {err:?}"))
}

/// Normalized text content of an element.
fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// First `h2` in the document, optionally requiring an exact (normalized) text.
fn find_h2<'a>(
    document: &'a Html,
    selectors: &Selectors,
    text: Option<&str>,
) -> Option<ElementRef<'a>> {
    document
        .select(&selectors.h2)
        .find(|heading| text.is_none_or(|wanted| element_text(*heading) == wanted))
}

fn next_siblings_named<'a>(
    element: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(move |sibling| sibling.value().name() == name)
}

fn previous_sibling_named<'a>(
    element: ElementRef<'a>,
    names: &[&str],
) -> Option<ElementRef<'a>> {
    element
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| names.contains(&sibling.value().name()))
}
