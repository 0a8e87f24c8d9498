use anyhow::{Context, Result, bail};
use scraper::{ElementRef, Html};

use super::text::title_case;
use super::{Selectors, element_text, find_h2, next_siblings_named, previous_sibling_named};

const CATEGORY_HEADINGS: [&str; 2] = ["h3", "h4"];

/// Per-page-kind decisions about which tables carry data.
#[derive(Copy, Clone, Debug)]
pub struct ScanRules {
    /// Suffix removed from the `h2` text to get the system name.
    pub system_suffix: &'static str,
    pub min_columns: usize,
    /// Categories containing this text are imported regardless of column count.
    pub min_columns_exempt: Option<&'static str>,
    /// Categories starting with this text are not data tables.
    pub skip_category_prefix: Option<&'static str>,
    /// Use the system name when a table has no heading; otherwise skip it.
    pub fallback_to_system: bool,
}

pub const KEY_EVENT_RULES: ScanRules = ScanRules {
    system_suffix: " EVENTS",
    min_columns: 3,
    min_columns_exempt: Some("Concorde"),
    skip_category_prefix: None,
    fallback_to_system: true,
};

pub const SIMVAR_RULES: ScanRules = ScanRules {
    system_suffix: " VARIABLES",
    min_columns: 4,
    min_columns_exempt: None,
    skip_category_prefix: None,
    fallback_to_system: true,
};

pub const UNIT_RULES: ScanRules = ScanRules {
    system_suffix: "",
    min_columns: 0,
    min_columns_exempt: None,
    skip_category_prefix: Some("Structs"),
    fallback_to_system: false,
};

/// Pages whose `h2` does not name their system.
const SYSTEM_NAME_CORRECTIONS: &[(&str, &str)] = &[("event ids", "Aircraft Fuel System")];

#[derive(Debug, Clone)]
pub struct CategoryTable<'a> {
    /// 1-based position among the tables following the page heading.
    pub index: usize,
    pub category: String,
    /// The category heading itself marks every row deprecated.
    pub deprecated: bool,
    /// Number of `th` cells in the first row.
    pub nominal_columns: usize,
    pub table: ElementRef<'a>,
}

#[derive(Debug, Clone, Default)]
pub struct PageScan<'a> {
    pub system: String,
    pub tables: Vec<CategoryTable<'a>>,
    pub tables_found: usize,
    pub tables_skipped: usize,
    pub warnings: Vec<String>,
}

/// Locates the system heading of an events or simvars page and collects its category tables.
pub fn scan_system_page<'a>(
    document: &'a Html,
    selectors: &Selectors,
    rules: &ScanRules,
) -> Result<PageScan<'a>> {
    let heading =
        find_h2(document, selectors, None).context("could not find a system name in an h2 tag")?;
    let system = system_name(&element_text(heading), rules.system_suffix);

    Ok(scan_tables(heading, &system, selectors, rules))
}

/// Collects the measure tables of the units page.
pub fn scan_units_page<'a>(
    document: &'a Html,
    selectors: &Selectors,
    heading_text: &str,
) -> Result<PageScan<'a>> {
    let heading = find_h2(document, selectors, Some(heading_text))
        .with_context(|| format!("could not find '{heading_text}' h2 tag"))?;

    Ok(scan_tables(heading, "", selectors, &UNIT_RULES))
}

/// Link targets listed under an index page heading, minus the first `skip` entries.
pub fn index_links(
    document: &Html,
    selectors: &Selectors,
    heading_text: &str,
    skip: usize,
) -> Result<Vec<String>> {
    let heading = find_h2(document, selectors, Some(heading_text))
        .with_context(|| format!("could not find '{heading_text}' h2 tag"))?;
    let Some(list) = next_siblings_named(heading, "ul").next() else {
        bail!("no system list follows the '{heading_text}' heading");
    };

    Ok(list
        .select(&selectors.list_links)
        .skip(skip)
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(ToOwned::to_owned)
        .collect())
}

pub(crate) fn system_name(heading_text: &str, suffix: &str) -> String {
    let trimmed = if suffix.is_empty() {
        heading_text.to_string()
    } else {
        heading_text.replace(suffix, "")
    };
    let titled = title_case(trimmed.trim());

    SYSTEM_NAME_CORRECTIONS
        .iter()
        .find(|(wrong, _)| titled.eq_ignore_ascii_case(wrong))
        .map(|(_, right)| (*right).to_string())
        .unwrap_or(titled)
}

fn scan_tables<'a>(
    heading: ElementRef<'a>,
    system: &str,
    selectors: &Selectors,
    rules: &ScanRules,
) -> PageScan<'a> {
    let mut scan = PageScan {
        system: system.to_string(),
        ..PageScan::default()
    };

    for (position, table) in next_siblings_named(heading, "table").enumerate() {
        let index = position + 1;
        scan.tables_found += 1;

        let heading_text = previous_sibling_named(table, &CATEGORY_HEADINGS)
            .map(element_text)
            .unwrap_or_default();
        let category = if !heading_text.is_empty() {
            heading_text
        } else if rules.fallback_to_system {
            scan.warnings.push(format!(
                "table {index} has no apparent category name, using system name '{system}' instead"
            ));
            system.to_string()
        } else {
            scan.warnings
                .push(format!("skipping table {index} with no apparent category name"));
            scan.tables_skipped += 1;
            continue;
        };

        if rules
            .skip_category_prefix
            .is_some_and(|prefix| category.starts_with(prefix))
        {
            scan.tables_skipped += 1;
            continue;
        }

        let nominal_columns = table
            .select(&selectors.tr)
            .next()
            .map(|row| row.select(&selectors.th).count())
            .unwrap_or(0);
        let exempt = rules
            .min_columns_exempt
            .is_some_and(|marker| category.contains(marker));
        if nominal_columns < rules.min_columns && !exempt {
            scan.warnings.push(format!(
                "skipping table {index} ('{category}'), not enough columns ({nominal_columns})"
            ));
            scan.tables_skipped += 1;
            continue;
        }

        scan.tables.push(CategoryTable {
            index,
            deprecated: category.to_lowercase().contains("deprecated"),
            category,
            nominal_columns,
            table,
        });
    }

    scan
}
