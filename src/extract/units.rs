use scraper::ElementRef;

use super::scanner::CategoryTable;
use super::text::clean_text;
use super::{Selectors, element_text};
use crate::model::SimVarUnit;

/// One unit per row: `alias, alias, ... | description`.
pub fn extract_units(table: &CategoryTable<'_>, selectors: &Selectors) -> Vec<SimVarUnit> {
    let mut units = Vec::new();

    for row in table.table.select(&selectors.tr) {
        let cells = row.select(&selectors.td).collect::<Vec<ElementRef<'_>>>();
        if cells.len() < 2 {
            continue;
        }

        let names = element_text(cells[0])
            .split(',')
            .map(clean_text)
            .collect::<Vec<String>>();
        if let Some(unit) = unit_from_aliases(&table.category, names, element_text(cells[1])) {
            units.push(unit);
        }
    }

    units
}

/// The second alias is usually the best primary name, unless it is shorter than the
/// first (a full name followed by its abbreviation).
pub fn unit_from_aliases(
    measure: &str,
    names: Vec<String>,
    description: String,
) -> Option<SimVarUnit> {
    let aliases = names
        .into_iter()
        .filter(|name| !name.is_empty())
        .collect::<Vec<String>>();
    let first = aliases.first()?;

    let name = match aliases.get(1) {
        Some(second) if second.len() >= first.len() => second.clone(),
        _ => first.clone(),
    };
    let short_name = aliases
        .iter()
        .fold(first, |shortest, alias| {
            if alias.len() < shortest.len() {
                alias
            } else {
                shortest
            }
        })
        .clone();

    Some(SimVarUnit {
        measure: measure.to_string(),
        name,
        short_name,
        aliases,
        description,
    })
}
