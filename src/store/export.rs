use std::io::Write;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use rusqlite::types::ValueRef;

use super::schema::{StoreTable, table_exists};

/// Writes `table` as tab-delimited text: a header row of column names, then one line
/// per row with text values double-quoted and NULL left empty.
pub fn export_table<W: Write>(connection: &Connection, table: StoreTable, out: &mut W) -> Result<usize> {
    let name = table.name();
    if !table_exists(connection, name)? {
        bail!("table {name} does not exist; import it first");
    }

    let sql = format!("SELECT * FROM \"{name}\" ORDER BY {}", table.export_order());
    let mut statement = connection
        .prepare(&sql)
        .with_context(|| format!("failed to prepare export of {name}"))?;

    let header = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<String>>();
    writeln!(out, "{}", header.join("\t"))?;

    let column_count = header.len();
    let mut rows = statement.query([])?;
    let mut written = 0;
    while let Some(row) = rows.next()? {
        let mut fields = Vec::with_capacity(column_count);
        for index in 0..column_count {
            fields.push(format_value(row.get_ref(index)?));
        }
        writeln!(out, "{}", fields.join("\t"))?;
        written += 1;
    }

    Ok(written)
}

fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(number) => number.to_string(),
        ValueRef::Real(number) => number.to_string(),
        ValueRef::Text(text) => format!("\"{}\"", String::from_utf8_lossy(text)),
        ValueRef::Blob(bytes) => format!("\"{}\"", String::from_utf8_lossy(bytes)),
    }
}
