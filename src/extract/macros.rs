use anyhow::{Context, Result};
use regex::Regex;
use tracing::warn;

use crate::model::{KeyMacro, MacroValue};

/// `KEY_ID_MIN` in the SDK headers.
const KEY_ID_MIN: i64 = 0x10000;

/// Stored id of an alias whose target is not known.
pub const UNRESOLVED_KEY_ID: i64 = 0;

pub fn key_id_for_offset(offset: u32) -> i64 {
    KEY_ID_MIN + i64::from(offset)
}

/// Reads the contiguous block of `#define KEY_*` lines from `gauges.h` / `MSFS_EventsEnum.h`.
pub struct MacroParser {
    direct: Regex,
    alias: Regex,
}

impl MacroParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            direct: Regex::new(r"#define (\w+)\s+\(KEY_ID_MIN \+ (\d+)\)")
                .context("failed to compile key definition regex")?,
            alias: Regex::new(r"#define (\w+)\s+(\w+)")
                .context("failed to compile key alias regex")?,
        })
    }

    /// The block starts at the first `(KEY_ID_MIN + n)` definition and ends at the first
    /// line after it that is neither a definition nor an alias. `KEY_NULL` is dropped, as is
    /// any definition whose offset does not fit the id range.
    pub fn parse(&self, header: &str) -> Vec<KeyMacro> {
        let mut macros = Vec::new();
        let mut in_definitions = false;

        for line in header.lines() {
            let (name, value) = if let Some(captures) = self.direct.captures(line) {
                match captures[2].parse::<u32>() {
                    Ok(offset) => (captures[1].to_string(), MacroValue::Offset(offset)),
                    Err(err) => {
                        in_definitions = true;
                        warn!(line, error = %err, "skipping key definition with invalid offset");
                        continue;
                    }
                }
            } else if in_definitions {
                let Some(captures) = self.alias.captures(line) else {
                    break;
                };
                (
                    captures[1].to_string(),
                    MacroValue::Alias(strip_key_prefix(&captures[2]).to_string()),
                )
            } else {
                continue;
            };

            in_definitions = true;
            let name = strip_key_prefix(&name);
            if name == "NULL" {
                continue;
            }

            macros.push(KeyMacro {
                name: name.to_string(),
                value,
            });
        }

        macros
    }
}

fn strip_key_prefix(name: &str) -> &str {
    name.strip_prefix("KEY_").unwrap_or(name)
}
