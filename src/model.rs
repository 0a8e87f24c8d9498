use serde::Serialize;

use crate::edition::Edition;

/// Support of an entity in one edition, persisted as 0/1/2.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SupportStatus {
    #[default]
    Unsupported,
    Supported,
    Deprecated,
}

impl SupportStatus {
    pub fn from_deprecated(deprecated: bool) -> Self {
        if deprecated {
            Self::Deprecated
        } else {
            Self::Supported
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Self::Unsupported => 0,
            Self::Supported => 1,
            Self::Deprecated => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unsupported),
            1 => Some(Self::Supported),
            2 => Some(Self::Deprecated),
            _ => None,
        }
    }
}

/// The edition that supplied a record, and what that edition says about it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusStamp {
    pub edition: Edition,
    pub status: SupportStatus,
}

impl StatusStamp {
    pub fn new(edition: Edition, deprecated: bool) -> Self {
        Self {
            edition,
            status: SupportStatus::from_deprecated(deprecated),
        }
    }
}

/// Identity and descriptive fields of a Key Event; written once per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEventEntry {
    pub system: String,
    pub category: String,
    pub name: String,
    pub params: String,
    pub description: String,
    pub multiplayer: String,
}

/// Identity and descriptive fields of a simulation variable; written once per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimVarEntry {
    pub system: String,
    pub category: String,
    pub name: String,
    pub description: String,
    pub units: String,
    pub settable: bool,
    pub multiplayer: String,
    pub indexed: bool,
    pub component: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub entry: T,
    pub stamp: StatusStamp,
}

pub type KeyEventRecord = Extracted<KeyEventEntry>;
pub type SimVarRecord = Extracted<SimVarEntry>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimVarUnit {
    pub measure: String,
    pub name: String,
    pub short_name: String,
    pub aliases: Vec<String>,
    pub description: String,
}

impl SimVarUnit {
    /// Stored form of the alias list; the trailing comma lets `LIKE '%name,%'` match every entry.
    pub fn aliases_column(&self) -> String {
        let mut joined = self.aliases.join(",");
        joined.push(',');
        joined
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroValue {
    /// `(KEY_ID_MIN + n)`
    Offset(u32),
    /// Another macro name, `KEY_` prefix removed.
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMacro {
    pub name: String,
    pub value: MacroValue,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportCounts {
    pub pages_requested: usize,
    pub pages_failed: usize,
    pub tables_found: usize,
    pub tables_skipped: usize,
    pub key_events_imported: usize,
    pub simvars_imported: usize,
    pub units_imported: usize,
    pub key_ids_imported: usize,
    pub key_ids_unresolved: usize,
    pub anchor_mismatches: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub edition: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub db_path: String,
    pub base_url: String,
    pub tasks: Vec<String>,
    pub failures: usize,
    pub counts: ImportCounts,
    pub warnings: Vec<String>,
}
