//! Documentation/SDK editions and where each one publishes its pages.

use std::fmt;

pub const EVENTS_TABLE: &str = "KeyEvents";
pub const SIMVARS_TABLE: &str = "SimVars";
pub const UNITS_TABLE: &str = "SimVarUnits";
pub const KEY_IDS_TABLE: &str = "KeyEventIDs";
pub const IMPORT_META_TABLE: &str = "ImportMeta";

pub const SIMVARS_PATH: &str = "SimVars/";
pub const SIMVARS_INDEX: &str = "Simulation_Variables.htm";
pub const SIMVARS_UNITS_PAGE: &str = "Simulation_Variable_Units.htm";
pub const SIMVARS_INDEX_HEADING: &str = "SIMULATION VARIABLES";
pub const UNITS_HEADING: &str = "SIMULATION VARIABLE UNITS";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Edition {
    Msfs2020,
    Msfs2024,
}

impl Edition {
    pub fn from_fs24(fs24: bool) -> Self {
        if fs24 { Self::Msfs2024 } else { Self::Msfs2020 }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Msfs2020 => "msfs2020",
            Self::Msfs2024 => "msfs2024",
        }
    }

    /// Per-edition support column in `KeyEvents` and `SimVars`.
    pub fn status_column(self) -> &'static str {
        match self {
            Self::Msfs2020 => "MSFS_11",
            Self::Msfs2024 => "MSFS_12",
        }
    }

    pub fn docs_base_url(self) -> &'static str {
        match self {
            Self::Msfs2020 => "https://docs.flightsimulator.com/html/Programming_Tools/",
            Self::Msfs2024 => "https://docs.flightsimulator.com/msfs2024/html/6_Programming_APIs/",
        }
    }

    pub fn events_path(self) -> &'static str {
        match self {
            Self::Msfs2020 => "Event_IDs/",
            Self::Msfs2024 => "Key_Events/",
        }
    }

    pub fn events_index(self) -> &'static str {
        match self {
            Self::Msfs2020 => "Event_IDs.htm",
            Self::Msfs2024 => "Key_Events.htm",
        }
    }

    pub fn events_index_heading(self) -> &'static str {
        match self {
            Self::Msfs2020 => "EVENT IDs",
            Self::Msfs2024 => "KEY EVENTS",
        }
    }

    /// Header holding the KEY_* macros, relative to the SDK root.
    pub fn key_header_path(self) -> &'static str {
        match self {
            Self::Msfs2020 => "WASM/include/MSFS/legacy/gauges.h",
            Self::Msfs2024 => "WASM/include/MSFS/Types/MSFS_EventsEnum.h",
        }
    }

    pub fn sdk_env_var(self) -> &'static str {
        match self {
            Self::Msfs2020 => "MSFS_SDK",
            Self::Msfs2024 => "MSFS2024_SDK",
        }
    }

    /// `LIKE` pattern over `KeyEventIDs.SDK_VERSION` selecting macros from this edition's SDK.
    pub fn sdk_version_pattern(self) -> &'static str {
        match self {
            Self::Msfs2020 => "0.%",
            Self::Msfs2024 => "%",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
