use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub const DEFAULT_DB_PATH: &str = "./MSFS_SDK_Doc_Import.sqlite3";

#[derive(Parser, Debug)]
#[command(
    name = "msfs-docimport",
    version,
    about = "Import MSFS SDK documentation (Key Events, SimVars, units, KEY_* macros) into SQLite"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape documentation pages and/or SDK headers into the database.
    Import(ImportArgs),
    /// Write table contents to stdout as tab-delimited text.
    Export(ExportArgs),
    /// Compare documented Key Events against imported KEY_* macros.
    Report(ReportArgs),
    /// Show row counts and the last import of each table.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// SQLite database file; tables are created when missing.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Drop and recreate the tables of the imported item types first.
    #[arg(long, default_value_t = false)]
    pub drop: bool,

    /// Import Key Events. Optional values name single system pages (file name without `.htm`).
    #[arg(short = 'e', long, num_args = 0.., value_name = "URL_PATH")]
    pub events: Option<Vec<String>>,

    /// Import SimVars. Optional values name single system pages, e.g. `Aircraft_SimVars/Aircraft_Fuel_Variables`.
    #[arg(short = 'v', long, num_args = 0.., value_name = "URL_PATH")]
    pub simvars: Option<Vec<String>>,

    /// Import SimVar units.
    #[arg(short = 'u', long, default_value_t = false)]
    pub units: bool,

    /// Import KEY_* macro names and ids from the SDK headers.
    #[arg(short = 'k', long, default_value_t = false)]
    pub keyids: bool,

    /// Import from the MSFS 2024 edition of the documentation/SDK.
    #[arg(long, default_value_t = false)]
    pub fs24: bool,

    /// MSFS SDK root for --keyids. Defaults to $MSFS_SDK or $MSFS2024_SDK.
    #[arg(long)]
    pub sdk_path: Option<PathBuf>,

    /// Override the documentation base URL (or a local mirror directory).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Cache fetched pages in this directory.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Write a JSON summary of the run.
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Run the Key Event report after a successful import. On its own, only the report runs.
    #[arg(long, default_value_t = false)]
    pub ev_report: bool,
}

impl ImportArgs {
    /// True when neither an item type nor the report was selected explicitly.
    pub fn import_defaults(&self) -> bool {
        self.events.is_none()
            && self.simvars.is_none()
            && !self.units
            && !self.keyids
            && !self.ev_report
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportTable {
    Events,
    Simvars,
    Units,
    Keyids,
    Meta,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[arg(value_enum, required = true, num_args = 1..)]
    pub tables: Vec<ExportTable>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[arg(long, default_value_t = false)]
    pub fs24: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub db: DbArgs,
}
