use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use clap::Parser;
use rusqlite::Connection;

use super::context::ImportContext;
use super::run::{ImportPlan, execute};
use super::{events, keyids, simvars, units};
use crate::cli::{Cli, Commands};
use crate::commands::report::write_report;
use crate::edition::Edition;
use crate::extract::tests::{
    ENGINE_EVENTS_PAGE, EVENTS_INDEX_PAGE, FUEL_SIMVARS_PAGE, GAUGES_HEADER, SIMVARS_INDEX_PAGE,
    UNITS_PAGE,
};
use crate::model::SupportStatus;
use crate::source::PageSource;
use crate::store::{StoreTable, count_rows, export_table, load_import_meta};

const BASE: &str = "https://docs.test";
const ENGINE_EVENTS_2020: &str = "https://docs.test/Event_IDs/Aircraft_Engine_Events.htm";
const ENGINE_EVENTS_2024: &str = "https://docs.test/Key_Events/Aircraft_Engine_Events.htm";

struct FixturePages {
    pages: HashMap<String, String>,
}

impl FixturePages {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| ((*url).to_string(), (*body).to_string()))
                .collect(),
        }
    }
}

impl PageSource for FixturePages {
    fn fetch(&self, location: &str) -> Result<String> {
        match self.pages.get(location) {
            Some(body) => Ok(body.clone()),
            None => bail!("HTTP 404 Not Found: {location}"),
        }
    }
}

fn documentation_pages() -> FixturePages {
    FixturePages::new(&[
        ("https://docs.test/Event_IDs/Event_IDs.htm", EVENTS_INDEX_PAGE),
        (ENGINE_EVENTS_2020, ENGINE_EVENTS_PAGE),
        ("https://docs.test/SimVars/Simulation_Variables.htm", SIMVARS_INDEX_PAGE),
        (
            "https://docs.test/SimVars/Aircraft_SimVars/Aircraft_Fuel_Variables.htm",
            FUEL_SIMVARS_PAGE,
        ),
        ("https://docs.test/SimVars/Simulation_Variable_Units.htm", UNITS_PAGE),
    ])
}

fn context_with(connection: Connection, pages: FixturePages, edition: Edition) -> ImportContext {
    ImportContext::new(connection, Box::new(pages), edition, BASE, false)
        .expect("context should build")
}

fn context(edition: Edition) -> ImportContext {
    let connection = Connection::open_in_memory().expect("in-memory database");
    context_with(connection, documentation_pages(), edition)
}

fn event_status(ctx: &ImportContext, name: &str) -> (String, SupportStatus, SupportStatus) {
    ctx.connection
        .query_row(
            "SELECT Description, MSFS_11, MSFS_12 FROM KeyEvents WHERE Name = ?1",
            [name],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("event row")
}

fn exported(ctx: &ImportContext, table: StoreTable) -> String {
    let mut out = Vec::new();
    export_table(&ctx.connection, table, &mut out).expect("export");
    String::from_utf8(out).expect("utf8")
}

fn write_sdk(root: &Path, header_rel: &str) {
    fs::write(root.join("version.txt"), "0.24.3.0\n").expect("version file");
    let header = root.join(header_rel);
    fs::create_dir_all(header.parent().expect("header parent")).expect("header dir");
    fs::write(header, GAUGES_HEADER).expect("header file");
}

#[test]
fn full_event_import_isolates_missing_pages() {
    let mut ctx = context(Edition::Msfs2020);

    let failures = events::import_all(&mut ctx).expect("import");

    assert_eq!(failures, 1);
    assert_eq!(ctx.counts.pages_requested, 3);
    assert_eq!(ctx.counts.pages_failed, 1);
    assert_eq!(ctx.counts.tables_found, 5);
    assert_eq!(ctx.counts.tables_skipped, 1);
    assert_eq!(ctx.counts.key_events_imported, 8);
    assert_eq!(ctx.counts.anchor_mismatches, 1);
    assert_eq!(count_rows(&ctx.connection, StoreTable::KeyEvents).expect("count"), 8);

    assert_eq!(event_status(&ctx, "THROTTLE_FULL").1, SupportStatus::Supported);
    assert_eq!(event_status(&ctx, "ENGINE_AUTO_START").1, SupportStatus::Deprecated);
    assert_eq!(event_status(&ctx, "ENGINE_PRIMER").1, SupportStatus::Deprecated);
    assert_eq!(event_status(&ctx, "THROTTLE2_SET").2, SupportStatus::Unsupported);

    let meta = load_import_meta(&ctx.connection, StoreTable::KeyEvents)
        .expect("meta")
        .expect("meta row");
    assert_eq!(meta.from_url.as_deref(), Some("https://docs.test/Event_IDs/"));
}

#[test]
fn repeated_event_import_is_a_no_op() {
    let mut ctx = context(Edition::Msfs2020);
    events::import_all(&mut ctx).expect("first import");
    let before = exported(&ctx, StoreTable::KeyEvents);

    events::import_all(&mut ctx).expect("second import");

    assert_eq!(count_rows(&ctx.connection, StoreTable::KeyEvents).expect("count"), 8);
    assert_eq!(exported(&ctx, StoreTable::KeyEvents), before);
}

#[test]
fn second_edition_adds_its_status_and_keeps_descriptions() {
    let mut ctx = context(Edition::Msfs2020);
    events::import_all(&mut ctx).expect("2020 import");

    let reworded = ENGINE_EVENTS_PAGE.replace("Set throttles max", "Set all throttles to max");
    let pages = FixturePages::new(&[(ENGINE_EVENTS_2024, reworded.as_str())]);
    let mut ctx = context_with(ctx.connection, pages, Edition::Msfs2024);
    let failures =
        events::import_pages(&mut ctx, &["Aircraft_Engine_Events".to_string()]).expect("2024 import");

    assert_eq!(failures, 0);
    assert_eq!(count_rows(&ctx.connection, StoreTable::KeyEvents).expect("count"), 8);
    assert_eq!(
        event_status(&ctx, "THROTTLE_FULL"),
        ("Set throttles max".to_string(), SupportStatus::Supported, SupportStatus::Supported)
    );
    assert_eq!(
        event_status(&ctx, "ENGINE_PRIMER"),
        ("Primer".to_string(), SupportStatus::Deprecated, SupportStatus::Deprecated)
    );

    let meta = load_import_meta(&ctx.connection, StoreTable::KeyEvents)
        .expect("meta")
        .expect("meta row");
    assert_eq!(meta.from_url.as_deref(), Some(ENGINE_EVENTS_2024));
}

#[test]
fn single_page_failure_leaves_metadata_untouched() {
    let mut ctx = context(Edition::Msfs2024);
    let failures = events::import_pages(&mut ctx, &["Nope_Events".to_string()]).expect("import");

    assert_eq!(failures, 1);
    assert_eq!(load_import_meta(&ctx.connection, StoreTable::KeyEvents).expect("meta"), None);
}

#[test]
fn simvar_import_resolves_row_shapes() {
    let mut ctx = context(Edition::Msfs2020);

    let failures = simvars::import_all(&mut ctx).expect("import");

    assert_eq!(failures, 0);
    assert_eq!(ctx.counts.simvars_imported, 6);
    assert_eq!(count_rows(&ctx.connection, StoreTable::SimVars).expect("count"), 6);

    let (description, units, indexed, status): (String, String, bool, SupportStatus) = ctx
        .connection
        .query_row(
            "SELECT Description, Units, Indexed, MSFS_11 FROM SimVars WHERE Name = ?1",
            ["FUELSYSTEM LINE FUEL LEVEL"],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .expect("carried-description row");
    assert_eq!(description, "Fuel flow through the line");
    assert_eq!(units, "Gallons");
    assert!(indexed);
    assert_eq!(status, SupportStatus::Deprecated);

    let (units, settable, component): (String, bool, bool) = ctx
        .connection
        .query_row(
            "SELECT Units, Settable, Component FROM SimVars WHERE Name = ?1",
            ["FUELSYSTEM ENGINE PRESSURE"],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("extra-column row");
    assert_eq!(units, "KPa");
    assert!(settable);
    assert!(component);

    let category: String = ctx
        .connection
        .query_row(
            "SELECT Category FROM SimVars WHERE Name = 'FUEL TANK RIGHT MAIN LEVEL'",
            [],
            |row| row.get(0),
        )
        .expect("fallback category row");
    assert_eq!(category, "Aircraft Fuel");
}

#[test]
fn unit_import_skips_unnamed_and_struct_tables() {
    let mut ctx = context(Edition::Msfs2020);

    assert_eq!(units::import(&mut ctx).expect("import"), 0);
    assert_eq!(ctx.counts.units_imported, 3);
    assert_eq!(ctx.counts.tables_skipped, 2);
    assert!(
        ctx.warnings
            .iter()
            .any(|warning| warning.contains("no apparent category name"))
    );

    let short_name: String = ctx
        .connection
        .query_row(
            "SELECT ShortName FROM SimVarUnits WHERE Name = 'degrees'",
            [],
            |row| row.get(0),
        )
        .expect("unit row");
    assert_eq!(short_name, "deg");
}

#[test]
fn key_id_import_reads_version_and_header() {
    let sdk = tempfile::tempdir().expect("temp dir");
    write_sdk(sdk.path(), Edition::Msfs2020.key_header_path());
    let mut ctx = context(Edition::Msfs2020);

    let failures = keyids::import(&mut ctx, Some(sdk.path())).expect("import");

    assert_eq!(failures, 0);
    assert_eq!(ctx.counts.key_ids_imported, 4);
    assert_eq!(ctx.counts.key_ids_unresolved, 1);
    let alias_id: i64 = ctx
        .connection
        .query_row(
            "SELECT KeyID FROM KeyEventIDs WHERE KeyName = 'SLEW_OFF_ALIAS'",
            [],
            |row| row.get(0),
        )
        .expect("alias row");
    assert_eq!(alias_id, 0x10002);

    let meta = load_import_meta(&ctx.connection, StoreTable::KeyEventIds)
        .expect("meta")
        .expect("meta row");
    assert_eq!(
        meta.from_url.as_deref(),
        Some("WASM/include/MSFS/legacy/gauges.h SDK v0.24.3.0")
    );
}

#[test]
fn key_id_import_skips_unparseable_offsets() {
    let sdk = tempfile::tempdir().expect("temp dir");
    write_sdk(sdk.path(), Edition::Msfs2020.key_header_path());
    fs::write(
        sdk.path().join(Edition::Msfs2020.key_header_path()),
        "#define KEY_SLEW_TOGGLE (KEY_ID_MIN + 1)\n#define KEY_HUGE (KEY_ID_MIN + 99999999999)\n",
    )
    .expect("header file");
    let mut ctx = context(Edition::Msfs2020);

    assert_eq!(keyids::import(&mut ctx, Some(sdk.path())).expect("import"), 0);
    assert_eq!(ctx.counts.key_ids_imported, 1);
}

#[test]
fn key_id_import_fails_the_task_on_missing_inputs() {
    let mut ctx = context(Edition::Msfs2024);
    assert_eq!(keyids::import(&mut ctx, None).expect("no sdk"), 1);

    let sdk = tempfile::tempdir().expect("temp dir");
    assert_eq!(keyids::import(&mut ctx, Some(sdk.path())).expect("no version"), 1);

    // Only the 2020 header is present.
    write_sdk(sdk.path(), Edition::Msfs2020.key_header_path());
    assert_eq!(keyids::import(&mut ctx, Some(sdk.path())).expect("no header"), 1);
    assert_eq!(count_rows(&ctx.connection, StoreTable::KeyEventIds).expect("count"), 0);
}

#[test]
fn explicit_sdk_path_wins_over_environment() {
    let explicit = Path::new("/opt/msfs-sdk");
    assert_eq!(
        keyids::resolve_sdk_path(Some(explicit), Edition::Msfs2024).as_deref(),
        Some(explicit)
    );
}

#[test]
fn event_report_lists_both_directions() {
    let sdk = tempfile::tempdir().expect("temp dir");
    write_sdk(sdk.path(), Edition::Msfs2020.key_header_path());
    let mut ctx = context(Edition::Msfs2020);

    let mut out = Vec::new();
    assert_eq!(write_report(&ctx.connection, Edition::Msfs2020, &mut out).expect("report"), 1);
    assert!(out.is_empty());

    events::import_all(&mut ctx).expect("events");
    keyids::import(&mut ctx, Some(sdk.path())).expect("key ids");
    ctx.connection
        .execute_batch(
            "CREATE TABLE PubKeyEventNameToKeyID (PublishedName TEXT, KeyName TEXT);
             INSERT INTO PubKeyEventNameToKeyID VALUES ('THROTTLE_FULL', 'SLEW_TOGGLE');",
        )
        .expect("name map");

    assert_eq!(write_report(&ctx.connection, Edition::Msfs2020, &mut out).expect("report"), 0);
    let report = String::from_utf8(out).expect("utf8");

    assert!(report.contains("Simulator Version: MSFS_11"));
    assert!(
        report
            .lines()
            .any(|line| line.starts_with("ENGINE_PRIMER ") && line.ends_with("[DEPR]"))
    );
    assert!(report.lines().any(|line| line.starts_with("THROTTLE1_SET ")));
    assert!(!report.lines().any(|line| line.starts_with("THROTTLE_FULL ")));
    assert!(
        report
            .lines()
            .any(|line| line.starts_with("\"KEY_SLEW_OFF_ALIAS\",") && line.ends_with("\"0.24.3\""))
    );
    assert!(!report.contains("KEY_SLEW_TOGGLE"));
}

#[test]
fn plan_defaults_to_events_and_simvars() {
    let cli = Cli::parse_from(["msfs-docimport", "import", "--fs24"]);
    let Commands::Import(args) = cli.command else {
        panic!("expected import command");
    };
    let plan = ImportPlan::from_args(&args);
    assert_eq!(plan.task_names(), vec!["events", "simvars"]);

    let cli = Cli::parse_from(["msfs-docimport", "import", "-v", "Camera_Variables", "-k"]);
    let Commands::Import(args) = cli.command else {
        panic!("expected import command");
    };
    let plan = ImportPlan::from_args(&args);
    assert_eq!(plan.task_names(), vec!["simvars:Camera_Variables", "keyids"]);

    let cli = Cli::parse_from(["msfs-docimport", "import", "--ev-report"]);
    let Commands::Import(args) = cli.command else {
        panic!("expected import command");
    };
    let plan = ImportPlan::from_args(&args);
    assert_eq!(plan.task_names(), vec!["ev_report"]);
}

#[test]
fn report_is_skipped_after_failures() {
    let mut ctx = context(Edition::Msfs2020);
    let plan = ImportPlan {
        events: Some(Vec::new()),
        report: true,
        ..ImportPlan::default()
    };

    let mut failures = 0;
    execute(&mut ctx, &plan, None, &mut failures).expect("execute");

    // The failed page is counted; the report would have added 1 for missing key ids.
    assert_eq!(failures, 1);
}

#[test]
fn run_imports_from_a_local_mirror_and_writes_manifest() {
    let mirror = tempfile::tempdir().expect("mirror dir");
    let root = mirror.path();
    for (rel, body) in [
        ("Event_IDs/Event_IDs.htm", EVENTS_INDEX_PAGE),
        ("Event_IDs/Aircraft_Engine_Events.htm", ENGINE_EVENTS_PAGE),
        ("SimVars/Simulation_Variables.htm", SIMVARS_INDEX_PAGE),
        ("SimVars/Aircraft_SimVars/Aircraft_Fuel_Variables.htm", FUEL_SIMVARS_PAGE),
    ] {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mirror subdir");
        fs::write(path, body).expect("mirror page");
    }

    let work = tempfile::tempdir().expect("work dir");
    let db_path = work.path().join("docs.sqlite3");
    let manifest_path = work.path().join("manifests").join("import.json");
    let cli = Cli::parse_from([
        "msfs-docimport".to_string(),
        "import".to_string(),
        "--db-path".to_string(),
        db_path.display().to_string(),
        "--base-url".to_string(),
        root.display().to_string(),
        "--manifest-path".to_string(),
        manifest_path.display().to_string(),
    ]);
    let Commands::Import(args) = cli.command else {
        panic!("expected import command");
    };

    // Aircraft_Missing_Events.htm is listed but not mirrored.
    assert_eq!(super::run(args).expect("run"), 1);

    let connection = Connection::open(&db_path).expect("database");
    assert_eq!(count_rows(&connection, StoreTable::KeyEvents).expect("count"), 8);
    assert_eq!(count_rows(&connection, StoreTable::SimVars).expect("count"), 6);

    let manifest: serde_json::Value =
        serde_json::from_slice(&fs::read(&manifest_path).expect("manifest")).expect("json");
    assert_eq!(manifest["status"], "completed_with_failures");
    assert_eq!(manifest["failures"], 1);
    assert_eq!(manifest["counts"]["pages_failed"], 1);
    assert_eq!(manifest["edition"], "msfs2020");
}
