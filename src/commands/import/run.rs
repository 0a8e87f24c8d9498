use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};

use super::context::ImportContext;
use super::{events, keyids, simvars, units};
use crate::cli::ImportArgs;
use crate::commands::report;
use crate::edition::Edition;
use crate::model::ImportRunManifest;
use crate::source::DocSource;
use crate::store::open_database;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

/// Added to the exit status when a run stops on an unexpected error.
pub(super) const UNEXPECTED_ERROR_PENALTY: usize = 100;

/// Which tasks one run performs, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct ImportPlan {
    /// `Some(empty)` imports every system page; otherwise only the listed pages.
    pub events: Option<Vec<String>>,
    pub simvars: Option<Vec<String>>,
    pub units: bool,
    pub key_ids: bool,
    pub report: bool,
}

impl ImportPlan {
    pub fn from_args(args: &ImportArgs) -> Self {
        let defaults = args.import_defaults();
        Self {
            events: args.events.clone().or_else(|| defaults.then(Vec::new)),
            simvars: args.simvars.clone().or_else(|| defaults.then(Vec::new)),
            units: args.units,
            key_ids: args.keyids,
            report: args.ev_report,
        }
    }

    pub fn task_names(&self) -> Vec<String> {
        let mut tasks = Vec::new();
        for (kind, pages) in [("events", &self.events), ("simvars", &self.simvars)] {
            match pages {
                Some(pages) if pages.is_empty() => tasks.push(kind.to_string()),
                Some(pages) => tasks.extend(pages.iter().map(|page| format!("{kind}:{page}"))),
                None => {}
            }
        }
        if self.units {
            tasks.push("units".to_string());
        }
        if self.key_ids {
            tasks.push("keyids".to_string());
        }
        if self.report {
            tasks.push("ev_report".to_string());
        }
        tasks
    }
}

pub fn run(args: ImportArgs) -> Result<usize> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("import-{}", utc_compact_string(started_ts));

    let edition = Edition::from_fs24(args.fs24);
    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| edition.docs_base_url().to_string());
    let plan = ImportPlan::from_args(&args);
    info!(
        run_id = %run_id,
        edition = %edition,
        base_url = %base_url,
        db = %args.db.db_path.display(),
        tasks = ?plan.task_names(),
        "starting import"
    );

    let connection = open_database(&args.db.db_path)?;
    let source = DocSource::new(Duration::from_secs(args.timeout_secs), args.cache_dir.clone())?;
    let mut ctx = ImportContext::new(connection, Box::new(source), edition, &base_url, args.drop)?;

    let sdk_path = plan
        .key_ids
        .then(|| keyids::resolve_sdk_path(args.sdk_path.as_deref(), edition))
        .flatten();

    let mut failures = 0;
    let status = match execute(&mut ctx, &plan, sdk_path.as_deref(), &mut failures) {
        Ok(()) if failures == 0 => "completed",
        Ok(()) => "completed_with_failures",
        Err(err) => {
            error!(error = %err, "import stopped on an unexpected error");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            ctx.warnings.push(format!("unexpected error: {err:#}"));
            failures += UNEXPECTED_ERROR_PENALTY;
            "failed"
        }
    };

    info!(
        status,
        failures,
        pages = ctx.counts.pages_requested,
        pages_failed = ctx.counts.pages_failed,
        key_events = ctx.counts.key_events_imported,
        simvars = ctx.counts.simvars_imported,
        units = ctx.counts.units_imported,
        key_ids = ctx.counts.key_ids_imported,
        warnings = ctx.warnings.len(),
        "import finished"
    );

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = ImportRunManifest {
            manifest_version: 1,
            run_id,
            edition: edition.to_string(),
            status: status.to_string(),
            started_at,
            updated_at: now_utc_string(),
            db_path: args.db.db_path.display().to_string(),
            base_url: ctx.base_url.clone(),
            tasks: plan.task_names(),
            failures,
            counts: ctx.counts.clone(),
            warnings: ctx.warnings.clone(),
        };
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote import manifest");
    }

    Ok(failures)
}

/// Runs the planned tasks in order, adding isolated failures to `failures`.
/// An `Err` is an unexpected error; work committed before it stays committed.
pub(super) fn execute(
    ctx: &mut ImportContext,
    plan: &ImportPlan,
    sdk_path: Option<&Path>,
    failures: &mut usize,
) -> Result<()> {
    match plan.events.as_deref() {
        Some([]) => *failures += events::import_all(ctx)?,
        Some(pages) => *failures += events::import_pages(ctx, pages)?,
        None => {}
    }

    match plan.simvars.as_deref() {
        Some([]) => *failures += simvars::import_all(ctx)?,
        Some(pages) => *failures += simvars::import_pages(ctx, pages)?,
        None => {}
    }

    if plan.units {
        *failures += units::import(ctx)?;
    }

    if plan.key_ids {
        *failures += keyids::import(ctx, sdk_path)?;
    }

    if plan.report && *failures == 0 {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        *failures += report::write_report(&ctx.connection, ctx.edition, &mut out)?;
    }

    Ok(())
}
