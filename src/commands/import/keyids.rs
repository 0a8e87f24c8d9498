use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info};

use super::context::ImportContext;
use crate::edition::Edition;
use crate::extract::MacroParser;
use crate::store::{StoreTable, insert_key_macros, record_import};

const VERSION_FILE: &str = "version.txt";

/// Explicit `--sdk-path`, else the edition's SDK environment variable.
pub fn resolve_sdk_path(explicit: Option<&Path>, edition: Edition) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        env::var_os(edition.sdk_env_var())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

/// Imports the KEY_* macro block of the edition's SDK header. Missing inputs fail
/// this task only.
pub fn import(ctx: &mut ImportContext, sdk_path: Option<&Path>) -> Result<usize> {
    ctx.prepare_table(StoreTable::KeyEventIds)?;

    let Some(sdk_root) = sdk_path else {
        error!(
            env_var = ctx.edition.sdk_env_var(),
            "no MSFS SDK path given and the environment variable is not set"
        );
        return Ok(1);
    };

    let version_path = sdk_root.join(VERSION_FILE);
    let sdk_version = match fs::read_to_string(&version_path) {
        Ok(raw) => raw.trim().to_string(),
        Err(err) => {
            error!(path = %version_path.display(), error = %err, "MSFS SDK version.txt not readable");
            return Ok(1);
        }
    };

    let header_rel = ctx.edition.key_header_path();
    let header_path = sdk_root.join(header_rel);
    let header = match fs::read_to_string(&header_path) {
        Ok(text) => text,
        Err(err) => {
            error!(path = %header_path.display(), error = %err, "event definitions header not readable");
            return Ok(1);
        }
    };

    info!(
        sdk_version = %sdk_version,
        header = %header_path.display(),
        "importing KEY_* macros"
    );
    let macros = MacroParser::new()?.parse(&header);
    let outcome = insert_key_macros(&mut ctx.connection, &macros, &sdk_version)?;
    if outcome.unresolved > 0 {
        ctx.warn(format!(
            "{} key alias(es) point at unknown names and were stored with id 0",
            outcome.unresolved
        ));
    }
    ctx.counts.key_ids_imported += outcome.inserted;
    ctx.counts.key_ids_unresolved += outcome.unresolved;

    record_import(
        &ctx.connection,
        StoreTable::KeyEventIds,
        &format!("{header_rel} SDK v{sdk_version}"),
    )?;
    info!(
        parsed = macros.len(),
        inserted = outcome.inserted,
        "finished importing key event ids"
    );
    Ok(0)
}
