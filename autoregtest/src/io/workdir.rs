//! Per-run scratch directory: creation and conditional removal.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info, instrument};

use crate::core::resolve::RunParams;
use crate::error::{Error, Result};

/// Timestamp format shared by workdir and log names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Name prefix of a run's workdir. A random suffix is appended on creation.
pub fn workdir_prefix(started: NaiveDateTime, params: &RunParams) -> String {
    format!(
        "regtest_ufs_weather_model_{}_{}_{}_{}_",
        params.fork,
        params.branch.replace('/', "-"),
        params.compiler,
        started.format(TIMESTAMP_FORMAT)
    )
}

/// Create a uniquely named directory under `parent`.
///
/// The directory outlives this call; removing it is up to [`cleanup`].
#[instrument(skip_all, fields(parent = %parent.display()))]
pub fn create_workdir(
    parent: &Path,
    started: NaiveDateTime,
    params: &RunParams,
) -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(&workdir_prefix(started, params))
        .tempdir_in(parent)
        .map_err(|source| Error::io("create temporary directory in", parent, source))?
        .keep();
    info!(workdir = %dir.display(), "set up temporary directory");
    Ok(dir)
}

/// Remove `workdir` when the run succeeded and the caller did not ask to keep
/// it. Returns whether it was removed.
#[instrument(skip_all, fields(workdir = %workdir.display(), success = success, keep = keep))]
pub fn cleanup(success: bool, keep: bool, workdir: &Path) -> Result<bool> {
    if !success || keep {
        debug!("keeping temporary directory");
        return Ok(false);
    }
    debug!("deleting temporary directory");
    fs::remove_dir_all(workdir)
        .map_err(|source| Error::io("delete temporary directory", workdir, source))?;
    Ok(true)
}
