//! Orchestration of one regression-test run.
//!
//! Steps run strictly in order: resolve selections, create the workdir,
//! check out the code, run the harness, evaluate the log and notify, clean
//! up. The first error ends the run and leaves the workdir in place.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{info, instrument};

use crate::core::catalog::Catalog;
use crate::core::resolve::{RunParams, Selection, resolve};
use crate::core::stage::Stage;
use crate::error::Result;
use crate::io::git::checkout_code;
use crate::io::harness::{log_path, run_tests};
use crate::io::notify::check_logs;
use crate::io::process::CommandRunner;
use crate::io::workdir::{cleanup, create_workdir};

/// Per-invocation environment of a run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Start time; names the workdir and the log file.
    pub started: NaiveDateTime,
    /// Directory receiving the harness log (the invocation directory).
    pub log_dir: PathBuf,
    /// Parent of the temporary workdir.
    pub scratch_root: PathBuf,
}

/// Result of a run that reached its end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub params: RunParams,
    pub workdir: PathBuf,
    pub log_path: PathBuf,
    pub success: bool,
    /// [`Stage::CleanedUp`] or [`Stage::Retained`].
    pub stage: Stage,
}

/// Run the full regression-test cycle.
///
/// Selections are validated before any external command runs.
#[instrument(skip_all, fields(fork = %selection.fork, branch = %selection.branch, system = %selection.system))]
pub fn run_regression<R: CommandRunner + ?Sized>(
    catalog: &Catalog,
    selection: &Selection,
    ctx: &RunContext,
    runner: &R,
) -> Result<RunOutcome> {
    advance(Stage::Init);
    let params = resolve(catalog, selection)?;
    info!(branch = %params.branch, fork = %params.fork, "using branch of fork");
    info!(
        system = %params.system,
        compiler = %params.compiler,
        project = %params.project,
        rtconfig = %params.rtconfig,
        "resolved run parameters"
    );
    if params.keep {
        info!("keeping run directory after successful test");
    } else {
        info!("deleting run directory after successful test (keeping it if not successful)");
    }
    advance(Stage::ArgsResolved);

    let workdir = create_workdir(&ctx.scratch_root, ctx.started, &params)?;
    advance(Stage::WorkdirCreated);

    let checkout = checkout_code(runner, &params, &workdir)?;
    advance(Stage::CodeCheckedOut);

    let log = run_tests(runner, &params, &checkout, log_path(&ctx.log_dir, ctx.started))?;
    advance(Stage::TestsRun);

    let success = check_logs(runner, &params, &workdir, &log)?;
    advance(Stage::LogEvaluated);

    let removed = cleanup(success, params.keep, &workdir)?;
    let stage = Stage::after_cleanup(removed);
    advance(stage);

    Ok(RunOutcome {
        params,
        workdir,
        log_path: log,
        success,
        stage,
    })
}

fn advance(stage: Stage) {
    info!(%stage, "stage reached");
}
