//! Regression test harness invocation.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, instrument};

use crate::core::resolve::RunParams;
use crate::error::ExecError;
use crate::io::process::{CommandRunner, CommandSpec};
use crate::io::workdir::TIMESTAMP_FORMAT;

/// Directory under the checkout from which the harness runs.
pub const TEST_DIR: &str = "tests";
/// Harness script inside [`TEST_DIR`].
pub const HARNESS: &str = "rt.sh";

/// `<log_dir>/rt_<timestamp>.log` for a run started at `started`.
pub fn log_path(log_dir: &Path, started: NaiveDateTime) -> PathBuf {
    log_dir.join(format!("rt_{}.log", started.format(TIMESTAMP_FORMAT)))
}

/// The harness command for `params`, run from `test_dir`, logging to `log`.
///
/// The script is addressed by absolute path: a relative program combined
/// with a working directory resolves differently across platforms.
pub fn harness_command(params: &RunParams, test_dir: &Path, log: &Path) -> CommandSpec {
    let program = test_dir.join(HARNESS).display().to_string();
    let mut spec = CommandSpec::new(program)
        .args(["-l", params.rtconfig.as_str()])
        .current_dir(test_dir)
        .env("NEMS_MACHINE", &params.system)
        .env("NEMS_COMPILER", &params.compiler)
        .env("ACCNR", &params.project)
        .redirect_to(log);
    if params.keep {
        spec = spec.arg("-k");
    }
    spec
}

/// Run the harness inside `checkout` and return the log it wrote.
#[instrument(skip_all, fields(system = %params.system, compiler = %params.compiler))]
pub fn run_tests<R: CommandRunner + ?Sized>(
    runner: &R,
    params: &RunParams,
    checkout: &Path,
    log: PathBuf,
) -> Result<PathBuf, ExecError> {
    info!(log = %log.display(), "launching regression test");
    let spec = harness_command(params, &checkout.join(TEST_DIR), &log);
    runner.run(&spec)?;
    Ok(log)
}
