//! Git adapter for source checkout.
//!
//! A thin wrapper that turns clone and submodule steps into structured
//! commands for a [`CommandRunner`].

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::core::resolve::RunParams;
use crate::error::ExecError;
use crate::io::process::{CommandOutput, CommandRunner, CommandSpec};

/// Directory (relative to the workdir) the code is cloned into.
pub const CHECKOUT_DIR: &str = "ufs-weather-model";

/// Git commands run in a fixed working directory.
#[derive(Debug)]
pub struct Git<'r, R: ?Sized> {
    runner: &'r R,
    workdir: PathBuf,
}

impl<'r, R: CommandRunner + ?Sized> Git<'r, R> {
    pub fn new(runner: &'r R, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    /// Clone a single branch of `url` into `dest` (relative to the workdir).
    #[instrument(skip_all, fields(branch = %branch, url = %url))]
    pub fn clone_branch(&self, url: &str, branch: &str, dest: &str) -> Result<(), ExecError> {
        debug!(branch, url, dest, "cloning");
        self.run(&["clone", "-v", "-b", branch, url, dest])?;
        Ok(())
    }

    pub fn submodule_sync(&self) -> Result<(), ExecError> {
        self.run(&["submodule", "sync"])?;
        Ok(())
    }

    pub fn submodule_update_recursive(&self) -> Result<(), ExecError> {
        self.run(&["submodule", "update", "--init", "--recursive"])?;
        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput, ExecError> {
        let spec = CommandSpec::new("git")
            .args(args.iter().copied())
            .current_dir(&self.workdir);
        self.runner.run(&spec)
    }
}

/// Clone the selected branch into `<workdir>/ufs-weather-model` and
/// initialize its submodules recursively. Returns the checkout path.
#[instrument(skip_all, fields(fork = %params.fork, branch = %params.branch))]
pub fn checkout_code<R: CommandRunner + ?Sized>(
    runner: &R,
    params: &RunParams,
    workdir: &Path,
) -> Result<PathBuf, ExecError> {
    info!(branch = %params.branch, url = %params.url, "cloning branch");
    Git::new(runner, workdir).clone_branch(&params.url, &params.branch, CHECKOUT_DIR)?;

    let checkout = workdir.join(CHECKOUT_DIR);
    info!("checking out submodules");
    let git = Git::new(runner, &checkout);
    git.submodule_sync()?;
    git.submodule_update_recursive()?;
    Ok(checkout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<CommandSpec>>,
        fail_on: Option<&'static str>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
            self.calls.borrow_mut().push(spec.clone());
            if let Some(sub) = self.fail_on
                && spec.args.first().map(String::as_str) == Some(sub)
            {
                return Err(ExecError::Failed {
                    command: spec.display(),
                    code: Some(128),
                    stdout: String::new(),
                    stderr: "fatal".to_string(),
                });
            }
            Ok(CommandOutput::default())
        }
    }

    fn params() -> RunParams {
        RunParams {
            fork: "emc".to_string(),
            branch: "develop".to_string(),
            url: "https://github.com/ufs-community/ufs-weather-model".to_string(),
            system: "hera".to_string(),
            compiler: "intel".to_string(),
            project: "gmtb".to_string(),
            rtconfig: "rt.conf".to_string(),
            keep: false,
            email: "someone@example.org".to_string(),
        }
    }

    #[test]
    fn checkout_clones_then_initializes_submodules() {
        let runner = RecordingRunner::default();
        let workdir = Path::new("/tmp/regtest_x");

        let checkout = checkout_code(&runner, &params(), workdir).expect("checkout");
        assert_eq!(checkout, workdir.join(CHECKOUT_DIR));

        let calls = runner.calls.borrow();
        let rendered: Vec<String> = calls.iter().map(CommandSpec::display).collect();
        assert_eq!(
            rendered,
            vec![
                "git clone -v -b develop https://github.com/ufs-community/ufs-weather-model ufs-weather-model",
                "git submodule sync",
                "git submodule update --init --recursive",
            ]
        );
        assert_eq!(calls[0].cwd.as_deref(), Some(workdir));
        assert_eq!(calls[1].cwd.as_deref(), Some(checkout.as_path()));
        assert_eq!(calls[2].cwd.as_deref(), Some(checkout.as_path()));
    }

    #[test]
    fn clone_failure_stops_before_submodules() {
        let runner = RecordingRunner {
            fail_on: Some("clone"),
            ..RecordingRunner::default()
        };
        let err = checkout_code(&runner, &params(), Path::new("/tmp/regtest_x")).expect_err("fail");
        assert!(matches!(err, ExecError::Failed { code: Some(128), .. }));
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn submodule_failure_propagates() {
        let runner = RecordingRunner {
            fail_on: Some("submodule"),
            ..RecordingRunner::default()
        };
        let err = checkout_code(&runner, &params(), Path::new("/tmp/regtest_x")).expect_err("fail");
        assert!(err.command().starts_with("git submodule sync"));
        assert_eq!(runner.calls.borrow().len(), 2);
    }
}
