//! Scripted command runner for exercising a full run without git, the
//! harness or a mail client.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use crate::core::verdict::SUCCESS_MARKER;
use crate::error::ExecError;
use crate::io::harness::{HARNESS, TEST_DIR};
use crate::io::process::{CommandOutput, CommandRunner, CommandSpec, OutputTarget};

/// Simulates the external collaborators of a run and records every command.
///
/// - `git clone ... <dest>` creates `<cwd>/<dest>/tests/`.
/// - the harness writes the scripted log to its redirect target.
/// - everything else (submodules, mail) succeeds silently.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    harness_log: String,
    fail_on: Option<(String, i32)>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    /// Harness log ends with the success marker.
    pub fn passing() -> Self {
        Self::with_harness_log(format!(
            "+ ./rt.sh -l rt.conf\nTest 001 fv3_control PASS\n\n{SUCCESS_MARKER}\n"
        ))
    }

    /// Harness log reports a failed test and no marker.
    pub fn failing() -> Self {
        Self::with_harness_log("Test 001 fv3_control FAIL\n\nREGRESSION TEST FAILED\n")
    }

    pub fn with_harness_log(log: impl Into<String>) -> Self {
        Self {
            harness_log: log.into(),
            ..Self::default()
        }
    }

    /// Make commands whose rendered form starts with `prefix` exit with `code`.
    pub fn fail_on(mut self, prefix: impl Into<String>, code: i32) -> Self {
        self.fail_on = Some((prefix.into(), code));
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines, in invocation order.
    pub fn rendered(&self) -> Vec<String> {
        self.calls.borrow().iter().map(CommandSpec::display).collect()
    }

    fn simulate(&self, spec: &CommandSpec) -> std::io::Result<()> {
        let cwd = spec.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
        if spec.program == "git" && spec.args.first().map(String::as_str) == Some("clone") {
            if let Some(dest) = spec.args.last() {
                fs::create_dir_all(cwd.join(dest).join(TEST_DIR))?;
            }
        } else if spec.program.ends_with(HARNESS)
            && let OutputTarget::File(path) = &spec.output
        {
            fs::write(path, &self.harness_log)?;
        }
        Ok(())
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        self.calls.borrow_mut().push(spec.clone());
        let command = spec.display();

        if let Some((prefix, code)) = &self.fail_on
            && command.starts_with(prefix.as_str())
        {
            return Err(ExecError::Failed {
                command,
                code: Some(*code),
                stdout: String::new(),
                stderr: "scripted failure".to_string(),
            });
        }

        self.simulate(spec)
            .map_err(|source| ExecError::Spawn { command, source })?;
        Ok(CommandOutput::default())
    }
}
