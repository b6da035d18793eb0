//! Linear stages of a regression-test run.

use std::fmt;

/// Where a run is. Stages only move forward; an error ends the run at the
/// stage it was in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    ArgsResolved,
    WorkdirCreated,
    CodeCheckedOut,
    TestsRun,
    LogEvaluated,
    CleanedUp,
    Retained,
}

impl Stage {
    /// Terminal stage given whether cleanup removed the workdir.
    pub fn after_cleanup(removed: bool) -> Self {
        if removed {
            Stage::CleanedUp
        } else {
            Stage::Retained
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::ArgsResolved => "args-resolved",
            Stage::WorkdirCreated => "workdir-created",
            Stage::CodeCheckedOut => "code-checked-out",
            Stage::TestsRun => "tests-run",
            Stage::LogEvaluated => "log-evaluated",
            Stage::CleanedUp => "cleaned-up",
            Stage::Retained => "retained",
        };
        f.write_str(name)
    }
}
