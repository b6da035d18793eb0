//! Pass/fail classification of a harness log and the notification it yields.

use std::path::Path;

/// Literal the harness prints once every regression test has passed.
pub const SUCCESS_MARKER: &str = "REGRESSION TEST WAS SUCCESSFUL";

/// Overall outcome of a harness run.
///
/// A missing marker and a log truncated by a crashed harness are the same
/// `Failed` verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
}

impl Verdict {
    pub fn from_log(contents: &str) -> Self {
        if contents.contains(SUCCESS_MARKER) {
            Verdict::Passed
        } else {
            Verdict::Failed
        }
    }

    pub fn is_success(self) -> bool {
        self == Verdict::Passed
    }
}

/// Email subject and body for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Inputs needed to word a notification.
#[derive(Debug, Clone, Copy)]
pub struct NotificationContext<'a> {
    pub system: &'a str,
    pub compiler: &'a str,
    pub keep: bool,
    pub log_path: &'a Path,
    pub workdir: &'a Path,
}

/// Compose the notification for `verdict`.
///
/// The run directory is mentioned whenever it will still exist afterwards.
pub fn compose(verdict: Verdict, ctx: &NotificationContext<'_>) -> Notification {
    let target = format!("{}/{}", ctx.system, ctx.compiler);
    let log = ctx.log_path.display();
    let workdir = ctx.workdir.display();
    match (verdict, ctx.keep) {
        (Verdict::Passed, true) => Notification {
            subject: format!("{target}: regression tests passed"),
            body: format!(
                "Regression tests passed, see regression test log {log} and run directory {workdir}."
            ),
        },
        (Verdict::Passed, false) => Notification {
            subject: format!("{target}: regression tests passed"),
            body: format!("Regression tests passed, see regression test log {log}."),
        },
        (Verdict::Failed, _) => Notification {
            subject: format!("{target}: regression tests did NOT PASS"),
            body: format!(
                "Regression tests did NOT PASS, check latest regression test log {log} and run directory {workdir}"
            ),
        },
    }
}
