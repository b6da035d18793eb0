//! Log evaluation and email notification.

use std::fs;
use std::path::Path;

use tracing::{error, info, instrument};

use crate::core::resolve::RunParams;
use crate::core::verdict::{Notification, NotificationContext, Verdict, compose};
use crate::error::{Error, ExecError, Result};
use crate::io::process::{CommandRunner, CommandSpec};

/// Mail client used to deliver notifications.
pub const MAIL_PROGRAM: &str = "mail";

/// Read the whole harness log and classify it.
pub fn read_verdict(log: &Path) -> Result<Verdict> {
    let contents =
        fs::read(log).map_err(|source| Error::io("read regression test log", log, source))?;
    Ok(Verdict::from_log(&String::from_utf8_lossy(&contents)))
}

/// `mail -a <log> -s <subject> <recipient>` with the body on stdin.
pub fn mail_command(
    notification: &Notification,
    attachment: &Path,
    recipient: &str,
) -> CommandSpec {
    CommandSpec::new(MAIL_PROGRAM)
        .arg("-a")
        .arg(attachment.display().to_string())
        .arg("-s")
        .arg(notification.subject.as_str())
        .arg(recipient)
        .stdin(format!("{}\n", notification.body))
}

pub fn send_notification<R: CommandRunner + ?Sized>(
    runner: &R,
    notification: &Notification,
    attachment: &Path,
    recipient: &str,
) -> std::result::Result<(), ExecError> {
    runner.run(&mail_command(notification, attachment, recipient))?;
    Ok(())
}

/// Classify the run from its log, email the outcome with the log attached,
/// and return whether the regression tests passed.
#[instrument(skip_all, fields(log = %log.display()))]
pub fn check_logs<R: CommandRunner + ?Sized>(
    runner: &R,
    params: &RunParams,
    workdir: &Path,
    log: &Path,
) -> Result<bool> {
    let verdict = read_verdict(log)?;
    let notification = compose(
        verdict,
        &NotificationContext {
            system: &params.system,
            compiler: &params.compiler,
            keep: params.keep,
            log_path: log,
            workdir,
        },
    );
    if verdict.is_success() {
        info!("{}", notification.body);
    } else {
        error!("{}", notification.body);
    }

    info!(recipient = %params.email, subject = %notification.subject, "sending notification");
    send_notification(runner, &notification, log, &params.email)?;
    Ok(verdict.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::verdict::SUCCESS_MARKER;
    use crate::io::process::CommandOutput;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MailSpy {
        sent: RefCell<Vec<CommandSpec>>,
        fail: bool,
    }

    impl CommandRunner for MailSpy {
        fn run(&self, spec: &CommandSpec) -> std::result::Result<CommandOutput, ExecError> {
            self.sent.borrow_mut().push(spec.clone());
            if self.fail {
                return Err(ExecError::Failed {
                    command: spec.display(),
                    code: Some(1),
                    stdout: String::new(),
                    stderr: "mail: cannot send message".to_string(),
                });
            }
            Ok(CommandOutput::default())
        }
    }

    fn params(keep: bool) -> RunParams {
        RunParams {
            fork: "emc".to_string(),
            branch: "develop".to_string(),
            url: "https://github.com/ufs-community/ufs-weather-model".to_string(),
            system: "hera".to_string(),
            compiler: "intel".to_string(),
            project: "gmtb".to_string(),
            rtconfig: "rt.conf".to_string(),
            keep,
            email: "someone@example.org".to_string(),
        }
    }

    #[test]
    fn passing_log_mails_success_with_attachment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let log = temp.path().join("rt_20191122T030405.log");
        fs::write(&log, format!("compile ok\n{SUCCESS_MARKER}\n")).expect("write log");
        let spy = MailSpy::default();

        let success = check_logs(&spy, &params(false), temp.path(), &log).expect("check");
        assert!(success);

        let sent = spy.sent.borrow();
        assert_eq!(sent.len(), 1);
        let mail = &sent[0];
        assert_eq!(mail.program, "mail");
        assert_eq!(
            mail.args,
            vec![
                "-a".to_string(),
                log.display().to_string(),
                "-s".to_string(),
                "hera/intel: regression tests passed".to_string(),
                "someone@example.org".to_string(),
            ]
        );
        let body = String::from_utf8(mail.stdin.clone().expect("body")).expect("utf8");
        assert_eq!(
            body,
            format!("Regression tests passed, see regression test log {}.\n", log.display())
        );
    }

    #[test]
    fn failing_log_mails_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let log = temp.path().join("rt.log");
        fs::write(&log, "test 001 failed\nREGRESSION TEST FAILED\n").expect("write log");
        let spy = MailSpy::default();

        let success = check_logs(&spy, &params(true), temp.path(), &log).expect("check");
        assert!(!success);
        assert_eq!(
            spy.sent.borrow()[0].args[3],
            "hera/intel: regression tests did NOT PASS"
        );
    }

    #[test]
    fn non_utf8_log_is_still_scanned() {
        let temp = tempfile::tempdir().expect("tempdir");
        let log = temp.path().join("rt.log");
        let mut bytes = vec![0xff, 0xfe, b'\n'];
        bytes.extend_from_slice(SUCCESS_MARKER.as_bytes());
        fs::write(&log, bytes).expect("write log");
        assert_eq!(read_verdict(&log).expect("verdict"), Verdict::Passed);
    }

    #[test]
    fn missing_log_is_an_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let spy = MailSpy::default();
        let err = check_logs(&spy, &params(false), temp.path(), &temp.path().join("none.log"))
            .expect_err("fail");
        assert!(matches!(err, Error::Io { .. }));
        assert!(spy.sent.borrow().is_empty());
    }

    #[test]
    fn mail_failure_is_an_execution_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let log = temp.path().join("rt.log");
        fs::write(&log, SUCCESS_MARKER).expect("write log");
        let spy = MailSpy {
            fail: true,
            ..MailSpy::default()
        };
        let err = check_logs(&spy, &params(false), temp.path(), &log).expect_err("fail");
        assert!(matches!(err, Error::Execution(ExecError::Failed { .. })));
    }
}
