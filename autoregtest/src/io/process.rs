//! Structured execution of external commands.
//!
//! Every external interaction (git, the harness, mail) goes through a
//! [`CommandRunner`]. Commands are argument lists with an explicit
//! environment; nothing is interpolated into a shell string.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, error, instrument};

use crate::error::ExecError;

/// Where a command's stdout and stderr go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Pipe both streams and return them.
    Capture,
    /// Append both streams to one file. Nothing is returned.
    File(PathBuf),
}

/// Description of a single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Added on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    pub stdin: Option<Vec<u8>>,
    pub output: OutputTarget,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            stdin: None,
            output: OutputTarget::Capture,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn redirect_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = OutputTarget::File(path.into());
        self
    }

    /// Shell-like rendering for logs and error messages.
    ///
    /// Environment assignments come first, then the program and its
    /// arguments, then the output redirection. Words that a shell would
    /// split are single-quoted.
    pub fn display(&self) -> String {
        let mut words: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{k}={}", quote(v)))
            .collect();
        words.push(quote(&self.program));
        words.extend(self.args.iter().map(|a| quote(a)));
        if let OutputTarget::File(path) = &self.output {
            words.push(format!("> {} 2>&1", quote(&path.display().to_string())));
        }
        words.join(" ")
    }
}

fn quote(word: &str) -> String {
    if !word.is_empty() && word.chars().all(is_plain) {
        return word.to_string();
    }
    let mut quoted = String::from("'");
    for ch in word.chars() {
        if ch == '\'' {
            quoted.push_str("'\"'\"'");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

fn is_plain(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '@' | '=')
}

/// Output of a command that exited with status zero.
///
/// Streams are lossily decoded with trailing newlines trimmed. Both are
/// empty when the command's output was redirected to a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs commands to completion.
///
/// Implementations return `Ok` only for a zero exit status. A non-zero exit
/// is an [`ExecError::Failed`] carrying the rendered command, the code and
/// both streams.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        (**self).run(spec)
    }
}

/// Runner that spawns real processes and blocks until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    #[instrument(skip_all, fields(program = %spec.program))]
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let rendered = spec.display();
        debug!(command = %rendered, "executing");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).envs(&spec.env);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        if spec.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }
        match &spec.output {
            OutputTarget::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputTarget::File(path) => {
                let (out, err) = open_output_log(path).map_err(|source| ExecError::OutputLog {
                    command: rendered.clone(),
                    path: path.clone(),
                    source,
                })?;
                cmd.stdout(out).stderr(err);
            }
        }

        let spawn_err = |source: std::io::Error| ExecError::Spawn {
            command: rendered.clone(),
            source,
        };

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(err = %e, command = %rendered, "failed to spawn command");
                return Err(spawn_err(e));
            }
        };

        // Readers start before stdin is written so a chatty child cannot fill
        // its output pipe and stall.
        let stdout_handle = child.stdout.take().map(|s| thread::spawn(move || read_stream(s)));
        let stderr_handle = child.stderr.take().map(|s| thread::spawn(move || read_stream(s)));

        // Dropping the handle after the write gives the child EOF. A write
        // error is only judged after the exit status: a child may exit
        // without reading all of its input.
        let stdin_result = match (&spec.stdin, child.stdin.take()) {
            (Some(input), Some(mut child_stdin)) => child_stdin.write_all(input),
            _ => Ok(()),
        };

        let status = child.wait().map_err(spawn_err)?;
        let stdout = join_output(stdout_handle).map_err(spawn_err)?;
        let stderr = join_output(stderr_handle).map_err(spawn_err)?;

        debug!(
            exit_code = ?status.code(),
            stdout = %stdout,
            stderr = %stderr,
            "command finished"
        );

        if !status.success() {
            return Err(ExecError::Failed {
                command: rendered,
                code: status.code(),
                stdout,
                stderr,
            });
        }
        match stdin_result {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("child exited before reading all of its input");
            }
            Err(e) => {
                error!(err = %e, command = %rendered, "failed to write command input");
                return Err(ExecError::Stdin {
                    command: rendered,
                    source: e,
                });
            }
        }
        Ok(CommandOutput {
            code: status.code().unwrap_or_default(),
            stdout,
            stderr,
        })
    }
}

fn open_output_log(path: &Path) -> std::io::Result<(File, File)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let dup = file.try_clone()?;
    Ok((file, dup))
}

fn read_stream<R: Read>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

fn join_output(
    handle: Option<thread::JoinHandle<std::io::Result<Vec<u8>>>>,
) -> std::io::Result<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| std::io::Error::other("output reader thread panicked"))??;
    Ok(String::from_utf8_lossy(&bytes)
        .trim_end_matches('\n')
        .to_string())
}
