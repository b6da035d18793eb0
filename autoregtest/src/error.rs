//! Error types for regression-test runs.
//!
//! Configuration errors are raised before any external command runs.
//! Execution errors come from the process executor and carry everything the
//! failed command produced. Local filesystem failures carry the path involved.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for a regression-test run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Execution(#[from] ExecError),

    #[error("{context} {}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

/// Invalid fork/branch/system/compiler selection, or an unusable catalog.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid fork '{0}'")]
    UnknownFork(String),

    #[error("invalid branch '{branch}' of fork '{fork}'")]
    UnknownBranch { fork: String, branch: String },

    #[error("invalid system '{0}'")]
    UnknownSystem(String),

    #[error("invalid compiler '{compiler}' for system '{system}'")]
    UnknownCompiler { system: String, compiler: String },

    #[error("no default regression test config for compiler '{compiler}' on system '{system}'")]
    MissingRtConfig { system: String, compiler: String },

    #[error("read catalog {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse catalog {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

/// An external command that could not be run or exited non-zero.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("write input to `{command}`")]
    Stdin {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("open output log {} for `{command}`", .path.display())]
    OutputLog {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "execution of `{command}` failed, exit code {}\n    stdout: \"{stdout}\"\n    stderr: \"{stderr}\"",
        exit_code_label(.code)
    )]
    Failed {
        command: String,
        /// `None` when the process was terminated by a signal.
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl ExecError {
    /// Rendered command line of the failed invocation.
    pub fn command(&self) -> &str {
        match self {
            ExecError::Spawn { command, .. }
            | ExecError::Stdin { command, .. }
            | ExecError::OutputLog { command, .. }
            | ExecError::Failed { command, .. } => command,
        }
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
