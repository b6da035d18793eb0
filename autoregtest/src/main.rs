//! Automatic regression testing for the UFS weather model.
//!
//! Checks out a fork/branch, runs the regression test harness, emails the
//! verdict with the harness log attached, and removes the checkout after a
//! successful run unless asked to keep it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use autoregtest::core::resolve::Selection;
use autoregtest::exit_codes;
use autoregtest::io::config::load_catalog;
use autoregtest::io::process::SystemRunner;
use autoregtest::logging;
use autoregtest::regtest::{RunContext, run_regression};
use chrono::Local;
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "autoregtest",
    version,
    about = "Check out, regression-test and report on a UFS weather model branch"
)]
struct Cli {
    /// Fork to use.
    #[arg(short, long)]
    fork: String,

    /// Branch to test.
    #[arg(short, long)]
    branch: String,

    /// System/machine to use.
    #[arg(short, long)]
    system: String,

    /// Compiler to use (default: the system's default compiler).
    #[arg(short, long)]
    compiler: Option<String>,

    /// Project/account to charge (default: the system's default project).
    #[arg(short, long)]
    project: Option<String>,

    /// Regression test config to use (default: per system and compiler).
    #[arg(short, long)]
    rtconfig: Option<String>,

    /// Keep the temporary directory after a successful run.
    #[arg(short, long)]
    keep: bool,

    /// Send the report to this address.
    #[arg(short, long)]
    email: Option<String>,

    /// TOML catalog of forks and systems replacing the built-in one.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset.
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl Cli {
    fn selection(&self) -> Selection {
        Selection {
            fork: self.fork.clone(),
            branch: self.branch.clone(),
            system: self.system.clone(),
            compiler: self.compiler.clone(),
            project: self.project.clone(),
            rtconfig: self.rtconfig.clone(),
            keep: self.keep,
            email: self.email.clone(),
        }
    }
}

fn main() {
    let started = Local::now().naive_local();
    let cli = Cli::parse();
    logging::init(cli.log_level.into());

    let code = match run(&cli, started) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            error!("{:#}", err);
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli, started: chrono::NaiveDateTime) -> Result<()> {
    info!("starting automatic regression test");
    let catalog = load_catalog(cli.config.as_deref())?;
    let ctx = RunContext {
        started,
        log_dir: std::env::current_dir().context("resolve invocation directory")?,
        scratch_root: std::env::temp_dir(),
    };

    let outcome = run_regression(&catalog, &cli.selection(), &ctx, &SystemRunner)?;
    info!(
        success = outcome.success,
        stage = %outcome.stage,
        log = %outcome.log_path.display(),
        "finished automatic regression test"
    );
    Ok(())
}
