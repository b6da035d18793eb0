//! Side-effecting steps of a regression-test run.

pub mod config;
pub mod git;
pub mod harness;
pub mod notify;
pub mod process;
pub mod workdir;
