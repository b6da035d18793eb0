//! Automated regression testing for the UFS weather model.
//!
//! One invocation clones a fork/branch into a fresh temporary directory,
//! runs the model's regression test harness, checks its log for the success
//! marker, emails the result and removes the checkout when appropriate.
//!
//! - **[`core`]**: Pure logic (catalog, resolution of selections, verdicts,
//!   notification wording, run stages).
//! - **[`io`]**: Side effects (process execution, git, harness, mail,
//!   workdir, catalog files), all external commands behind
//!   [`io::process::CommandRunner`].
//!
//! [`regtest`] strings the steps together.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod regtest;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
