//! Deterministic logic for a regression-test run.
//!
//! Core modules are free of I/O. They validate selections, classify harness
//! logs and word notifications, and are tested in isolation.

pub mod catalog;
pub mod resolve;
pub mod stage;
pub mod verdict;
