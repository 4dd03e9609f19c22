#![forbid(unsafe_code)]
//! Golden-file regression harness for the Shadow (`.sdw`) compiler
//!
//! Test cases are grouped into blocks, one per compiler phase. Each case is a
//! directory holding a source program and the artifact the compiler is expected
//! to produce for it. The harness runs every case through the compiler and
//! reports which artifacts match.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `harness` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod harness;

pub use harness::{BlockSummary, HarnessConfig, HarnessError, run_block, run_blocks};
