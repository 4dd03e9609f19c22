//! Golden-file harness
//!
//! Discovers test cases block by block, runs each source program through the
//! compiler and compares the artifact it writes against the checked-in
//! expectation.
//!
//! ## Modules
//!
//! - `fixtures` - locating the source and expected files of a test directory
//! - `compiler` - invoking the compiler subprocess
//! - `compare` - whitespace-tolerant comparison and diffs
//! - `block` - walking a block and tallying verdicts
//! - `reporter` - progress and summary output
//! - `config` - harness settings
//! - `errors` - fatal error kinds

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod block;
pub mod compare;
pub mod compiler;
pub mod config;
pub mod errors;
pub mod fixtures;
pub mod reporter;

pub use block::{BlockSummary, ExecutionOutcome, RunTotals, collect_block, resolve_blocks, run_block, run_blocks};
pub use compare::{Comparison, compare, compare_text, normalize};
pub use compiler::{Compiler, ExecutionResult, ProcessCompiler, check_fault};
pub use config::{CompilerCommand, FixtureSpec, HarnessConfig, MissingFixturePolicy};
pub use errors::HarnessError;
pub use fixtures::{FixtureKind, TestCase, locate};
pub use reporter::{ConsoleReporter, Reporter, fatal_banner};
