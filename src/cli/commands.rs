//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io;

use crate::harness::{ConsoleReporter, HarnessConfig, ProcessCompiler, resolve_blocks, run_blocks};

use super::{CliResult, ExitCode};

/// Run the requested blocks and print the report to stdout.
///
/// Test failures are reported, not escalated: the exit code is only nonzero
/// when a fatal harness error stops the run.
pub fn run_tests(config: &HarnessConfig, requested: &[String], verbose: bool) -> CliResult<ExitCode> {
    let blocks = resolve_blocks(requested, &config.tests_dir)?;
    if blocks.is_empty() {
        tracing::warn!(tests_dir = %config.tests_dir.display(), "no blocks found");
    }

    let compiler = ProcessCompiler::new(config.compiler.clone(), config.project_root());
    let mut reporter = ConsoleReporter::new(io::stdout().lock(), verbose);

    let totals = run_blocks(&blocks, config, &compiler, &mut reporter)?;
    tracing::info!(
        blocks = totals.blocks,
        successful = totals.successful,
        total = totals.total,
        "run finished"
    );
    Ok(ExitCode::SUCCESS)
}
