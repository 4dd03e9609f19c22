//! CLI module for the sdw-tester harness
//!
//! ## Usage
//!
//! - `sdw-tester` - run every block under `tests/`
//! - `sdw-tester '*'` - same as above
//! - `sdw-tester lexer parser` - run the named blocks, in order
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::harness::{CompilerCommand, HarnessConfig, HarnessError, MissingFixturePolicy, fatal_banner};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// A fatal harness error; test failures never produce this
    pub const FATAL: ExitCode = ExitCode(-1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a fatal error (exit code -1).
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FATAL)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<HarnessError> for CliError {
    fn from(error: HarnessError) -> Self {
        CliError::fatal(fatal_banner(&error))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Golden-file test runner for the Shadow compiler
#[derive(Parser, Debug)]
#[command(name = "sdw-tester")]
#[command(version = VERSION)]
#[command(about = "Run automated golden-file tests for the Shadow compiler", long_about = None)]
pub struct Cli {
    /// Blocks to run; '*' or no block runs every block
    #[arg(value_name = "BLOCK")]
    pub blocks: Vec<String>,

    /// Directory whose subdirectories are the blocks
    #[arg(long, value_name = "DIR", default_value = "tests")]
    pub tests_dir: PathBuf,

    /// Working directory for the compiler (default: parent of the tests directory)
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Compiler program (default: $SDW_COMPILER, else `cargo run --quiet --`)
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<String>,

    /// Argument passed to the compiler before the fixture paths (repeatable)
    #[arg(long = "compiler-arg", value_name = "ARG", requires = "compiler", allow_hyphen_values = true)]
    pub compiler_args: Vec<String>,

    /// What to do with a test directory missing its source or expected file
    #[arg(long, value_enum, value_name = "POLICY", default_value_t = MissingFixturePolicy::Abort)]
    pub on_missing_fixture: MissingFixturePolicy,

    /// Show compiler exit code and stderr for failing tests
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the harness configuration these arguments describe.
    pub fn config(&self) -> HarnessConfig {
        let compiler = match &self.compiler {
            Some(program) => CompilerCommand {
                program: program.clone(),
                args: self.compiler_args.clone(),
            },
            None => CompilerCommand::from_env().unwrap_or_default(),
        };

        let mut config = HarnessConfig::new()
            .with_tests_dir(&self.tests_dir)
            .with_compiler(compiler)
            .with_missing_fixture(self.on_missing_fixture);
        if let Some(root) = &self.project_root {
            config = config.with_project_root(root);
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the parsed command line and return the exit code.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.config();
    tracing::debug!(?config, "resolved harness configuration");
    commands::run_tests(&config, &cli.blocks, cli.verbose)
}

// ============================================================================
// Tests
// ============================================================================
