//! Error kinds raised while discovering, compiling and comparing test cases.
//!
//! Every variant here is fatal to the run, with one exception: a
//! [`HarnessError::Discovery`] may be downgraded to a single failed test case
//! when the harness runs with [`MissingFixturePolicy::Fail`].
//!
//! A mismatching artifact is *not* an error. It is an ordinary failed
//! [`ExecutionOutcome`](super::block::ExecutionOutcome).
//!
//! [`MissingFixturePolicy::Fail`]: super::config::MissingFixturePolicy::Fail

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use super::fixtures::FixtureKind;

/// Errors that abort a harness run.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("no {kind} file (`{canonical_name}` or `*.{extension}`) found in {}", .directory.display())]
    #[diagnostic(
        code(sdw_tester::discovery),
        help("every test directory needs one source program and one expected artifact")
    )]
    Discovery {
        directory: PathBuf,
        kind: FixtureKind,
        canonical_name: String,
        extension: String,
    },

    #[error("the compiler did not return successfully{}; output:\n\n{stderr}", exit_suffix(.exit_code))]
    #[diagnostic(
        code(sdw_tester::compiler_fault),
        help("the compiler crashed instead of reporting a diagnostic; results of this run cannot be trusted")
    )]
    CompilerFault {
        input: PathBuf,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to start compiler `{program}`: {error}")]
    #[diagnostic(
        code(sdw_tester::spawn),
        help("pass --compiler or set SDW_COMPILER to a runnable program")
    )]
    Spawn {
        program: String,
        #[source]
        error: io::Error,
    },

    #[error("block '{name}' does not exist in {}", .tests_dir.display())]
    #[diagnostic(code(sdw_tester::unknown_block), help("blocks are the top-level directories of the tests directory"))]
    UnknownBlock { name: String, tests_dir: PathBuf },

    #[error("failed to walk block '{block}': {error}")]
    #[diagnostic(code(sdw_tester::walk))]
    Walk {
        block: String,
        #[source]
        error: walkdir::Error,
    },

    #[error("I/O error on {}: {error}", .path.display())]
    #[diagnostic(code(sdw_tester::io))]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl HarnessError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            error,
        }
    }

    pub fn is_discovery(&self) -> bool {
        matches!(self, HarnessError::Discovery { .. })
    }
}

fn exit_suffix(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(" (exit code {code})"),
        None => " (terminated by signal)".to_string(),
    }
}
