//! Compiler invocation
//!
//! The compiler is an opaque subprocess. It is called with two positional
//! arguments, the source program and the path to write the artifact to, and
//! only its exit code and standard error are kept. The [`Compiler`] trait lets
//! tests stand in a fake that writes canned artifacts.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::config::CompilerCommand;
use super::errors::HarnessError;

/// Exit status and diagnostics of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn exited(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stderr: stderr.into(),
        }
    }

    /// Whether this run means the compiler itself crashed.
    pub fn is_fault(&self, fatal_exit_code: i32) -> bool {
        self.exit_code.is_none_or(|code| code == fatal_exit_code)
    }
}

/// Something that turns a source program into an artifact file.
pub trait Compiler {
    /// Compile `source`, writing the artifact to `artifact`.
    fn compile(&self, source: &Path, artifact: &Path) -> Result<ExecutionResult, HarnessError>;
}

/// Runs the configured compiler command as a child process.
pub struct ProcessCompiler {
    command: CompilerCommand,
    working_dir: PathBuf,
}

impl ProcessCompiler {
    pub fn new(command: CompilerCommand, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            working_dir: working_dir.into(),
        }
    }
}

impl Compiler for ProcessCompiler {
    #[tracing::instrument(skip_all, fields(source = %source.display()))]
    fn compile(&self, source: &Path, artifact: &Path) -> Result<ExecutionResult, HarnessError> {
        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(source)
            .arg(artifact)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|error| HarnessError::Spawn {
                program: self.command.program.clone(),
                error,
            })?;

        let result = ExecutionResult {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(exit_code = ?result.exit_code, "compiler finished");
        Ok(result)
    }
}

/// Turn a crashed compiler run into a [`HarnessError::CompilerFault`].
///
/// Every other exit code is passed through; the artifact contents decide the verdict.
pub fn check_fault(
    result: ExecutionResult,
    source: &Path,
    fatal_exit_code: i32,
) -> Result<ExecutionResult, HarnessError> {
    if result.is_fault(fatal_exit_code) {
        return Err(HarnessError::CompilerFault {
            input: source.to_path_buf(),
            exit_code: result.exit_code,
            stderr: result.stderr,
        });
    }
    Ok(result)
}
