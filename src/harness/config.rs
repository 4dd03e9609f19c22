//! Harness configuration
//!
//! Defaults mirror the layout of the Shadow compiler repository: blocks live in
//! `tests/`, the compiler is run through `cargo run` from the repository root,
//! and each test directory holds `test.sdw` and `expected.ll`.

use std::env;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

/// Environment variable overriding the compiler command (program and arguments, whitespace separated).
pub const COMPILER_ENV_VAR: &str = "SDW_COMPILER";

/// Exit code of a panicking Rust program, propagated by `cargo run`.
pub const PANIC_EXIT_CODE: i32 = 101;

/// A fixture file: the preferred file name, and the extension accepted as fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSpec {
    pub canonical_name: String,
    pub extension: String,
}

impl FixtureSpec {
    pub fn new(canonical_name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            extension: extension.into(),
        }
    }
}

/// The external compiler: a program and the arguments placed before the fixture paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CompilerCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Split a command line on whitespace. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    /// Read the command from `SDW_COMPILER`, if set and non-blank.
    pub fn from_env() -> Option<Self> {
        env::var(COMPILER_ENV_VAR).ok().and_then(|line| Self::parse(&line))
    }
}

impl Default for CompilerCommand {
    fn default() -> Self {
        // Everything after `--` goes to the compiler binary, not to cargo
        Self::new("cargo").with_arg("run").with_arg("--quiet").with_arg("--")
    }
}

/// What to do with a test directory that lacks a source or expected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MissingFixturePolicy {
    /// Stop the whole run with a fatal error
    #[default]
    Abort,
    /// Report the directory as one failed test case and keep going
    Fail,
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory whose top-level subdirectories are the blocks
    pub tests_dir: PathBuf,
    /// Working directory for the compiler (defaults to the parent of `tests_dir`)
    pub project_root: Option<PathBuf>,
    /// Compiler invocation
    pub compiler: CompilerCommand,
    /// Source program fixture
    pub source: FixtureSpec,
    /// Expected artifact fixture
    pub expected: FixtureSpec,
    /// Name of the transient artifact written next to the fixtures
    pub result_file_name: String,
    /// Compiler exit code treated as a crash
    pub fatal_exit_code: i32,
    /// Handling of directories without fixtures
    pub missing_fixture: MissingFixturePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            tests_dir: PathBuf::from("tests"),
            project_root: None,
            compiler: CompilerCommand::default(),
            source: FixtureSpec::new("test.sdw", "sdw"),
            expected: FixtureSpec::new("expected.ll", "ll"),
            result_file_name: "result.ll".to_string(),
            fatal_exit_code: PANIC_EXIT_CODE,
            missing_fixture: MissingFixturePolicy::Abort,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory holding the blocks
    pub fn with_tests_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tests_dir = dir.into();
        self
    }

    /// Set the compiler working directory
    pub fn with_project_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_root = Some(dir.into());
        self
    }

    /// Set the compiler command
    pub fn with_compiler(mut self, compiler: CompilerCommand) -> Self {
        self.compiler = compiler;
        self
    }

    /// Set the missing fixture policy
    pub fn with_missing_fixture(mut self, policy: MissingFixturePolicy) -> Self {
        self.missing_fixture = policy;
        self
    }

    /// The directory the compiler runs in.
    pub fn project_root(&self) -> PathBuf {
        if let Some(root) = &self.project_root {
            return root.clone();
        }
        match self.tests_dir.parent() {
            Some(parent) if parent != Path::new("") => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fixture_names() {
        let config = HarnessConfig::default();
        assert_eq!(config.source, FixtureSpec::new("test.sdw", "sdw"));
        assert_eq!(config.expected, FixtureSpec::new("expected.ll", "ll"));
        assert_eq!(config.result_file_name, "result.ll");
    }

    #[test]
    fn test_default_fatal_exit_code() {
        assert_eq!(HarnessConfig::default().fatal_exit_code, 101);
    }

    #[test]
    fn test_default_policy_aborts() {
        assert_eq!(HarnessConfig::default().missing_fixture, MissingFixturePolicy::Abort);
    }

    #[test]
    fn test_default_compiler_is_cargo_run() {
        let compiler = CompilerCommand::default();
        assert_eq!(compiler.program, "cargo");
        assert_eq!(compiler.args, ["run", "--quiet", "--"]);
    }

    #[test]
    fn test_project_root_is_parent_of_tests_dir() {
        let config = HarnessConfig::new().with_tests_dir("/repo/tests");
        assert_eq!(config.project_root(), PathBuf::from("/repo"));
    }

    #[test]
    fn test_project_root_of_relative_tests_dir() {
        let config = HarnessConfig::new().with_tests_dir("tests");
        assert_eq!(config.project_root(), PathBuf::from("."));
    }

    #[test]
    fn test_project_root_override() {
        let config = HarnessConfig::new().with_tests_dir("/repo/tests").with_project_root("/elsewhere");
        assert_eq!(config.project_root(), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_compiler_command_parse() {
        let cmd = CompilerCommand::parse("  target/debug/sdw   --emit llvm ").unwrap();
        assert_eq!(cmd.program, "target/debug/sdw");
        assert_eq!(cmd.args, ["--emit", "llvm"]);
        assert!(CompilerCommand::parse("   ").is_none());
    }
}
