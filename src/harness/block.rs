//! Block execution
//!
//! A block is a top-level directory of the tests tree. Every directory below
//! it that holds files is one test case, at any depth; directories holding
//! only subdirectories (and hidden files) group cases and are walked through.
//! Cases run one at a time in file-name order.
//!
//! Running a case:
//! 1. Resolve the source and expected fixtures
//! 2. Compile the source into the transient result file
//! 3. Abort on a crashed compiler, otherwise compare the result to the expectation
//! 4. Delete the result file and record the verdict

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::compare::compare;
use super::compiler::{Compiler, check_fault};
use super::config::{HarnessConfig, MissingFixturePolicy};
use super::errors::HarnessError;
use super::fixtures::{TestCase, case_name};
use super::reporter::Reporter;

/// Successful and total test cases of one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockSummary {
    pub successful: usize,
    pub total: usize,
}

impl BlockSummary {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.successful += 1;
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.successful
    }
}

/// Sum of all block summaries of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub blocks: usize,
    pub successful: usize,
    pub total: usize,
}

impl RunTotals {
    pub fn add(&mut self, summary: &BlockSummary) {
        self.blocks += 1;
        self.successful += summary.successful;
        self.total += summary.total;
    }
}

/// Result of running one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// `None` if the compiler never ran or was killed by a signal
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub passed: bool,
    /// Unified diff on mismatch, or the discovery error of a malformed case
    pub diff: String,
}

impl ExecutionOutcome {
    fn malformed(error: &HarnessError) -> Self {
        Self {
            exit_code: None,
            stderr: String::new(),
            passed: false,
            diff: error.to_string(),
        }
    }
}

/// Owns the transient result file and removes it when dropped.
struct ResultFile<'a> {
    path: &'a Path,
}

impl<'a> ResultFile<'a> {
    fn claim(path: &'a Path) -> Self {
        Self { path }
    }
}

impl Drop for ResultFile<'_> {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove result file");
            }
        }
    }
}

/// List the names of every block in `tests_dir`, sorted.
pub fn list_blocks(tests_dir: &Path) -> Result<Vec<String>, HarnessError> {
    let entries = fs::read_dir(tests_dir).map_err(|e| HarnessError::io(tests_dir, e))?;

    let mut blocks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HarnessError::io(tests_dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() && !name.starts_with('.') {
            blocks.push(name);
        }
    }
    blocks.sort();
    Ok(blocks)
}

/// Expand the requested block names. No names, or `*`, means every block.
pub fn resolve_blocks(requested: &[String], tests_dir: &Path) -> Result<Vec<String>, HarnessError> {
    if requested.is_empty() {
        return list_blocks(tests_dir);
    }

    let mut blocks = Vec::new();
    for name in requested {
        if name == "*" {
            blocks.extend(list_blocks(tests_dir)?);
        } else {
            blocks.push(name.clone());
        }
    }
    Ok(blocks)
}

/// Collect the test case directories of block `name`, in run order.
pub fn collect_block(name: &str, config: &HarnessConfig) -> Result<Vec<PathBuf>, HarnessError> {
    let root = config.tests_dir.join(name);
    if !root.is_dir() {
        return Err(HarnessError::UnknownBlock {
            name: name.to_string(),
            tests_dir: config.tests_dir.clone(),
        });
    }
    let root = std::path::absolute(&root).map_err(|e| HarnessError::io(&root, e))?;

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    let mut cases = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|error| HarnessError::Walk {
            block: name.to_string(),
            error,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if is_grouping_dir(entry.path())? {
            tracing::debug!(path = %entry.path().display(), "skipping grouping directory");
            continue;
        }
        cases.push(entry.into_path());
    }
    Ok(cases)
}

/// Run every test case of block `name`.
///
/// Returns the block's tally. A crashed compiler, and under
/// [`MissingFixturePolicy::Abort`] a malformed test directory, end the walk
/// with an error instead.
#[tracing::instrument(skip(config, compiler, reporter))]
pub fn run_block(
    name: &str,
    config: &HarnessConfig,
    compiler: &dyn Compiler,
    reporter: &mut dyn Reporter,
) -> Result<BlockSummary, HarnessError> {
    reporter.on_block_start(name);

    let mut summary = BlockSummary::default();
    for directory in collect_block(name, config)? {
        let case_name = case_name(&directory);
        reporter.on_test_start(&case_name);

        let outcome = match TestCase::resolve(&directory, config) {
            Ok(case) => execute_case(&case, config, compiler)?,
            Err(err) if err.is_discovery() && config.missing_fixture == MissingFixturePolicy::Fail => {
                tracing::warn!(path = %directory.display(), "malformed test directory: {err}");
                ExecutionOutcome::malformed(&err)
            }
            Err(err) => return Err(err),
        };

        summary.record(outcome.passed);
        reporter.on_test_complete(&case_name, &outcome);
    }

    tracing::info!(successful = summary.successful, total = summary.total, "block finished");
    reporter.on_block_complete(name, &summary);
    Ok(summary)
}

/// Run `blocks` in order and return the totals.
pub fn run_blocks(
    blocks: &[String],
    config: &HarnessConfig,
    compiler: &dyn Compiler,
    reporter: &mut dyn Reporter,
) -> Result<RunTotals, HarnessError> {
    let mut totals = RunTotals::default();
    for name in blocks {
        let summary = run_block(name, config, compiler, reporter)?;
        totals.add(&summary);
    }
    reporter.on_run_complete(&totals);
    Ok(totals)
}

/// Compile and compare one resolved test case.
fn execute_case(
    case: &TestCase,
    config: &HarnessConfig,
    compiler: &dyn Compiler,
) -> Result<ExecutionOutcome, HarnessError> {
    let _result_file = ResultFile::claim(&case.result);

    tracing::debug!(source = %case.source.display(), expected = %case.expected.display(), "running test case");
    let result = compiler.compile(&case.source, &case.result)?;
    let result = check_fault(result, &case.source, config.fatal_exit_code)?;
    let comparison = compare(&case.result, &case.expected)?;

    Ok(ExecutionOutcome {
        exit_code: result.exit_code,
        stderr: result.stderr,
        passed: comparison.passed,
        diff: comparison.diff,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// A directory holding subdirectories and no visible files only groups other cases.
fn is_grouping_dir(path: &Path) -> Result<bool, HarnessError> {
    let mut has_subdirs = false;
    for entry in fs::read_dir(path).map_err(|e| HarnessError::io(path, e))? {
        let entry = entry.map_err(|e| HarnessError::io(path, e))?;
        if entry.path().is_dir() {
            has_subdirs = true;
        } else if !entry.file_name().to_string_lossy().starts_with('.') {
            return Ok(false);
        }
    }
    Ok(has_subdirs)
}
