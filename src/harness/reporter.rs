//! Run reporting
//!
//! ## Reporter Trait
//!
//! The block runner reports progress through the [`Reporter`] trait so the
//! output format is separate from execution. [`ConsoleReporter`] prints the
//! human-readable report to any writer; tests capture it in a `Vec<u8>`.

use std::io::Write;

use miette::Diagnostic;

use super::block::{BlockSummary, ExecutionOutcome, RunTotals};
use super::errors::HarnessError;

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Trait for reporting harness progress.
pub trait Reporter {
    /// Called before the first test case of a block
    fn on_block_start(&mut self, name: &str);

    /// Called before a test case is compiled
    fn on_test_start(&mut self, _case: &str) {}

    /// Called once a test case has a verdict
    fn on_test_complete(&mut self, case: &str, outcome: &ExecutionOutcome);

    /// Called after the last test case of a block
    fn on_block_complete(&mut self, name: &str, summary: &BlockSummary);

    /// Called after the last block
    fn on_run_complete(&mut self, _totals: &RunTotals) {}
}

/// Default console reporter
pub struct ConsoleReporter<W: Write> {
    out: W,
    pub verbose: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write report");
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_block_start(&mut self, name: &str) {
        let rule = rule();
        self.emit(&format!("\n{rule}\nRUNNING BLOCK '{name}'\n{rule}\n\n"));
    }

    // The verdict is completed on the same line by `on_test_complete`
    fn on_test_start(&mut self, case: &str) {
        self.emit(&format!("Running test '{case}': "));
    }

    fn on_test_complete(&mut self, _case: &str, outcome: &ExecutionOutcome) {
        let verdict = if outcome.passed { "passed!" } else { "failed..." };
        let mut text = format!("{verdict}\n");

        if !outcome.passed {
            let rule = rule();
            text.push_str(&format!("\n{rule}\nUnsuccessful test's diff log:\n"));
            text.push_str(outcome.diff.trim_end());
            text.push('\n');
            if self.verbose {
                match outcome.exit_code {
                    Some(code) => text.push_str(&format!("compiler exit code: {code}\n")),
                    None => text.push_str("compiler exit code: none\n"),
                }
                if !outcome.stderr.trim().is_empty() {
                    text.push_str("compiler stderr:\n");
                    text.push_str(outcome.stderr.trim_end());
                    text.push('\n');
                }
            }
            text.push_str(&format!("{rule}\n\n"));
        }

        self.emit(&text);
    }

    fn on_block_complete(&mut self, name: &str, summary: &BlockSummary) {
        self.emit(&format!(
            "\nBlock '{name}' finished; ({}/{})\n",
            summary.successful, summary.total
        ));
    }

    fn on_run_complete(&mut self, totals: &RunTotals) {
        if totals.blocks > 1 {
            self.emit(&format!(
                "\nAll blocks finished; ({}/{})\n",
                totals.successful, totals.total
            ));
        }
    }
}

/// Bordered banner shown when a fatal error ends the run.
pub fn fatal_banner(error: &HarnessError) -> String {
    let rule = rule();
    let mut text = format!("\n\n{rule}\nError: {error}\n");
    if let Some(help) = error.help() {
        text.push_str(&format!("help: {help}\n"));
    }
    if let Some(code) = error.code() {
        text.push_str(&format!("[{code}]\n"));
    }
    text.push_str(&rule);
    text
}
