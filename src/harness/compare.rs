//! Whitespace-tolerant artifact comparison
//!
//! Both texts are normalized before diffing: every line is trimmed and its
//! inner whitespace runs collapse to one space, line endings become `\n`, and
//! blank lines at the end of the file are dropped. Blank lines elsewhere, and
//! every other character, stay significant.

use std::fs;
use std::io;
use std::path::Path;

use similar::TextDiff;

use super::errors::HarnessError;

/// Verdict for one produced artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub passed: bool,
    /// Unified diff from produced to expected; empty when passed
    pub diff: String,
}

/// Normalize `text` for comparison.
pub fn normalize(text: &str) -> String {
    let mut lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Compare two artifact texts.
pub fn compare_text(produced: &str, expected: &str) -> Comparison {
    compare_labeled(produced, expected, "produced", "expected")
}

fn compare_labeled(produced: &str, expected: &str, produced_label: &str, expected_label: &str) -> Comparison {
    let produced = normalize(produced);
    let expected = normalize(expected);

    if produced == expected {
        return Comparison {
            passed: true,
            diff: String::new(),
        };
    }

    let diff = TextDiff::from_lines(produced.as_str(), expected.as_str())
        .unified_diff()
        .context_radius(3)
        .header(produced_label, expected_label)
        .to_string();
    Comparison { passed: false, diff }
}

/// Read `path` as text, replacing invalid UTF-8 with U+FFFD.
fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Compare the artifact at `produced` against `expected`, then delete `produced`.
///
/// A missing artifact (the compiler exited without writing one) is a failed
/// comparison, not an error. Bytes that are not UTF-8 are compared as
/// replacement characters.
pub fn compare(produced: &Path, expected: &Path) -> Result<Comparison, HarnessError> {
    let produced_text = match read_lossy(produced) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(HarnessError::io(produced, e)),
    };
    let expected_text = read_lossy(expected).map_err(|e| HarnessError::io(expected, e))?;

    if produced_text.is_some() {
        fs::remove_file(produced).map_err(|e| HarnessError::io(produced, e))?;
    }

    let produced_label = produced.display().to_string();
    let expected_label = expected.display().to_string();

    Ok(match produced_text {
        Some(text) => compare_labeled(&text, &expected_text, &produced_label, &expected_label),
        None => {
            let comparison = compare_labeled("", &expected_text, &produced_label, &expected_label);
            Comparison {
                passed: false,
                diff: format!("no artifact was written to {produced_label}\n{}", comparison.diff),
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  define   i32 @main()\t{  \n"), "define i32 @main() {\n");
    }

    #[test]
    fn test_normalize_drops_trailing_blank_lines() {
        assert_eq!(normalize("ret i32 0\n\n   \n"), "ret i32 0\n");
        assert_eq!(normalize("ret i32 0"), "ret i32 0\n");
        assert_eq!(normalize("\n\n"), "");
    }

    #[test]
    fn test_normalize_keeps_interior_blank_lines() {
        assert_eq!(normalize("a\n\nb\n"), "a\n\nb\n");
    }

    #[test]
    fn test_crlf_matches_lf() {
        let result = compare_text(
            "define i32 @main() {\r\n  ret i32 0\r\n}\r\n",
            "define i32 @main() {\n  ret i32 0\n}\n",
        );
        assert!(result.passed);
        assert!(result.diff.is_empty());
    }

    #[test]
    fn test_trailing_spaces_and_newline_ignored() {
        let result = compare_text("ret i32 0   \n}", "ret i32 0\n}\n\n");
        assert!(result.passed);
    }

    #[test]
    fn test_token_difference_fails() {
        let result = compare_text("ret i32 0\n", "ret i32 1\n");
        assert!(!result.passed);
        assert!(result.diff.contains("-ret i32 0"));
        assert!(result.diff.contains("+ret i32 1"));
    }

    #[test]
    fn test_reordered_lines_fail() {
        let result = compare_text("a\nb\n", "b\na\n");
        assert!(!result.passed);
        assert!(!result.diff.is_empty());
    }

    #[test]
    fn test_joined_tokens_are_significant() {
        assert!(!compare_text("i32 0\n", "i320\n").passed);
    }

    #[test]
    fn test_diff_header_uses_labels() {
        let result = compare_text("a\n", "b\n");
        assert!(result.diff.starts_with("--- produced\n+++ expected\n"));
    }

    #[test]
    fn test_compare_deletes_produced_file() {
        let dir = tempfile::tempdir().unwrap();
        let produced = dir.path().join("result.ll");
        let expected = dir.path().join("expected.ll");
        fs::write(&produced, "x\n").unwrap();
        fs::write(&expected, "y\n").unwrap();

        let result = compare(&produced, &expected).unwrap();
        assert!(!result.passed);
        assert!(!produced.exists());
        assert!(expected.exists());
    }

    #[test]
    fn test_compare_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().join("expected.ll");
        fs::write(&expected, "ret void\n").unwrap();

        let result = compare(&dir.path().join("result.ll"), &expected).unwrap();
        assert!(!result.passed);
        assert!(result.diff.starts_with("no artifact was written to"));
        assert!(result.diff.contains("+ret void"));
    }

    #[test]
    fn test_compare_invalid_utf8_is_a_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let produced = dir.path().join("result.ll");
        let expected = dir.path().join("expected.ll");
        fs::write(&produced, [0x66, 0xff, 0xfe, 0x0a]).unwrap();
        fs::write(&expected, "f\n").unwrap();

        let result = compare(&produced, &expected).unwrap();
        assert!(!result.passed);
        assert!(result.diff.contains("-f\u{fffd}\u{fffd}"));
        assert!(!produced.exists());
    }

    #[test]
    fn test_compare_invalid_utf8_in_both_files_can_pass() {
        let dir = tempfile::tempdir().unwrap();
        let produced = dir.path().join("result.ll");
        let expected = dir.path().join("expected.ll");
        fs::write(&produced, b"c\xc3 \n").unwrap();
        fs::write(&expected, b"c\xc3\n").unwrap();

        assert!(compare(&produced, &expected).unwrap().passed);
    }

    #[test]
    fn test_compare_missing_expected_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let produced = dir.path().join("result.ll");
        fs::write(&produced, "x\n").unwrap();

        let err = compare(&produced, &dir.path().join("expected.ll")).unwrap_err();
        assert!(matches!(err, HarnessError::Io { .. }));
    }
}
