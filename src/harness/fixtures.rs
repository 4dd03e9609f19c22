//! Fixture discovery inside a single test directory
//!
//! A fixture is found by its canonical name first (`test.sdw`, `expected.ll`).
//! Failing that, any regular file with the right extension is accepted. When
//! several files qualify, the lexicographically smallest name wins, so the
//! choice does not depend on the order the filesystem lists entries in.

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::config::{FixtureSpec, HarnessConfig};
use super::errors::HarnessError;

/// Which of the two fixtures of a test case is being looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    Source,
    Expected,
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureKind::Source => write!(f, "source"),
            FixtureKind::Expected => write!(f, "expected"),
        }
    }
}

/// One test directory with its fixtures resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Directory base name, used in reports
    pub name: String,
    pub directory: PathBuf,
    pub source: PathBuf,
    pub expected: PathBuf,
    /// Transient artifact written by the compiler
    pub result: PathBuf,
}

impl TestCase {
    /// Resolve both fixtures of `directory`.
    pub fn resolve(directory: &Path, config: &HarnessConfig) -> Result<Self, HarnessError> {
        let source = locate(directory, &config.source, FixtureKind::Source)?;
        let expected = locate_excluding(
            directory,
            &config.expected,
            FixtureKind::Expected,
            Some(OsStr::new(&config.result_file_name)),
        )?;

        Ok(Self {
            name: case_name(directory),
            directory: directory.to_path_buf(),
            source,
            expected,
            result: directory.join(&config.result_file_name),
        })
    }
}

/// The name a test directory is reported under.
pub fn case_name(directory: &Path) -> String {
    directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| directory.display().to_string())
}

/// Find `fixture` in `directory`.
pub fn locate(directory: &Path, fixture: &FixtureSpec, kind: FixtureKind) -> Result<PathBuf, HarnessError> {
    locate_excluding(directory, fixture, kind, None)
}

/// Find `fixture` in `directory`, never falling back to the file named `excluded`.
pub fn locate_excluding(
    directory: &Path,
    fixture: &FixtureSpec,
    kind: FixtureKind,
    excluded: Option<&OsStr>,
) -> Result<PathBuf, HarnessError> {
    let files = list_files(directory)?;

    let canonical = OsStr::new(&fixture.canonical_name);
    if files.iter().any(|name| name.as_os_str() == canonical) {
        return Ok(directory.join(&fixture.canonical_name));
    }

    let mut candidates: Vec<&PathBuf> = files
        .iter()
        .filter(|name| Some(name.as_os_str()) != excluded)
        .filter(|name| name.extension().is_some_and(|ext| ext == fixture.extension.as_str()))
        .collect();
    candidates.sort();

    match candidates.first() {
        Some(name) => {
            if candidates.len() > 1 {
                tracing::debug!(
                    directory = %directory.display(),
                    picked = %name.display(),
                    candidates = candidates.len(),
                    "several {kind} candidates, picking the first by name"
                );
            }
            Ok(directory.join(name))
        }
        None => Err(HarnessError::Discovery {
            directory: directory.to_path_buf(),
            kind,
            canonical_name: fixture.canonical_name.clone(),
            extension: fixture.extension.clone(),
        }),
    }
}

/// Names of the regular files directly inside `directory`.
fn list_files(directory: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let entries = fs::read_dir(directory).map_err(|e| HarnessError::io(directory, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HarnessError::io(directory, e))?;
        if entry.path().is_file() {
            files.push(PathBuf::from(entry.file_name()));
        }
    }
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    fn source_spec() -> FixtureSpec {
        FixtureSpec::new("test.sdw", "sdw")
    }

    #[test]
    fn test_locate_prefers_canonical_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "aaa.sdw");
        touch(dir.path(), "test.sdw");

        let found = locate(dir.path(), &source_spec(), FixtureKind::Source).unwrap();
        assert_eq!(found, dir.path().join("test.sdw"));
    }

    #[test]
    fn test_locate_falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "program.sdw");
        touch(dir.path(), "notes.txt");

        let found = locate(dir.path(), &source_spec(), FixtureKind::Source).unwrap();
        assert_eq!(found, dir.path().join("program.sdw"));
    }

    #[test]
    fn test_locate_fallback_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "zeta.sdw");
        touch(dir.path(), "alpha.sdw");
        touch(dir.path(), "mid.sdw");

        for _ in 0..3 {
            let found = locate(dir.path(), &source_spec(), FixtureKind::Source).unwrap();
            assert_eq!(found, dir.path().join("alpha.sdw"));
        }
    }

    #[test]
    fn test_locate_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested.sdw")).unwrap();

        let err = locate(dir.path(), &source_spec(), FixtureKind::Source).unwrap_err();
        assert!(err.is_discovery());
    }

    #[test]
    fn test_locate_missing_fixture_is_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "test.sdw");

        let err = locate(dir.path(), &FixtureSpec::new("expected.ll", "ll"), FixtureKind::Expected).unwrap_err();
        match err {
            HarnessError::Discovery { directory, kind, .. } => {
                assert_eq!(directory, dir.path());
                assert_eq!(kind, FixtureKind::Expected);
            }
            other => panic!("expected discovery error, got {other:?}"),
        }
    }

    #[test]
    fn test_locate_excluding_skips_result_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "result.ll");

        let spec = FixtureSpec::new("expected.ll", "ll");
        let err = locate_excluding(dir.path(), &spec, FixtureKind::Expected, Some(OsStr::new("result.ll")));
        assert!(err.unwrap_err().is_discovery());

        touch(dir.path(), "golden.ll");
        let found =
            locate_excluding(dir.path(), &spec, FixtureKind::Expected, Some(OsStr::new("result.ll"))).unwrap();
        assert_eq!(found, dir.path().join("golden.ll"));
    }

    #[test]
    fn test_resolve_test_case() {
        let dir = tempfile::tempdir().unwrap();
        let case_dir = dir.path().join("case_a");
        fs::create_dir(&case_dir).unwrap();
        touch(&case_dir, "test.sdw");
        touch(&case_dir, "expected.ll");

        let case = TestCase::resolve(&case_dir, &HarnessConfig::default()).unwrap();
        assert_eq!(case.name, "case_a");
        assert_eq!(case.source, case_dir.join("test.sdw"));
        assert_eq!(case.expected, case_dir.join("expected.ll"));
        assert_eq!(case.result, case_dir.join("result.ll"));
    }

    #[test]
    fn test_fixture_kind_display() {
        assert_eq!(FixtureKind::Source.to_string(), "source");
        assert_eq!(FixtureKind::Expected.to_string(), "expected");
    }
}
