//! Rewriting header files in place.
//!
//! [`HeaderRewriter`] reads each header under a root, runs it through a
//! [`GuardRewriter`] and writes the result back to the same path. Runs are
//! sequential and stop at the first I/O failure; files handled before the
//! failure keep their new content.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::guard::{GuardChange, GuardRewriter};
use crate::walker;

/// When a header is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write every header, even when its content is unchanged.
    #[default]
    Always,
    /// Write only headers whose guard was rewritten.
    Changed,
    /// Never write; report what would change.
    Check,
}

impl WriteMode {
    fn should_write(self, changed: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Changed => changed,
            Self::Check => false,
        }
    }
}

/// Outcome for a single header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Path of the header.
    pub path: PathBuf,
    /// Guard lines renamed (or that would be, in check mode).
    pub changes: Vec<GuardChange>,
    /// Whether the file was written back.
    pub written: bool,
}

impl FileReport {
    /// Whether the guard of this header was (or would be) rewritten.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Root directory that was walked.
    pub root: PathBuf,
    /// Project tag applied.
    pub tag: String,
    /// Write mode of the run.
    pub mode: WriteMode,
    /// Number of headers read.
    pub headers_scanned: usize,
    /// Number of headers whose guard was (or would be) rewritten.
    pub headers_changed: usize,
    /// Number of headers written back.
    pub headers_written: usize,
    /// Per-header outcomes, in traversal order.
    pub files: Vec<FileReport>,
}

impl RunReport {
    fn new(root: &Path, tag: &str, mode: WriteMode) -> Self {
        Self {
            root: root.to_path_buf(),
            tag: tag.to_string(),
            mode,
            headers_scanned: 0,
            headers_changed: 0,
            headers_written: 0,
            files: Vec::new(),
        }
    }

    fn record(&mut self, file: FileReport) {
        self.headers_scanned += 1;
        if file.is_changed() {
            self.headers_changed += 1;
        }
        if file.written {
            self.headers_written += 1;
        }
        self.files.push(file);
    }

    /// Headers whose guard was (or would be) rewritten.
    pub fn changed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|file| file.is_changed())
    }

    /// Render the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if a path cannot be represented as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Applies a [`GuardRewriter`] to every header in a directory tree.
#[derive(Debug, Clone)]
pub struct HeaderRewriter {
    guard: GuardRewriter,
    mode: WriteMode,
}

impl HeaderRewriter {
    /// Create a header rewriter.
    #[must_use]
    pub fn new(guard: GuardRewriter, mode: WriteMode) -> Self {
        Self { guard, mode }
    }

    /// The write mode.
    #[must_use]
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Rewrite the guard of one header in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text or cannot be
    /// written back.
    pub fn rewrite_file(&self, path: &Path) -> Result<FileReport> {
        let content = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let rewrite = self.guard.rewrite(&content);
        for change in &rewrite.changes {
            info!(path = %path.display(), "{change}");
        }

        let written = self.mode.should_write(rewrite.is_changed());
        if written {
            fs::write(path, &rewrite.content).map_err(|source| Error::WriteFile {
                path: path.to_path_buf(),
                source,
            })?;
        }
        debug!(
            path = %path.display(),
            changed = rewrite.is_changed(),
            written,
            "Processed header"
        );

        Ok(FileReport {
            path: path.to_path_buf(),
            changes: rewrite.changes,
            written,
        })
    }

    /// Rewrite every header under `root`.
    ///
    /// # Errors
    ///
    /// Returns the first traversal, read or write error; the run stops there.
    pub fn run(&self, root: &Path) -> Result<RunReport> {
        info!(root = %root.display(), tag = self.guard.tag(), mode = ?self.mode, "Rewriting include guards");

        let mut report = RunReport::new(root, self.guard.tag(), self.mode);
        for path in walker::headers(root) {
            let file = self.rewrite_file(&path?)?;
            report.record(file);
        }

        info!(
            scanned = report.headers_scanned,
            changed = report.headers_changed,
            written = report.headers_written,
            "Done"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    const UNTAGGED: &str = "#ifndef _FOO_H_\n#define _FOO_H_\nint foo();\n#endif\n";
    const TAGGED: &str = "#ifndef TAG_FOO_H\n#define TAG_FOO_H\nint foo();\n#endif\n";

    fn rewriter(mode: WriteMode) -> HeaderRewriter {
        HeaderRewriter::new(GuardRewriter::new("TAG").unwrap(), mode)
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("mesh/detail")).unwrap();
        fs::write(root.join("mesh/mesh.h"), UNTAGGED).unwrap();
        fs::write(root.join("mesh/detail/impl.hpp"), "#ifndef IMPL\n#define IMPL\n#endif\n").unwrap();
        fs::write(root.join("mesh/done.h"), TAGGED).unwrap();
        fs::write(root.join("mesh/mesh.cpp"), "#ifndef X\n#define X\n").unwrap();
        fs::write(root.join("plain.h"), "int x;\n").unwrap();
        dir
    }

    fn age(path: &Path) {
        let old = SystemTime::now() - Duration::from_secs(3600);
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(old)
            .unwrap();
    }

    fn modified(path: &Path) -> SystemTime {
        fs::metadata(path).unwrap().modified().unwrap()
    }

    #[test]
    fn test_rewrite_file_in_place() {
        init_test_logging();
        let dir = tree();
        let path = dir.path().join("mesh/mesh.h");

        let report = rewriter(WriteMode::Always).rewrite_file(&path).unwrap();

        assert!(report.is_changed());
        assert!(report.written);
        assert_eq!(report.changes.len(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), TAGGED);
    }

    #[test]
    fn test_run_rewrites_headers_only() {
        let dir = tree();
        let report = rewriter(WriteMode::Always).run(dir.path()).unwrap();

        assert_eq!(report.headers_scanned, 4);
        assert_eq!(report.headers_changed, 2);
        assert_eq!(report.headers_written, 4);
        assert_eq!(
            fs::read_to_string(dir.path().join("mesh/detail/impl.hpp")).unwrap(),
            "#ifndef TAG_IMPL\n#define TAG_IMPL\n#endif\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("mesh/mesh.cpp")).unwrap(),
            "#ifndef X\n#define X\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("plain.h")).unwrap(),
            "int x;\n"
        );
    }

    #[test]
    fn test_run_is_idempotent() {
        let dir = tree();
        rewriter(WriteMode::Always).run(dir.path()).unwrap();
        let second = rewriter(WriteMode::Always).run(dir.path()).unwrap();

        assert_eq!(second.headers_changed, 0);
        assert_eq!(
            fs::read_to_string(dir.path().join("mesh/mesh.h")).unwrap(),
            TAGGED
        );
    }

    #[test]
    fn test_always_writes_unchanged_files() {
        let dir = tree();
        let path = dir.path().join("plain.h");
        age(&path);
        let before = modified(&path);

        let report = rewriter(WriteMode::Always).rewrite_file(&path).unwrap();

        assert!(!report.is_changed());
        assert!(report.written);
        assert!(modified(&path) > before);
    }

    #[test]
    fn test_non_headers_are_not_touched() {
        let dir = tree();
        let path = dir.path().join("mesh/mesh.cpp");
        age(&path);
        let before = modified(&path);

        rewriter(WriteMode::Always).run(dir.path()).unwrap();

        assert_eq!(modified(&path), before);
    }

    #[test]
    fn test_changed_mode_skips_unchanged_files() {
        let dir = tree();
        let path = dir.path().join("mesh/done.h");
        age(&path);
        let before = modified(&path);

        let report = rewriter(WriteMode::Changed).run(dir.path()).unwrap();

        assert_eq!(report.headers_written, 2);
        assert_eq!(modified(&path), before);
        assert_eq!(
            fs::read_to_string(dir.path().join("mesh/mesh.h")).unwrap(),
            TAGGED
        );
    }

    #[test]
    fn test_check_mode_writes_nothing() {
        let dir = tree();
        let report = rewriter(WriteMode::Check).run(dir.path()).unwrap();

        assert_eq!(report.headers_changed, 2);
        assert_eq!(report.headers_written, 0);
        assert_eq!(
            fs::read_to_string(dir.path().join("mesh/mesh.h")).unwrap(),
            UNTAGGED
        );
        let changed: Vec<_> = report
            .changed_files()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            changed,
            vec![
                PathBuf::from("mesh/detail/impl.hpp"),
                PathBuf::from("mesh/mesh.h"),
            ]
        );
    }

    #[test]
    fn test_missing_root_fails() {
        let err = rewriter(WriteMode::Always)
            .run(Path::new("/nonexistent/headerguard/libraries"))
            .unwrap_err();
        assert!(matches!(err, Error::Walk { .. }));
    }

    #[test]
    fn test_non_utf8_header_aborts_run() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.h"), "#ifndef A\n#define A\n").unwrap();
        fs::write(dir.path().join("b.h"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("c.h"), "#ifndef C\n#define C\n").unwrap();

        let err = rewriter(WriteMode::Always).run(dir.path()).unwrap_err();

        assert!(matches!(err, Error::ReadFile { .. }));
        assert_eq!(err.path(), Some(dir.path().join("b.h").as_path()));
        // Files before the failure stay rewritten, files after are untouched
        assert_eq!(
            fs::read_to_string(dir.path().join("a.h")).unwrap(),
            "#ifndef TAG_A\n#define TAG_A\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("c.h")).unwrap(),
            "#ifndef C\n#define C\n"
        );
    }

    #[test]
    fn test_report_serializes() {
        let dir = tree();
        let report = rewriter(WriteMode::Check).run(dir.path()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["tag"], "TAG");
        assert_eq!(json["mode"], "check");
        assert_eq!(json["headers_changed"], 2);
        assert_eq!(json["files"][0]["changes"][0]["directive"], "ifndef");
    }

    #[test]
    fn test_report_to_json() {
        let dir = tree();
        let report = rewriter(WriteMode::Check).run(dir.path()).unwrap();
        let json = report.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["headers_scanned"], 4);
        assert!(json.contains('\n'));
    }

    #[cfg(unix)]
    #[test]
    fn test_report_to_json_rejects_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut report = RunReport::new(Path::new("root"), "TAG", WriteMode::Check);
        report.record(FileReport {
            path: PathBuf::from(OsStr::from_bytes(b"caf\xe9.h")),
            changes: Vec::new(),
            written: false,
        });

        assert!(matches!(report.to_json(), Err(Error::Json(_))));
    }

    #[test]
    fn test_write_mode_default() {
        assert_eq!(WriteMode::default(), WriteMode::Always);
    }
}
