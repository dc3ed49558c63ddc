//! Directory traversal.
//!
//! Walks a source tree in a stable order (file names sorted within each
//! directory) and picks out the C/C++ headers.

use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

/// File name suffixes treated as headers.
pub const HEADER_SUFFIXES: [&str; 2] = [".h", ".hpp"];

/// Whether `path` names a C/C++ header (`.h` or `.hpp`, case-sensitive).
///
/// Compares raw file name bytes, so names that are not valid UTF-8 still count.
#[must_use]
pub fn is_header(path: &Path) -> bool {
    path.file_name().is_some_and(|name| {
        let name = name.as_encoded_bytes();
        HEADER_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix.as_bytes()))
    })
}

/// Every non-directory entry under `root`, at any depth.
fn files(root: &Path) -> impl Iterator<Item = Result<DirEntry>> + '_ {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) => {
                // Symlinks are not followed, but a link to a directory is still a directory
                if entry.path_is_symlink() && entry.path().is_dir() {
                    return None;
                }
                trace!(path = %entry.path().display(), "Visited");
                Some(Ok(entry))
            }
            Err(e) => Some(Err(Error::walk(root, e))),
        })
}

/// Lazily yield every header path under `root`.
///
/// A missing or unreadable `root` (or subdirectory) shows up as an `Err`
/// item; callers are expected to stop at the first one.
pub fn headers(root: &Path) -> impl Iterator<Item = Result<PathBuf>> + '_ {
    files(root).filter_map(|entry| match entry {
        Ok(entry) if is_header(entry.path()) => Some(Ok(entry.into_path())),
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    })
}

/// Search `root` for a file called `name` and return the name of the folder
/// directly containing the first match.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked.
pub fn find_containing_dir(root: &Path, name: &str) -> Result<Option<String>> {
    for entry in files(root) {
        let entry = entry?;
        if entry.file_name() != name {
            continue;
        }
        let folder = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|folder| folder.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(Some(folder));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("objMesh")).unwrap();
        fs::create_dir_all(root.join("sparseSolver/internal")).unwrap();
        fs::write(root.join("top.h"), "").unwrap();
        fs::write(root.join("objMesh/objMesh.h"), "").unwrap();
        fs::write(root.join("objMesh/objMesh.cpp"), "").unwrap();
        fs::write(root.join("sparseSolver/linearSolver.hpp"), "").unwrap();
        fs::write(root.join("sparseSolver/internal/detail.h"), "").unwrap();
        fs::write(root.join("sparseSolver/internal/README"), "").unwrap();
        dir
    }

    #[test]
    fn test_is_header() {
        assert!(is_header(Path::new("a/b/foo.h")));
        assert!(is_header(Path::new("foo.hpp")));
        assert!(!is_header(Path::new("foo.cpp")));
        assert!(!is_header(Path::new("foo.hh")));
        assert!(!is_header(Path::new("foo.H")));
        assert!(!is_header(Path::new("foo.h.bak")));
        assert!(!is_header(Path::new("Makefile")));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_header_name_is_found() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"ma\xefl.h");
        assert!(is_header(Path::new(name)));
        assert!(!is_header(Path::new(OsStr::from_bytes(b"ma\xefl.c"))));

        let dir = TempDir::new().unwrap();
        // Some filesystems (e.g. APFS) refuse non-UTF-8 names
        if fs::write(dir.path().join(name), "").is_err() {
            return;
        }
        let found: Vec<PathBuf> = headers(dir.path()).collect::<Result<_>>().unwrap();
        assert_eq!(found, vec![dir.path().join(name)]);
    }

    #[test]
    fn test_headers_recurses_in_sorted_order() {
        let dir = tree();
        let found: Vec<PathBuf> = headers(dir.path())
            .collect::<Result<_>>()
            .unwrap();
        let relative: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("objMesh/objMesh.h"),
                PathBuf::from("sparseSolver/internal/detail.h"),
                PathBuf::from("sparseSolver/linearSolver.hpp"),
                PathBuf::from("top.h"),
            ]
        );
    }

    #[test]
    fn test_headers_missing_root_is_error() {
        let mut iter = headers(Path::new("/nonexistent/headerguard/libraries"));
        let first = iter.next().unwrap();
        assert!(matches!(first, Err(Error::Walk { .. })));
    }

    #[test]
    fn test_headers_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(headers(dir.path()).count(), 0);
    }

    #[test]
    fn test_find_containing_dir() {
        let dir = tree();
        assert_eq!(
            find_containing_dir(dir.path(), "detail.h").unwrap(),
            Some("internal".to_string())
        );
        assert_eq!(
            find_containing_dir(dir.path(), "objMesh.cpp").unwrap(),
            Some("objMesh".to_string())
        );
    }

    #[test]
    fn test_find_containing_dir_ignores_directories() {
        let dir = tree();
        assert_eq!(find_containing_dir(dir.path(), "internal").unwrap(), None);
    }

    #[test]
    fn test_find_containing_dir_not_found() {
        let dir = tree();
        assert_eq!(find_containing_dir(dir.path(), "missing.h").unwrap(), None);
    }

    #[test]
    fn test_find_containing_dir_missing_root() {
        let result = find_containing_dir(Path::new("/nonexistent/headerguard"), "a.h");
        assert!(result.is_err());
    }
}
