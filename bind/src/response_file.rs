//! Response-file augmentation.
//!
//! A program at `path/to/train` may keep default arguments in
//! `path/to/train.args`. The file's whitespace-separated tokens are placed
//! *before* the explicit ones, so with last-occurrence-wins parsing an
//! explicit flag overrides the same flag from the file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BindError, Result};

/// Extension of response files.
pub const ARGS_FILE_EXTENSION: &str = "args";

/// Path of the response file belonging to `entry`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use config_schema_bind::args_file_for;
///
/// assert_eq!(args_file_for(Path::new("bin/train")), Path::new("bin/train.args"));
/// assert_eq!(args_file_for(Path::new("train.exe")), Path::new("train.args"));
/// ```
pub fn args_file_for(entry: &Path) -> PathBuf {
    entry.with_extension(ARGS_FILE_EXTENSION)
}

/// Path of the running program's entry point, if the platform reports one.
pub fn current_entry() -> Option<PathBuf> {
    std::env::args_os()
        .next()
        .filter(|arg| !arg.is_empty())
        .map(PathBuf::from)
}

/// Prepends the tokens of `entry`'s response file to `args`.
///
/// Without an entry, or when the response file does not exist, `args` is
/// returned unchanged.
///
/// # Errors
///
/// Returns [`BindError::Io`] if the response file exists but cannot be read.
pub fn augment(entry: Option<&Path>, args: Vec<String>) -> Result<Vec<String>> {
    let Some(entry) = entry else {
        return Ok(args);
    };
    let path = args_file_for(entry);

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(args),
        Err(source) => return Err(BindError::Io { path, source }),
    };

    let mut tokens: Vec<String> = contents.split_whitespace().map(String::from).collect();
    debug!(path = %path.display(), tokens = tokens.len(), "Loaded response file");
    tokens.extend(args);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prepends_file_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("train");
        std::fs::write(dir.path().join("train.args"), "--foo 1\n--bar  2.5\n").unwrap();

        let args = augment(Some(&entry), strings(&["--foo", "3"])).unwrap();
        assert_eq!(args, strings(&["--foo", "1", "--bar", "2.5", "--foo", "3"]));
    }

    #[test]
    fn test_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("train");
        let args = augment(Some(&entry), strings(&["--foo", "3"])).unwrap();
        assert_eq!(args, strings(&["--foo", "3"]));
    }

    #[test]
    fn test_no_entry_is_noop() {
        assert_eq!(augment(None, strings(&["x"])).unwrap(), strings(&["x"]));
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        std::fs::create_dir(dir.path().join("train.args")).unwrap();
        let err = augment(Some(&dir.path().join("train")), Vec::new()).unwrap_err();
        assert!(matches!(err, BindError::Io { .. }));
    }
}
