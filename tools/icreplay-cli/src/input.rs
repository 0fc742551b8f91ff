//! Capture loading
//!
//! The decoder never touches the filesystem. Everything that can go wrong
//! before decoding starts is reported here.

use std::io;
use std::path::{Path, PathBuf};

/// The capture could not be turned into a byte buffer
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("capture not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read capture {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("capture is empty: {0}")]
    Empty(PathBuf),
}

/// Read the whole capture into memory
pub fn load_capture(path: &Path) -> Result<Vec<u8>, InputError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => InputError::Missing(path.to_path_buf()),
        _ => InputError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if bytes.is_empty() {
        return Err(InputError::Empty(path.to_path_buf()));
    }

    tracing::info!("loaded {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// File name used to label reports
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.sgm");
        std::fs::write(&path, b"RSYN").unwrap();
        assert_eq!(load_capture(&path).unwrap(), b"RSYN");
    }

    #[test]
    fn test_missing_capture() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_capture(&dir.path().join("absent.sgm")).unwrap_err();
        assert!(matches!(err, InputError::Missing(_)));
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_capture(dir.path()).unwrap_err();
        assert!(matches!(err, InputError::Unreadable { .. }));
    }

    #[test]
    fn test_empty_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sgm");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(load_capture(&path), Err(InputError::Empty(_))));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/replays/match.sgm")), "match.sgm");
    }
}
