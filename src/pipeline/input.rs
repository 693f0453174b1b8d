//! Input resolution: validate the source path and read its bytes.
//!
//! The existence check happens before anything else so a missing file fails
//! with [`Txt2MdError::FileNotFound`] instead of a generic I/O error. A
//! directory counts as "not found": only regular files are convertible.

use crate::error::Txt2MdError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` names a readable regular file.
pub async fn resolve_input(path: &Path) -> Result<PathBuf, Txt2MdError> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(Txt2MdError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Txt2MdError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if !meta.is_file() {
        return Err(Txt2MdError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!("Resolved local text file: {}", path.display());
    Ok(path.to_path_buf())
}

/// Read the whole file into memory.
pub async fn read_source(path: &Path) -> Result<Vec<u8>, Txt2MdError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => Txt2MdError::PermissionDenied {
            path: path.to_path_buf(),
        },
        ErrorKind::NotFound => Txt2MdError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Txt2MdError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Default output path for `input`: same directory, extension replaced by `.md`.
///
/// ```rust
/// use std::path::Path;
/// use txt2md::default_output_path;
///
/// assert_eq!(default_output_path("books/ch1.txt"), Path::new("books/ch1.md"));
/// ```
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension("md")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_replaces_extension() {
        assert_eq!(
            default_output_path("/home/reader/book/ch1.txt"),
            PathBuf::from("/home/reader/book/ch1.md")
        );
        assert_eq!(default_output_path("novel"), PathBuf::from("novel.md"));
        assert_eq!(default_output_path("a.b.txt"), PathBuf::from("a.b.md"));
    }

    #[test]
    fn default_output_path_keeps_windows_directory() {
        assert_eq!(default_output_path(r"C:\book\ch1.txt"), PathBuf::from(r"C:\book\ch1.md"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = resolve_input(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Txt2MdError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(dir.path()).await.unwrap_err();
        assert!(matches!(err, Txt2MdError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"abc").unwrap();

        let resolved = resolve_input(&path).await.unwrap();
        assert_eq!(read_source(&resolved).await.unwrap(), b"abc");
    }
}
