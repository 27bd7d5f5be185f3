//! Local staging: the readiness check an admitted file goes through before it
//! can be sent for remote processing.
//!
//! In-memory payloads are ready immediately. Path-backed files are read from
//! disk in chunks so progress can be reported, and the number of bytes read
//! must match the size recorded at admission.

use tokio::io::AsyncReadExt;

use crate::types::{FileRef, FileSource};

/// Why a file failed staging
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// The file could not be opened or read
    #[error("failed to read \"{name}\": {source}")]
    Io {
        /// File name
        name: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file changed size since it was admitted
    #[error("\"{name}\" changed size: expected {expected} bytes, read {actual}")]
    SizeMismatch {
        /// File name
        name: String,
        /// Size recorded at admission
        expected: u64,
        /// Bytes actually read
        actual: u64,
    },

    /// Staging did not finish within the configured timeout
    #[error("\"{name}\" was not ready after {after:?}")]
    TimedOut {
        /// File name
        name: String,
        /// Configured timeout
        after: std::time::Duration,
    },
}

/// Verify a file is readable in full, reporting progress percentages
///
/// `on_progress` receives cumulative percentages in [0, 100] and is always
/// called with 100 on success.
pub async fn stage_file<F>(
    file: &FileRef,
    chunk_size: usize,
    mut on_progress: F,
) -> Result<(), StagingError>
where
    F: FnMut(f32),
{
    let path = match &file.source {
        FileSource::Memory(_) => {
            on_progress(100.0);
            return Ok(());
        }
        FileSource::Path(path) => path,
    };

    let io_err = |source| StagingError::Io {
        name: file.name.clone(),
        source,
    };

    let mut handle = tokio::fs::File::open(path).await.map_err(io_err)?;
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut read_total: u64 = 0;

    loop {
        let n = handle.read(&mut buf).await.map_err(io_err)?;
        if n == 0 {
            break;
        }
        read_total += n as u64;
        if read_total > file.size {
            break;
        }
        if file.size > 0 {
            on_progress(read_total as f32 / file.size as f32 * 100.0);
        }
    }

    if read_total != file.size {
        return Err(StagingError::SizeMismatch {
            name: file.name.clone(),
            expected: file.size,
            actual: read_total,
        });
    }

    on_progress(100.0);
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_payload_is_ready_immediately() {
        let file = FileRef::from_bytes("a.pdf", "application/pdf", vec![1u8; 10]);
        let mut seen = Vec::new();

        stage_file(&file, 4, |p| seen.push(p)).await.unwrap();
        assert_eq!(seen, vec![100.0]);
    }

    #[tokio::test]
    async fn path_payload_reports_chunked_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, vec![7u8; 100]).unwrap();
        let file = FileRef::from_path(&path).await.unwrap();

        let mut seen = Vec::new();
        stage_file(&file, 25, |p| seen.push(p)).await.unwrap();

        assert!(seen.len() >= 2, "expected several progress reports: {:?}", seen);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress must not decrease");
        assert_eq!(*seen.last().unwrap(), 100.0);
    }

    #[tokio::test]
    async fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.pdf");
        std::fs::write(&path, b"abc").unwrap();
        let file = FileRef::from_path(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let result = stage_file(&file, 16, |_| {}).await;
        assert!(matches!(result, Err(StagingError::Io { .. })));
    }

    #[tokio::test]
    async fn file_changed_since_admission_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grow.pdf");
        std::fs::write(&path, b"abc").unwrap();
        let file = FileRef::from_path(&path).await.unwrap();
        std::fs::write(&path, b"abcdef").unwrap();

        match stage_file(&file, 16, |_| {}).await {
            Err(StagingError::SizeMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 3);
                assert!(actual > 3);
            }
            other => panic!("expected SizeMismatch, got: {:?}", other),
        }
    }
}
