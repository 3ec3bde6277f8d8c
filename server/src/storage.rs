//! Whole-file reads and writes of `username=score` backing files
//!
//! Writes overwrite the target in place. There is no temporary file and
//! rename step, so a crash in the middle of a write can leave a truncated
//! file behind.

use crate::error::{RankingError, Result};
use shared::{decode_records, encode_records, ScoreRecord};
use std::io;
use std::path::Path;

/// Reads and decodes a whole backing file.
///
/// I/O failures become `Load` errors and bad content `Malformed`, both
/// naming `path`.
pub async fn read_records(path: &Path) -> Result<Vec<ScoreRecord>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RankingError::Load {
            path: path.to_path_buf(),
            source,
        })?;

    decode_records(&text).map_err(|source| RankingError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Encodes `records` below a `# header` line and overwrites `path` with them
pub async fn write_records<'a, I>(path: &Path, header: &str, records: I) -> Result<()>
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    let text = encode_records(header, records);
    tokio::fs::write(path, text)
        .await
        .map_err(|source| RankingError::Persist {
            path: path.to_path_buf(),
            source,
        })
}

/// Creates `path` as an empty file unless it already exists.
///
/// Returns true if the file was created.
pub async fn create_if_missing(path: &Path) -> Result<bool> {
    let created = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await;

    match created {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(source) => Err(RankingError::Persist {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.data");
        let records = vec![ScoreRecord::new("alice", 50), ScoreRecord::new("bob", 30)];

        write_records(&path, "test", &records).await.unwrap();
        assert_eq!(read_records(&path).await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.data");

        let err = read_records(&path).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_read_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.data");
        tokio::fs::write(&path, "alice=fifty\n").await.unwrap();

        let err = read_records(&path).await.unwrap_err();
        assert!(matches!(err, RankingError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_write_into_directory_fails() {
        let dir = tempfile::tempdir().unwrap();

        let none: Vec<ScoreRecord> = Vec::new();
        let err = write_records(dir.path(), "test", &none).await.unwrap_err();
        assert!(err.is_persist());
    }

    #[tokio::test]
    async fn test_create_if_missing_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.data");

        assert!(create_if_missing(&path).await.unwrap());
        tokio::fs::write(&path, "alice=5\n").await.unwrap();
        assert!(!create_if_missing(&path).await.unwrap());

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "alice=5\n");
    }
}
