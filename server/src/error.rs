use shared::DecodeError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Failed to load ranking file {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed ranking file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to persist ranking file {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Rankings have not been loaded")]
    NotLoaded,
}

pub type Result<T> = std::result::Result<T, RankingError>;

impl RankingError {
    /// The backing file involved, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            RankingError::Load { path, .. }
            | RankingError::Malformed { path, .. }
            | RankingError::Persist { path, .. } => Some(path),
            RankingError::NotLoaded => None,
        }
    }

    /// True for failures while reading a backing file, including bad content
    pub fn is_load(&self) -> bool {
        matches!(
            self,
            RankingError::Load { .. } | RankingError::Malformed { .. }
        )
    }

    pub fn is_persist(&self) -> bool {
        matches!(self, RankingError::Persist { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RankingError::Load { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
