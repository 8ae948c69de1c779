//! Error types for snapshot loading and editing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, editing or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("snapshot path must be a .json file or a directory: {}", .0.display())]
    UnsupportedPath(PathBuf),

    #[error("work hours must be between 0 and {max}, got {hours}")]
    Hours { hours: u32, max: u32 },

    #[error("user '{user}' is not a member of board '{board}'")]
    NotMember { board: String, user: String },

    #[error("no card at list {list}, position {card} on board '{board}'")]
    UnknownCard {
        board: String,
        list: usize,
        card: usize,
    },
}

impl SnapshotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
