//! Error taxonomy for the storage engine.

use std::{fmt, path::PathBuf};

/// Which level of the Game -> Collection -> Deck hierarchy an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Top-level game.
    Game,
    /// Collection inside a game.
    Collection,
    /// Deck inside a collection.
    Deck,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Game => "game",
            EntityKind::Collection => "collection",
            EntityKind::Deck => "deck",
        })
    }
}

/// Transport-level status a caller should report for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHint {
    /// The request itself was wrong (400).
    BadRequest,
    /// Nothing to return; polling clients treat this as non-fatal (204).
    NoContent,
    /// Storage is in a state the caller cannot fix (500).
    InternalError,
}

impl StatusHint {
    /// Numeric HTTP status code for the hint.
    pub fn code(self) -> u16 {
        match self {
            StatusHint::BadRequest => 400,
            StatusHint::NoContent => 204,
            StatusHint::InternalError => 500,
        }
    }
}

/// Every failure the repositories can report.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The name (or deck type) derives to an empty id.
    #[error("bad name: {0:?}")]
    BadName(String),
    /// A sibling with the same id is already stored.
    #[error("{0} exist")]
    AlreadyExists(EntityKind),
    /// No descriptor file for the requested entity.
    #[error("{0} not exists")]
    NotExists(EntityKind),
    /// The entity exists but has no sidecar image.
    #[error("{0} image not exists")]
    ImageNotExists(EntityKind),
    /// Image bytes did not match any accepted format.
    #[error("unknown image type")]
    UnknownImageType,
    /// Underlying read, write, move or listing failure.
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        /// Path the operation touched.
        path: PathBuf,
        /// OS error.
        #[source]
        source: std::io::Error,
    },
    /// Descriptor could not be (de)serialised.
    #[error("invalid descriptor {}: {source}", path.display())]
    Json {
        /// Descriptor path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// Image fetch failed.
    #[error("failed to download {url}: {source}")]
    Network {
        /// Source URL.
        url: String,
        /// Transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StorageError::Json {
            path: path.into(),
            source,
        }
    }

    /// Status the transport layer should map this error to.
    pub fn status(&self) -> StatusHint {
        match self {
            StorageError::NotExists(_) | StorageError::ImageNotExists(_) => StatusHint::NoContent,
            StorageError::Io { .. } | StorageError::Json { .. } => StatusHint::InternalError,
            _ => StatusHint::BadRequest,
        }
    }

    /// True when the error reports a missing entity of exactly `kind`.
    pub fn is_not_exists(&self, kind: EntityKind) -> bool {
        matches!(self, StorageError::NotExists(k) if *k == kind)
    }
}

/// Result alias used throughout the crate.
pub type StorageResult<T> = Result<T, StorageError>;
