use std::path::PathBuf;

use thiserror::Error;

use crate::player::PlayerId;

/// Errors raised by the JSON player store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data file is missing or could not be read.
    #[error("File loading error: {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data file was read but is not a valid player array.
    #[error("File loading error: {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two or more records in the data file share an id.
    #[error("JSON file contains duplicates!")]
    DuplicateRecords,

    /// The collection could not be turned into JSON.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Locking, writing or replacing the data file failed.
    #[error("File saving error: {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// True for failures that leave the registry free to start empty.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, StoreError::Read { .. } | StoreError::Parse { .. })
    }
}

/// Errors returned by registry operations. The display text of the
/// business-rule variants is matched on by callers and must not change.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Nickname is empty!")]
    EmptyNickname,

    #[error("Nickname is already in use: {0}")]
    DuplicateNickname(String),

    #[error("No such user: {0}")]
    NotFound(PlayerId),

    #[error("You cannot add negative points!")]
    NegativePoints,

    #[error("Points total would overflow for user: {0}")]
    PointsOverflow(PlayerId),

    #[error("No more player ids available!")]
    IdsExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse error classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    DuplicateNickname,
    NotFound,
    FileLoad,
    DuplicateRecords,
    Save,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::EmptyNickname
            | RegistryError::NegativePoints
            | RegistryError::PointsOverflow(_)
            | RegistryError::IdsExhausted => ErrorKind::InvalidArgument,
            RegistryError::DuplicateNickname(_) => ErrorKind::DuplicateNickname,
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::Store(e) => e.kind(),
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Read { .. } | StoreError::Parse { .. } => ErrorKind::FileLoad,
            StoreError::DuplicateRecords => ErrorKind::DuplicateRecords,
            StoreError::Serialize(_) | StoreError::Save { .. } => ErrorKind::Save,
        }
    }
}
