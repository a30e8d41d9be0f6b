//! State errors

use crate::snapshot::SNAPSHOT_VERSION;

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Snapshot version {0} is newer than supported (max: {SNAPSHOT_VERSION})")]
    FutureVersion(u32),
}

pub type StateResult<T> = Result<T, StateError>;
