use thiserror::Error;

/// Failures raised at the persistence seam. Tree computations never fail.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),
}
