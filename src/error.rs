//! Error types shared by the vector algebra, item memories and the codec.

/// Errors raised by mapscript operations.
///
/// Interference-driven mismatches (a clean-up resolving to the wrong entry)
/// are not errors; they surface as low similarity scores on decoded nodes.
#[derive(Debug, thiserror::Error)]
pub enum VsaError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("'{name}' not found in item memory '{memory}'")]
    NotFound { memory: String, name: String },

    #[error("'{name}' already exists in item memory '{memory}'")]
    DuplicateKey { memory: String, name: String },

    #[error("item memory '{memory}' is empty")]
    EmptyMemory { memory: String },

    #[error("cannot bundle an empty set of vectors")]
    EmptyBundle,

    #[error("{level} decoding did not reach the end marker within {cap} iterations")]
    IterationCapExceeded { level: String, cap: usize },

    #[error("unknown role label: {0}")]
    UnknownRoleLabel(String),

    #[error("invalid script: {0}")]
    InvalidScript(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for mapscript operations.
pub type Result<T> = std::result::Result<T, VsaError>;

impl VsaError {
    /// Helper for the common dimension check.
    pub fn check_dim(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(VsaError::DimensionMismatch { expected, actual })
        }
    }
}
