use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Labeled data unfit for training (too few examples, missing class,
    /// unfitted component misuse)
    #[error("Data error: {0}")]
    Data(String),

    /// Invalid configuration value, rejected before any computation
    #[error("Config error: {0}")]
    Config(String),

    /// Artifact path does not exist
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Artifact bytes exist but cannot be decoded
    #[error("Artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    /// Artifact decoded but its fingerprint does not match its own schema
    #[error("Model integrity error: {0}")]
    ModelIntegrity(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            PipelineError::Data(_) => "DATA_ERROR",
            PipelineError::Config(_) => "CONFIG_ERROR",
            PipelineError::ArtifactNotFound(_) => "ARTIFACT_NOT_FOUND",
            PipelineError::ArtifactCorrupt(_) => "ARTIFACT_CORRUPT",
            PipelineError::ModelIntegrity(_) => "MODEL_INTEGRITY_ERROR",
            PipelineError::Io(_) => "IO_ERROR",
            PipelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller can recover by retraining or falling back to an
    /// older artifact
    pub fn is_artifact_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ArtifactNotFound(_)
                | PipelineError::ArtifactCorrupt(_)
                | PipelineError::ModelIntegrity(_)
        )
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Internal(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PipelineError>;
