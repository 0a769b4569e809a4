use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Image not found: {source_id}")]
    NotFound { source_id: String },

    #[error("Failed to decode image {source_id}: {reason}")]
    Decode { source_id: String, reason: String },

    #[error("Invalid shape for {context}: {reason}")]
    InvalidShape { context: String, reason: String },

    #[error("Feature mismatch for dataset item {item}: {reason}")]
    FeatureMismatch { item: String, reason: String },

    #[error("Failed to save debug image: {0}")]
    DebugOutput(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MatchError>;
