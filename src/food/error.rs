use thiserror::Error;

use super::models::FailureReason;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("{0} permission denied")]
    PermissionDenied(&'static str),
    #[error("Capture cancelled")]
    Cancelled,
    #[error("Capture failed: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Segmentation response did not contain an imageId")]
    NoImageId,
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API request failed with status: {0}")]
    Status(u16),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl From<AnalysisError> for FailureReason {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::NoImageId => FailureReason::NoImageId,
            AnalysisError::Transport(e) => FailureReason::TransportError(e.to_string()),
            AnalysisError::Status(code) => {
                FailureReason::TransportError(format!("status {}", code))
            }
            AnalysisError::InvalidImage(e) => FailureReason::InvalidImage(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Not a local image: {0}")]
    NotLocal(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
