use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A photo handed over by an image source. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    pub uri: String,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl CapturedImage {
    pub fn new(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Resolves the URI to a filesystem path. Accepts `file://` URLs and
    /// bare paths; anything else (empty, other schemes) yields `None`.
    pub fn local_path(&self) -> Option<PathBuf> {
        let uri = self.uri.trim();
        if uri.is_empty() {
            return None;
        }

        match url::Url::parse(uri) {
            Ok(parsed) if parsed.scheme() == "file" => parsed.to_file_path().ok(),
            // Windows drive letters parse as a one-letter scheme
            Ok(parsed) if parsed.scheme().len() > 1 => None,
            _ => Some(PathBuf::from(uri)),
        }
    }
}

/// Guess a MIME type from the file extension.
pub fn mime_for_path(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub food_name: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    /// `None` means unknown; 0 is a valid score.
    pub nutri_score: Option<f64>,
}

/// Why an analysis attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    NoImageId,
    TransportError(String),
    InvalidImage(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoImageId => write!(f, "no imageId in segmentation response"),
            FailureReason::TransportError(e) => write!(f, "transport error: {}", e),
            FailureReason::InvalidImage(e) => write!(f, "invalid image: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Success(NutritionRecord),
    Failure(FailureReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisProgressState {
    pub step_index: usize,
    pub percent: u8,
}
