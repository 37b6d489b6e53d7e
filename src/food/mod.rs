pub mod analysis;
pub mod api;
pub mod capture;
pub mod config;
pub mod details;
pub mod error;
pub mod handoff;
pub mod models;

pub use analysis::{AnalysisProgressController, ControllerPhase, ProgressTiming};
pub use api::{LogMealClient, NutritionAnalyzer};
pub use capture::{CaptureBackend, FileSystemBackend, ImageSource, PreprocessOptions};
pub use handoff::{NavigationParams, Navigator};
pub use models::{AnalysisOutcome, AnalysisProgressState, CapturedImage, FailureReason, NutritionRecord};
