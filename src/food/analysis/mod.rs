pub mod nutrition;
pub mod progress;

pub use nutrition::normalize_nutrition;
pub use progress::{AnalysisProgressController, ControllerPhase, ProgressTiming};
