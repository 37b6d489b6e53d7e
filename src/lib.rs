pub mod commands;
pub mod config;
pub mod food;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use config::AppConfig;
pub use food::{AnalysisProgressController, CapturedImage, LogMealClient, NutritionRecord};
