use async_trait::async_trait;

use crate::food::error::AnalysisError;
use crate::food::models::{CapturedImage, NutritionRecord};

/// Turns a captured photo into nutrition data. Implementations perform a
/// single attempt per call: no retries, no caching.
#[async_trait]
pub trait NutritionAnalyzer: Send + Sync {
    async fn analyze(&self, image: &CapturedImage) -> Result<NutritionRecord, AnalysisError>;
}
