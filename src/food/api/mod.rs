pub mod logmeal;
pub mod traits;

pub use logmeal::LogMealClient;
pub use traits::NutritionAnalyzer;
