use std::collections::BTreeMap;

use log::info;

use super::models::{AnalysisOutcome, FailureReason, NutritionRecord};

pub const DETAILS_ROUTE: &str = "/food-details";
pub const ANALYSIS_ROUTE: &str = "/analysis-loading";

/// String-keyed route parameters.
pub type NavigationParams = BTreeMap<String, String>;

/// The UI shell the pipeline talks to. Calls are fire-and-forget.
pub trait Navigator: Send + Sync {
    fn push(&self, route: &str, params: NavigationParams);
    fn replace(&self, route: &str, params: NavigationParams);
    fn back(&self);
    fn alert(&self, title: &str, message: &str);
}

/// Parameters the details view reads.
pub fn details_params(image_uri: &str, record: &NutritionRecord) -> NavigationParams {
    let mut params = NavigationParams::new();
    params.insert("imageUri".to_string(), image_uri.to_string());
    params.insert("foodName".to_string(), record.food_name.clone());
    params.insert("calories".to_string(), record.calories.to_string());
    params.insert("carbs".to_string(), record.carbs.to_string());
    params.insert("protein".to_string(), record.protein.to_string());
    params.insert("fat".to_string(), record.fat.to_string());
    params
}

/// Applies a terminal outcome to the navigator: one `replace` on success,
/// one alert plus one `back` on failure.
pub fn deliver(navigator: &dyn Navigator, image_uri: &str, outcome: &AnalysisOutcome) {
    match outcome {
        AnalysisOutcome::Success(record) => {
            info!("Handing '{}' to the details view", record.food_name);
            navigator.replace(DETAILS_ROUTE, details_params(image_uri, record));
        }
        AnalysisOutcome::Failure(reason) => {
            let (title, message) = alert_text(reason);
            navigator.alert(title, message);
            navigator.back();
        }
    }
}

fn alert_text(reason: &FailureReason) -> (&'static str, &'static str) {
    match reason {
        FailureReason::InvalidImage(_) => ("Missing Image", "No valid image found to analyze."),
        FailureReason::NoImageId => (
            "Analysis Failed",
            "We couldn't recognise any food in this photo. Please try another one.",
        ),
        FailureReason::TransportError(_) => (
            "Analysis Failed",
            "Could not reach the analysis service. Please check your connection and try again.",
        ),
    }
}
