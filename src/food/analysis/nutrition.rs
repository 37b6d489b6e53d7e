use serde_json::Value;

use crate::food::models::NutritionRecord;

pub const PLACEHOLDER_FOOD_NAME: &str = "Unnamed Dish";

// Nutrient codes used by the nutritionalInfo endpoint
const ENERGY: &str = "ENERC_KCAL";
const CARBOHYDRATE: &str = "CHOCDF";
const PROTEIN: &str = "PROCNT";
const FAT: &str = "FAT";

/// Builds a `NutritionRecord` out of a nutritionalInfo response. Any field
/// may be missing at any depth; missing data becomes a default, never an
/// error.
pub fn normalize_nutrition(data: &Value) -> NutritionRecord {
    let nutrients = data
        .get("nutritional_info")
        .and_then(|info| info.get("totalNutrients"));

    let quantity = |code: &str| -> f64 {
        nutrients
            .and_then(|n| n.get(code))
            .and_then(|n| n.get("quantity"))
            .and_then(|q| q.as_f64())
            .unwrap_or(0.0)
    };

    let nutri_score = data
        .get("image_nutri_score")
        .and_then(|s| s.get("nutri_score_standardized"))
        .and_then(|s| s.as_f64());

    NutritionRecord {
        food_name: food_name(data.get("foodName")),
        calories: quantity(ENERGY),
        carbs: quantity(CARBOHYDRATE),
        protein: quantity(PROTEIN),
        fat: quantity(FAT),
        nutri_score,
    }
}

fn food_name(value: Option<&Value>) -> String {
    let raw = match value {
        Some(Value::Array(names)) => names.first().and_then(|n| n.as_str()),
        Some(Value::String(name)) => Some(name.as_str()),
        _ => None,
    };

    raw.map(title_case)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_FOOD_NAME.to_string())
}

/// Upper-cases the first character of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
