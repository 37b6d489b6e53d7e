use super::handoff::NavigationParams;

const DEFAULT_FOOD_NAME: &str = "Pancakes with blueberries & syrup";
const DEFAULT_CALORIES: f64 = 615.0;
const DEFAULT_CARBS: f64 = 93.0;
const DEFAULT_PROTEIN: f64 = 11.0;
const DEFAULT_FAT: f64 = 21.0;

/// What the details view shows, rebuilt from handoff parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodDetails {
    pub image_uri: Option<String>,
    pub food_name: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroTotals {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
}

impl FoodDetails {
    /// Missing or unparsable values fall back to the screen defaults.
    pub fn from_params(params: &NavigationParams) -> Self {
        let number = |key: &str, default: f64| {
            params
                .get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        };

        Self {
            image_uri: params.get("imageUri").filter(|u| !u.is_empty()).cloned(),
            food_name: params
                .get("foodName")
                .filter(|n| !n.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_FOOD_NAME.to_string()),
            calories: number("calories", DEFAULT_CALORIES),
            carbs: number("carbs", DEFAULT_CARBS),
            protein: number("protein", DEFAULT_PROTEIN),
            fat: number("fat", DEFAULT_FAT),
            quantity: 1,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Adjusts the serving count; it never drops below one.
    pub fn change_quantity(&mut self, delta: i32) -> u32 {
        let next = (self.quantity as i64 + delta as i64).max(1);
        self.quantity = next.min(u32::MAX as i64) as u32;
        self.quantity
    }

    pub fn totals(&self) -> MacroTotals {
        let q = self.quantity as f64;
        MacroTotals {
            calories: self.calories * q,
            carbs: self.carbs * q,
            protein: self.protein * q,
            fat: self.fat * q,
        }
    }
}
