use serde::{Deserialize, Serialize};

/// kcal per gram of protein and carbohydrate.
pub const KCAL_PER_G_PROTEIN_CARB: f64 = 4.0;
/// kcal per gram of fat.
pub const KCAL_PER_G_FAT: f64 = 9.0;
/// kcal per gram of ethanol.
pub const KCAL_PER_G_ALCOHOL: f64 = 7.0;
/// Density of ethanol, g/ml.
pub const ETHANOL_DENSITY: f64 = 0.789;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlcoholInfo {
    /// Grams of ethanol.
    pub alcohol: f64,
}

/// Final, sanitized macro totals for a meal or a breakdown item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroNutrients {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub calories: u32,
    #[serde(
        rename = "alcohol_info",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub alcohol_info: Option<AlcoholInfo>,
}

impl MacroNutrients {
    /// Calories implied by the 4-4-9 rule, ignoring any alcohol.
    pub fn calculated_calories(&self) -> u32 {
        calories_from_macros(
            f64::from(self.protein),
            f64::from(self.carbs),
            f64::from(self.fat),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodBreakdownItem {
    pub food: String,
    #[serde(default)]
    pub estimated_amount: String,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub calories: u32,
}

pub fn calories_from_macros(protein: f64, carbs: f64, fat: f64) -> u32 {
    clamp_round(protein * KCAL_PER_G_PROTEIN_CARB + carbs * KCAL_PER_G_PROTEIN_CARB + fat * KCAL_PER_G_FAT)
}

/// Energy from the ethanol in a drink: `ml × ABV × 0.789 × 7`.
/// `abv` is a fraction (0.042 for 4.2%).
pub fn alcohol_calories(volume_ml: f64, abv: f64) -> u32 {
    clamp_round(volume_ml * abv * ETHANOL_DENSITY * KCAL_PER_G_ALCOHOL)
}

/// `max(0, round(value))`; NaN and negative values become 0.
pub fn clamp_round(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let rounded = value.round();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}
