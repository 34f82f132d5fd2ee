use serde::{Deserialize, Serialize};
use time::Date;

use super::iso_date;
use crate::nutrition::macros::MacroNutrients;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMealRequest {
    pub meal_description: Option<serde_json::Value>,
    #[serde(default)]
    pub is_recalculation: bool,
    #[serde(default)]
    pub previous_result: Option<MacroNutrients>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub meal_description: Option<serde_json::Value>,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
}

/// `mealDescription` as a non-blank string, or the 400 message.
pub fn description_of(value: Option<&serde_json::Value>) -> Result<&str, &'static str> {
    match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s.trim()),
        Some(serde_json::Value::String(_)) => Err("mealDescription must not be empty"),
        Some(_) => Err("mealDescription must be a string"),
        None => Err("mealDescription is required"),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub calories: u32,
    pub meals: u32,
}

impl DailyTotals {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            protein: 0,
            carbs: 0,
            fat: 0,
            calories: 0,
            meals: 0,
        }
    }

    pub fn add(&mut self, m: &MacroNutrients) {
        self.protein = self.protein.saturating_add(m.protein);
        self.carbs = self.carbs.saturating_add(m.carbs);
        self.fat = self.fat.saturating_add(m.fat);
        self.calories = self.calories.saturating_add(m.calories);
        self.meals += 1;
    }
}
