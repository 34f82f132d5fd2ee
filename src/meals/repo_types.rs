use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::iso_date;
use crate::nutrition::macros::{AlcoholInfo, FoodBreakdownItem, MacroNutrients};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub original_text: String,
    pub macros: MacroNutrients,
    pub breakdown: Vec<FoodBreakdownItem>,
    pub reasoning: String,
    pub validation: String,
}

/// Everything needed to insert an entry; id and timestamp come from the store.
#[derive(Debug, Clone)]
pub struct NewMealEntry {
    pub date: Date,
    pub original_text: String,
    pub macros: MacroNutrients,
    pub breakdown: Vec<FoodBreakdownItem>,
    pub reasoning: String,
    pub validation: String,
}

/// User edit of a stored entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealEntryPatch {
    pub macros: Option<MacroNutrients>,
    pub breakdown: Option<Vec<FoodBreakdownItem>>,
}

impl MealEntryPatch {
    pub fn is_empty(&self) -> bool {
        self.macros.is_none() && self.breakdown.is_none()
    }

    /// Rejects values the `meal_entries` CHECK constraints would refuse.
    pub fn validate(&self) -> Result<(), &'static str> {
        let alcohol = self
            .macros
            .and_then(|m| m.alcohol_info)
            .map(|a| a.alcohol);
        match alcohol {
            Some(g) if !g.is_finite() || g < 0.0 => Err("alcohol_info.alcohol must be a non-negative number"),
            _ => Ok(()),
        }
    }

    pub fn apply(self, entry: &mut MealEntry) {
        if let Some(macros) = self.macros {
            entry.macros = macros;
        }
        if let Some(breakdown) = self.breakdown {
            entry.breakdown = breakdown;
        }
    }
}

#[derive(Debug, FromRow)]
pub struct MealEntryRow {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
    pub entry_date: Date,
    pub original_text: String,
    pub protein_g: i64,
    pub carbs_g: i64,
    pub fat_g: i64,
    pub calories_kcal: i64,
    pub alcohol_g: Option<f64>,
    pub breakdown: Json<Vec<FoodBreakdownItem>>,
    pub reasoning: String,
    pub validation: String,
}

// columns carry CHECK (>= 0)
fn non_negative(v: i64) -> u32 {
    u32::try_from(v).unwrap_or_default()
}

impl From<MealEntryRow> for MealEntry {
    fn from(r: MealEntryRow) -> Self {
        Self {
            id: r.id,
            timestamp: r.created_at,
            date: r.entry_date,
            original_text: r.original_text,
            macros: MacroNutrients {
                protein: non_negative(r.protein_g),
                carbs: non_negative(r.carbs_g),
                fat: non_negative(r.fat_g),
                calories: non_negative(r.calories_kcal),
                alcohol_info: r.alcohol_g.map(|alcohol| AlcoholInfo { alcohol }),
            },
            breakdown: r.breakdown.0,
            reasoning: r.reasoning,
            validation: r.validation,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::macros::{date, datetime};

    /// Stored entry with a calorie total and otherwise empty analysis.
    pub(crate) fn entry(text: &str, calories: u32) -> MealEntry {
        MealEntry {
            id: Uuid::new_v4(),
            timestamp: datetime!(2024-05-01 12:00 UTC),
            date: date!(2024 - 05 - 01),
            original_text: text.to_string(),
            macros: MacroNutrients {
                calories,
                ..MacroNutrients::default()
            },
            breakdown: Vec::new(),
            reasoning: String::new(),
            validation: String::new(),
        }
    }

    #[test]
    fn entry_serializes_dates_as_strings() {
        let e = entry("oatmeal", 300);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json["originalText"], "oatmeal");
        assert_eq!(json["macros"]["calories"], 300);
    }

    #[test]
    fn patch_replaces_only_given_fields() {
        let mut e = entry("oatmeal", 300);
        let patch = MealEntryPatch {
            macros: None,
            breakdown: Some(vec![FoodBreakdownItem {
                food: "oats".into(),
                estimated_amount: "80g".into(),
                protein: 10,
                carbs: 54,
                fat: 6,
                calories: 310,
            }]),
        };
        assert!(!patch.is_empty());
        patch.apply(&mut e);
        assert_eq!(e.macros.calories, 300);
        assert_eq!(e.breakdown.len(), 1);
    }

    #[test]
    fn patch_rejects_negative_alcohol() {
        let patch = |alcohol: f64| MealEntryPatch {
            macros: Some(MacroNutrients {
                calories: 150,
                alcohol_info: Some(AlcoholInfo { alcohol }),
                ..MacroNutrients::default()
            }),
            breakdown: None,
        };
        assert!(patch(-1.0).validate().is_err());
        assert!(patch(f64::INFINITY).validate().is_err());
        assert!(patch(14.0).validate().is_ok());
        assert!(MealEntryPatch::default().validate().is_ok());
    }

    #[test]
    fn row_conversion_clamps_and_maps_alcohol() {
        let row = MealEntryRow {
            id: Uuid::new_v4(),
            created_at: datetime!(2024-05-01 12:00 UTC),
            entry_date: date!(2024 - 05 - 01),
            original_text: "pint of stout".into(),
            protein_g: 2,
            carbs_g: 18,
            fat_g: -1,
            calories_kcal: 210,
            alcohol_g: Some(18.8),
            breakdown: Json(Vec::new()),
            reasoning: String::new(),
            validation: String::new(),
        };
        let e = MealEntry::from(row);
        assert_eq!(e.macros.fat, 0);
        assert_eq!(e.macros.alcohol_info, Some(AlcoholInfo { alcohol: 18.8 }));
    }
}
