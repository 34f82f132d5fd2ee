//! Clamping and cross-checking of AI macro estimates.
//!
//! Nothing here rejects a response. Anomalies are logged and collected as
//! informational warnings; the numbers pass through unchanged apart from
//! clamping to non-negative integers.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::macros::{
    clamp_round, AlcoholInfo, FoodBreakdownItem, MacroNutrients, KCAL_PER_G_ALCOHOL,
};
use super::parse::{RawAnalysis, RawBreakdownItem};

pub const ALCOHOL_KEYWORDS: [&str; 12] = [
    "beer",
    "wine",
    "vodka",
    "whiskey",
    "rum",
    "gin",
    "cocktail",
    "alcohol",
    "champagne",
    "mojito",
    "margarita",
    "tequila",
];

/// Reported vs 4-4-9 calories may differ by this much before it is noted.
pub const CALORIE_DIVERGENCE_KCAL: u32 = 10;
/// Breakdown vs total tolerance per macro, grams.
pub const BREAKDOWN_GRAMS_TOLERANCE: u32 = 2;
/// Breakdown vs total tolerance, kcal.
pub const BREAKDOWN_KCAL_TOLERANCE: u32 = 10;

const MAX_PROTEIN_SHARE: f64 = 0.80;
const MAX_CARBS_SHARE: f64 = 0.95;
const MAX_FAT_SHARE: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Keep the calories the model reported instead of the 4-4-9 figure.
    /// Alcoholic items always keep the reported value.
    pub trust_reported_calories: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            trust_reported_calories: true,
        }
    }
}

/// A finished analysis as returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysis {
    #[serde(flatten)]
    pub macros: MacroNutrients,
    pub breakdown: Vec<FoodBreakdownItem>,
    pub reasoning: String,
    pub validation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reused_from: Option<Uuid>,
}

pub fn contains_alcohol(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ALCOHOL_KEYWORDS.iter().any(|k| lowered.contains(k))
}

struct MacroInput {
    protein: f64,
    carbs: f64,
    fat: f64,
    reported: Option<f64>,
    alcohol_g: Option<f64>,
}

struct Reconciled {
    protein: u32,
    carbs: u32,
    fat: u32,
    calories: u32,
}

/// Steps 1-4 for one record: clamp, detect alcohol, compute 4-4-9, pick calories.
fn reconcile(
    label: &str,
    input: MacroInput,
    is_alcoholic: bool,
    options: SanitizeOptions,
    warnings: &mut Vec<String>,
) -> Reconciled {
    let protein = clamp_round(input.protein);
    let carbs = clamp_round(input.carbs);
    let fat = clamp_round(input.fat);
    let calculated = MacroNutrients {
        protein,
        carbs,
        fat,
        ..MacroNutrients::default()
    }
    .calculated_calories();

    let calories = match input.reported {
        Some(reported) => {
            let reported = clamp_round(reported);
            let diff = reported.abs_diff(calculated);
            if diff > CALORIE_DIVERGENCE_KCAL {
                if is_alcoholic {
                    info!(
                        item = label,
                        reported, calculated, "alcohol energy explains calorie difference"
                    );
                } else if options.trust_reported_calories {
                    info!(
                        item = label,
                        reported,
                        calculated,
                        "calories differ from 4-4-9, trusting AI analysis regardless"
                    );
                } else {
                    warn!(item = label, reported, calculated, "replacing reported calories with 4-4-9");
                    warnings.push(format!(
                        "{label}: calories recalculated from macros ({reported} -> {calculated} kcal)"
                    ));
                }
            }
            if is_alcoholic || options.trust_reported_calories {
                reported
            } else {
                calculated
            }
        }
        None => {
            let ethanol = input
                .alcohol_g
                .map(|g| clamp_round(g * KCAL_PER_G_ALCOHOL))
                .unwrap_or(0);
            debug!(item = label, calculated, ethanol, "no reported calories, using 4-4-9");
            calculated.saturating_add(ethanol)
        }
    };

    Reconciled {
        protein,
        carbs,
        fat,
        calories,
    }
}

fn sanitize_item(
    raw: &RawBreakdownItem,
    options: SanitizeOptions,
    warnings: &mut Vec<String>,
) -> FoodBreakdownItem {
    let r = reconcile(
        &raw.food,
        MacroInput {
            protein: raw.protein,
            carbs: raw.carbs,
            fat: raw.fat,
            reported: raw.calories,
            alcohol_g: None,
        },
        contains_alcohol(&raw.food),
        options,
        warnings,
    );
    FoodBreakdownItem {
        food: raw.food.trim().to_string(),
        estimated_amount: raw.estimated_amount.trim().to_string(),
        protein: r.protein,
        carbs: r.carbs,
        fat: r.fat,
        calories: r.calories,
    }
}

fn check_ratios(macros: &MacroNutrients, warnings: &mut Vec<String>) {
    let total = f64::from(macros.protein) + f64::from(macros.carbs) + f64::from(macros.fat);
    if total <= 0.0 {
        return;
    }
    let shares = [
        ("protein", f64::from(macros.protein) / total, MAX_PROTEIN_SHARE),
        ("carbs", f64::from(macros.carbs) / total, MAX_CARBS_SHARE),
        ("fat", f64::from(macros.fat) / total, MAX_FAT_SHARE),
    ];
    for (name, share, max) in shares {
        if share > max {
            warn!(macro_name = name, share, "implausible macro distribution");
            warnings.push(format!(
                "{name} makes up {:.0}% of macro grams, which is unusual",
                share * 100.0
            ));
        }
    }
}

fn check_breakdown_sums(
    macros: &MacroNutrients,
    breakdown: &[FoodBreakdownItem],
    warnings: &mut Vec<String>,
) {
    if breakdown.is_empty() {
        return;
    }
    let sum = |f: fn(&FoodBreakdownItem) -> u32| -> u32 {
        breakdown.iter().map(f).fold(0, u32::saturating_add)
    };
    let checks = [
        ("protein", sum(|i| i.protein), macros.protein, BREAKDOWN_GRAMS_TOLERANCE),
        ("carbs", sum(|i| i.carbs), macros.carbs, BREAKDOWN_GRAMS_TOLERANCE),
        ("fat", sum(|i| i.fat), macros.fat, BREAKDOWN_GRAMS_TOLERANCE),
        ("calories", sum(|i| i.calories), macros.calories, BREAKDOWN_KCAL_TOLERANCE),
    ];
    for (name, items, total, tolerance) in checks {
        if items.abs_diff(total) > tolerance {
            warn!(
                macro_name = name,
                breakdown_sum = items,
                total,
                "breakdown does not add up to meal total"
            );
            warnings.push(format!(
                "breakdown {name} sum to {items} but the meal total is {total}"
            ));
        }
    }
}

/// Turn a raw model response into a client-ready analysis.
pub fn sanitize(raw: &RawAnalysis, meal_description: &str, options: SanitizeOptions) -> MealAnalysis {
    let mut warnings = Vec::new();

    let is_alcoholic = contains_alcohol(meal_description)
        || raw.breakdown.iter().any(|i| contains_alcohol(&i.food));
    let alcohol_g = raw
        .alcohol_info
        .as_ref()
        .map(|a| a.alcohol)
        .filter(|g| g.is_finite() && *g > 0.0);

    let totals = reconcile(
        "meal",
        MacroInput {
            protein: raw.protein,
            carbs: raw.carbs,
            fat: raw.fat,
            reported: raw.calories,
            alcohol_g,
        },
        is_alcoholic || alcohol_g.is_some(),
        options,
        &mut warnings,
    );
    let macros = MacroNutrients {
        protein: totals.protein,
        carbs: totals.carbs,
        fat: totals.fat,
        calories: totals.calories,
        alcohol_info: alcohol_g.map(|alcohol| AlcoholInfo { alcohol }),
    };

    let breakdown: Vec<FoodBreakdownItem> = raw
        .breakdown
        .iter()
        .map(|item| sanitize_item(item, options, &mut warnings))
        .collect();

    check_ratios(&macros, &mut warnings);
    check_breakdown_sums(&macros, &breakdown, &mut warnings);

    MealAnalysis {
        macros,
        breakdown,
        reasoning: raw.reasoning.trim().to_string(),
        validation: raw.validation.trim().to_string(),
        warnings,
        reused_from: None,
    }
}
