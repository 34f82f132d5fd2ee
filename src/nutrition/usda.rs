use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::macros::{calories_from_macros, clamp_round, MacroNutrients};

pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

const PROTEIN_ID: u32 = 1003;
const FAT_ID: u32 = 1004;
const CARBS_ID: u32 = 1005;
const ENERGY_KCAL_ID: u32 = 1008;
const ENERGY_ATWATER_GENERAL_ID: u32 = 2047;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaNutrient {
    #[serde(default)]
    pub nutrient_id: Option<u32>,
    #[serde(default)]
    pub nutrient_number: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl UsdaNutrient {
    fn is(&self, id: u32, number: &str) -> bool {
        self.nutrient_id == Some(id) || self.nutrient_number.as_deref() == Some(number)
    }
}

/// A food as returned by the FoodData Central search endpoint.
/// Nutrient values are per 100 g.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaFood {
    pub fdc_id: u64,
    pub description: String,
    #[serde(default)]
    pub brand_owner: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<UsdaNutrient>,
}

impl UsdaFood {
    fn per_100g(&self, id: u32, number: &str) -> Option<f64> {
        self.food_nutrients
            .iter()
            .find(|n| n.is(id, number))
            .and_then(|n| n.value)
    }

    pub fn context_line(&self) -> String {
        let m = extract_macros(self, 100.0);
        format!(
            "- {}{} (USDA #{}) per 100 g: {}g protein, {}g carbs, {}g fat, {} kcal",
            self.description,
            self.brand_owner
                .as_deref()
                .map(|b| format!(", {b}"))
                .unwrap_or_default(),
            self.fdc_id,
            m.protein,
            m.carbs,
            m.fat,
            m.calories
        )
    }
}

/// Macros for `grams` of `food`, scaled linearly from its per-100 g values.
pub fn extract_macros(food: &UsdaFood, grams: f64) -> MacroNutrients {
    let factor = if grams.is_finite() && grams > 0.0 {
        grams / 100.0
    } else {
        0.0
    };
    let protein = food.per_100g(PROTEIN_ID, "203").unwrap_or(0.0) * factor;
    let fat = food.per_100g(FAT_ID, "204").unwrap_or(0.0) * factor;
    let carbs = food.per_100g(CARBS_ID, "205").unwrap_or(0.0) * factor;
    let calories = food
        .per_100g(ENERGY_KCAL_ID, "208")
        .or_else(|| food.per_100g(ENERGY_ATWATER_GENERAL_ID, "957"))
        .map(|kcal| clamp_round(kcal * factor))
        .unwrap_or_else(|| calories_from_macros(protein, carbs, fat));

    MacroNutrients {
        protein: clamp_round(protein),
        carbs: clamp_round(carbs),
        fat: clamp_round(fat),
        calories,
        alcohol_info: None,
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<UsdaFood>,
}

#[derive(Debug, Clone)]
pub struct UsdaClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl UsdaClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: Client::new(),
        }
    }

    pub async fn search(&self, query: &str, page_size: u8) -> anyhow::Result<Vec<UsdaFood>> {
        let url = format!("{}/foods/search", self.base_url.trim_end_matches('/'));
        let page_size = page_size.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("pageSize", page_size.as_str()),
                ("dataType", "Foundation,SR Legacy,Branded"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.without_url())
            .context("usda search request")?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| e.without_url())
            .context("usda search body")?;
        debug!(query, hits = body.foods.len(), "usda search");
        Ok(body.foods)
    }
}
