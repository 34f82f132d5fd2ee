use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use super::errors::AnalysisError;

/// Numbers as the model sent them, before clamping.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat: f64,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub calories: Option<f64>,
    #[serde(rename = "alcohol_info", alias = "alcoholInfo", default)]
    pub alcohol_info: Option<RawAlcoholInfo>,
    #[serde(default)]
    pub breakdown: Vec<RawBreakdownItem>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reasoning: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub validation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawAlcoholInfo {
    #[serde(default, deserialize_with = "lenient_number")]
    pub alcohol: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBreakdownItem {
    #[serde(default, alias = "name", deserialize_with = "lenient_string")]
    pub food: String,
    #[serde(default, alias = "amount", deserialize_with = "lenient_string")]
    pub estimated_amount: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat: f64,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub calories: Option<f64>,
}

fn number_from_value(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            // "25g", "~300 kcal"
            let digits: String = s
                .trim()
                .trim_start_matches('~')
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn lenient_optional_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(d)?;
    Ok(number_from_value(&v))
}

fn lenient_number<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_number(d)?.unwrap_or(0.0))
}

fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

lazy_static! {
    static ref FENCE: Regex = Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").unwrap();
    static ref OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Parse model output: as-is, then with code fences stripped, then the
/// outermost `{...}` block.
pub fn parse_ai_response(text: &str) -> Result<RawAnalysis, AnalysisError> {
    let trimmed = text.trim();
    match serde_json::from_str::<RawAnalysis>(trimmed) {
        Ok(parsed) => return Ok(parsed),
        Err(e) => debug!(error = %e, "direct parse failed"),
    }

    if let Some(inner) = FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        match serde_json::from_str::<RawAnalysis>(inner.as_str()) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => debug!(error = %e, "fenced parse failed"),
        }
    }

    if let Some(block) = OBJECT.find(trimmed) {
        match serde_json::from_str::<RawAnalysis>(block.as_str()) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => debug!(error = %e, "extracted-object parse failed"),
        }
    }

    let preview: String = trimmed.chars().take(200).collect();
    warn!(preview = %preview, "could not parse AI response");
    Err(AnalysisError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"protein": 31, "carbs": 45.6, "fat": "12g", "calories": 420,
        "breakdown": [{"food": "chicken breast", "estimatedAmount": "100g", "protein": 31, "carbs": 0, "fat": 3.6, "calories": 165}],
        "reasoning": "standard portions", "validation": "totals match"}"#;

    #[test]
    fn parses_plain_json() {
        let raw = parse_ai_response(BODY).unwrap();
        assert_eq!(raw.protein, 31.0);
        assert_eq!(raw.carbs, 45.6);
        assert_eq!(raw.fat, 12.0);
        assert_eq!(raw.calories, Some(420.0));
        assert_eq!(raw.breakdown[0].food, "chicken breast");
        assert_eq!(raw.breakdown[0].estimated_amount, "100g");
    }

    #[test]
    fn parses_fenced_json() {
        let text = format!("```json\n{BODY}\n```");
        let raw = parse_ai_response(&text).unwrap();
        assert_eq!(raw.reasoning, "standard portions");
    }

    #[test]
    fn parses_object_embedded_in_prose() {
        let text = format!("Here is the analysis you asked for: {BODY} Hope it helps!");
        let raw = parse_ai_response(&text).unwrap();
        assert_eq!(raw.validation, "totals match");
    }

    #[test]
    fn missing_fields_default() {
        let raw = parse_ai_response(r#"{"protein": null, "carbs": "n/a"}"#).unwrap();
        assert_eq!(raw.protein, 0.0);
        assert_eq!(raw.carbs, 0.0);
        assert_eq!(raw.calories, None);
        assert!(raw.breakdown.is_empty());
    }

    #[test]
    fn alcohol_info_is_read() {
        let raw = parse_ai_response(r#"{"calories": 210, "alcohol_info": {"alcohol": 18.8}}"#).unwrap();
        assert_eq!(raw.alcohol_info.unwrap().alcohol, 18.8);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_ai_response("I cannot help with that.").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse));
        assert_eq!(err.to_string(), "could not parse AI response");
    }
}
