use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedQuantity {
    pub item: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityAnalysis {
    pub has_explicit_quantities: bool,
    pub extracted_quantities: Vec<ExtractedQuantity>,
}

/// Pattern families, applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityRule {
    /// "150g chicken", "1.5 kg potatoes"
    WeightBeforeFood,
    /// "chicken 150g"
    WeightAfterFood,
    /// "330ml cola", "2 dl milk", "1 tbsp oil"
    VolumeBeforeFood,
    /// "Guinness 568ml"
    VolumeAfterFood,
    /// Any number followed by a word: "2 bananas". Broad on purpose; it
    /// also fires on "lunch at 12 noon".
    NumberWord,
    /// "half a pizza", "2 slices of bread", "one handful of nuts".
    /// A bare article is not an amount: "a slice of toast" stays vague.
    Portion,
    /// "2 glasses of wine", "one bowl of soup". "a bowl of soup" stays vague.
    Container,
}

impl QuantityRule {
    pub const ALL: [QuantityRule; 7] = [
        QuantityRule::WeightBeforeFood,
        QuantityRule::WeightAfterFood,
        QuantityRule::VolumeBeforeFood,
        QuantityRule::VolumeAfterFood,
        QuantityRule::NumberWord,
        QuantityRule::Portion,
        QuantityRule::Container,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QuantityRule::WeightBeforeFood => "weight_before_food",
            QuantityRule::WeightAfterFood => "weight_after_food",
            QuantityRule::VolumeBeforeFood => "volume_before_food",
            QuantityRule::VolumeAfterFood => "volume_after_food",
            QuantityRule::NumberWord => "number_word",
            QuantityRule::Portion => "portion",
            QuantityRule::Container => "container",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            QuantityRule::WeightBeforeFood => &WEIGHT_BEFORE,
            QuantityRule::WeightAfterFood => &WEIGHT_AFTER,
            QuantityRule::VolumeBeforeFood => &VOLUME_BEFORE,
            QuantityRule::VolumeAfterFood => &VOLUME_AFTER,
            QuantityRule::NumberWord => &NUMBER_WORD,
            QuantityRule::Portion => &PORTION,
            QuantityRule::Container => &CONTAINER,
        }
    }

    fn extract(self, caps: &Captures<'_>) -> ExtractedQuantity {
        let get = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| caps.name(n))
                .map(|m| m.as_str().trim())
                .unwrap_or_default()
        };
        let amount = get(&["amount", "frac"]);
        let quantity = match get(&["unit"]) {
            "" => amount.to_string(),
            unit if matches!(self, QuantityRule::Portion | QuantityRule::Container) => {
                format!("{amount} {unit}")
            }
            unit => format!("{amount}{unit}"),
        };
        ExtractedQuantity {
            item: trim_connectors(&get(&["item", "fitem"]).to_lowercase()),
            quantity: quantity.to_lowercase(),
        }
    }

    /// All matches of this rule in `text`.
    pub fn matches(self, text: &str) -> Vec<ExtractedQuantity> {
        self.regex()
            .captures_iter(text)
            .map(|caps| self.extract(&caps))
            .collect()
    }
}

const NUMBER: &str = r"(?P<amount>\d+(?:[.,]\d+)?)";
const FOOD: &str = r"(?P<item>\p{L}+(?:\s+\p{L}+)?)";
const WEIGHT_UNITS: &str = r"(?P<unit>kg|grams?|gr|g)\b";
const VOLUME_UNITS: &str = r"(?P<unit>ml|cl|dl|l|litres?|liters?|cups?|tbsp|tsp|tablespoons?|teaspoons?|msk|tsk|krm|oz)\b";

lazy_static! {
    static ref WEIGHT_BEFORE: Regex =
        Regex::new(&format!(r"(?i){NUMBER}\s*{WEIGHT_UNITS}\s+(?:of\s+)?{FOOD}")).unwrap();
    static ref WEIGHT_AFTER: Regex =
        Regex::new(&format!(r"(?i)(?P<item>\p{{L}}+)\s+{NUMBER}\s*{WEIGHT_UNITS}")).unwrap();
    static ref VOLUME_BEFORE: Regex =
        Regex::new(&format!(r"(?i){NUMBER}\s*{VOLUME_UNITS}\s+(?:of\s+)?{FOOD}")).unwrap();
    static ref VOLUME_AFTER: Regex =
        Regex::new(&format!(r"(?i)(?P<item>\p{{L}}+)\s+{NUMBER}\s*{VOLUME_UNITS}")).unwrap();
    static ref NUMBER_WORD: Regex =
        Regex::new(&format!(r"(?i){NUMBER}\s+(?P<item>\p{{L}}+)")).unwrap();
    static ref PORTION: Regex = Regex::new(
        r"(?i)\b(?P<amount>\d+|one|two|three|half|quarter|third)\s+(?:an?\s+)?(?P<unit>servings?|portions?|slices?|pieces?|handfuls?|scoops?)\s+(?:of\s+)?(?P<item>\p{L}+(?:\s+\p{L}+)?)|\b(?P<frac>half|quarter|third)\s+(?:of\s+)?(?:an?\s+|the\s+)(?P<fitem>\p{L}+)"
    )
    .unwrap();
    static ref CONTAINER: Regex = Regex::new(
        r"(?i)\b(?P<amount>\d+|one|two|three|half)\s+(?:an?\s+)?(?P<unit>glass(?:es)?|bowls?|plates?|cups?|mugs?|cans?|bottles?|pints?)\s+of\s+(?P<item>\p{L}+(?:\s+\p{L}+)?)"
    )
    .unwrap();
}

const CONNECTORS: [&str; 6] = ["and", "with", "or", "plus", "och", "med"];

/// Drops a trailing "and"/"with" swallowed by the two-word food capture.
fn trim_connectors(item: &str) -> String {
    match item.rsplit_once(' ') {
        Some((head, last)) if CONNECTORS.contains(&last) => head.to_string(),
        _ => item.to_string(),
    }
}

/// Scan a meal description for explicit quantities.
pub fn classify(description: &str) -> QuantityAnalysis {
    let mut extracted = Vec::new();
    for rule in QuantityRule::ALL {
        let found = rule.matches(description);
        if !found.is_empty() {
            debug!(rule = rule.name(), hits = found.len(), "quantity rule matched");
        }
        extracted.extend(found);
    }
    extracted.retain(|q| !q.item.is_empty());
    QuantityAnalysis {
        has_explicit_quantities: !extracted.is_empty(),
        extracted_quantities: extracted,
    }
}
