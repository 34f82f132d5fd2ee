use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::repo_types::MealEntry;
use crate::nutrition::quantity::{classify, QuantityAnalysis};

/// Word-overlap ratio at or above which two vague descriptions are the same meal.
pub const SIMILARITY_THRESHOLD: f64 = 0.90;

const SEPARATOR_WORDS: [&str; 11] = [
    "a", "an", "the", "and", "with", "of", "some", "plus", "och", "med", "lite",
];

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[^\p{L}\p{N}\s]").unwrap();
}

/// Lowercase, drop punctuation and separator words, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, " ");
    stripped
        .split_whitespace()
        .filter(|w| !SEPARATOR_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `|common words longer than 2 chars| / max(|words1|, |words2|)` over normalized text.
/// Words are counted as lists, so a repeated word counts each time it occurs in `a`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    let longest = words_a.len().max(words_b.len());
    if longest == 0 {
        return 0.0;
    }
    let common = words_a
        .iter()
        .filter(|w| w.chars().count() > 2 && words_b.contains(w))
        .count();
    common as f64 / longest as f64
}

/// Find a stored vague meal whose description matches `description`.
///
/// Descriptions with explicit quantities never reuse anything, and only
/// stored meals that are themselves vague are candidates.
pub fn find_reusable<'a>(
    description: &str,
    quantity_info: &QuantityAnalysis,
    history: &'a [MealEntry],
) -> Option<&'a MealEntry> {
    if quantity_info.has_explicit_quantities {
        return None;
    }
    let wanted = normalize(description);
    if wanted.is_empty() {
        return None;
    }

    history.iter().find(|entry| {
        if classify(&entry.original_text).has_explicit_quantities {
            return false;
        }
        let stored = normalize(&entry.original_text);
        if stored == wanted {
            debug!(meal_id = %entry.id, "exact normalized match");
            return true;
        }
        let score = similarity(&wanted, &stored);
        if score >= SIMILARITY_THRESHOLD {
            debug!(meal_id = %entry.id, score, "similar vague meal");
            return true;
        }
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::tests::entry;

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(normalize("Some   Chicken, and RICE!"), "chicken rice");
        assert_eq!(normalize("the pasta with pesto."), "pasta pesto");
    }

    #[test]
    fn similarity_counts_only_longer_words() {
        assert_eq!(similarity("chicken rice", "chicken rice"), 1.0);
        assert_eq!(similarity("chicken rice", "chicken rice salad"), 2.0 / 3.0);
        assert_eq!(similarity("ox", "ox"), 0.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn repeated_words_count_as_list_entries() {
        assert_eq!(similarity("toast toast", "toast jam"), 1.0);
        assert_eq!(similarity("ox ox", "ox"), 0.0);
        assert_eq!(similarity("toast jam", "toast toast jam"), 2.0 / 3.0);
    }

    #[test]
    fn vague_meal_reuses_vague_history() {
        let history = vec![
            entry("pasta with pesto", 400),
            entry("Chicken and rice", 550),
        ];
        let description = "some chicken and rice";
        let info = classify(description);
        let found = find_reusable(description, &info, &history).unwrap();
        assert_eq!(found, &history[1]);
    }

    #[test]
    fn explicit_quantities_never_reuse() {
        let history = vec![entry("2 bananas", 210), entry("bananas", 105)];
        let description = "2 bananas";
        let info = classify(description);
        assert!(info.has_explicit_quantities);
        assert!(find_reusable(description, &info, &history).is_none());
    }

    #[test]
    fn explicit_history_entries_are_skipped() {
        let history = vec![entry("5 bananas", 525)];
        // vague description whose normalized text would overlap the stored one
        let description = "bananas";
        let info = classify(description);
        assert!(!info.has_explicit_quantities);
        assert!(find_reusable(description, &info, &history).is_none());
    }

    #[test]
    fn below_threshold_is_no_match() {
        let history = vec![entry("chicken rice broccoli", 600)];
        let description = "chicken rice";
        let info = classify(description);
        assert!(find_reusable(description, &info, &history).is_none());
    }

    #[test]
    fn first_match_wins() {
        let history = vec![entry("oatmeal", 300), entry("Oatmeal!", 320)];
        let info = classify("oatmeal");
        let found = find_reusable("oatmeal", &info, &history).unwrap();
        assert_eq!(found.macros.calories, 300);
    }
}
