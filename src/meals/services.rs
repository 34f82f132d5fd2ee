use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use super::{dto::DailyTotals, history::find_reusable, repo_types::MealEntry};
use crate::{
    nutrition::{
        errors::AnalysisError,
        macros::MacroNutrients,
        quantity::classify,
        sanitize::{sanitize, MealAnalysis, SanitizeOptions},
    },
    state::AppState,
};

pub struct AnalyzeInput<'a> {
    pub description: &'a str,
    pub is_recalculation: bool,
    pub previous: Option<&'a MacroNutrients>,
}

fn reused_analysis(entry: &MealEntry) -> MealAnalysis {
    let validation = if entry.validation.is_empty() {
        "Reused from an earlier matching meal.".to_string()
    } else {
        format!("Reused from an earlier matching meal. {}", entry.validation)
    };
    MealAnalysis {
        macros: entry.macros,
        breakdown: entry.breakdown.clone(),
        reasoning: entry.reasoning.clone(),
        validation,
        warnings: Vec::new(),
        reused_from: Some(entry.id),
    }
}

/// classify → reuse a matching vague meal, or estimate fresh → sanitize.
pub async fn analyze_meal(
    st: &AppState,
    user_id: Uuid,
    input: AnalyzeInput<'_>,
) -> Result<MealAnalysis, AnalysisError> {
    let quantities = classify(input.description);

    if !input.is_recalculation && !quantities.has_explicit_quantities {
        match st.meals.list_for_user(user_id).await {
            Ok(history) => {
                if let Some(hit) = find_reusable(input.description, &quantities, &history) {
                    info!(%user_id, meal_id = %hit.id, "reusing previous analysis");
                    return Ok(reused_analysis(hit));
                }
            }
            Err(e) => warn!(error = %e, %user_id, "history lookup failed; estimating fresh"),
        }
    }

    let raw = st
        .estimator
        .estimate(input.description, input.previous)
        .await?;
    let options = SanitizeOptions {
        trust_reported_calories: st.config.trust_reported_calories,
    };
    Ok(sanitize(&raw, input.description, options))
}

/// Per-day sums over `from..=to`, including days without meals.
pub fn daily_totals(entries: &[MealEntry], from: Date, to: Date) -> Vec<DailyTotals> {
    let mut days = Vec::new();
    let mut next = Some(from);
    while let Some(day) = next.filter(|d| *d <= to) {
        let mut totals = DailyTotals::empty(day);
        for e in entries.iter().filter(|e| e.date == day) {
            totals.add(&e.macros);
        }
        days.push(totals);
        next = day.next_day();
    }
    days
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use time::macros::date;

    use super::*;
    use crate::meals::repo::memory::MemoryMealStore;
    use crate::meals::repo_types::tests::entry;
    use crate::nutrition::parse::RawAnalysis;
    use crate::state::fakes::CannedEstimator;

    fn input(description: &str) -> AnalyzeInput<'_> {
        AnalyzeInput {
            description,
            is_recalculation: false,
            previous: None,
        }
    }

    #[tokio::test]
    async fn vague_repeat_reuses_history_without_estimating() {
        let user = Uuid::new_v4();
        let store = MemoryMealStore::default();
        let mut stored = entry("Chicken and rice", 610);
        stored.validation = "checked".into();
        store.seed(user, stored.clone());
        let (state, estimator) = AppState::fake_with(store, RawAnalysis::default());

        let out = analyze_meal(&state, user, input("some chicken and rice"))
            .await
            .unwrap();
        assert_eq!(out.reused_from, Some(stored.id));
        assert_eq!(out.macros, stored.macros);
        assert!(out.validation.starts_with("Reused"));
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn explicit_quantity_goes_to_the_estimator() {
        let user = Uuid::new_v4();
        let store = MemoryMealStore::default();
        store.seed(user, entry("5 bananas", 525));
        store.seed(user, entry("bananas", 105));
        let canned = RawAnalysis {
            protein: 2.6,
            carbs: 54.0,
            fat: 0.8,
            calories: Some(210.0),
            ..RawAnalysis::default()
        };
        let (state, estimator) = AppState::fake_with(store, canned);

        let out = analyze_meal(&state, user, input("2 bananas")).await.unwrap();
        assert_eq!(out.reused_from, None);
        assert_eq!(out.macros.calories, 210);
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_users_history_is_not_reused() {
        let store = MemoryMealStore::default();
        store.seed(Uuid::new_v4(), entry("oatmeal", 300));
        let (state, estimator) = AppState::fake_with(store, RawAnalysis::default());

        let out = analyze_meal(&state, Uuid::new_v4(), input("oatmeal")).await.unwrap();
        assert!(out.reused_from.is_none());
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recalculation_skips_reuse_and_forwards_previous() {
        let user = Uuid::new_v4();
        let store = MemoryMealStore::default();
        let stored = entry("oatmeal", 300);
        store.seed(user, stored.clone());
        let (state, estimator) = AppState::fake_with(store, RawAnalysis::default());

        let out = analyze_meal(
            &state,
            user,
            AnalyzeInput {
                description: "oatmeal",
                is_recalculation: true,
                previous: Some(&stored.macros),
            },
        )
        .await
        .unwrap();
        assert!(out.reused_from.is_none());
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 1);
        assert!(estimator.saw_previous.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn history_failure_falls_through_to_estimation() {
        let (state, estimator) = AppState::fake_with(MemoryMealStore::failing(), RawAnalysis::default());
        let out = analyze_meal(&state, Uuid::new_v4(), input("pasta")).await;
        assert!(out.is_ok());
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn daily_totals_fill_empty_days() {
        let mut a = entry("breakfast", 400);
        a.macros.protein = 20;
        let mut b = entry("lunch", 700);
        b.macros.protein = 35;
        let mut c = entry("dinner", 650);
        c.date = date!(2024 - 05 - 03);

        let days = daily_totals(&[a, b, c], date!(2024 - 05 - 01), date!(2024 - 05 - 03));
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].calories, 1100);
        assert_eq!(days[0].protein, 55);
        assert_eq!(days[0].meals, 2);
        assert_eq!(days[1].meals, 0);
        assert_eq!(days[1].calories, 0);
        assert_eq!(days[2].calories, 650);
    }

    #[test]
    fn daily_totals_end_on_the_last_representable_day() {
        let days = daily_totals(&[], date!(9999 - 12 - 30), date!(9999 - 12 - 31));
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].date, Date::MAX);
    }
}
