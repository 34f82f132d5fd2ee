use std::fmt::Write as _;

use super::macros::{alcohol_calories, MacroNutrients};

pub const RULES: [&str; 21] = [
    "Use the exact quantities the user states. Never substitute a \"typical\" portion when a number is given.",
    "When no quantity is given, assume one standard adult portion and say so in the reasoning.",
    "Convert volumes to weight before calculating: 1 ml of water, milk, juice or soda weighs about 1 g; 1 ml of oil weighs 0.92 g; 1 dl = 100 ml; 1 cl = 10 ml.",
    "Kitchen measures: 1 cup = 240 ml, 1 tbsp = 15 ml, 1 tsp = 5 ml, 1 msk = 15 ml, 1 tsk = 5 ml, 1 krm = 1 ml.",
    "Calculate calories with the 4-4-9 rule: protein × 4 + carbohydrates × 4 + fat × 9.",
    "For alcoholic drinks add alcohol energy: ml × ABV × 0.789 × 7 kcal (ABV as a fraction, 0.789 g/ml is the density of ethanol).",
    "For alcoholic drinks report the grams of ethanol in alcohol_info.alcohol and include the alcohol energy in calories, so calories will exceed the 4-4-9 figure.",
    "Use typical ABV values when the user does not give one: lager 5%, stout 4.2%, wine 12-13.5%, spirits 40%, cider 4.5%.",
    "Every breakdown item needs food, estimatedAmount, protein, carbs, fat and calories.",
    "The sum of the breakdown items must match the meal totals: grams within 2 g, calories within 10 kcal.",
    "Compute the totals by adding up the breakdown items, never estimate them separately.",
    "Report all values as whole numbers. Never return negative values.",
    "For branded or restaurant products use the manufacturer's published nutrition values when you know them.",
    "Prefer the reference values listed below when a food matches one of them, scaling to the stated amount.",
    "Cooked and raw weights differ: 100 g raw rice is about 300 g cooked, 100 g raw pasta about 220 g cooked, 100 g raw chicken about 75 g cooked. Use the state the user describes, cooked when unclear.",
    "Include cooking fats, sauces, dressings and toppings the user mentions as their own breakdown items.",
    "Count pieces realistically: one medium banana is 118 g, one large egg is 50 g, one slice of bread is 25-30 g.",
    "Do not invent foods the user did not mention.",
    "WRONG: \"Guinness 568ml\" → 2 g protein, 18 g carbs, 0 g fat, 80 kcal (4-4-9 only, alcohol ignored). CORRECT: 2 g protein, 18 g carbs, 0 g fat, alcohol 18.8 g, about 210 kcal (80 kcal from carbs and protein + 132 kcal from 568 × 0.042 × 0.789 × 7).",
    "WRONG: breakdown items adding up to 362 kcal with a total of 330 kcal. CORRECT: the total is the sum of the items, 362 kcal.",
    "Explain the estimate briefly in reasoning, and in validation state how you checked that the breakdown adds up to the totals.",
];

const RESPONSE_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{
  "protein": number,
  "carbs": number,
  "fat": number,
  "calories": number,
  "alcohol_info": { "alcohol": number } | null,
  "breakdown": [
    { "food": string, "estimatedAmount": string, "protein": number, "carbs": number, "fat": number, "calories": number }
  ],
  "reasoning": string,
  "validation": string
}"#;

/// System instruction: role, numbered rules, reference foods, response format.
pub fn system_prompt(food_context: &[String]) -> String {
    let mut out = String::from(
        "You are a precise nutrition analyst. Estimate the macronutrients of the meal the user describes.\n\nRULES:\n",
    );
    for (i, rule) in RULES.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, rule);
    }
    let _ = writeln!(
        out,
        "\nALCOHOL CHECK: 568 ml at 4.2% ABV is {} kcal from ethanol alone, before any carbohydrates.",
        alcohol_calories(568.0, 0.042)
    );
    if !food_context.is_empty() {
        out.push_str("\nREFERENCE VALUES:\n");
        for line in food_context {
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');
    out.push_str(RESPONSE_FORMAT);
    out
}

/// User turn: the literal meal text, plus the earlier result on recalculation.
pub fn user_prompt(description: &str, previous: Option<&MacroNutrients>) -> String {
    let mut out = format!("Meal: {}", description.trim());
    if let Some(prev) = previous {
        let _ = write!(
            out,
            "\n\nA previous analysis of this meal returned {} g protein, {} g carbs, {} g fat and {} kcal. \
             The user asked for a recalculation: check every item again and correct any mistakes.",
            prev.protein, prev.carbs, prev.fat, prev.calories
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_numbered_in_order() {
        let prompt = system_prompt(&[]);
        assert!(prompt.contains("1. Use the exact quantities"));
        assert!(prompt.contains("21. Explain the estimate"));
        assert!(!prompt.contains("22. "));
        assert!(!prompt.contains("REFERENCE VALUES"));
    }

    #[test]
    fn prompt_carries_formulas() {
        let prompt = system_prompt(&[]);
        assert!(prompt.contains("ml × ABV × 0.789 × 7"));
        assert!(prompt.contains("protein × 4 + carbohydrates × 4 + fat × 9"));
        assert!(prompt.contains("\"alcohol_info\""));
        assert!(prompt.contains("568 ml at 4.2% ABV is 132 kcal"));
    }

    #[test]
    fn food_context_is_listed() {
        let prompt = system_prompt(&["- Banana (fruit), 1 medium (118 g): 1.3g protein".to_string()]);
        assert!(prompt.contains("REFERENCE VALUES:\n- Banana"));
    }

    #[test]
    fn recalculation_mentions_previous_numbers() {
        let prev = MacroNutrients {
            protein: 12,
            carbs: 40,
            fat: 9,
            calories: 289,
            alcohol_info: None,
        };
        let text = user_prompt(" oatmeal ", Some(&prev));
        assert!(text.starts_with("Meal: oatmeal"));
        assert!(text.contains("289 kcal"));
        assert_eq!(user_prompt("oatmeal", None), "Meal: oatmeal");
    }
}
