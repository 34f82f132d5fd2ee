use std::fmt;

use serde::Serialize;

/// Most catalog entries included in one prompt.
pub const MAX_CONTEXT_ITEMS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Protein,
    Dairy,
    Grains,
    Fruit,
    Vegetables,
    Fats,
    Drinks,
    Alcohol,
    Branded,
    Meals,
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FoodCategory::Protein => "protein",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Grains => "grains",
            FoodCategory::Fruit => "fruit",
            FoodCategory::Vegetables => "vegetables",
            FoodCategory::Fats => "fats",
            FoodCategory::Drinks => "drinks",
            FoodCategory::Alcohol => "alcohol",
            FoodCategory::Branded => "branded",
            FoodCategory::Meals => "meals",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Serving {
    pub amount: f64,
    pub unit: &'static str,
    pub description: &'static str,
}

/// Macros for one serving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoodMacros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoodDatabaseItem {
    pub id: &'static str,
    pub name: &'static str,
    pub category: FoodCategory,
    #[serde(skip)]
    pub keywords: &'static [&'static str],
    pub serving: Serving,
    pub macros: FoodMacros,
    pub verified: bool,
    pub source: &'static str,
}

impl FoodDatabaseItem {
    pub fn matches(&self, lowered_description: &str) -> bool {
        lowered_description.contains(&self.name.to_lowercase())
            || self.keywords.iter().any(|k| lowered_description.contains(k))
    }

    /// One prompt line.
    pub fn context_line(&self) -> String {
        format!(
            "- {} ({}), {} ({} {}): {}g protein, {}g carbs, {}g fat, {} kcal [{}{}]",
            self.name,
            self.category,
            self.serving.description,
            self.serving.amount,
            self.serving.unit,
            self.macros.protein,
            self.macros.carbs,
            self.macros.fat,
            self.macros.calories,
            if self.verified { "verified, " } else { "" },
            self.source,
        )
    }
}

const USDA: &str = "USDA FoodData Central";
const LABEL: &str = "Manufacturer label";
const ESTIMATE: &str = "Recipe estimate";

macro_rules! food {
    ($id:literal, $name:literal, $cat:ident, [$($kw:literal),*],
     $amount:literal $unit:literal, $desc:literal,
     $p:literal, $c:literal, $f:literal, $kcal:literal, $src:expr, $verified:literal) => {
        FoodDatabaseItem {
            id: $id,
            name: $name,
            category: FoodCategory::$cat,
            keywords: &[$($kw),*],
            serving: Serving { amount: $amount, unit: $unit, description: $desc },
            macros: FoodMacros { protein: $p, carbs: $c, fat: $f, calories: $kcal },
            verified: $verified,
            source: $src,
        }
    };
}

pub static FOOD_DATABASE: &[FoodDatabaseItem] = &[
    food!("chicken-breast", "Chicken breast, cooked", Protein, ["chicken"], 100.0 "g", "100 g", 31.0, 0.0, 3.6, 165.0, USDA, true),
    food!("salmon", "Salmon, cooked", Protein, ["salmon"], 100.0 "g", "100 g", 22.0, 0.0, 12.0, 206.0, USDA, true),
    food!("egg", "Egg, large", Protein, ["egg", "omelette", "omelet"], 50.0 "g", "1 egg", 6.3, 0.4, 4.8, 72.0, USDA, true),
    food!("ground-beef", "Ground beef 90% lean, cooked", Protein, ["ground beef", "mince", "minced meat", "burger patty"], 100.0 "g", "100 g", 26.0, 0.0, 11.0, 217.0, USDA, true),
    food!("tuna", "Tuna, canned in water", Protein, ["tuna"], 100.0 "g", "100 g", 26.0, 0.0, 1.0, 116.0, USDA, true),
    food!("tofu", "Tofu, firm", Protein, ["tofu"], 100.0 "g", "100 g", 17.0, 3.0, 9.0, 144.0, USDA, true),
    food!("bacon", "Bacon, pan-fried", Protein, ["bacon"], 8.0 "g", "1 slice", 3.0, 0.1, 3.3, 43.0, USDA, true),
    food!("shrimp", "Shrimp, cooked", Protein, ["shrimp", "prawn"], 100.0 "g", "100 g", 24.0, 0.2, 0.3, 99.0, USDA, true),
    food!("milk-whole", "Milk, whole", Dairy, ["milk"], 244.0 "ml", "1 cup", 8.0, 12.0, 8.0, 149.0, USDA, true),
    food!("greek-yogurt", "Greek yogurt, 2%", Dairy, ["greek yogurt", "yoghurt", "yogurt"], 170.0 "g", "1 container", 20.0, 6.0, 4.0, 130.0, LABEL, true),
    food!("cheddar", "Cheddar cheese", Dairy, ["cheddar", "cheese"], 28.0 "g", "1 slice", 7.0, 0.4, 9.3, 113.0, USDA, true),
    food!("butter", "Butter", Dairy, ["butter"], 14.0 "g", "1 tbsp", 0.1, 0.0, 11.5, 102.0, USDA, true),
    food!("white-rice", "White rice, cooked", Grains, ["rice"], 158.0 "g", "1 cup", 4.3, 45.0, 0.4, 205.0, USDA, true),
    food!("pasta", "Pasta, cooked", Grains, ["pasta", "spaghetti", "penne", "macaroni"], 140.0 "g", "1 cup", 8.0, 43.0, 1.3, 221.0, USDA, true),
    food!("white-bread", "White bread", Grains, ["bread", "toast", "sandwich"], 25.0 "g", "1 slice", 2.7, 13.0, 0.8, 67.0, USDA, true),
    food!("oats", "Rolled oats, dry", Grains, ["oat", "porridge"], 40.0 "g", "1/2 cup", 5.0, 27.0, 2.7, 150.0, USDA, true),
    food!("potato", "Potato, boiled", Grains, ["potato"], 173.0 "g", "1 medium", 4.3, 37.0, 0.2, 161.0, USDA, true),
    food!("tortilla", "Flour tortilla", Grains, ["tortilla", "wrap", "burrito"], 45.0 "g", "1 medium", 3.7, 22.0, 3.5, 138.0, USDA, true),
    food!("banana", "Banana", Fruit, ["banana"], 118.0 "g", "1 medium", 1.3, 27.0, 0.4, 105.0, USDA, true),
    food!("apple", "Apple", Fruit, ["apple"], 182.0 "g", "1 medium", 0.5, 25.0, 0.3, 95.0, USDA, true),
    food!("orange", "Orange", Fruit, ["orange"], 131.0 "g", "1 medium", 1.2, 15.0, 0.2, 62.0, USDA, true),
    food!("blueberries", "Blueberries", Fruit, ["blueberr", "berries"], 148.0 "g", "1 cup", 1.1, 21.0, 0.5, 84.0, USDA, true),
    food!("avocado", "Avocado", Fruit, ["avocado", "guacamole"], 100.0 "g", "1/2 fruit", 2.0, 8.5, 14.7, 160.0, USDA, true),
    food!("broccoli", "Broccoli, cooked", Vegetables, ["broccoli"], 156.0 "g", "1 cup", 3.7, 11.0, 0.6, 55.0, USDA, true),
    food!("salad-greens", "Mixed salad greens", Vegetables, ["salad", "lettuce", "greens"], 85.0 "g", "1 bowl", 1.2, 2.9, 0.2, 15.0, USDA, true),
    food!("carrot", "Carrot", Vegetables, ["carrot"], 61.0 "g", "1 medium", 0.6, 6.0, 0.1, 25.0, USDA, true),
    food!("almonds", "Almonds", Fats, ["almond", "nuts"], 28.0 "g", "1 handful", 6.0, 6.0, 14.0, 164.0, USDA, true),
    food!("peanut-butter", "Peanut butter", Fats, ["peanut butter"], 32.0 "g", "2 tbsp", 7.0, 6.0, 16.0, 188.0, USDA, true),
    food!("olive-oil", "Olive oil", Fats, ["olive oil", "oil"], 13.5 "ml", "1 tbsp", 0.0, 0.0, 14.0, 119.0, USDA, true),
    food!("lager", "Lager beer, 5%", Alcohol, ["beer", "lager", "pilsner"], 330.0 "ml", "1 bottle", 1.6, 11.0, 0.0, 142.0, USDA, true),
    food!("guinness", "Guinness Draught, 4.2%", Alcohol, ["guinness", "stout"], 568.0 "ml", "1 pint", 2.0, 18.0, 0.0, 210.0, LABEL, true),
    food!("red-wine", "Red wine, 13.5%", Alcohol, ["red wine", "wine"], 150.0 "ml", "1 glass", 0.1, 3.8, 0.0, 125.0, USDA, true),
    food!("white-wine", "White wine, 12.5%", Alcohol, ["white wine"], 150.0 "ml", "1 glass", 0.1, 3.8, 0.0, 121.0, USDA, true),
    food!("vodka", "Vodka, 40%", Alcohol, ["vodka", "shot"], 40.0 "ml", "1 shot", 0.0, 0.0, 0.0, 88.0, USDA, true),
    food!("gin-tonic", "Gin and tonic", Alcohol, ["gin and tonic", "gin & tonic", "g&t"], 240.0 "ml", "40 ml gin + 200 ml tonic", 0.0, 18.0, 0.0, 160.0, ESTIMATE, false),
    food!("cola", "Coca-Cola", Drinks, ["coca-cola", "coca cola", "coke", "cola"], 330.0 "ml", "1 can", 0.0, 35.0, 0.0, 139.0, LABEL, true),
    food!("orange-juice", "Orange juice", Drinks, ["orange juice", "juice"], 250.0 "ml", "1 glass", 1.7, 26.0, 0.5, 112.0, USDA, true),
    food!("coffee", "Coffee, black", Drinks, ["coffee", "espresso"], 240.0 "ml", "1 cup", 0.3, 0.0, 0.0, 2.0, USDA, true),
    food!("latte", "Latte, whole milk", Drinks, ["latte", "cappuccino"], 350.0 "ml", "1 grande", 12.0, 18.0, 9.0, 220.0, LABEL, true),
    food!("big-mac", "McDonald's Big Mac", Branded, ["big mac"], 219.0 "g", "1 burger", 25.0, 45.0, 30.0, 550.0, LABEL, true),
    food!("mcd-fries", "McDonald's fries, medium", Branded, ["fries", "chips"], 111.0 "g", "1 medium", 4.0, 44.0, 15.0, 320.0, LABEL, true),
    food!("snickers", "Snickers bar", Branded, ["snickers"], 52.0 "g", "1 bar", 4.3, 33.0, 12.0, 250.0, LABEL, true),
    food!("nutella", "Nutella", Branded, ["nutella"], 37.0 "g", "2 tbsp", 2.0, 21.0, 11.0, 200.0, LABEL, true),
    food!("protein-bar", "Protein bar", Branded, ["protein bar", "quest bar"], 60.0 "g", "1 bar", 21.0, 22.0, 8.0, 230.0, LABEL, false),
    food!("pizza-margherita", "Pizza margherita", Meals, ["pizza"], 107.0 "g", "1 slice", 12.0, 36.0, 10.0, 285.0, ESTIMATE, false),
    food!("caesar-salad", "Chicken caesar salad", Meals, ["caesar"], 350.0 "g", "1 bowl", 35.0, 15.0, 28.0, 440.0, ESTIMATE, false),
    food!("salmon-nigiri", "Salmon nigiri", Meals, ["sushi", "nigiri"], 38.0 "g", "1 piece", 3.0, 8.0, 1.0, 55.0, ESTIMATE, false),
    food!("bolognese", "Spaghetti bolognese", Meals, ["bolognese"], 400.0 "g", "1 plate", 28.0, 70.0, 18.0, 540.0, ESTIMATE, false),
];

/// Catalog entries mentioned in a description, in catalog order, at most
/// [`MAX_CONTEXT_ITEMS`].
pub fn relevant_foods(description: &str) -> Vec<&'static FoodDatabaseItem> {
    let lowered = description.to_lowercase();
    FOOD_DATABASE
        .iter()
        .filter(|item| item.matches(&lowered))
        .take(MAX_CONTEXT_ITEMS)
        .collect()
}
