//! Meal macro estimation: quantity classification, the AI estimator and
//! sanitizing of its answers.

pub mod errors;
pub mod estimator;
pub mod food_db;
pub mod macros;
pub mod parse;
pub mod prompt;
pub mod quantity;
pub mod sanitize;
pub mod usda;
