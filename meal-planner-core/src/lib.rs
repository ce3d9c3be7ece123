//! Meal Planner Core Library
//!
//! Domain entities and business rules for Meal Planner. Nothing in this
//! crate knows how entities are stored.

pub mod error;
pub mod models;

pub use error::ValidationError;
pub use models::{
    Feedback, GroceryItem, GroceryList, Ingredient, MealPlan, MealSlot, Recipe, UserProfile,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
