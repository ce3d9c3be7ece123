mod feedback;
mod grocery_list;
mod meal_plan;
mod recipe;
mod user_profile;

pub use feedback::Feedback;
pub use grocery_list::{GroceryItem, GroceryList};
pub use meal_plan::{MealPlan, MealSlot};
pub use recipe::{Ingredient, Recipe};
pub use user_profile::UserProfile;
