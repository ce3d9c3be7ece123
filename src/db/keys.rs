//! Key scheme for the single table.
//!
//! | Entity      | PK                 | SK               | GSI1PK           | GSI1SK     |
//! |-------------|--------------------|------------------|------------------|------------|
//! | Recipe      | `RECIPE#<id>`      | `METADATA`       | `RECIPE#ALL`     | title      |
//! | UserProfile | `USER#<id>`        | `PROFILE`        |                  |            |
//! | MealPlan    | `USER#<userId>`    | `MEALPLAN#<id>`  | `MEALPLAN#<id>`  | week start |
//! | Feedback    | `USER#<userId>`    | `FEEDBACK#<id>`  | `RECIPE#<recId>` | created at |
//! | GroceryList | `MEALPLAN#<planId>`| `GROCERYLIST#<id>`|                 |            |

use chrono::NaiveDate;

use super::store::PrimaryKey;

pub const RECIPE_PREFIX: &str = "RECIPE#";
pub const USER_PREFIX: &str = "USER#";
pub const MEALPLAN_PREFIX: &str = "MEALPLAN#";
pub const FEEDBACK_PREFIX: &str = "FEEDBACK#";
pub const GROCERYLIST_PREFIX: &str = "GROCERYLIST#";

pub const RECIPE_SK: &str = "METADATA";
pub const PROFILE_SK: &str = "PROFILE";
pub const ALL_RECIPES: &str = "RECIPE#ALL";

/// Date format used for every date-valued key and attribute.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// All key attributes of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKeys {
    pub pk: String,
    pub sk: String,
    /// `(GSI1PK, GSI1SK)` when the item is projected into the index.
    pub gsi1: Option<(String, String)>,
}

impl ItemKeys {
    pub fn primary_key(&self) -> PrimaryKey {
        PrimaryKey::new(self.pk.clone(), self.sk.clone())
    }
}

pub fn recipe_pk(recipe_id: &str) -> String {
    format!("{}{}", RECIPE_PREFIX, recipe_id)
}

pub fn user_pk(user_id: &str) -> String {
    format!("{}{}", USER_PREFIX, user_id)
}

pub fn meal_plan_pk(meal_plan_id: &str) -> String {
    format!("{}{}", MEALPLAN_PREFIX, meal_plan_id)
}

pub fn recipe_key(recipe_id: &str) -> PrimaryKey {
    PrimaryKey::new(recipe_pk(recipe_id), RECIPE_SK)
}

pub fn user_key(user_id: &str) -> PrimaryKey {
    PrimaryKey::new(user_pk(user_id), PROFILE_SK)
}

pub fn recipe_keys(recipe_id: &str, title: &str) -> ItemKeys {
    ItemKeys {
        pk: recipe_pk(recipe_id),
        sk: RECIPE_SK.to_string(),
        gsi1: Some((ALL_RECIPES.to_string(), title.to_string())),
    }
}

pub fn user_keys(user_id: &str) -> ItemKeys {
    ItemKeys {
        pk: user_pk(user_id),
        sk: PROFILE_SK.to_string(),
        gsi1: None,
    }
}

/// The plan id doubles as its own index partition so a plan can be found
/// without knowing its owner.
pub fn meal_plan_keys(user_id: &str, meal_plan_id: &str, week_start: NaiveDate) -> ItemKeys {
    ItemKeys {
        pk: user_pk(user_id),
        sk: format!("{}{}", MEALPLAN_PREFIX, meal_plan_id),
        gsi1: Some((
            meal_plan_pk(meal_plan_id),
            week_start.format(DATE_FORMAT).to_string(),
        )),
    }
}

/// `created_at` must already be in sortable timestamp form.
pub fn feedback_keys(user_id: &str, feedback_id: &str, recipe_id: &str, created_at: &str) -> ItemKeys {
    ItemKeys {
        pk: user_pk(user_id),
        sk: format!("{}{}", FEEDBACK_PREFIX, feedback_id),
        gsi1: Some((recipe_pk(recipe_id), created_at.to_string())),
    }
}

pub fn grocery_list_keys(meal_plan_id: &str, grocery_list_id: &str) -> ItemKeys {
    ItemKeys {
        pk: meal_plan_pk(meal_plan_id),
        sk: format!("{}{}", GROCERYLIST_PREFIX, grocery_list_id),
        gsi1: None,
    }
}
