//! Repository interfaces, one per entity.
//!
//! Shared behavior: `save` upserts and refreshes `UpdatedAt`; reads return
//! `Ok(None)` or an empty `Vec` when nothing matches; `delete` returns
//! whether an item was removed and never fails for a missing entity.

use async_trait::async_trait;
use chrono::NaiveDate;
use meal_planner_core::{Feedback, GroceryList, MealPlan, Recipe, UserProfile};

use super::error::RepositoryError;

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn save(&self, recipe: &Recipe) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, recipe_id: &str) -> Result<Option<Recipe>, RepositoryError>;

    /// All recipes, ordered by title.
    async fn get_all(&self) -> Result<Vec<Recipe>, RepositoryError>;

    async fn delete(&self, recipe_id: &str) -> Result<bool, RepositoryError>;

    async fn exists(&self, recipe_id: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: &UserProfile) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError>;

    async fn delete(&self, user_id: &str) -> Result<bool, RepositoryError>;

    async fn exists(&self, user_id: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait MealPlanRepository: Send + Sync {
    async fn save(&self, meal_plan: &MealPlan) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, meal_plan_id: &str) -> Result<Option<MealPlan>, RepositoryError>;

    /// Every plan owned by the user, in plan-id order.
    async fn get_by_user(&self, user_id: &str) -> Result<Vec<MealPlan>, RepositoryError>;

    /// The first active plan in store order.
    ///
    /// Nothing stops a user from having several active plans; which one is
    /// returned then depends on plan ids, not on recency.
    async fn get_active_by_user(&self, user_id: &str)
        -> Result<Option<MealPlan>, RepositoryError>;

    async fn get_by_user_and_week(
        &self,
        user_id: &str,
        week_start_date: NaiveDate,
    ) -> Result<Option<MealPlan>, RepositoryError>;

    async fn delete(&self, meal_plan_id: &str) -> Result<bool, RepositoryError>;

    async fn exists(&self, meal_plan_id: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn save(&self, feedback: &Feedback) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, feedback_id: &str) -> Result<Option<Feedback>, RepositoryError>;

    async fn get_by_user(&self, user_id: &str) -> Result<Vec<Feedback>, RepositoryError>;

    /// Feedback for a recipe, newest first.
    async fn get_by_recipe(&self, recipe_id: &str) -> Result<Vec<Feedback>, RepositoryError>;

    async fn delete(&self, feedback_id: &str) -> Result<bool, RepositoryError>;

    async fn exists(&self, feedback_id: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait GroceryListRepository: Send + Sync {
    async fn save(&self, grocery_list: &GroceryList) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, grocery_list_id: &str)
        -> Result<Option<GroceryList>, RepositoryError>;

    async fn get_by_meal_plan(
        &self,
        meal_plan_id: &str,
    ) -> Result<Option<GroceryList>, RepositoryError>;

    async fn delete(&self, grocery_list_id: &str) -> Result<bool, RepositoryError>;

    async fn exists(&self, grocery_list_id: &str) -> Result<bool, RepositoryError>;
}
