use async_trait::async_trait;
use chrono::NaiveDate;
use meal_planner_core::MealPlan;

use super::access::{map_items, query_all};
use super::error::{EntityKind, RepositoryError};
use super::keys;
use super::mapper::{EntityMapper, MealPlanMapper};
use super::repository::MealPlanRepository;
use super::store::{Item, QueryRequest, StoreError, TableStore};

/// Meal plans live under their owner's partition and are indexed by plan id.
pub struct TableMealPlanRepository<S> {
    store: S,
}

impl<S: TableStore> TableMealPlanRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Raw plan items reachable through the plan-id index.
    async fn locate(&self, meal_plan_id: &str) -> Result<Vec<Item>, RepositoryError> {
        let items = query_all(&self.store, QueryRequest::gsi1(keys::meal_plan_pk(meal_plan_id)))
            .await
            .map_err(store_error)?;
        Ok(items
            .into_iter()
            .filter(|item| item.entity_type() == Some(MealPlanMapper::ENTITY_TYPE))
            .collect())
    }
}

fn store_error(e: StoreError) -> RepositoryError {
    RepositoryError::store(EntityKind::MealPlan, e)
}

#[async_trait]
impl<S: TableStore> MealPlanRepository for TableMealPlanRepository<S> {
    async fn save(&self, meal_plan: &MealPlan) -> Result<(), RepositoryError> {
        tracing::debug!(
            "Saving meal plan {} for user {}",
            meal_plan.id,
            meal_plan.user_id
        );
        self.store
            .put_item(MealPlanMapper::to_item(meal_plan))
            .await
            .map_err(store_error)
    }

    async fn get_by_id(&self, meal_plan_id: &str) -> Result<Option<MealPlan>, RepositoryError> {
        let items = self.locate(meal_plan_id).await?;
        Ok(map_items::<MealPlanMapper>(items)?.into_iter().next())
    }

    async fn get_by_user(&self, user_id: &str) -> Result<Vec<MealPlan>, RepositoryError> {
        let request =
            QueryRequest::partition(keys::user_pk(user_id)).with_sort_prefix(keys::MEALPLAN_PREFIX);
        let items = query_all(&self.store, request)
            .await
            .map_err(store_error)?;
        map_items::<MealPlanMapper>(items)
    }

    async fn get_active_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<MealPlan>, RepositoryError> {
        let plans = self.get_by_user(user_id).await?;
        Ok(plans.into_iter().find(|plan| plan.is_active))
    }

    async fn get_by_user_and_week(
        &self,
        user_id: &str,
        week_start_date: NaiveDate,
    ) -> Result<Option<MealPlan>, RepositoryError> {
        let plans = self.get_by_user(user_id).await?;
        Ok(plans
            .into_iter()
            .find(|plan| plan.week_start_date == week_start_date))
    }

    async fn delete(&self, meal_plan_id: &str) -> Result<bool, RepositoryError> {
        let Some(key) = self
            .locate(meal_plan_id)
            .await?
            .first()
            .and_then(Item::primary_key)
        else {
            return Ok(false);
        };

        tracing::debug!("Deleting meal plan {} at {}", meal_plan_id, key);
        self.store.delete_item(&key).await.map_err(store_error)
    }

    async fn exists(&self, meal_plan_id: &str) -> Result<bool, RepositoryError> {
        Ok(!self.locate(meal_plan_id).await?.is_empty())
    }
}
