use async_trait::async_trait;
use meal_planner_core::GroceryList;

use super::access::{linear_fallback, map_item, map_items, query_all};
use super::error::{EntityKind, RepositoryError};
use super::keys;
use super::mapper::{EntityMapper, GroceryListMapper};
use super::repository::GroceryListRepository;
use super::store::{Item, QueryRequest, StoreError, TableStore};

/// Grocery lists are stored under the meal plan they were built from.
pub struct TableGroceryListRepository<S> {
    store: S,
}

impl<S: TableStore> TableGroceryListRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn locate(&self, grocery_list_id: &str) -> Result<Option<Item>, RepositoryError> {
        linear_fallback(&self.store, EntityKind::GroceryList, grocery_list_id)
            .await
            .map_err(store_error)
    }
}

fn store_error(e: StoreError) -> RepositoryError {
    RepositoryError::store(EntityKind::GroceryList, e)
}

#[async_trait]
impl<S: TableStore> GroceryListRepository for TableGroceryListRepository<S> {
    async fn save(&self, grocery_list: &GroceryList) -> Result<(), RepositoryError> {
        tracing::debug!(
            "Saving grocery list {} for meal plan {}",
            grocery_list.id,
            grocery_list.meal_plan_id
        );
        self.store
            .put_item(GroceryListMapper::to_item(grocery_list))
            .await
            .map_err(store_error)
    }

    async fn get_by_id(
        &self,
        grocery_list_id: &str,
    ) -> Result<Option<GroceryList>, RepositoryError> {
        let item = self.locate(grocery_list_id).await?;
        map_item::<GroceryListMapper>(item)
    }

    async fn get_by_meal_plan(
        &self,
        meal_plan_id: &str,
    ) -> Result<Option<GroceryList>, RepositoryError> {
        let request = QueryRequest::partition(keys::meal_plan_pk(meal_plan_id))
            .with_sort_prefix(keys::GROCERYLIST_PREFIX);
        let items = query_all(&self.store, request)
            .await
            .map_err(store_error)?;
        Ok(map_items::<GroceryListMapper>(items)?.into_iter().next())
    }

    async fn delete(&self, grocery_list_id: &str) -> Result<bool, RepositoryError> {
        let Some(key) = self
            .locate(grocery_list_id)
            .await?
            .as_ref()
            .and_then(Item::primary_key)
        else {
            return Ok(false);
        };

        tracing::debug!("Deleting grocery list {} at {}", grocery_list_id, key);
        self.store.delete_item(&key).await.map_err(store_error)
    }

    async fn exists(&self, grocery_list_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.locate(grocery_list_id).await?.is_some())
    }
}
