use async_trait::async_trait;
use meal_planner_core::Recipe;

use super::access::{map_item, map_items, query_all};
use super::error::{EntityKind, RepositoryError};
use super::keys;
use super::mapper::{EntityMapper, RecipeMapper};
use super::repository::RecipeRepository;
use super::store::{QueryRequest, StoreError, TableStore};

/// Recipes keyed by id, listed through the `RECIPE#ALL` index partition.
pub struct TableRecipeRepository<S> {
    store: S,
}

impl<S: TableStore> TableRecipeRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

fn store_error(e: StoreError) -> RepositoryError {
    RepositoryError::store(EntityKind::Recipe, e)
}

#[async_trait]
impl<S: TableStore> RecipeRepository for TableRecipeRepository<S> {
    async fn save(&self, recipe: &Recipe) -> Result<(), RepositoryError> {
        tracing::debug!("Saving recipe {}", recipe.id);
        self.store
            .put_item(RecipeMapper::to_item(recipe))
            .await
            .map_err(store_error)
    }

    async fn get_by_id(&self, recipe_id: &str) -> Result<Option<Recipe>, RepositoryError> {
        let item = self
            .store
            .get_item(&keys::recipe_key(recipe_id))
            .await
            .map_err(store_error)?;
        map_item::<RecipeMapper>(item)
    }

    async fn get_all(&self) -> Result<Vec<Recipe>, RepositoryError> {
        let items = query_all(&self.store, QueryRequest::gsi1(keys::ALL_RECIPES))
            .await
            .map_err(store_error)?;
        map_items::<RecipeMapper>(items)
    }

    async fn delete(&self, recipe_id: &str) -> Result<bool, RepositoryError> {
        tracing::debug!("Deleting recipe {}", recipe_id);
        self.store
            .delete_item(&keys::recipe_key(recipe_id))
            .await
            .map_err(store_error)
    }

    async fn exists(&self, recipe_id: &str) -> Result<bool, RepositoryError> {
        let item = self
            .store
            .get_item(&keys::recipe_key(recipe_id))
            .await
            .map_err(store_error)?;
        Ok(item.is_some())
    }
}
