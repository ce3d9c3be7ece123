use async_trait::async_trait;
use meal_planner_core::Feedback;

use super::access::{linear_fallback, map_item, map_items, query_all};
use super::error::{EntityKind, RepositoryError};
use super::keys;
use super::mapper::{EntityMapper, FeedbackMapper};
use super::repository::FeedbackRepository;
use super::store::{Item, QueryRequest, StoreError, TableStore};

/// Feedback is stored under the user and indexed under the recipe.
///
/// Lookups by feedback id alone have no key to go on and scan the table.
pub struct TableFeedbackRepository<S> {
    store: S,
}

impl<S: TableStore> TableFeedbackRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn locate(&self, feedback_id: &str) -> Result<Option<Item>, RepositoryError> {
        linear_fallback(&self.store, EntityKind::Feedback, feedback_id)
            .await
            .map_err(store_error)
    }
}

fn store_error(e: StoreError) -> RepositoryError {
    RepositoryError::store(EntityKind::Feedback, e)
}

#[async_trait]
impl<S: TableStore> FeedbackRepository for TableFeedbackRepository<S> {
    async fn save(&self, feedback: &Feedback) -> Result<(), RepositoryError> {
        tracing::debug!(
            "Saving feedback {} for recipe {}",
            feedback.id,
            feedback.recipe_id
        );
        self.store
            .put_item(FeedbackMapper::to_item(feedback))
            .await
            .map_err(store_error)
    }

    async fn get_by_id(&self, feedback_id: &str) -> Result<Option<Feedback>, RepositoryError> {
        let item = self.locate(feedback_id).await?;
        map_item::<FeedbackMapper>(item)
    }

    async fn get_by_user(&self, user_id: &str) -> Result<Vec<Feedback>, RepositoryError> {
        let request =
            QueryRequest::partition(keys::user_pk(user_id)).with_sort_prefix(keys::FEEDBACK_PREFIX);
        let items = query_all(&self.store, request)
            .await
            .map_err(store_error)?;
        map_items::<FeedbackMapper>(items)
    }

    async fn get_by_recipe(&self, recipe_id: &str) -> Result<Vec<Feedback>, RepositoryError> {
        let request = QueryRequest::gsi1(keys::recipe_pk(recipe_id)).backward();
        let items = query_all(&self.store, request)
            .await
            .map_err(store_error)?;
        map_items::<FeedbackMapper>(items)
    }

    async fn delete(&self, feedback_id: &str) -> Result<bool, RepositoryError> {
        let Some(key) = self
            .locate(feedback_id)
            .await?
            .as_ref()
            .and_then(Item::primary_key)
        else {
            return Ok(false);
        };

        tracing::debug!("Deleting feedback {} at {}", feedback_id, key);
        self.store.delete_item(&key).await.map_err(store_error)
    }

    async fn exists(&self, feedback_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.locate(feedback_id).await?.is_some())
    }
}
