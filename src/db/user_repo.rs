use async_trait::async_trait;
use meal_planner_core::UserProfile;

use super::access::map_item;
use super::error::{EntityKind, RepositoryError};
use super::keys;
use super::mapper::{EntityMapper, UserProfileMapper};
use super::repository::UserRepository;
use super::store::{StoreError, TableStore};

pub struct TableUserRepository<S> {
    store: S,
}

impl<S: TableStore> TableUserRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

fn store_error(e: StoreError) -> RepositoryError {
    RepositoryError::store(EntityKind::UserProfile, e)
}

#[async_trait]
impl<S: TableStore> UserRepository for TableUserRepository<S> {
    async fn save(&self, user: &UserProfile) -> Result<(), RepositoryError> {
        tracing::debug!("Saving user {}", user.id);
        self.store
            .put_item(UserProfileMapper::to_item(user))
            .await
            .map_err(store_error)
    }

    async fn get_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let item = self
            .store
            .get_item(&keys::user_key(user_id))
            .await
            .map_err(store_error)?;
        map_item::<UserProfileMapper>(item)
    }

    async fn delete(&self, user_id: &str) -> Result<bool, RepositoryError> {
        tracing::debug!("Deleting user {}", user_id);
        self.store
            .delete_item(&keys::user_key(user_id))
            .await
            .map_err(store_error)
    }

    async fn exists(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let item = self
            .store
            .get_item(&keys::user_key(user_id))
            .await
            .map_err(store_error)?;
        Ok(item.is_some())
    }
}
