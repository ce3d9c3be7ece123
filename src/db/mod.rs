//! Persistence for meal-planner entities in a single key-value table.

pub mod access;
pub mod error;
pub mod keys;
pub mod mapper;
pub mod store;

mod feedback_repo;
mod grocery_list_repo;
mod mealplan_repo;
mod recipe_repo;
mod repository;
mod user_repo;

#[cfg(test)]
mod test_support;

pub use error::{EntityKind, MappingError, RepositoryError};
pub use feedback_repo::TableFeedbackRepository;
pub use grocery_list_repo::TableGroceryListRepository;
pub use mealplan_repo::TableMealPlanRepository;
pub use recipe_repo::TableRecipeRepository;
pub use repository::{
    FeedbackRepository, GroceryListRepository, MealPlanRepository, RecipeRepository,
    UserRepository,
};
pub use store::{MemoryTable, SqliteTable, StoreError, StoreErrorCode, TableStore};
pub use user_repo::TableUserRepository;

use std::path::Path;

/// Opens the SQLite-backed table and makes sure it exists.
pub async fn open_table(
    db_path: &Path,
    table_name: &str,
    page_size: usize,
) -> Result<SqliteTable, RepositoryError> {
    let table = SqliteTable::connect(db_path, table_name, page_size)
        .await
        .map_err(|e| error::translate_store_error(e, "Table"))?;
    table
        .create_table()
        .await
        .map_err(|e| error::translate_store_error(e, "Table"))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_table_creates_table() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let table = open_table(&db_path, "meal-planner", 100).await.unwrap();
        assert!(db_path.exists());

        let recipes = TableRecipeRepository::new(table);
        assert!(recipes.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_table_rejects_bad_name() {
        let temp_dir = tempdir().unwrap();
        let err = open_table(&temp_dir.path().join("test.db"), "x", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Domain { .. }));
        assert_eq!(err.code(), Some(StoreErrorCode::ValidationFailed));
    }
}
