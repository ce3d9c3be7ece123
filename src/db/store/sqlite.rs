//! Table stored in a single SQLite table.
//!
//! Each item is kept as JSON next to copies of its key and index attributes,
//! which are the only columns queries touch.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use super::{
    validate_item, ContinuationToken, Item, Page, PrimaryKey, QueryRequest, ScanRequest,
    StoreError, TableIndex, TableStore, ENTITY_TYPE, GSI1PK, GSI1SK,
};

#[derive(Clone, Debug)]
pub struct SqliteTable {
    pool: SqlitePool,
    table_name: String,
    page_size: usize,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    item: String,
}

/// Table names follow the same rules as hosted key-value tables.
fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if !(3..=255).contains(&name.len()) || !valid_chars {
        return Err(StoreError::validation(format!(
            "invalid table name '{}': use 3-255 characters from [A-Za-z0-9_.-]",
            name
        )));
    }
    Ok(())
}

impl SqliteTable {
    /// Wraps an existing pool.
    pub fn new(
        pool: SqlitePool,
        table_name: impl Into<String>,
        page_size: usize,
    ) -> Result<Self, StoreError> {
        let table_name = table_name.into();
        validate_table_name(&table_name)?;
        Ok(Self {
            pool,
            table_name,
            page_size: page_size.max(1),
        })
    }

    /// Opens (creating if needed) the database file at `path`.
    pub async fn connect(
        path: &Path,
        table_name: impl Into<String>,
        page_size: usize,
    ) -> Result<Self, StoreError> {
        let table_name = table_name.into();
        validate_table_name(&table_name)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::internal(format!(
                    "failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened {} for table {}", path.display(), table_name);
        Self::new(pool, table_name, page_size)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Creates the table and its index if they do not exist.
    pub async fn create_table(&self) -> Result<(), StoreError> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                pk TEXT NOT NULL,
                sk TEXT NOT NULL,
                gsi1pk TEXT,
                gsi1sk TEXT,
                entity_type TEXT,
                item TEXT NOT NULL,
                PRIMARY KEY (pk, sk)
            )
            "#,
            table = self.table_name
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let create_index = format!(
            r#"CREATE INDEX IF NOT EXISTS "{table}_gsi1" ON "{table}" (gsi1pk, gsi1sk, pk, sk)"#,
            table = self.table_name
        );
        sqlx::query(&create_index).execute(&self.pool).await?;

        tracing::info!("Table {} ready", self.table_name);
        Ok(())
    }

    async fn fetch_items(
        &self,
        sql: &str,
        binds: Vec<String>,
        limit: usize,
    ) -> Result<Vec<Item>, StoreError> {
        let mut query = sqlx::query_as::<_, ItemRow>(sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.bind(limit as i64).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| serde_json::from_str::<Item>(&row.item).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl TableStore for SqliteTable {
    async fn get_item(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError> {
        tracing::debug!("get_item {}", key);
        let sql = format!(
            r#"SELECT item FROM "{}" WHERE pk = ? AND sk = ?"#,
            self.table_name
        );
        let row: Option<ItemRow> = sqlx::query_as(&sql)
            .bind(&key.pk)
            .bind(&key.sk)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.item)?)),
            None => Ok(None),
        }
    }

    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        let key = validate_item(&item)?;
        tracing::debug!("put_item {}", key);
        let json = serde_json::to_string(&item)?;

        let sql = format!(
            r#"
            INSERT INTO "{}" (pk, sk, gsi1pk, gsi1sk, entity_type, item)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (pk, sk) DO UPDATE SET
                gsi1pk = excluded.gsi1pk,
                gsi1sk = excluded.gsi1sk,
                entity_type = excluded.entity_type,
                item = excluded.item
            "#,
            self.table_name
        );
        sqlx::query(&sql)
            .bind(&key.pk)
            .bind(&key.sk)
            .bind(item.get_str(GSI1PK))
            .bind(item.get_str(GSI1SK))
            .bind(item.get_str(ENTITY_TYPE))
            .bind(&json)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_item(&self, key: &PrimaryKey) -> Result<bool, StoreError> {
        tracing::debug!("delete_item {}", key);
        let sql = format!(
            r#"DELETE FROM "{}" WHERE pk = ? AND sk = ?"#,
            self.table_name
        );
        let result = sqlx::query(&sql)
            .bind(&key.pk)
            .bind(&key.sk)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query(&self, request: &QueryRequest) -> Result<Page, StoreError> {
        tracing::debug!(
            "query {:?} partition={} prefix={:?}",
            request.index,
            request.partition,
            request.sort_prefix
        );
        let (partition_col, sort_col, order_cols) = match request.index {
            TableIndex::Primary => ("pk", "sk", "sk"),
            TableIndex::Gsi1 => ("gsi1pk", "gsi1sk", "gsi1sk, pk, sk"),
        };
        let direction = if request.scan_forward { "ASC" } else { "DESC" };
        let cursor_op = if request.scan_forward { ">" } else { "<" };

        let mut sql = format!(
            r#"SELECT item FROM "{}" WHERE {} = ? AND {} IS NOT NULL"#,
            self.table_name, partition_col, sort_col
        );
        let mut binds = vec![request.partition.clone()];

        if let Some(prefix) = &request.sort_prefix {
            sql.push_str(&format!(" AND substr({}, 1, length(?)) = ?", sort_col));
            binds.push(prefix.clone());
            binds.push(prefix.clone());
        }

        if let Some(start) = &request.start {
            match (request.index, &start.index_sort) {
                (TableIndex::Gsi1, Some(index_sort)) => {
                    sql.push_str(&format!(" AND (gsi1sk, pk, sk) {} (?, ?, ?)", cursor_op));
                    binds.push(index_sort.clone());
                    binds.push(start.key.pk.clone());
                    binds.push(start.key.sk.clone());
                }
                (TableIndex::Primary, _) => {
                    sql.push_str(&format!(" AND sk {} ?", cursor_op));
                    binds.push(start.key.sk.clone());
                }
                (TableIndex::Gsi1, None) => {
                    return Err(StoreError::validation(
                        "continuation token does not belong to an index query",
                    ));
                }
            }
        }

        let order: Vec<String> = order_cols
            .split(", ")
            .map(|col| format!("{} {}", col, direction))
            .collect();
        sql.push_str(&format!(" ORDER BY {} LIMIT ?", order.join(", ")));

        let limit = request.limit.unwrap_or(self.page_size).max(1);
        let items = self.fetch_items(&sql, binds, limit).await?;

        let next = if items.len() == limit {
            items
                .last()
                .and_then(|last| ContinuationToken::after(last, request.index))
        } else {
            None
        };

        Ok(Page { items, next })
    }

    async fn scan(&self, request: &ScanRequest) -> Result<Page, StoreError> {
        tracing::debug!("scan filter={:?}", request.filter);
        let mut sql = format!(r#"SELECT item FROM "{}""#, self.table_name);
        let mut binds = Vec::new();

        if let Some(start) = &request.start {
            sql.push_str(" WHERE (pk, sk) > (?, ?)");
            binds.push(start.key.pk.clone());
            binds.push(start.key.sk.clone());
        }
        sql.push_str(" ORDER BY pk, sk LIMIT ?");

        let limit = request.limit.unwrap_or(self.page_size).max(1);
        let evaluated = self.fetch_items(&sql, binds, limit).await?;

        let next = if evaluated.len() == limit {
            evaluated
                .last()
                .and_then(|last| ContinuationToken::after(last, TableIndex::Primary))
        } else {
            None
        };

        let items = evaluated
            .into_iter()
            .filter(|item| request.filter.matches(item))
            .collect();

        Ok(Page { items, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{AttributeValue, ScanFilter, StoreErrorCode, PK, SK};
    use bigdecimal::BigDecimal;
    use tempfile::TempDir;

    struct TestContext {
        table: SqliteTable,
        _temp_dir: TempDir,
    }

    impl TestContext {
        async fn new(page_size: usize) -> Self {
            let temp_dir = TempDir::new().unwrap();
            let db_path = temp_dir.path().join("test.db");
            let table = SqliteTable::connect(&db_path, "meal-planner", page_size)
                .await
                .unwrap();
            table.create_table().await.unwrap();
            Self {
                table,
                _temp_dir: temp_dir,
            }
        }
    }

    fn slot_item(user: &str, plan: &str, week: &str) -> Item {
        Item::new()
            .with(PK, format!("USER#{}", user))
            .with(SK, format!("MEALPLAN#{}", plan))
            .with(GSI1PK, format!("MEALPLAN#{}", plan))
            .with(GSI1SK, week)
            .with(ENTITY_TYPE, "MealPlan")
    }

    #[test]
    fn test_table_name_validation() {
        assert!(validate_table_name("meal-planner").is_ok());
        assert!(validate_table_name("meals_v2.prod").is_ok());
        assert!(validate_table_name("ab").is_err());
        assert!(validate_table_name("bad\"name").is_err());
        assert!(validate_table_name("has space").is_err());
    }

    #[tokio::test]
    async fn test_create_table_is_idempotent() {
        let ctx = TestContext::new(100).await;
        ctx.table.create_table().await.unwrap();
        assert_eq!(ctx.table.table_name(), "meal-planner");
    }

    #[tokio::test]
    async fn test_missing_table_is_resource_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let table = SqliteTable::connect(&temp_dir.path().join("empty.db"), "absent", 100)
            .await
            .unwrap();

        let err = table
            .get_item(&PrimaryKey::new("RECIPE#1", "METADATA"))
            .await
            .unwrap_err();
        assert_eq!(err.code, StoreErrorCode::ResourceNotFound);
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let ctx = TestContext::new(100).await;
        let item = slot_item("u1", "p1", "2025-03-03")
            .with("Servings", BigDecimal::from_str("2.5").unwrap());
        let key = item.primary_key().unwrap();

        ctx.table.put_item(item.clone()).await.unwrap();
        let stored = ctx.table.get_item(&key).await.unwrap().unwrap();
        assert_eq!(stored, item);
        assert_eq!(
            stored.get("Servings").and_then(AttributeValue::as_number),
            Some(&BigDecimal::from_str("2.5").unwrap())
        );

        assert!(ctx.table.delete_item(&key).await.unwrap());
        assert!(!ctx.table.delete_item(&key).await.unwrap());
        assert!(ctx.table.get_item(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let ctx = TestContext::new(100).await;
        ctx.table
            .put_item(slot_item("u1", "p1", "2025-03-03"))
            .await
            .unwrap();
        ctx.table
            .put_item(slot_item("u1", "p1", "2025-03-10"))
            .await
            .unwrap();

        let page = ctx
            .table
            .query(&QueryRequest::partition("USER#u1"))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].get_str(GSI1SK), Some("2025-03-10"));
    }

    #[tokio::test]
    async fn test_query_prefix_and_pages() {
        let ctx = TestContext::new(2).await;
        for plan in ["a", "b", "c"] {
            ctx.table
                .put_item(slot_item("u1", plan, "2025-03-03"))
                .await
                .unwrap();
        }
        ctx.table
            .put_item(
                Item::new()
                    .with(PK, "USER#u1")
                    .with(SK, "PROFILE")
                    .with(ENTITY_TYPE, "UserProfile"),
            )
            .await
            .unwrap();

        let request = QueryRequest::partition("USER#u1").with_sort_prefix("MEALPLAN#");
        let first = ctx.table.query(&request).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.next.is_some());

        let second = ctx
            .table
            .query(&request.clone().starting_after(first.next))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].get_str(SK), Some("MEALPLAN#c"));
        assert!(second.next.is_none());
    }

    #[tokio::test]
    async fn test_index_query_descending() {
        let ctx = TestContext::new(1).await;
        ctx.table
            .put_item(slot_item("u1", "a", "2025-03-03"))
            .await
            .unwrap();
        ctx.table
            .put_item(slot_item("u2", "b", "2025-03-10"))
            .await
            .unwrap();
        // Both plans share the index partition for this test
        for (user, plan) in [("u1", "a"), ("u2", "b")] {
            let key = PrimaryKey::new(format!("USER#{}", user), format!("MEALPLAN#{}", plan));
            let item = ctx.table.get_item(&key).await.unwrap().unwrap();
            ctx.table
                .put_item(item.with(GSI1PK, "SHARED"))
                .await
                .unwrap();
        }

        let request = QueryRequest::gsi1("SHARED").backward();
        let first = ctx.table.query(&request).await.unwrap();
        assert_eq!(first.items[0].get_str(GSI1SK), Some("2025-03-10"));

        let second = ctx
            .table
            .query(&request.clone().starting_after(first.next))
            .await
            .unwrap();
        assert_eq!(second.items[0].get_str(GSI1SK), Some("2025-03-03"));
    }

    #[tokio::test]
    async fn test_scan_applies_filter() {
        let ctx = TestContext::new(100).await;
        ctx.table
            .put_item(slot_item("u1", "a", "2025-03-03"))
            .await
            .unwrap();
        ctx.table
            .put_item(
                Item::new()
                    .with(PK, "RECIPE#r1")
                    .with(SK, "METADATA")
                    .with(ENTITY_TYPE, "Recipe"),
            )
            .await
            .unwrap();

        let page = ctx
            .table
            .scan(&ScanRequest::new(ScanFilter::entity("Recipe")))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].get_str(PK), Some("RECIPE#r1"));
        assert!(page.next.is_none());
    }
}
