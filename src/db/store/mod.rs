//! The key-value store protocol every repository talks to.
//!
//! A store holds one table of [`Item`]s addressed by a composite primary key
//! (`PK`, `SK`) with one global secondary index (`GSI1PK`, `GSI1SK`). Items
//! without both index attributes are not projected into the index.
//!
//! Reads that can return many items are paginated: a [`Page`] carries a
//! [`ContinuationToken`] when the store stopped before the end of the result
//! set. Scans apply their filter after the page limit, so a page can be
//! empty and still carry a token.

mod error;
mod item;
mod memory;
mod sqlite;

use async_trait::async_trait;

pub use error::{StoreError, StoreErrorCode};
pub use item::{
    AttributeMap, AttributeValue, Item, PrimaryKey, CREATED_AT, DATA, ENTITY_TYPE, GSI1PK, GSI1SK,
    PK, SK, UPDATED_AT,
};
pub use memory::MemoryTable;
pub use sqlite::SqliteTable;

/// Maximum serialized size of a single item.
pub const MAX_ITEM_BYTES: usize = 400 * 1024;

/// Which key a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableIndex {
    /// `PK` / `SK`
    Primary,
    /// `GSI1PK` / `GSI1SK`
    Gsi1,
}

impl TableIndex {
    pub fn partition_attribute(&self) -> &'static str {
        match self {
            TableIndex::Primary => PK,
            TableIndex::Gsi1 => GSI1PK,
        }
    }

    pub fn sort_attribute(&self) -> &'static str {
        match self {
            TableIndex::Primary => SK,
            TableIndex::Gsi1 => GSI1SK,
        }
    }
}

/// Opaque marker for resuming a paginated read.
///
/// Holds the position of the last item the store evaluated; the next page
/// starts strictly after it in the request's ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken {
    pub(crate) key: PrimaryKey,
    pub(crate) index_sort: Option<String>,
}

impl ContinuationToken {
    pub(crate) fn after(item: &Item, index: TableIndex) -> Option<Self> {
        let key = item.primary_key()?;
        let index_sort = match index {
            TableIndex::Primary => None,
            TableIndex::Gsi1 => Some(item.get_str(GSI1SK)?.to_string()),
        };
        Some(Self { key, index_sort })
    }
}

/// Key-condition query: partition equality plus an optional sort-key prefix.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub index: TableIndex,
    pub partition: String,
    pub sort_prefix: Option<String>,
    /// Ascending sort-key order when true.
    pub scan_forward: bool,
    pub limit: Option<usize>,
    pub start: Option<ContinuationToken>,
}

impl QueryRequest {
    /// Query the primary key for one partition.
    pub fn partition(pk: impl Into<String>) -> Self {
        Self::on(TableIndex::Primary, pk)
    }

    /// Query `GSI1` for one index partition.
    pub fn gsi1(gsi1pk: impl Into<String>) -> Self {
        Self::on(TableIndex::Gsi1, gsi1pk)
    }

    fn on(index: TableIndex, partition: impl Into<String>) -> Self {
        Self {
            index,
            partition: partition.into(),
            sort_prefix: None,
            scan_forward: true,
            limit: None,
            start: None,
        }
    }

    pub fn with_sort_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sort_prefix = Some(prefix.into());
        self
    }

    /// Return items in descending sort-key order.
    pub fn backward(mut self) -> Self {
        self.scan_forward = false;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn starting_after(mut self, token: Option<ContinuationToken>) -> Self {
        self.start = token;
        self
    }

    /// True if the item satisfies the key condition.
    pub fn matches(&self, item: &Item) -> bool {
        let partition = item.get_str(self.index.partition_attribute());
        let sort = item.get_str(self.index.sort_attribute());
        match (partition, sort) {
            (Some(p), Some(s)) => {
                p == self.partition
                    && self
                        .sort_prefix
                        .as_deref()
                        .map_or(true, |prefix| s.starts_with(prefix))
            }
            _ => false,
        }
    }
}

/// Post-read filter applied by scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    /// Only items whose `EntityType` equals this value.
    pub entity_type: Option<String>,
    /// Only items whose `Data.<field>` is a string equal to the value.
    pub data_field: Option<(String, String)>,
}

impl ScanFilter {
    pub fn entity(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            data_field: None,
        }
    }

    pub fn with_data_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.data_field = Some((field.into(), value.into()));
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(entity_type) = &self.entity_type {
            if item.entity_type() != Some(entity_type.as_str()) {
                return false;
            }
        }
        if let Some((field, value)) = &self.data_field {
            let found = item
                .data()
                .and_then(|data| data.get(field))
                .and_then(AttributeValue::as_str);
            if found != Some(value.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Full-table read in primary-key order.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub filter: ScanFilter,
    pub limit: Option<usize>,
    pub start: Option<ContinuationToken>,
}

impl ScanRequest {
    pub fn new(filter: ScanFilter) -> Self {
        Self {
            filter,
            limit: None,
            start: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn starting_after(mut self, token: Option<ContinuationToken>) -> Self {
        self.start = token;
        self
    }
}

/// One page of results.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Item>,
    /// Present when more results may follow.
    pub next: Option<ContinuationToken>,
}

/// A table with a composite primary key and one secondary index.
///
/// Implementations must be safe to share across tasks. Writes are blind
/// overwrites: the last `put_item` for a key wins.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Strongly consistent point read.
    async fn get_item(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError>;

    /// Writes the whole item, replacing any item with the same key.
    async fn put_item(&self, item: Item) -> Result<(), StoreError>;

    /// Removes the item. Returns whether an item existed.
    async fn delete_item(&self, key: &PrimaryKey) -> Result<bool, StoreError>;

    async fn query(&self, request: &QueryRequest) -> Result<Page, StoreError>;

    async fn scan(&self, request: &ScanRequest) -> Result<Page, StoreError>;
}

/// Checks the item carries a usable primary key and fits the size limit.
pub(crate) fn validate_item(item: &Item) -> Result<PrimaryKey, StoreError> {
    let key = item
        .primary_key()
        .ok_or_else(|| StoreError::validation("item is missing a string PK or SK"))?;
    if key.pk.is_empty() || key.sk.is_empty() {
        return Err(StoreError::validation(format!(
            "key attributes must not be empty: {}",
            key
        )));
    }

    let size = serde_json::to_vec(item)?.len();
    if size > MAX_ITEM_BYTES {
        return Err(StoreError::new(
            StoreErrorCode::ItemTooLarge,
            format!(
                "item {} is {} bytes, limit is {} bytes",
                key, size, MAX_ITEM_BYTES
            ),
        ));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_item() -> Item {
        let mut data = AttributeMap::new();
        data.insert("id".into(), "plan-1".into());
        Item::new()
            .with(PK, "USER#u1")
            .with(SK, "MEALPLAN#plan-1")
            .with(GSI1PK, "MEALPLAN#plan-1")
            .with(GSI1SK, "2025-03-03")
            .with(ENTITY_TYPE, "MealPlan")
            .with(DATA, AttributeValue::M(data))
    }

    #[test]
    fn test_query_matches_primary_prefix() {
        let item = plan_item();
        assert!(QueryRequest::partition("USER#u1").matches(&item));
        assert!(QueryRequest::partition("USER#u1")
            .with_sort_prefix("MEALPLAN#")
            .matches(&item));
        assert!(!QueryRequest::partition("USER#u1")
            .with_sort_prefix("FEEDBACK#")
            .matches(&item));
        assert!(!QueryRequest::partition("USER#u2").matches(&item));
    }

    #[test]
    fn test_query_matches_index() {
        let item = plan_item();
        assert!(QueryRequest::gsi1("MEALPLAN#plan-1").matches(&item));

        // Items without index attributes are not in the index
        let profile = Item::new().with(PK, "USER#u1").with(SK, "PROFILE");
        assert!(!QueryRequest::gsi1("USER#u1").matches(&profile));
    }

    #[test]
    fn test_scan_filter() {
        let item = plan_item();
        assert!(ScanFilter::default().matches(&item));
        assert!(ScanFilter::entity("MealPlan")
            .with_data_field("id", "plan-1")
            .matches(&item));
        assert!(!ScanFilter::entity("Feedback").matches(&item));
        assert!(!ScanFilter::entity("MealPlan")
            .with_data_field("id", "plan-2")
            .matches(&item));
    }

    #[test]
    fn test_validate_item_rejects_missing_key() {
        let err = validate_item(&Item::new().with(PK, "USER#1")).unwrap_err();
        assert_eq!(err.code, StoreErrorCode::ValidationFailed);

        let err = validate_item(&Item::new().with(PK, "").with(SK, "PROFILE")).unwrap_err();
        assert_eq!(err.code, StoreErrorCode::ValidationFailed);
    }

    #[test]
    fn test_validate_item_rejects_oversized() {
        let item = plan_item().with("Blob", "x".repeat(MAX_ITEM_BYTES));
        let err = validate_item(&item).unwrap_err();
        assert_eq!(err.code, StoreErrorCode::ItemTooLarge);
    }

    #[test]
    fn test_token_for_index_needs_sort_value() {
        let item = plan_item();
        let token = ContinuationToken::after(&item, TableIndex::Gsi1).unwrap();
        assert_eq!(token.index_sort.as_deref(), Some("2025-03-03"));

        let profile = Item::new().with(PK, "USER#u1").with(SK, "PROFILE");
        assert!(ContinuationToken::after(&profile, TableIndex::Gsi1).is_none());
        assert!(ContinuationToken::after(&profile, TableIndex::Primary).is_some());
    }
}
