//! In-process table backed by an ordered map.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    validate_item, ContinuationToken, Item, Page, PrimaryKey, QueryRequest, ScanRequest,
    StoreError, TableIndex, TableStore, GSI1SK,
};

/// Default number of items evaluated per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A table held in memory.
///
/// Clones share the same underlying data.
#[derive(Clone, Debug)]
pub struct MemoryTable {
    items: Arc<RwLock<BTreeMap<PrimaryKey, Item>>>,
    page_size: usize,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates a table whose reads stop after `page_size` evaluated items.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: page_size.max(1),
        }
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<PrimaryKey, Item>>, StoreError> {
        self.items
            .read()
            .map_err(|_| StoreError::internal("memory table lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<PrimaryKey, Item>>, StoreError> {
        self.items
            .write()
            .map_err(|_| StoreError::internal("memory table lock poisoned"))
    }
}

/// Position of an item in a query's ordering.
fn order_key(item: &Item, key: &PrimaryKey, index: TableIndex) -> (Option<String>, PrimaryKey) {
    let index_sort = match index {
        TableIndex::Primary => None,
        TableIndex::Gsi1 => item.get_str(GSI1SK).map(str::to_string),
    };
    (index_sort, key.clone())
}

#[async_trait]
impl TableStore for MemoryTable {
    async fn get_item(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError> {
        tracing::debug!("get_item {}", key);
        Ok(self.read()?.get(key).cloned())
    }

    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        let key = validate_item(&item)?;
        tracing::debug!("put_item {}", key);
        self.write()?.insert(key, item);
        Ok(())
    }

    async fn delete_item(&self, key: &PrimaryKey) -> Result<bool, StoreError> {
        tracing::debug!("delete_item {}", key);
        Ok(self.write()?.remove(key).is_some())
    }

    async fn query(&self, request: &QueryRequest) -> Result<Page, StoreError> {
        tracing::debug!(
            "query {:?} partition={} prefix={:?}",
            request.index,
            request.partition,
            request.sort_prefix
        );
        let items = self.read()?;

        let mut matched: Vec<((Option<String>, PrimaryKey), &Item)> = items
            .iter()
            .filter(|(_, item)| request.matches(item))
            .map(|(key, item)| (order_key(item, key, request.index), item))
            .collect();
        matched.sort_by(|a, b| a.0.cmp(&b.0));
        if !request.scan_forward {
            matched.reverse();
        }

        if let Some(start) = &request.start {
            let start_key = (start.index_sort.clone(), start.key.clone());
            matched.retain(|(position, _)| {
                if request.scan_forward {
                    *position > start_key
                } else {
                    *position < start_key
                }
            });
        }

        let limit = request.limit.unwrap_or(self.page_size).max(1);
        let page: Vec<Item> = matched
            .into_iter()
            .take(limit)
            .map(|(_, item)| item.clone())
            .collect();

        let next = if page.len() == limit {
            page.last()
                .and_then(|last| ContinuationToken::after(last, request.index))
        } else {
            None
        };

        Ok(Page { items: page, next })
    }

    async fn scan(&self, request: &ScanRequest) -> Result<Page, StoreError> {
        tracing::debug!("scan filter={:?}", request.filter);
        let items = self.read()?;
        let limit = request.limit.unwrap_or(self.page_size).max(1);

        let evaluated: Vec<&Item> = items
            .iter()
            .filter(|(key, _)| match &request.start {
                Some(start) => **key > start.key,
                None => true,
            })
            .take(limit)
            .map(|(_, item)| item)
            .collect();

        let next = if evaluated.len() == limit {
            evaluated
                .last()
                .and_then(|last| ContinuationToken::after(last, TableIndex::Primary))
        } else {
            None
        };

        let page = evaluated
            .into_iter()
            .filter(|item| request.filter.matches(item))
            .cloned()
            .collect();

        Ok(Page { items: page, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{
        AttributeMap, AttributeValue, ScanFilter, StoreErrorCode, DATA, ENTITY_TYPE, GSI1PK, PK,
        SK,
    };

    fn feedback_item(user: &str, id: &str, recipe: &str, created: &str) -> Item {
        let mut data = AttributeMap::new();
        data.insert("id".into(), id.into());
        Item::new()
            .with(PK, format!("USER#{}", user))
            .with(SK, format!("FEEDBACK#{}", id))
            .with(GSI1PK, format!("RECIPE#{}", recipe))
            .with(GSI1SK, created)
            .with(ENTITY_TYPE, "Feedback")
            .with(DATA, AttributeValue::M(data))
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let table = MemoryTable::new();
        let item = feedback_item("u1", "f1", "r1", "2025-01-01");
        let key = item.primary_key().unwrap();

        table.put_item(item.clone()).await.unwrap();
        assert_eq!(table.get_item(&key).await.unwrap(), Some(item));

        assert!(table.delete_item(&key).await.unwrap());
        assert!(!table.delete_item(&key).await.unwrap());
        assert!(table.get_item(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let table = MemoryTable::new();
        table
            .put_item(feedback_item("u1", "f1", "r1", "2025-01-01"))
            .await
            .unwrap();
        table
            .put_item(feedback_item("u1", "f1", "r2", "2025-01-02"))
            .await
            .unwrap();

        assert_eq!(table.len(), 1);
        let stored = table
            .get_item(&PrimaryKey::new("USER#u1", "FEEDBACK#f1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get_str(GSI1PK), Some("RECIPE#r2"));
    }

    #[tokio::test]
    async fn test_put_rejects_keyless_item() {
        let table = MemoryTable::new();
        let err = table.put_item(Item::new().with(PK, "X")).await.unwrap_err();
        assert_eq!(err.code, StoreErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_query_pages_in_index_order() {
        let table = MemoryTable::with_page_size(2);
        for (i, created) in ["2025-01-03", "2025-01-01", "2025-01-02"].iter().enumerate() {
            table
                .put_item(feedback_item("u1", &format!("f{}", i), "r1", created))
                .await
                .unwrap();
        }

        let request = QueryRequest::gsi1("RECIPE#r1");
        let first = table.query(&request).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].get_str(GSI1SK), Some("2025-01-01"));
        assert!(first.next.is_some());

        let second = table
            .query(&request.clone().starting_after(first.next))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].get_str(GSI1SK), Some("2025-01-03"));
        assert!(second.next.is_none());
    }

    #[tokio::test]
    async fn test_query_backward() {
        let table = MemoryTable::new();
        table
            .put_item(feedback_item("u1", "a", "r1", "2025-01-01"))
            .await
            .unwrap();
        table
            .put_item(feedback_item("u2", "b", "r1", "2025-01-05"))
            .await
            .unwrap();

        let page = table
            .query(&QueryRequest::gsi1("RECIPE#r1").backward())
            .await
            .unwrap();
        let dates: Vec<_> = page.items.iter().map(|i| i.get_str(GSI1SK).unwrap()).collect();
        assert_eq!(dates, vec!["2025-01-05", "2025-01-01"]);
    }

    #[tokio::test]
    async fn test_scan_filters_after_limit() {
        let table = MemoryTable::with_page_size(1);
        table
            .put_item(feedback_item("u1", "a", "r1", "2025-01-01"))
            .await
            .unwrap();
        table
            .put_item(feedback_item("u2", "b", "r1", "2025-01-02"))
            .await
            .unwrap();

        let request = ScanRequest::new(ScanFilter::entity("Feedback").with_data_field("id", "b"));
        let first = table.scan(&request).await.unwrap();
        // First evaluated item does not match, but the scan continues
        assert!(first.items.is_empty());
        assert!(first.next.is_some());

        let second = table
            .scan(&request.clone().starting_after(first.next))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
    }
}
