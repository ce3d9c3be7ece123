//! Multi-page reads shared by the repositories.

use super::error::{EntityKind, RepositoryError};
use super::mapper::EntityMapper;
use super::store::{Item, QueryRequest, ScanFilter, ScanRequest, StoreError, TableStore};

/// Runs a query to exhaustion, following continuation tokens.
pub async fn query_all<S>(store: &S, request: QueryRequest) -> Result<Vec<Item>, StoreError>
where
    S: TableStore + ?Sized,
{
    let mut items = Vec::new();
    let mut request = request;
    let mut pages = 0usize;

    loop {
        let page = store.query(&request).await?;
        pages += 1;
        items.extend(page.items);
        match page.next {
            Some(token) => request = request.starting_after(Some(token)),
            None => break,
        }
    }

    tracing::debug!(
        "query {} returned {} items in {} pages",
        request.partition,
        items.len(),
        pages
    );
    Ok(items)
}

/// Runs a filtered scan to exhaustion.
pub async fn scan_all<S>(store: &S, filter: ScanFilter) -> Result<Vec<Item>, StoreError>
where
    S: TableStore + ?Sized,
{
    let mut items = Vec::new();
    let mut request = ScanRequest::new(filter);

    loop {
        let page = store.scan(&request).await?;
        items.extend(page.items);
        match page.next {
            Some(token) => request = request.starting_after(Some(token)),
            None => break,
        }
    }
    Ok(items)
}

/// Finds an entity by the `id` in its `Data` map by scanning the table.
///
/// Cost grows with the size of the whole table. Used only where the key
/// scheme gives no way to derive the item's key from its id.
pub async fn linear_fallback<S>(
    store: &S,
    kind: EntityKind,
    id: &str,
) -> Result<Option<Item>, StoreError>
where
    S: TableStore + ?Sized,
{
    tracing::debug!("Scanning table for {} {}", kind, id);
    let filter = ScanFilter::entity(kind.entity_type()).with_data_field("id", id);
    let mut request = ScanRequest::new(filter);

    loop {
        let page = store.scan(&request).await?;
        if let Some(item) = page.items.into_iter().next() {
            return Ok(Some(item));
        }
        match page.next {
            Some(token) => request = request.starting_after(Some(token)),
            None => return Ok(None),
        }
    }
}

/// Maps items into entities, skipping items of any other entity type.
pub fn map_items<M: EntityMapper>(items: Vec<Item>) -> Result<Vec<M::Entity>, RepositoryError> {
    items
        .into_iter()
        .filter(|item| {
            let matches = item.entity_type() == Some(M::ENTITY_TYPE);
            if !matches {
                tracing::warn!(
                    "Skipping {} item {} while reading {} entries",
                    item.entity_type().unwrap_or("untyped"),
                    item.primary_key()
                        .map(|key| key.to_string())
                        .unwrap_or_default(),
                    M::ENTITY_TYPE
                );
            }
            matches
        })
        .map(|item| M::from_item(&item).map_err(|e| RepositoryError::mapping(M::KIND, e)))
        .collect()
}

/// Maps a single optional item.
pub fn map_item<M: EntityMapper>(item: Option<Item>) -> Result<Option<M::Entity>, RepositoryError> {
    match item {
        Some(item) => M::from_item(&item)
            .map(Some)
            .map_err(|e| RepositoryError::mapping(M::KIND, e)),
        None => Ok(None),
    }
}
