//! Store doubles for repository tests.

use async_trait::async_trait;

use super::store::{
    Item, Page, PrimaryKey, QueryRequest, ScanRequest, StoreError, StoreErrorCode, TableStore,
};

/// A store whose every call fails with the same error.
pub struct FailingStore {
    code: StoreErrorCode,
    message: String,
}

impl FailingStore {
    pub fn new(code: StoreErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::new(self.code, self.message.clone()))
    }
}

#[async_trait]
impl TableStore for FailingStore {
    async fn get_item(&self, _key: &PrimaryKey) -> Result<Option<Item>, StoreError> {
        self.fail()
    }

    async fn put_item(&self, _item: Item) -> Result<(), StoreError> {
        self.fail()
    }

    async fn delete_item(&self, _key: &PrimaryKey) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn query(&self, _request: &QueryRequest) -> Result<Page, StoreError> {
        self.fail()
    }

    async fn scan(&self, _request: &ScanRequest) -> Result<Page, StoreError> {
        self.fail()
    }
}
