use std::fmt;
use thiserror::Error;

/// Stable classification of store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// The table (or index) does not exist.
    ResourceNotFound,
    /// The request or item was malformed.
    ValidationFailed,
    /// A conditional write did not match.
    ConditionalCheckFailed,
    /// The store is overloaded or the request was throttled.
    ThroughputExceeded,
    /// The item exceeds the store's size limit.
    ItemTooLarge,
    Internal,
}

impl StoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorCode::ResourceNotFound => "ResourceNotFound",
            StoreErrorCode::ValidationFailed => "ValidationFailed",
            StoreErrorCode::ConditionalCheckFailed => "ConditionalCheckFailed",
            StoreErrorCode::ThroughputExceeded => "ThroughputExceeded",
            StoreErrorCode::ItemTooLarge => "ItemTooLarge",
            StoreErrorCode::Internal => "Internal",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by a backing store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::ValidationFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::Internal, message)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let code = match &err {
            sqlx::Error::Database(db) => {
                let message = db.message();
                if message.contains("no such table") {
                    StoreErrorCode::ResourceNotFound
                } else if message.contains("too big") || message.contains("full") {
                    StoreErrorCode::ItemTooLarge
                } else if message.contains("locked") || message.contains("busy") {
                    StoreErrorCode::ThroughputExceeded
                } else if db.is_check_violation() || db.is_unique_violation() {
                    StoreErrorCode::ConditionalCheckFailed
                } else {
                    StoreErrorCode::Internal
                }
            }
            sqlx::Error::PoolTimedOut => StoreErrorCode::ThroughputExceeded,
            _ => StoreErrorCode::Internal,
        };
        StoreError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::validation(format!("malformed item: {}", err))
    }
}
