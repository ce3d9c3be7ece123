//! Errors surfaced by repositories.
//!
//! Store failures are translated at the repository boundary into one variant
//! per entity family; callers never see a raw [`StoreError`]. Mapping
//! failures are kept apart because they mean the stored data is bad, not
//! that the store misbehaved.

use meal_planner_core::ValidationError;
use std::fmt;
use thiserror::Error;

use super::store::{StoreError, StoreErrorCode};

/// The kind of entity an operation was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Recipe,
    UserProfile,
    MealPlan,
    Feedback,
    GroceryList,
}

impl EntityKind {
    /// Value stored in the `EntityType` attribute.
    pub const fn entity_type(&self) -> &'static str {
        match self {
            EntityKind::Recipe => "Recipe",
            EntityKind::UserProfile => "UserProfile",
            EntityKind::MealPlan => "MealPlan",
            EntityKind::Feedback => "Feedback",
            EntityKind::GroceryList => "GroceryList",
        }
    }

    /// Name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::UserProfile => "User",
            other => other.entity_type(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored item could not be turned into a domain entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{field}' should be {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{field}' has invalid date '{value}'")]
    InvalidDate { field: String, value: String },

    #[error("field '{field}' has invalid timestamp '{value}'")]
    InvalidTimestamp { field: String, value: String },

    #[error("field '{field}' has invalid number '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("expected entity type '{expected}', found '{found}'")]
    UnexpectedEntityType {
        expected: &'static str,
        found: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// Recipe, feedback and grocery list failures.
    #[error("{message}")]
    Recipe {
        code: StoreErrorCode,
        message: String,
    },

    #[error("{message}")]
    User {
        code: StoreErrorCode,
        message: String,
    },

    #[error("{message}")]
    MealPlan {
        code: StoreErrorCode,
        message: String,
    },

    /// Failures not tied to an entity family.
    #[error("{message}")]
    Domain {
        code: StoreErrorCode,
        message: String,
    },

    #[error("Failed to read {entity} item: {source}")]
    Mapping {
        entity: EntityKind,
        #[source]
        source: MappingError,
    },
}

impl RepositoryError {
    /// Translates a store failure that happened while handling `entity`.
    pub fn store(entity: EntityKind, error: StoreError) -> Self {
        translate_store_error(error, entity.label())
    }

    pub fn mapping(entity: EntityKind, source: MappingError) -> Self {
        RepositoryError::Mapping { entity, source }
    }

    /// The store error code, for store failures.
    pub fn code(&self) -> Option<StoreErrorCode> {
        match self {
            RepositoryError::Recipe { code, .. }
            | RepositoryError::User { code, .. }
            | RepositoryError::MealPlan { code, .. }
            | RepositoryError::Domain { code, .. } => Some(*code),
            RepositoryError::Mapping { .. } => None,
        }
    }
}

/// Builds the repository error for a store failure on the named entity.
///
/// The entity name picks the error family (case-insensitively); unknown
/// names fall back to [`RepositoryError::Domain`].
pub fn translate_store_error(error: StoreError, entity: &str) -> RepositoryError {
    let code = error.code;
    let message = match code {
        StoreErrorCode::ResourceNotFound => format!("{} not found in repository", entity),
        StoreErrorCode::ValidationFailed => {
            format!("Invalid {} data: {}", entity, error.message)
        }
        StoreErrorCode::ConditionalCheckFailed => format!("Condition check failed for {}", entity),
        StoreErrorCode::ThroughputExceeded => {
            format!("Store throughput exceeded for {}", entity)
        }
        StoreErrorCode::ItemTooLarge => format!("Item size limit exceeded for {}", entity),
        StoreErrorCode::Internal => format!("Store error for {}: {}", entity, error.message),
    };

    tracing::debug!("store error for {}: {}", entity, error);

    match entity.to_lowercase().as_str() {
        "recipe" | "feedback" | "grocerylist" => RepositoryError::Recipe { code, message },
        "user" | "userprofile" => RepositoryError::User { code, message },
        "mealplan" => RepositoryError::MealPlan { code, message },
        _ => RepositoryError::Domain { code, message },
    }
}
