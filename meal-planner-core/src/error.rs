//! Validation errors raised by domain constructors and business rules.

use thiserror::Error;

/// A domain invariant was violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Servings must be at least 1, got {0}")]
    InvalidServings(u32),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}
