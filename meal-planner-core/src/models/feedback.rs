use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A user's rating of a recipe they cooked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    pub recipe_id: String,
    /// 1 (worst) to 5 (best)
    pub rating: u8,
    pub would_make_again: bool,
    /// Plan the recipe was cooked from, if any
    pub meal_plan_id: Option<String>,
    pub notes: Option<String>,
    pub cooked_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Feedback {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        recipe_id: impl Into<String>,
        rating: u8,
        would_make_again: bool,
    ) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::InvalidRating(rating));
        }
        Ok(Self {
            id: id.into(),
            user_id: user_id.into(),
            recipe_id: recipe_id.into(),
            rating,
            would_make_again,
            meal_plan_id: None,
            notes: None,
            cooked_date: None,
            created_at: None,
        })
    }

    pub fn with_meal_plan(mut self, meal_plan_id: impl Into<String>) -> Self {
        self.meal_plan_id = Some(meal_plan_id.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_cooked_date(mut self, date: NaiveDate) -> Self {
        self.cooked_date = Some(date);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn is_positive(&self) -> bool {
        self.rating >= 4
    }

    pub fn is_negative(&self) -> bool {
        self.rating <= 2
    }

    /// Combines rating and `would_make_again` into a score in [-1.0, 1.0].
    ///
    /// A rating of 3 is neutral; `would_make_again` scales the normalized
    /// rating by 1.2, otherwise by 0.8.
    pub fn sentiment_score(&self) -> f64 {
        let normalized = (f64::from(self.rating) - 3.0) / 2.0;
        let multiplier = if self.would_make_again { 1.2 } else { 0.8 };
        (normalized * multiplier).clamp(-1.0, 1.0)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rated {} {}/5",
            self.user_id, self.recipe_id, self.rating
        )?;
        if self.would_make_again {
            write!(f, " (would make again)")?;
        }
        if let Some(notes) = &self.notes {
            write!(f, ": {}", notes)?;
        }
        Ok(())
    }
}
