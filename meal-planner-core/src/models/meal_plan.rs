use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// One planned meal on a specific date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealSlot {
    pub date: NaiveDate,
    pub recipe_id: String,
    pub servings: u32,
    /// e.g. "leftovers for lunch"
    pub notes: Option<String>,
}

impl MealSlot {
    pub fn new(
        date: NaiveDate,
        recipe_id: impl Into<String>,
        servings: u32,
    ) -> Result<Self, ValidationError> {
        if servings < 1 {
            return Err(ValidationError::InvalidServings(servings));
        }
        Ok(Self {
            date,
            recipe_id: recipe_id.into(),
            servings,
            notes: None,
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A week of planned meals owned by one user.
///
/// Meals are keyed by date. `swap_meal` and `remove_meal` operate per date,
/// but `add_meal` appends without checking for an existing slot on the same
/// date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlan {
    pub id: String,
    pub user_id: String,
    /// Typically a Monday
    pub week_start_date: NaiveDate,
    pub meals: Vec<MealSlot>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl MealPlan {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        week_start_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            week_start_date,
            meals: Vec::new(),
            created_at: None,
            is_active: true,
        }
    }

    pub fn with_meals(mut self, meals: Vec<MealSlot>) -> Self {
        self.meals = meals;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn add_meal(&mut self, meal: MealSlot) {
        self.meals.push(meal);
    }

    /// Removes every slot on `date`. Returns true if anything was removed.
    pub fn remove_meal(&mut self, date: NaiveDate) -> bool {
        let len_before = self.meals.len();
        self.meals.retain(|m| m.date != date);
        self.meals.len() != len_before
    }

    pub fn meal_on(&self, date: NaiveDate) -> Option<&MealSlot> {
        self.meals.iter().find(|m| m.date == date)
    }

    /// Unique recipe ids in first-seen order.
    pub fn recipe_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for meal in &self.meals {
            if !ids.contains(&meal.recipe_id) {
                ids.push(meal.recipe_id.clone());
            }
        }
        ids
    }

    /// Replaces the recipe planned on `date`, keeping the slot's notes.
    ///
    /// Returns `Ok(false)` when no meal is planned on that date.
    pub fn swap_meal(
        &mut self,
        date: NaiveDate,
        recipe_id: impl Into<String>,
        servings: u32,
    ) -> Result<bool, ValidationError> {
        let Some(slot) = self.meals.iter_mut().find(|m| m.date == date) else {
            return Ok(false);
        };

        let mut replacement = MealSlot::new(date, recipe_id, servings)?;
        replacement.notes = slot.notes.take();
        *slot = replacement;
        Ok(true)
    }

    /// Earliest and latest planned dates, or the week start twice when empty.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let dates = self.meals.iter().map(|m| m.date);
        match (dates.clone().min(), dates.max()) {
            (Some(first), Some(last)) => (first, last),
            _ => (self.week_start_date, self.week_start_date),
        }
    }
}

impl fmt::Display for MealPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Week of {}", self.week_start_date);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        writeln!(f, "Plan: {}", self.id)?;
        writeln!(f, "User: {}", self.user_id)?;
        writeln!(f, "Active: {}", if self.is_active { "yes" } else { "no" })?;

        if !self.meals.is_empty() {
            writeln!(f, "\nMeals:")?;
            for meal in &self.meals {
                write!(
                    f,
                    "  {} {} ({} servings)",
                    meal.date, meal.recipe_id, meal.servings
                )?;
                if let Some(notes) = &meal.notes {
                    write!(f, " - {}", notes)?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}
