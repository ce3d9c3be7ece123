//! Grocery lists consolidated from a meal plan's recipes.
//!
//! Items are identified within a list by their name and unit, compared
//! case-insensitively. Consolidating an ingredient that is already on the
//! list adds to its quantity and records the extra source recipe.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single line on a grocery list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryItem {
    pub name: String,
    /// Total quantity needed
    pub quantity: f64,
    pub unit: String,
    /// Store section (e.g. "produce", "dairy")
    pub category: String,
    /// Ids of the recipes that need this item
    pub recipe_sources: Vec<String>,
    pub is_purchased: bool,
    pub notes: Option<String>,
}

impl GroceryItem {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            category: "other".to_string(),
            recipe_sources: Vec::new(),
            is_purchased: false,
            notes: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_recipe_sources(mut self, sources: Vec<String>) -> Self {
        self.recipe_sources = sources;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn add_quantity(&mut self, additional: f64) {
        self.quantity += additional;
    }

    pub fn mark_purchased(&mut self) {
        self.is_purchased = true;
    }

    pub fn mark_unpurchased(&mut self) {
        self.is_purchased = false;
    }

    /// True if this item has the given (name, unit) identity.
    pub fn is_same_item(&self, name: &str, unit: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
            && self.unit.to_lowercase() == unit.to_lowercase()
    }
}

impl fmt::Display for GroceryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = if self.is_purchased { "[x]" } else { "[ ]" };
        if self.unit.is_empty() {
            write!(f, "{} {:<20} {}", check, self.name, self.quantity)
        } else {
            write!(
                f,
                "{} {:<20} {} {}",
                check, self.name, self.quantity, self.unit
            )
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryList {
    pub id: String,
    pub meal_plan_id: String,
    pub items: Vec<GroceryItem>,
    pub created_at: Option<DateTime<Utc>>,
    pub week_start_date: Option<NaiveDate>,
}

impl GroceryList {
    pub fn new(id: impl Into<String>, meal_plan_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            meal_plan_id: meal_plan_id.into(),
            items: Vec::new(),
            created_at: None,
            week_start_date: None,
        }
    }

    pub fn with_week_start_date(mut self, date: NaiveDate) -> Self {
        self.week_start_date = Some(date);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn add_item(&mut self, item: GroceryItem) {
        self.items.push(item);
    }

    /// Adds an ingredient requirement, merging with an existing line that has
    /// the same name and unit.
    pub fn consolidate_item(&mut self, name: &str, quantity: f64, unit: &str, recipe_id: &str) {
        if let Some(item) = self.items.iter_mut().find(|i| i.is_same_item(name, unit)) {
            item.add_quantity(quantity);
            if !item.recipe_sources.iter().any(|s| s == recipe_id) {
                item.recipe_sources.push(recipe_id.to_string());
            }
            return;
        }

        self.add_item(
            GroceryItem::new(name, quantity, unit).with_recipe_sources(vec![recipe_id.to_string()]),
        );
    }

    pub fn items_in_category(&self, category: &str) -> Vec<&GroceryItem> {
        let category = category.to_lowercase();
        self.items
            .iter()
            .filter(|i| i.category.to_lowercase() == category)
            .collect()
    }

    /// Sorted, de-duplicated category names.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.items.iter().map(|i| i.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn unpurchased_items(&self) -> Vec<&GroceryItem> {
        self.items.iter().filter(|i| !i.is_purchased).collect()
    }

    /// Marks the first item with this name (case-insensitive) as purchased.
    pub fn mark_item_purchased(&mut self, name: &str) -> bool {
        let name = name.to_lowercase();
        match self.items.iter_mut().find(|i| i.name.to_lowercase() == name) {
            Some(item) => {
                item.mark_purchased();
                true
            }
            None => false,
        }
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    pub fn purchased_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_purchased).count()
    }

    /// Percentage of items purchased, 0-100.
    pub fn completion_percentage(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.purchased_count() as f64 / self.total_items() as f64 * 100.0
    }
}
