use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// An ingredient line within a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    /// Preparation notes such as "diced"
    pub notes: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns a copy with the quantity multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            quantity: self.quantity * factor,
            ..self.clone()
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} {}", self.quantity, self.name)?;
        } else {
            write!(f, "{} {} {}", self.quantity, self.unit, self.name)?;
        }
        if let Some(notes) = &self.notes {
            write!(f, " ({})", notes)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub servings: u32,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    /// Dietary tags such as "vegetarian" or "gluten_free"
    pub dietary_tags: Vec<String>,
    pub cuisine: String,
    /// "easy", "medium" or "hard"
    pub difficulty: String,
    pub protein_type: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    /// Average rating (1-5)
    pub rating: Option<f64>,
}

impl Recipe {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        servings: u32,
    ) -> Result<Self, ValidationError> {
        if servings < 1 {
            return Err(ValidationError::InvalidServings(servings));
        }
        Ok(Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            servings,
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            dietary_tags: Vec::new(),
            cuisine: "other".to_string(),
            difficulty: "medium".to_string(),
            protein_type: "none".to_string(),
            image_url: None,
            source_url: None,
            rating: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_times(mut self, prep_minutes: u32, cook_minutes: u32) -> Self {
        self.prep_time_minutes = prep_minutes;
        self.cook_time_minutes = cook_minutes;
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn with_dietary_tags(mut self, tags: Vec<String>) -> Self {
        self.dietary_tags = tags;
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = cuisine.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    pub fn with_protein_type(mut self, protein_type: impl Into<String>) -> Self {
        self.protein_type = protein_type.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Checks the invariants that construction enforces.
    ///
    /// Fields are public, so a recipe deserialized from JSON or edited in
    /// place can drift; callers importing recipes should validate them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.servings < 1 {
            return Err(ValidationError::InvalidServings(self.servings));
        }
        Ok(())
    }

    pub fn total_time_minutes(&self) -> u32 {
        self.prep_time_minutes.saturating_add(self.cook_time_minutes)
    }

    /// Scales the recipe to a different number of servings.
    ///
    /// Scaling to the current serving count returns an unchanged copy.
    pub fn scale(&self, new_servings: u32) -> Result<Recipe, ValidationError> {
        if new_servings < 1 {
            return Err(ValidationError::InvalidServings(new_servings));
        }
        self.validate()?;

        if new_servings == self.servings {
            return Ok(self.clone());
        }

        let factor = f64::from(new_servings) / f64::from(self.servings);
        Ok(Recipe {
            servings: new_servings,
            ingredients: self.ingredients.iter().map(|i| i.scale(factor)).collect(),
            ..self.clone()
        })
    }

    /// True if the recipe carries every required tag (case-insensitive).
    pub fn meets_dietary_requirements(&self, required_tags: &[String]) -> bool {
        required_tags.iter().all(|required| {
            self.dietary_tags
                .iter()
                .any(|tag| tag.to_lowercase() == required.to_lowercase())
        })
    }

    /// True if any ingredient name contains `ingredient_name` (case-insensitive).
    pub fn has_ingredient(&self, ingredient_name: &str) -> bool {
        let needle = ingredient_name.to_lowercase();
        self.ingredients
            .iter()
            .any(|i| i.name.to_lowercase().contains(&needle))
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;

        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        writeln!(f, "Servings: {}", self.servings)?;
        writeln!(
            f,
            "Time: {} min (prep: {} min, cook: {} min)",
            self.total_time_minutes(),
            self.prep_time_minutes,
            self.cook_time_minutes
        )?;
        writeln!(f, "Cuisine: {} | Difficulty: {}", self.cuisine, self.difficulty)?;

        if !self.dietary_tags.is_empty() {
            writeln!(f, "Tags: {}", self.dietary_tags.join(", "))?;
        }

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        if !self.instructions.is_empty() {
            writeln!(f, "\nInstructions:")?;
            for (step, instruction) in self.instructions.iter().enumerate() {
                writeln!(f, "  {}. {}", step + 1, instruction)?;
            }
        }

        Ok(())
    }
}
