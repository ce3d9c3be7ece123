use serde::{Deserialize, Serialize};

/// Dietary preferences and constraints for one household.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    /// Number of people to cook for
    pub household_size: u32,
    pub dietary_restrictions: Vec<String>,
    pub disliked_ingredients: Vec<String>,
    pub cuisine_preferences: Vec<String>,
    pub max_prep_time_minutes: Option<u32>,
    pub max_cook_time_minutes: Option<u32>,
    /// "beginner", "intermediate" or "advanced"
    pub skill_level: String,
    pub avoid_protein_types: Vec<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            household_size: 2,
            dietary_restrictions: Vec::new(),
            disliked_ingredients: Vec::new(),
            cuisine_preferences: Vec::new(),
            max_prep_time_minutes: None,
            max_cook_time_minutes: None,
            skill_level: "intermediate".to_string(),
            avoid_protein_types: Vec::new(),
        }
    }

    pub fn with_household_size(mut self, size: u32) -> Self {
        self.household_size = size;
        self
    }

    pub fn with_dietary_restrictions(mut self, restrictions: Vec<String>) -> Self {
        self.dietary_restrictions = restrictions;
        self
    }

    pub fn with_disliked_ingredients(mut self, ingredients: Vec<String>) -> Self {
        self.disliked_ingredients = ingredients;
        self
    }

    pub fn with_cuisine_preferences(mut self, cuisines: Vec<String>) -> Self {
        self.cuisine_preferences = cuisines;
        self
    }

    pub fn with_time_limits(mut self, prep: Option<u32>, cook: Option<u32>) -> Self {
        self.max_prep_time_minutes = prep;
        self.max_cook_time_minutes = cook;
        self
    }

    pub fn with_skill_level(mut self, level: impl Into<String>) -> Self {
        self.skill_level = level.into();
        self
    }

    pub fn with_avoided_proteins(mut self, proteins: Vec<String>) -> Self {
        self.avoid_protein_types = proteins;
        self
    }

    /// Total time limit, only when both prep and cook limits are set.
    pub fn max_total_time_minutes(&self) -> Option<u32> {
        match (self.max_prep_time_minutes, self.max_cook_time_minutes) {
            (Some(prep), Some(cook)) => Some(prep.saturating_add(cook)),
            _ => None,
        }
    }

    pub fn has_dietary_restriction(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.dietary_restrictions
            .iter()
            .any(|r| r.to_lowercase() == tag)
    }

    /// Substring match, so disliking "mushrooms" also covers "mushroom".
    pub fn dislikes_ingredient(&self, ingredient_name: &str) -> bool {
        let name = ingredient_name.to_lowercase();
        self.disliked_ingredients
            .iter()
            .any(|d| d.to_lowercase().contains(&name))
    }

    pub fn avoids_protein(&self, protein_type: &str) -> bool {
        let protein = protein_type.to_lowercase();
        self.avoid_protein_types
            .iter()
            .any(|p| p.to_lowercase() == protein)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_defaults() {
        let user = UserProfile::new("user-1", "Sam");
        assert_eq!(user.household_size, 2);
        assert_eq!(user.skill_level, "intermediate");
        assert!(user.dietary_restrictions.is_empty());
        assert!(user.max_total_time_minutes().is_none());
    }

    #[test]
    fn test_max_total_time_requires_both_limits() {
        let user = UserProfile::new("u", "n").with_time_limits(Some(15), None);
        assert_eq!(user.max_total_time_minutes(), None);

        let user = UserProfile::new("u", "n").with_time_limits(Some(15), Some(30));
        assert_eq!(user.max_total_time_minutes(), Some(45));

        let user = UserProfile::new("u", "n").with_time_limits(Some(u32::MAX), Some(1));
        assert_eq!(user.max_total_time_minutes(), Some(u32::MAX));
    }

    #[test]
    fn test_preference_checks_are_case_insensitive() {
        let user = UserProfile::new("u", "n")
            .with_dietary_restrictions(vec!["Gluten_Free".into()])
            .with_disliked_ingredients(vec!["Mushrooms".into()])
            .with_avoided_proteins(vec!["Pork".into()]);

        assert!(user.has_dietary_restriction("gluten_free"));
        assert!(!user.has_dietary_restriction("vegan"));
        assert!(user.dislikes_ingredient("mushroom"));
        assert!(!user.dislikes_ingredient("onion"));
        assert!(user.avoids_protein("PORK"));
        assert!(!user.avoids_protein("pork belly"));
    }
}
