use chrono::{DateTime, Utc};
use meal_planner_core::{Ingredient, Recipe};

use super::{DataReader, DataWriter, EntityMapper};
use crate::db::error::{EntityKind, MappingError};
use crate::db::keys::{self, ItemKeys};
use crate::db::store::AttributeMap;

pub struct RecipeMapper;

fn write_ingredient(ingredient: &Ingredient) -> AttributeMap {
    DataWriter::new()
        .string("name", &ingredient.name)
        .float("quantity", ingredient.quantity)
        .string("unit", &ingredient.unit)
        .opt_string("notes", ingredient.notes.as_deref())
        .finish()
}

fn read_ingredient(data: &DataReader<'_>) -> Result<Ingredient, MappingError> {
    Ok(Ingredient {
        name: data.string("name")?,
        quantity: data.float("quantity")?.unwrap_or(0.0),
        unit: data.string("unit")?,
        notes: data.opt_string("notes")?,
    })
}

impl EntityMapper for RecipeMapper {
    type Entity = Recipe;

    const KIND: EntityKind = EntityKind::Recipe;

    fn keys(recipe: &Recipe, _now: DateTime<Utc>) -> ItemKeys {
        keys::recipe_keys(&recipe.id, &recipe.title)
    }

    fn write_data(recipe: &Recipe) -> AttributeMap {
        DataWriter::new()
            .string("id", &recipe.id)
            .string("title", &recipe.title)
            .string("description", &recipe.description)
            .integer("servings", recipe.servings)
            .integer("prep_time_minutes", recipe.prep_time_minutes)
            .integer("cook_time_minutes", recipe.cook_time_minutes)
            .maps(
                "ingredients",
                recipe.ingredients.iter().map(write_ingredient).collect(),
            )
            .strings("instructions", &recipe.instructions)
            .strings("dietary_tags", &recipe.dietary_tags)
            .string("cuisine", &recipe.cuisine)
            .string("difficulty", &recipe.difficulty)
            .string("protein_type", &recipe.protein_type)
            .opt_string("image_url", recipe.image_url.as_deref())
            .opt_string("source_url", recipe.source_url.as_deref())
            .opt_float("rating", recipe.rating)
            .finish()
    }

    fn read_data(data: &DataReader<'_>) -> Result<Recipe, MappingError> {
        let servings = data.integer("servings")?.unwrap_or(1);
        let mut recipe = Recipe::new(data.string("id")?, data.string("title")?, servings)?;

        recipe.description = data.string("description")?;
        recipe.prep_time_minutes = data.integer("prep_time_minutes")?.unwrap_or(0);
        recipe.cook_time_minutes = data.integer("cook_time_minutes")?.unwrap_or(0);
        recipe.ingredients = data
            .maps("ingredients")?
            .iter()
            .map(read_ingredient)
            .collect::<Result<_, _>>()?;
        recipe.instructions = data.strings("instructions")?;
        recipe.dietary_tags = data.strings("dietary_tags")?;
        recipe.cuisine = data.string_or("cuisine", &recipe.cuisine)?;
        recipe.difficulty = data.string_or("difficulty", &recipe.difficulty)?;
        recipe.protein_type = data.string_or("protein_type", &recipe.protein_type)?;
        recipe.image_url = data.opt_string("image_url")?;
        recipe.source_url = data.opt_string("source_url")?;
        recipe.rating = data.float("rating")?;

        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{AttributeValue, Item, DATA, ENTITY_TYPE, GSI1PK, GSI1SK, PK, SK};
    use bigdecimal::BigDecimal;
    use chrono::TimeZone;
    use meal_planner_core::ValidationError;
    use std::str::FromStr;

    fn pad_thai() -> Recipe {
        Recipe::new("r-1", "Pad Thai", 4)
            .unwrap()
            .with_description("Stir-fried rice noodles")
            .with_times(20, 15)
            .with_ingredients(vec![
                Ingredient::new("rice noodles", 8.0, "oz"),
                Ingredient::new("eggs", 2.0, "").with_notes("beaten"),
                Ingredient::new("lime juice", 0.1, "cup"),
            ])
            .with_instructions(vec!["Soak noodles".into(), "Fry".into()])
            .with_dietary_tags(vec!["dairy-free".into()])
            .with_cuisine("thai")
            .with_difficulty("easy")
            .with_protein_type("tofu")
            .with_source_url("https://example.com/pad-thai")
            .with_rating(4.5)
    }

    #[test]
    fn test_item_layout() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let item = RecipeMapper::to_item_at(&pad_thai(), now);

        assert_eq!(item.get_str(PK), Some("RECIPE#r-1"));
        assert_eq!(item.get_str(SK), Some("METADATA"));
        assert_eq!(item.get_str(GSI1PK), Some("RECIPE#ALL"));
        assert_eq!(item.get_str(GSI1SK), Some("Pad Thai"));
        assert_eq!(item.get_str(ENTITY_TYPE), Some("Recipe"));
        assert_eq!(item.get_str("CreatedAt"), Some("2025-03-01T12:00:00.000000000Z"));
        assert_eq!(item.get_str("UpdatedAt"), item.get_str("CreatedAt"));

        let data = item.data().unwrap();
        assert_eq!(
            data.get("servings").and_then(AttributeValue::as_number),
            Some(&BigDecimal::from(4u32))
        );
        // Absent optionals are absent, not empty
        assert!(!data.contains_key("image_url"));
    }

    #[test]
    fn test_quantities_are_exact_decimals() {
        let item = RecipeMapper::to_item(&pad_thai());
        let ingredients = item.data().unwrap().get("ingredients").unwrap();
        let lime = ingredients.as_list().unwrap()[2].as_map().unwrap();
        assert_eq!(
            lime.get("quantity").and_then(AttributeValue::as_number),
            Some(&BigDecimal::from_str("0.1").unwrap())
        );
    }

    #[test]
    fn test_roundtrip() {
        let recipe = pad_thai();
        let item = RecipeMapper::to_item(&recipe);
        assert_eq!(RecipeMapper::from_item(&item).unwrap(), recipe);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let data = DataWriter::new().string("id", "r-2").finish();
        let item = Item::new()
            .with(PK, "RECIPE#r-2")
            .with(SK, "METADATA")
            .with(DATA, AttributeValue::M(data));

        let recipe = RecipeMapper::from_item(&item).unwrap();
        assert_eq!(recipe.id, "r-2");
        assert_eq!(recipe.title, "");
        assert_eq!(recipe.servings, 1);
        assert_eq!(recipe.cuisine, "other");
        assert_eq!(recipe.difficulty, "medium");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.rating.is_none());
    }

    #[test]
    fn test_stored_zero_servings_rejected() {
        let data = DataWriter::new()
            .string("id", "r-3")
            .integer("servings", 0)
            .finish();
        let item = Item::new().with(DATA, AttributeValue::M(data));

        assert_eq!(
            RecipeMapper::from_item(&item).unwrap_err(),
            MappingError::Validation(ValidationError::InvalidServings(0))
        );
    }

    #[test]
    fn test_wrong_entity_type_rejected() {
        let item = RecipeMapper::to_item(&pad_thai()).with(ENTITY_TYPE, "Feedback");
        assert!(matches!(
            RecipeMapper::from_item(&item),
            Err(MappingError::UnexpectedEntityType { .. })
        ));
    }

    #[test]
    fn test_missing_data_map_reads_as_empty() {
        let item = Item::new()
            .with(PK, "RECIPE#r-4")
            .with(SK, "METADATA")
            .with(ENTITY_TYPE, "Recipe");

        let recipe = RecipeMapper::from_item(&item).unwrap();
        assert_eq!(recipe.id, "");
        assert_eq!(recipe.title, "");
        assert_eq!(recipe.servings, 1);
        assert_eq!(recipe.cuisine, "other");
        assert_eq!(recipe.difficulty, "medium");
        assert_eq!(recipe.protein_type, "none");
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_data_must_be_a_map() {
        let item = Item::new().with(DATA, "not a map");
        assert!(matches!(
            RecipeMapper::from_item(&item),
            Err(MappingError::WrongType { expected: "M", .. })
        ));
    }
}
