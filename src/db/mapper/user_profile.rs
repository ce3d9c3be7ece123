use chrono::{DateTime, Utc};
use meal_planner_core::UserProfile;

use super::{DataReader, DataWriter, EntityMapper};
use crate::db::error::{EntityKind, MappingError};
use crate::db::keys::{self, ItemKeys};
use crate::db::store::AttributeMap;

pub struct UserProfileMapper;

impl EntityMapper for UserProfileMapper {
    type Entity = UserProfile;

    const KIND: EntityKind = EntityKind::UserProfile;

    fn keys(user: &UserProfile, _now: DateTime<Utc>) -> ItemKeys {
        keys::user_keys(&user.id)
    }

    fn write_data(user: &UserProfile) -> AttributeMap {
        DataWriter::new()
            .string("id", &user.id)
            .string("name", &user.name)
            .integer("household_size", user.household_size)
            .strings("dietary_restrictions", &user.dietary_restrictions)
            .strings("disliked_ingredients", &user.disliked_ingredients)
            .strings("cuisine_preferences", &user.cuisine_preferences)
            .string("skill_level", &user.skill_level)
            .opt_integer("max_prep_time_minutes", user.max_prep_time_minutes)
            .opt_integer("max_cook_time_minutes", user.max_cook_time_minutes)
            .strings("avoid_protein_types", &user.avoid_protein_types)
            .finish()
    }

    fn read_data(data: &DataReader<'_>) -> Result<UserProfile, MappingError> {
        let mut user = UserProfile::new(data.string("id")?, data.string("name")?);

        if let Some(size) = data.integer("household_size")? {
            user.household_size = size;
        }
        user.dietary_restrictions = data.strings("dietary_restrictions")?;
        user.disliked_ingredients = data.strings("disliked_ingredients")?;
        user.cuisine_preferences = data.strings("cuisine_preferences")?;
        user.skill_level = data.string_or("skill_level", &user.skill_level)?;
        user.max_prep_time_minutes = data.integer("max_prep_time_minutes")?;
        user.max_cook_time_minutes = data.integer("max_cook_time_minutes")?;
        user.avoid_protein_types = data.strings("avoid_protein_types")?;

        Ok(user)
    }
}
