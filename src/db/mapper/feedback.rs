use chrono::{DateTime, Utc};
use meal_planner_core::Feedback;

use super::{format_timestamp, DataReader, DataWriter, EntityMapper};
use crate::db::error::{EntityKind, MappingError};
use crate::db::keys::{self, ItemKeys};
use crate::db::store::AttributeMap;

pub struct FeedbackMapper;

impl EntityMapper for FeedbackMapper {
    type Entity = Feedback;

    const KIND: EntityKind = EntityKind::Feedback;

    /// Feedback is indexed under its recipe by creation time, falling back
    /// to the write time when the entity has none.
    fn keys(feedback: &Feedback, now: DateTime<Utc>) -> ItemKeys {
        let created = feedback.created_at.unwrap_or(now);
        keys::feedback_keys(
            &feedback.user_id,
            &feedback.id,
            &feedback.recipe_id,
            &format_timestamp(&created),
        )
    }

    fn write_data(feedback: &Feedback) -> AttributeMap {
        DataWriter::new()
            .string("id", &feedback.id)
            .string("user_id", &feedback.user_id)
            .string("recipe_id", &feedback.recipe_id)
            .opt_string("meal_plan_id", feedback.meal_plan_id.as_deref())
            .opt_date("cooked_date", feedback.cooked_date)
            .integer("rating", u32::from(feedback.rating))
            .boolean("would_make_again", feedback.would_make_again)
            .opt_string("notes", feedback.notes.as_deref())
            .opt_timestamp("created_at", feedback.created_at.as_ref())
            .finish()
    }

    fn read_data(data: &DataReader<'_>) -> Result<Feedback, MappingError> {
        let stored = data.integer("rating")?.unwrap_or(3);
        let rating = u8::try_from(stored).map_err(|_| MappingError::InvalidNumber {
            field: "rating".to_string(),
            value: stored.to_string(),
        })?;

        let mut feedback = Feedback::new(
            data.string("id")?,
            data.string("user_id")?,
            data.string("recipe_id")?,
            rating,
            data.boolean("would_make_again")?.unwrap_or(false),
        )?;
        feedback.meal_plan_id = data.opt_string("meal_plan_id")?;
        feedback.cooked_date = data.date("cooked_date")?;
        feedback.notes = data.opt_string("notes")?;
        feedback.created_at = data.timestamp("created_at")?;
        Ok(feedback)
    }
}
