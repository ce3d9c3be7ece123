use chrono::{DateTime, Utc};
use meal_planner_core::{MealPlan, MealSlot};

use super::{DataReader, DataWriter, EntityMapper};
use crate::db::error::{EntityKind, MappingError};
use crate::db::keys::{self, ItemKeys};
use crate::db::store::AttributeMap;

pub struct MealPlanMapper;

fn write_slot(slot: &MealSlot) -> AttributeMap {
    DataWriter::new()
        .date("date", slot.date)
        .string("recipe_id", &slot.recipe_id)
        .integer("servings", slot.servings)
        .opt_string("notes", slot.notes.as_deref())
        .finish()
}

fn read_slot(data: &DataReader<'_>) -> Result<MealSlot, MappingError> {
    let mut slot = MealSlot::new(
        data.required_date("date")?,
        data.string("recipe_id")?,
        data.integer("servings")?.unwrap_or(1),
    )?;
    slot.notes = data.opt_string("notes")?;
    Ok(slot)
}

impl EntityMapper for MealPlanMapper {
    type Entity = MealPlan;

    const KIND: EntityKind = EntityKind::MealPlan;

    fn keys(plan: &MealPlan, _now: DateTime<Utc>) -> ItemKeys {
        keys::meal_plan_keys(&plan.user_id, &plan.id, plan.week_start_date)
    }

    fn write_data(plan: &MealPlan) -> AttributeMap {
        DataWriter::new()
            .string("id", &plan.id)
            .string("user_id", &plan.user_id)
            .date("week_start_date", plan.week_start_date)
            .maps("meals", plan.meals.iter().map(write_slot).collect())
            .boolean("is_active", plan.is_active)
            .opt_timestamp("created_at", plan.created_at.as_ref())
            .finish()
    }

    fn read_data(data: &DataReader<'_>) -> Result<MealPlan, MappingError> {
        let mut plan = MealPlan::new(
            data.string("id")?,
            data.string("user_id")?,
            data.required_date("week_start_date")?,
        );
        plan.meals = data
            .maps("meals")?
            .iter()
            .map(read_slot)
            .collect::<Result<_, _>>()?;
        plan.is_active = data.boolean("is_active")?.unwrap_or(true);
        plan.created_at = data.timestamp("created_at")?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{AttributeValue, Item, DATA, GSI1PK, GSI1SK, PK, SK};
    use chrono::{NaiveDate, TimeZone};
    use meal_planner_core::ValidationError;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn plan() -> MealPlan {
        MealPlan::new("p-1", "u-1", date(3))
            .with_meals(vec![
                MealSlot::new(date(3), "r-1", 4).unwrap().with_notes("leftovers Tue"),
                MealSlot::new(date(5), "r-2", 2).unwrap(),
            ])
            .with_created_at(Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap())
            .with_active(false)
    }

    #[test]
    fn test_item_layout() {
        let item = MealPlanMapper::to_item(&plan());
        assert_eq!(item.get_str(PK), Some("USER#u-1"));
        assert_eq!(item.get_str(SK), Some("MEALPLAN#p-1"));
        assert_eq!(item.get_str(GSI1PK), Some("MEALPLAN#p-1"));
        assert_eq!(item.get_str(GSI1SK), Some("2025-03-03"));

        let meals = item.data().unwrap().get("meals").unwrap().as_list().unwrap();
        assert_eq!(meals.len(), 2);
        assert_eq!(
            meals[0].as_map().unwrap().get("date").and_then(AttributeValue::as_str),
            Some("2025-03-03")
        );
    }

    #[test]
    fn test_roundtrip() {
        let plan = plan();
        let item = MealPlanMapper::to_item(&plan);
        assert_eq!(MealPlanMapper::from_item(&item).unwrap(), plan);
    }

    #[test]
    fn test_roundtrip_without_meals() {
        let plan = MealPlan::new("p-2", "u-1", date(10));
        let item = MealPlanMapper::to_item(&plan);
        let restored = MealPlanMapper::from_item(&item).unwrap();
        assert_eq!(restored, plan);
        assert!(restored.is_active);
    }

    #[test]
    fn test_missing_week_start_is_an_error() {
        let data = DataWriter::new().string("id", "p-3").finish();
        let item = Item::new().with(DATA, AttributeValue::M(data));
        assert_eq!(
            MealPlanMapper::from_item(&item).unwrap_err(),
            MappingError::MissingField("week_start_date".into())
        );
    }

    #[test]
    fn test_missing_data_map_needs_week_start() {
        let item = Item::new()
            .with(PK, "USER#u-1")
            .with(SK, "MEALPLAN#p-4")
            .with(crate::db::store::ENTITY_TYPE, "MealPlan");
        assert_eq!(
            MealPlanMapper::from_item(&item).unwrap_err(),
            MappingError::MissingField("week_start_date".into())
        );
    }

    #[test]
    fn test_missing_meal_date_is_an_error() {
        let meal = DataWriter::new().string("recipe_id", "r-1").finish();
        let data = DataWriter::new()
            .string("id", "p-4")
            .date("week_start_date", date(3))
            .maps("meals", vec![meal])
            .finish();
        let item = Item::new().with(DATA, AttributeValue::M(data));

        assert_eq!(
            MealPlanMapper::from_item(&item).unwrap_err(),
            MappingError::MissingField("meals[0].date".into())
        );
    }

    #[test]
    fn test_zero_servings_slot_rejected() {
        let meal = DataWriter::new()
            .date("date", date(4))
            .string("recipe_id", "r-1")
            .integer("servings", 0)
            .finish();
        let data = DataWriter::new()
            .date("week_start_date", date(3))
            .maps("meals", vec![meal])
            .finish();
        let item = Item::new().with(DATA, AttributeValue::M(data));

        assert_eq!(
            MealPlanMapper::from_item(&item).unwrap_err(),
            MappingError::Validation(ValidationError::InvalidServings(0))
        );
    }
}
