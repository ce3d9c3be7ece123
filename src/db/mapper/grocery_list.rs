use chrono::{DateTime, Utc};
use meal_planner_core::{GroceryItem, GroceryList};

use super::{DataReader, DataWriter, EntityMapper};
use crate::db::error::{EntityKind, MappingError};
use crate::db::keys::{self, ItemKeys};
use crate::db::store::AttributeMap;

pub struct GroceryListMapper;

fn write_entry(entry: &GroceryItem) -> AttributeMap {
    DataWriter::new()
        .string("name", &entry.name)
        .float("quantity", entry.quantity)
        .string("unit", &entry.unit)
        .string("category", &entry.category)
        .strings("recipe_sources", &entry.recipe_sources)
        .boolean("is_purchased", entry.is_purchased)
        .opt_string("notes", entry.notes.as_deref())
        .finish()
}

fn read_entry(data: &DataReader<'_>) -> Result<GroceryItem, MappingError> {
    let mut entry = GroceryItem::new(
        data.string("name")?,
        data.float("quantity")?.unwrap_or(0.0),
        data.string("unit")?,
    );
    entry.category = data.string_or("category", &entry.category)?;
    entry.recipe_sources = data.strings("recipe_sources")?;
    entry.is_purchased = data.boolean("is_purchased")?.unwrap_or(false);
    entry.notes = data.opt_string("notes")?;
    Ok(entry)
}

impl EntityMapper for GroceryListMapper {
    type Entity = GroceryList;

    const KIND: EntityKind = EntityKind::GroceryList;

    fn keys(list: &GroceryList, _now: DateTime<Utc>) -> ItemKeys {
        keys::grocery_list_keys(&list.meal_plan_id, &list.id)
    }

    fn write_data(list: &GroceryList) -> AttributeMap {
        DataWriter::new()
            .string("id", &list.id)
            .string("meal_plan_id", &list.meal_plan_id)
            .maps("items", list.items.iter().map(write_entry).collect())
            .opt_timestamp("created_at", list.created_at.as_ref())
            .opt_date("week_start_date", list.week_start_date)
            .finish()
    }

    fn read_data(data: &DataReader<'_>) -> Result<GroceryList, MappingError> {
        let mut list = GroceryList::new(data.string("id")?, data.string("meal_plan_id")?);
        list.items = data
            .maps("items")?
            .iter()
            .map(read_entry)
            .collect::<Result<_, _>>()?;
        list.created_at = data.timestamp("created_at")?;
        list.week_start_date = data.date("week_start_date")?;
        Ok(list)
    }
}
