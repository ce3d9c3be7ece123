//! Conversion between domain entities and stored items.
//!
//! Every item carries its key attributes, `EntityType`, a `Data` map with
//! all domain fields, and `CreatedAt` / `UpdatedAt` write timestamps.
//! Absent optional values are absent attributes, never empty strings.

mod feedback;
mod grocery_list;
mod meal_plan;
mod recipe;
mod user_profile;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::str::FromStr;

use super::error::{EntityKind, MappingError};
use super::keys::{ItemKeys, DATE_FORMAT};
use super::store::{
    AttributeMap, AttributeValue, Item, CREATED_AT, DATA, ENTITY_TYPE, GSI1PK, GSI1SK, PK, SK,
    UPDATED_AT,
};

pub use feedback::FeedbackMapper;
pub use grocery_list::GroceryListMapper;
pub use meal_plan::MealPlanMapper;
pub use recipe::RecipeMapper;
pub use user_profile::UserProfileMapper;

/// Formats a timestamp so that string order is chronological order.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Exact decimal form of a float, via its shortest round-trip text.
pub fn decimal_from_f64(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    BigDecimal::from_str(&value.to_string()).ok()
}

/// Bidirectional mapping for one entity type.
pub trait EntityMapper {
    type Entity;

    const KIND: EntityKind;
    const ENTITY_TYPE: &'static str = Self::KIND.entity_type();

    /// Key attributes for the entity. `now` is available for keys that
    /// embed a write time.
    fn keys(entity: &Self::Entity, now: DateTime<Utc>) -> ItemKeys;

    fn write_data(entity: &Self::Entity) -> AttributeMap;

    fn read_data(data: &DataReader<'_>) -> Result<Self::Entity, MappingError>;

    /// Builds the item, stamping the write time with the current time.
    fn to_item(entity: &Self::Entity) -> Item {
        Self::to_item_at(entity, Utc::now())
    }

    fn to_item_at(entity: &Self::Entity, now: DateTime<Utc>) -> Item {
        let keys = Self::keys(entity, now);
        let stamp = format_timestamp(&now);

        let mut item = Item::new()
            .with(PK, keys.pk)
            .with(SK, keys.sk)
            .with(ENTITY_TYPE, Self::ENTITY_TYPE)
            .with(DATA, AttributeValue::M(Self::write_data(entity)))
            .with(CREATED_AT, stamp.clone())
            .with(UPDATED_AT, stamp);
        if let Some((gsi1pk, gsi1sk)) = keys.gsi1 {
            item.insert(GSI1PK, gsi1pk);
            item.insert(GSI1SK, gsi1sk);
        }
        item
    }

    fn from_item(item: &Item) -> Result<Self::Entity, MappingError> {
        if let Some(found) = item.entity_type() {
            if found != Self::ENTITY_TYPE {
                return Err(MappingError::UnexpectedEntityType {
                    expected: Self::ENTITY_TYPE,
                    found: found.to_string(),
                });
            }
        }
        // A missing Data map reads like an empty one
        let empty = AttributeMap::new();
        let data = match item.get(DATA) {
            Some(AttributeValue::M(map)) => map,
            Some(other) => {
                return Err(MappingError::WrongType {
                    field: DATA.to_string(),
                    expected: "M",
                    found: other.type_name(),
                })
            }
            None => &empty,
        };
        Self::read_data(&DataReader::new(data))
    }
}

/// Converts an exact decimal to `u32` when it is a whole number in range.
///
/// Works on the mantissa and scale directly: rescaling a value such as
/// `1E+3000000000` would allocate a number with billions of digits.
fn whole_u32(n: &BigDecimal) -> Option<u32> {
    let (mantissa, mut scale) = n.as_bigint_and_scale();
    if mantissa.is_zero() {
        return Some(0);
    }

    // Strip trailing zeros held in the fraction, e.g. 4.00
    let mut mantissa = mantissa.into_owned();
    while scale > 0 && (&mantissa % 10u32).is_zero() {
        mantissa /= 10u32;
        scale -= 1;
    }
    if scale > 0 {
        return None;
    }
    // u32::MAX has ten digits, so a nonzero mantissa shifted further is out of range
    if scale < -9 {
        return None;
    }

    let shift = 10u64.pow(scale.unsigned_abs() as u32);
    let value = mantissa.to_u64()?.checked_mul(shift)?;
    u32::try_from(value).ok()
}

/// Builds a `Data` map.
#[derive(Debug, Default)]
pub struct DataWriter {
    map: AttributeMap,
}

impl DataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, name: &str, value: &str) -> Self {
        self.map.insert(name.to_string(), value.into());
        self
    }

    pub fn opt_string(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.string(name, value),
            None => self,
        }
    }

    pub fn strings(mut self, name: &str, values: &[String]) -> Self {
        let list = values.iter().map(|v| v.as_str().into()).collect();
        self.map.insert(name.to_string(), AttributeValue::L(list));
        self
    }

    /// Non-finite values are left out.
    pub fn float(mut self, name: &str, value: f64) -> Self {
        if let Some(decimal) = decimal_from_f64(value) {
            self.map.insert(name.to_string(), decimal.into());
        }
        self
    }

    pub fn opt_float(self, name: &str, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.float(name, value),
            None => self,
        }
    }

    pub fn integer(mut self, name: &str, value: u32) -> Self {
        self.map
            .insert(name.to_string(), BigDecimal::from(value).into());
        self
    }

    pub fn opt_integer(self, name: &str, value: Option<u32>) -> Self {
        match value {
            Some(value) => self.integer(name, value),
            None => self,
        }
    }

    pub fn boolean(mut self, name: &str, value: bool) -> Self {
        self.map.insert(name.to_string(), value.into());
        self
    }

    pub fn date(self, name: &str, value: NaiveDate) -> Self {
        self.string(name, &format_date(value))
    }

    pub fn opt_date(self, name: &str, value: Option<NaiveDate>) -> Self {
        match value {
            Some(value) => self.date(name, value),
            None => self,
        }
    }

    pub fn opt_timestamp(self, name: &str, value: Option<&DateTime<Utc>>) -> Self {
        match value {
            Some(value) => self.string(name, &format_timestamp(value)),
            None => self,
        }
    }

    pub fn maps(mut self, name: &str, values: Vec<AttributeMap>) -> Self {
        let list = values.into_iter().map(AttributeValue::M).collect();
        self.map.insert(name.to_string(), AttributeValue::L(list));
        self
    }

    pub fn finish(self) -> AttributeMap {
        self.map
    }
}

/// Typed, path-aware access to a `Data` map.
///
/// Missing fields read as `None` (or an empty value); fields of the wrong
/// type are errors.
#[derive(Debug)]
pub struct DataReader<'a> {
    map: &'a AttributeMap,
    path: String,
}

impl<'a> DataReader<'a> {
    pub fn new(map: &'a AttributeMap) -> Self {
        Self {
            map,
            path: String::new(),
        }
    }

    fn field(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        }
    }

    fn wrong_type(&self, name: &str, expected: &'static str, found: &AttributeValue) -> MappingError {
        MappingError::WrongType {
            field: self.field(name),
            expected,
            found: found.type_name(),
        }
    }

    pub fn opt_string(&self, name: &str) -> Result<Option<String>, MappingError> {
        match self.map.get(name) {
            None => Ok(None),
            Some(AttributeValue::S(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.wrong_type(name, "S", other)),
        }
    }

    /// Missing strings read as `default`.
    pub fn string_or(&self, name: &str, default: &str) -> Result<String, MappingError> {
        Ok(self
            .opt_string(name)?
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn string(&self, name: &str) -> Result<String, MappingError> {
        self.string_or(name, "")
    }

    pub fn strings(&self, name: &str) -> Result<Vec<String>, MappingError> {
        match self.map.get(name) {
            None => Ok(Vec::new()),
            Some(AttributeValue::L(values)) => values
                .iter()
                .enumerate()
                .map(|(i, value)| match value {
                    AttributeValue::S(s) => Ok(s.clone()),
                    other => Err(self.wrong_type(&format!("{}[{}]", name, i), "S", other)),
                })
                .collect(),
            Some(other) => Err(self.wrong_type(name, "L", other)),
        }
    }

    fn number(&self, name: &str) -> Result<Option<&'a BigDecimal>, MappingError> {
        match self.map.get(name) {
            None => Ok(None),
            Some(AttributeValue::N(n)) => Ok(Some(n)),
            Some(other) => Err(self.wrong_type(name, "N", other)),
        }
    }

    pub fn float(&self, name: &str) -> Result<Option<f64>, MappingError> {
        match self.number(name)? {
            None => Ok(None),
            Some(n) => {
                let text = n.to_string();
                text.parse::<f64>()
                    .map(Some)
                    .map_err(|_| MappingError::InvalidNumber {
                        field: self.field(name),
                        value: text,
                    })
            }
        }
    }

    /// Reads a whole number that fits in `u32`.
    pub fn integer(&self, name: &str) -> Result<Option<u32>, MappingError> {
        match self.number(name)? {
            None => Ok(None),
            Some(n) => {
                match whole_u32(n) {
                    Some(value) => Ok(Some(value)),
                    None => Err(MappingError::InvalidNumber {
                        field: self.field(name),
                        value: n.to_string(),
                    }),
                }
            }
        }
    }

    pub fn boolean(&self, name: &str) -> Result<Option<bool>, MappingError> {
        match self.map.get(name) {
            None => Ok(None),
            Some(AttributeValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(name, "BOOL", other)),
        }
    }

    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>, MappingError> {
        match self.opt_string(name)? {
            None => Ok(None),
            Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map(Some)
                .map_err(|_| MappingError::InvalidDate {
                    field: self.field(name),
                    value: text,
                }),
        }
    }

    pub fn required_date(&self, name: &str) -> Result<NaiveDate, MappingError> {
        self.date(name)?
            .ok_or_else(|| MappingError::MissingField(self.field(name)))
    }

    pub fn timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>, MappingError> {
        match self.opt_string(name)? {
            None => Ok(None),
            Some(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| MappingError::InvalidTimestamp {
                    field: self.field(name),
                    value: text,
                }),
        }
    }

    /// Readers for a list of nested maps.
    pub fn maps(&self, name: &str) -> Result<Vec<DataReader<'a>>, MappingError> {
        match self.map.get(name) {
            None => Ok(Vec::new()),
            Some(AttributeValue::L(values)) => values
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let path = self.field(&format!("{}[{}]", name, i));
                    match value {
                        AttributeValue::M(map) => Ok(DataReader { map, path }),
                        other => Err(MappingError::WrongType {
                            field: path,
                            expected: "M",
                            found: other.type_name(),
                        }),
                    }
                })
                .collect(),
            Some(other) => Err(self.wrong_type(name, "L", other)),
        }
    }
}
