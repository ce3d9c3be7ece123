//! Schemaless items and typed attribute values.
//!
//! An [`Item`] is a map from attribute name to [`AttributeValue`]. Numbers
//! are exact decimals and are written to JSON as decimal text, never as
//! binary floats, so quantities survive storage unchanged.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PK: &str = "PK";
pub const SK: &str = "SK";
pub const GSI1PK: &str = "GSI1PK";
pub const GSI1SK: &str = "GSI1SK";
pub const ENTITY_TYPE: &str = "EntityType";
pub const DATA: &str = "Data";
pub const CREATED_AT: &str = "CreatedAt";
pub const UPDATED_AT: &str = "UpdatedAt";

/// Attribute map used for `Data` payloads and nested records.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(#[serde(with = "decimal_text")] BigDecimal),
    #[serde(rename = "BOOL")]
    Bool(bool),
    L(Vec<AttributeValue>),
    M(AttributeMap),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            AttributeValue::N(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::L(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            AttributeValue::M(m) => Some(m),
            _ => None,
        }
    }

    /// Short type tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::L(_) => "L",
            AttributeValue::M(_) => "M",
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::S(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::S(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<BigDecimal> for AttributeValue {
    fn from(value: BigDecimal) -> Self {
        AttributeValue::N(value)
    }
}

/// The composite primary key of one item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimaryKey {
    pub pk: String,
    pub sk: String,
}

impl PrimaryKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl std::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.pk, self.sk)
    }
}

/// One stored item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(AttributeMap);

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<AttributeValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_str)
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.0
    }

    /// The `(PK, SK)` pair, if both are present as strings.
    pub fn primary_key(&self) -> Option<PrimaryKey> {
        Some(PrimaryKey::new(self.get_str(PK)?, self.get_str(SK)?))
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.get_str(ENTITY_TYPE)
    }

    pub fn data(&self) -> Option<&AttributeMap> {
        self.get(DATA).and_then(AttributeValue::as_map)
    }
}

impl From<AttributeMap> for Item {
    fn from(map: AttributeMap) -> Self {
        Item(map)
    }
}

/// Serializes decimals as their exact text form.
mod decimal_text {
    use bigdecimal::BigDecimal;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigDecimal::from_str(&text).map_err(|e| D::Error::custom(format!("bad number '{}': {}", text, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_item_accessors() {
        let item = Item::new()
            .with(PK, "RECIPE#1")
            .with(SK, "METADATA")
            .with(ENTITY_TYPE, "Recipe");

        assert_eq!(item.primary_key(), Some(PrimaryKey::new("RECIPE#1", "METADATA")));
        assert_eq!(item.entity_type(), Some("Recipe"));
        assert!(item.data().is_none());
    }

    #[test]
    fn test_primary_key_requires_both_parts() {
        let item = Item::new().with(PK, "USER#1");
        assert!(item.primary_key().is_none());
    }

    #[test]
    fn test_numbers_serialize_as_decimal_text() {
        let item = Item::new().with("qty", BigDecimal::from_str("3.50").unwrap());
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"qty":{"N":"3.50"}}"#);

        let parsed: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn test_nested_values_roundtrip() {
        let mut data = AttributeMap::new();
        data.insert("tags".into(), AttributeValue::L(vec!["a".into(), "b".into()]));
        data.insert("active".into(), true.into());
        let item = Item::new().with(DATA, AttributeValue::M(data));

        let json = serde_json::to_string(&item).unwrap();
        let parsed: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
        assert_eq!(
            parsed.data().unwrap().get("active").and_then(AttributeValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn test_bad_number_text_rejected() {
        let result: Result<Item, _> = serde_json::from_str(r#"{"qty":{"N":"lots"}}"#);
        assert!(result.is_err());
    }
}
