//! Snaks: the property/value pairs used for main values, qualifiers and
//! reference parts

use crate::datavalue::{DataType, DataValue};
use crate::error::{DomainError, Result};
use crate::id::PropertyId;
use serde_json::{json, Map, Value};

/// What a snak asserts about its property
#[derive(Debug, Clone, PartialEq)]
pub enum SnakValue {
    /// A concrete value
    Value(DataValue),
    /// Some value exists but is unknown
    SomeValue,
    /// The property has no value
    NoValue,
}

impl SnakValue {
    /// Wire `snaktype`
    pub fn snaktype(&self) -> &'static str {
        match self {
            SnakValue::Value(_) => "value",
            SnakValue::SomeValue => "somevalue",
            SnakValue::NoValue => "novalue",
        }
    }

    fn eq_ignore_case(&self, other: &SnakValue) -> bool {
        match (self, other) {
            (SnakValue::Value(a), SnakValue::Value(b)) => a.eq_ignore_case(b),
            _ => self == other,
        }
    }
}

/// A single property/value pair
///
/// The server-assigned `hash` does not take part in equality.
#[derive(Debug, Clone)]
pub struct Snak {
    /// Property the snak is about
    pub property: PropertyId,
    /// Datatype of the property
    pub datatype: DataType,
    /// Asserted value
    pub value: SnakValue,
    /// Server-assigned hash, present on snaks read back from the API
    pub hash: Option<String>,
}

impl PartialEq for Snak {
    fn eq(&self, other: &Self) -> bool {
        self.property == other.property && self.value == other.value
    }
}

impl Snak {
    /// Snak carrying a concrete value; the datatype follows the value
    pub fn new(property: PropertyId, value: DataValue) -> Self {
        Self {
            property,
            datatype: value.datatype(),
            value: SnakValue::Value(value),
            hash: None,
        }
    }

    /// "Unknown value" snak
    pub fn some_value(property: PropertyId, datatype: DataType) -> Self {
        Self {
            property,
            datatype,
            value: SnakValue::SomeValue,
            hash: None,
        }
    }

    /// "No value" snak
    pub fn no_value(property: PropertyId, datatype: DataType) -> Self {
        Self {
            property,
            datatype,
            value: SnakValue::NoValue,
            hash: None,
        }
    }

    /// The concrete value, if any
    pub fn datavalue(&self) -> Option<&DataValue> {
        match &self.value {
            SnakValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Equality with string payloads compared case-insensitively
    pub fn eq_ignore_case(&self, other: &Snak) -> bool {
        self.property == other.property && self.value.eq_ignore_case(&other.value)
    }

    /// Serialize to the wire snak object
    pub fn to_json(&self) -> Value {
        let mut snak = Map::new();
        snak.insert("snaktype".into(), json!(self.value.snaktype()));
        snak.insert("property".into(), json!(self.property.to_string()));
        snak.insert("datatype".into(), json!(self.datatype.as_str()));
        if let SnakValue::Value(value) = &self.value {
            snak.insert("datavalue".into(), value.to_json());
        }
        if let Some(hash) = &self.hash {
            snak.insert("hash".into(), json!(hash));
        }
        Value::Object(snak)
    }

    /// Parse a wire snak object
    pub fn from_json(json: &Value) -> Result<Self> {
        let property: PropertyId = json
            .get("property")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::Malformed("Snak without property".to_string()))?
            .parse()?;
        let datavalue = json.get("datavalue");

        let datatype = match json.get("datatype").and_then(Value::as_str) {
            Some(name) => name.parse()?,
            None => datavalue.and_then(DataType::infer).ok_or_else(|| {
                DomainError::Malformed(format!("Cannot determine datatype of {} snak", property))
            })?,
        };

        let value = match json.get("snaktype").and_then(Value::as_str).unwrap_or("value") {
            "value" => {
                let datavalue = datavalue.ok_or_else(|| {
                    DomainError::Malformed(format!("Value snak for {} without datavalue", property))
                })?;
                SnakValue::Value(DataValue::from_json(datatype, datavalue)?)
            }
            "somevalue" => SnakValue::SomeValue,
            "novalue" => SnakValue::NoValue,
            other => {
                return Err(DomainError::Malformed(format!("Unknown snaktype '{}'", other)))
            }
        };

        Ok(Self {
            property,
            datatype,
            value,
            hash: json.get("hash").and_then(Value::as_str).map(str::to_string),
        })
    }
}

/// Serialize snaks grouped by property, returning the map and the
/// first-seen property order
pub(crate) fn group_to_json(snaks: &[Snak]) -> (Value, Vec<String>) {
    let mut grouped = Map::new();
    let mut order: Vec<String> = Vec::new();
    for snak in snaks {
        let key = snak.property.to_string();
        if !order.contains(&key) {
            order.push(key.clone());
        }
        if let Value::Array(list) = grouped.entry(key).or_insert_with(|| json!([])) {
            list.push(snak.to_json());
        }
    }
    (Value::Object(grouped), order)
}

/// Parse a property-keyed snak map, honouring an optional order list
pub(crate) fn group_from_json(grouped: Option<&Value>, order: Option<&Value>) -> Result<Vec<Snak>> {
    let Some(map) = grouped.and_then(Value::as_object) else {
        return Ok(Vec::new());
    };
    let mut keys: Vec<&str> = order
        .and_then(Value::as_array)
        .map(|o| o.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    for key in map.keys() {
        if !keys.contains(&key.as_str()) {
            keys.push(key.as_str());
        }
    }

    let mut snaks = Vec::new();
    for key in keys {
        let Some(list) = map.get(key).and_then(Value::as_array) else {
            continue;
        };
        for snak in list {
            snaks.push(Snak::from_json(snak)?);
        }
    }
    Ok(snaks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_snak_json() {
        let snak = Snak::new(PropertyId::new(1), DataValue::String("test".to_string()));
        let json = snak.to_json();
        assert_eq!(json["snaktype"], "value");
        assert_eq!(json["property"], "P1");
        assert_eq!(json["datatype"], "string");
        assert_eq!(json["datavalue"]["value"], "test");
    }

    #[test]
    fn test_novalue_snak_roundtrip() {
        let snak = Snak::no_value(PropertyId::new(40), DataType::Item);
        let json = snak.to_json();
        assert!(json.get("datavalue").is_none());
        assert_eq!(Snak::from_json(&json).unwrap(), snak);
    }

    #[test]
    fn test_hash_ignored_for_equality() {
        let mut a = Snak::new(PropertyId::new(31), DataValue::Item(5));
        let b = a.clone();
        a.hash = Some("abc".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_datatype_is_inferred() {
        let json = json!({
            "snaktype": "value",
            "property": "P31",
            "datavalue": {
                "value": {"entity-type": "item", "numeric-id": 5, "id": "Q5"},
                "type": "wikibase-entityid"
            }
        });
        let snak = Snak::from_json(&json).unwrap();
        assert_eq!(snak.datatype, DataType::Item);
        assert_eq!(snak.datavalue(), Some(&DataValue::Item(5)));
    }

    #[test]
    fn test_group_order_is_kept() {
        let snaks = vec![
            Snak::new(PropertyId::new(813), DataValue::String("a".to_string())),
            Snak::new(PropertyId::new(248), DataValue::Item(1)),
            Snak::new(PropertyId::new(813), DataValue::String("b".to_string())),
        ];
        let (grouped, order) = group_to_json(&snaks);
        assert_eq!(order, vec!["P813", "P248"]);
        let order_json = json!(order);
        let parsed = group_from_json(Some(&grouped), Some(&order_json)).unwrap();
        assert_eq!(parsed[0].property, PropertyId::new(813));
        assert_eq!(parsed[2].property, PropertyId::new(248));
    }
}
