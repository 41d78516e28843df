//! Typed claim values and their `datavalue` wire shapes
//!
//! Every value kind Wikibase knows about is a variant of [`DataValue`]. The
//! snak-level `datatype` string ([`DataType`]) is the explicit tag used to
//! pick the parser when reading JSON back; several datatypes share the plain
//! `string` datavalue shape, so the tag cannot be recovered from the value.

use crate::error::{DomainError, Result};
use crate::id::{parse_numeric, parse_sub_entity};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Concept URI base of wikidata.org, used for units, calendars and globes
pub const DEFAULT_CONCEPT_BASE: &str = "http://www.wikidata.org/entity/";

/// Proleptic Gregorian calendar
pub const GREGORIAN_CALENDAR: &str = "http://www.wikidata.org/entity/Q1985727";

/// Earth, the default globe for coordinates
pub const EARTH_GLOBE: &str = "http://www.wikidata.org/entity/Q2";

/// Base schemes; `+`-joined combinations of them (`svn+ssh`) are accepted too
const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "irc", "ssh", "svn", "git"];

/// Snak datatype tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Plain string
    String,
    /// Identifier in an external database
    ExternalId,
    /// URL
    Url,
    /// TeX formula
    Math,
    /// File on Wikimedia Commons
    CommonsMedia,
    /// `Data:` page holding a `.map` shape
    GeoShape,
    /// `Data:` page holding a `.tab` table
    TabularData,
    /// LilyPond notation
    MusicalNotation,
    /// Text in one language
    MonolingualText,
    /// Amount with optional bounds and unit
    Quantity,
    /// Point in time with precision
    Time,
    /// Position on a globe
    GlobeCoordinate,
    /// Reference to an item
    Item,
    /// Reference to a property
    Property,
    /// Reference to a lexeme
    Lexeme,
    /// Reference to a lexeme form
    Form,
    /// Reference to a lexeme sense
    Sense,
}

impl DataType {
    /// Wire name of the datatype
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::ExternalId => "external-id",
            DataType::Url => "url",
            DataType::Math => "math",
            DataType::CommonsMedia => "commonsMedia",
            DataType::GeoShape => "geo-shape",
            DataType::TabularData => "tabular-data",
            DataType::MusicalNotation => "musical-notation",
            DataType::MonolingualText => "monolingualtext",
            DataType::Quantity => "quantity",
            DataType::Time => "time",
            DataType::GlobeCoordinate => "globe-coordinate",
            DataType::Item => "wikibase-item",
            DataType::Property => "wikibase-property",
            DataType::Lexeme => "wikibase-lexeme",
            DataType::Form => "wikibase-form",
            DataType::Sense => "wikibase-sense",
        }
    }

    /// The `type` field of the datavalue object this datatype produces
    pub fn value_type(&self) -> &'static str {
        match self {
            DataType::String
            | DataType::ExternalId
            | DataType::Url
            | DataType::Math
            | DataType::CommonsMedia
            | DataType::GeoShape
            | DataType::TabularData
            | DataType::MusicalNotation => "string",
            DataType::MonolingualText => "monolingualtext",
            DataType::Quantity => "quantity",
            DataType::Time => "time",
            DataType::GlobeCoordinate => "globecoordinate",
            DataType::Item
            | DataType::Property
            | DataType::Lexeme
            | DataType::Form
            | DataType::Sense => "wikibase-entityid",
        }
    }

    /// Best guess at the datatype when a snak arrives without one
    pub fn infer(datavalue: &Value) -> Option<Self> {
        match datavalue.get("type")?.as_str()? {
            "string" => Some(DataType::String),
            "monolingualtext" => Some(DataType::MonolingualText),
            "quantity" => Some(DataType::Quantity),
            "time" => Some(DataType::Time),
            "globecoordinate" => Some(DataType::GlobeCoordinate),
            "wikibase-entityid" => match datavalue["value"]["entity-type"].as_str()? {
                "item" => Some(DataType::Item),
                "property" => Some(DataType::Property),
                "lexeme" => Some(DataType::Lexeme),
                "form" => Some(DataType::Form),
                "sense" => Some(DataType::Sense),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromStr for DataType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let datatype = match s {
            "string" => DataType::String,
            "external-id" => DataType::ExternalId,
            "url" => DataType::Url,
            "math" => DataType::Math,
            "commonsMedia" => DataType::CommonsMedia,
            "geo-shape" => DataType::GeoShape,
            "tabular-data" => DataType::TabularData,
            "musical-notation" => DataType::MusicalNotation,
            "monolingualtext" => DataType::MonolingualText,
            "quantity" => DataType::Quantity,
            "time" => DataType::Time,
            "globe-coordinate" => DataType::GlobeCoordinate,
            "wikibase-item" => DataType::Item,
            "wikibase-property" => DataType::Property,
            "wikibase-lexeme" => DataType::Lexeme,
            "wikibase-form" => DataType::Form,
            "wikibase-sense" => DataType::Sense,
            other => {
                return Err(DomainError::InvalidValue(format!(
                    "Unsupported datatype '{}'",
                    other
                )))
            }
        };
        Ok(datatype)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text tagged with its language
#[derive(Debug, Clone, PartialEq)]
pub struct MonolingualText {
    /// The text
    pub text: String,
    /// Language code
    pub language: String,
}

/// Amount with optional uncertainty bounds and unit
///
/// Amounts are kept as signed decimal strings (`"+5.06"`) the way the wire
/// format carries them, so no precision is lost on a read/write cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    /// Signed decimal amount
    pub amount: String,
    /// Upper bound of the uncertainty interval
    pub upper_bound: Option<String>,
    /// Lower bound of the uncertainty interval
    pub lower_bound: Option<String>,
    /// `"1"` for unit-less quantities, otherwise the unit's concept URI
    pub unit: String,
}

impl Quantity {
    /// Unit-less quantity
    pub fn new(amount: f64) -> Result<Self> {
        Ok(Self {
            amount: format_amount(amount)?,
            upper_bound: None,
            lower_bound: None,
            unit: "1".to_string(),
        })
    }

    /// Quantity from a decimal string, with or without a leading sign
    pub fn from_amount(amount: &str) -> Result<Self> {
        Ok(Self {
            amount: normalize_amount(amount)?,
            upper_bound: None,
            lower_bound: None,
            unit: "1".to_string(),
        })
    }

    /// Attach uncertainty bounds
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Result<Self> {
        self.lower_bound = Some(format_amount(lower)?);
        self.upper_bound = Some(format_amount(upper)?);
        self.validate()?;
        Ok(self)
    }

    /// Attach a unit given as `"1"`, a concept URI, or an item id (`Q11573`)
    /// resolved against [`DEFAULT_CONCEPT_BASE`]
    pub fn with_unit(self, unit: &str) -> Result<Self> {
        self.with_unit_base(unit, DEFAULT_CONCEPT_BASE)
    }

    /// Like [`Quantity::with_unit`] with an explicit concept URI base
    pub fn with_unit_base(mut self, unit: &str, concept_base: &str) -> Result<Self> {
        self.unit = if unit == "1" || unit.starts_with("http://") || unit.starts_with("https://") {
            unit.to_string()
        } else {
            format!("{}Q{}", concept_base, parse_numeric(unit, 'Q')?)
        };
        Ok(self)
    }

    /// Check the bound pairing and ordering
    pub fn validate(&self) -> Result<()> {
        let amount = parse_amount(&self.amount)?;
        match (&self.lower_bound, &self.upper_bound) {
            (None, None) => Ok(()),
            (Some(lower), Some(upper)) => {
                let lower = parse_amount(lower)?;
                let upper = parse_amount(upper)?;
                if lower > amount || amount > upper {
                    return Err(DomainError::InvalidValue(format!(
                        "Quantity bounds must satisfy lower <= amount <= upper ({} <= {} <= {})",
                        lower, amount, upper
                    )));
                }
                Ok(())
            }
            _ => Err(DomainError::InvalidValue(
                "Quantity bounds must be given together".to_string(),
            )),
        }
    }
}

/// Point in time in the Wikibase time model
#[derive(Debug, Clone, PartialEq)]
pub struct Time {
    /// Signed ISO-8601-like timestamp, e.g. `+2021-01-01T00:00:00Z`
    pub time: String,
    /// Offset from UTC in minutes
    pub timezone: i64,
    /// Tolerance before, in units of the precision
    pub before: u64,
    /// Tolerance after, in units of the precision
    pub after: u64,
    /// 0 (billion years) through 14 (second); 11 is day
    pub precision: u8,
    /// Calendar model concept URI
    pub calendarmodel: String,
}

impl Time {
    /// Highest supported precision (seconds)
    pub const MAX_PRECISION: u8 = 14;

    /// Time in the Gregorian calendar, UTC, no tolerance
    pub fn new(time: &str, precision: u8) -> Result<Self> {
        let time = Self {
            time: normalize_time(time)?,
            timezone: 0,
            before: 0,
            after: 0,
            precision,
            calendarmodel: GREGORIAN_CALENDAR.to_string(),
        };
        time.validate()?;
        Ok(time)
    }

    /// Set the tolerance interval
    pub fn with_tolerance(mut self, before: u64, after: u64) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    /// Set the timezone offset in minutes
    pub fn with_timezone(mut self, timezone: i64) -> Self {
        self.timezone = timezone;
        self
    }

    /// Set the calendar model concept URI
    pub fn with_calendar(mut self, calendarmodel: &str) -> Self {
        self.calendarmodel = calendarmodel.to_string();
        self
    }

    /// Check timestamp shape and precision range
    pub fn validate(&self) -> Result<()> {
        if self.precision > Self::MAX_PRECISION {
            return Err(DomainError::InvalidValue(format!(
                "Time precision {} is out of range 0..={}",
                self.precision,
                Self::MAX_PRECISION
            )));
        }
        normalize_time(&self.time).map(|_| ())
    }
}

/// Position on a globe
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeCoordinate {
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
    /// Altitude, rarely used
    pub altitude: Option<f64>,
    /// Precision in degrees
    pub precision: f64,
    /// Globe concept URI
    pub globe: String,
}

impl GlobeCoordinate {
    /// Coordinate on Earth
    pub fn new(latitude: f64, longitude: f64, precision: f64) -> Result<Self> {
        let coordinate = Self {
            latitude,
            longitude,
            altitude: None,
            precision,
            globe: EARTH_GLOBE.to_string(),
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Set the globe concept URI
    pub fn with_globe(mut self, globe: &str) -> Self {
        self.globe = globe.to_string();
        self
    }

    /// Check the latitude/longitude ranges
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(DomainError::InvalidValue(format!(
                "Latitude {} is out of range",
                self.latitude
            )));
        }
        if !(-360.0..=360.0).contains(&self.longitude) {
            return Err(DomainError::InvalidValue(format!(
                "Longitude {} is out of range",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// A typed claim value
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Plain string
    String(String),
    /// External identifier
    ExternalId(String),
    /// URL
    Url(String),
    /// TeX formula
    Math(String),
    /// Commons file name
    CommonsMedia(String),
    /// `Data:*.map` page
    GeoShape(String),
    /// `Data:*.tab` page
    TabularData(String),
    /// LilyPond notation
    MusicalNotation(String),
    /// Text in one language
    MonolingualText(MonolingualText),
    /// Quantity
    Quantity(Quantity),
    /// Time
    Time(Time),
    /// Globe coordinate
    GlobeCoordinate(GlobeCoordinate),
    /// Item by number (`Q<n>`)
    Item(u64),
    /// Property by number (`P<n>`)
    Property(u64),
    /// Lexeme by number (`L<n>`)
    Lexeme(u64),
    /// Lexeme form (`L<n>-F<n>`)
    Form(String),
    /// Lexeme sense (`L<n>-S<n>`)
    Sense(String),
}

impl DataValue {
    /// Item reference from `"Q42"`, `"42"`
    pub fn item(id: &str) -> Result<Self> {
        parse_numeric(id, 'Q').map(DataValue::Item)
    }

    /// Property reference from `"P31"`, `"31"`
    pub fn property(id: &str) -> Result<Self> {
        parse_numeric(id, 'P').map(DataValue::Property)
    }

    /// Lexeme reference from `"L7"`, `"7"`
    pub fn lexeme(id: &str) -> Result<Self> {
        parse_numeric(id, 'L').map(DataValue::Lexeme)
    }

    /// Form reference from `"L7-F1"`
    pub fn form(id: &str) -> Result<Self> {
        parse_sub_entity(id, 'F').map(DataValue::Form)
    }

    /// Sense reference from `"L7-S1"`
    pub fn sense(id: &str) -> Result<Self> {
        parse_sub_entity(id, 'S').map(DataValue::Sense)
    }

    /// URL, checked against the schemes Wikibase accepts
    pub fn url(url: &str) -> Result<Self> {
        let valid = match url.split_once("://") {
            Some((scheme, rest)) => {
                !rest.is_empty() && scheme.split('+').all(|part| URL_SCHEMES.contains(&part))
            }
            None => url.strip_prefix("mailto:").is_some_and(|rest| !rest.is_empty()),
        };
        if !valid {
            return Err(DomainError::InvalidValue(format!("Invalid URL '{}'", url)));
        }
        Ok(DataValue::Url(url.to_string()))
    }

    /// `Data:` page holding a geographic shape
    pub fn geo_shape(page: &str) -> Result<Self> {
        check_data_page(page, ".map").map(DataValue::GeoShape)
    }

    /// `Data:` page holding tabular data
    pub fn tabular_data(page: &str) -> Result<Self> {
        check_data_page(page, ".tab").map(DataValue::TabularData)
    }

    /// Text in one language
    pub fn monolingual(text: &str, language: &str) -> Self {
        DataValue::MonolingualText(MonolingualText {
            text: text.to_string(),
            language: language.to_string(),
        })
    }

    /// The snak datatype this value belongs to
    pub fn datatype(&self) -> DataType {
        match self {
            DataValue::String(_) => DataType::String,
            DataValue::ExternalId(_) => DataType::ExternalId,
            DataValue::Url(_) => DataType::Url,
            DataValue::Math(_) => DataType::Math,
            DataValue::CommonsMedia(_) => DataType::CommonsMedia,
            DataValue::GeoShape(_) => DataType::GeoShape,
            DataValue::TabularData(_) => DataType::TabularData,
            DataValue::MusicalNotation(_) => DataType::MusicalNotation,
            DataValue::MonolingualText(_) => DataType::MonolingualText,
            DataValue::Quantity(_) => DataType::Quantity,
            DataValue::Time(_) => DataType::Time,
            DataValue::GlobeCoordinate(_) => DataType::GlobeCoordinate,
            DataValue::Item(_) => DataType::Item,
            DataValue::Property(_) => DataType::Property,
            DataValue::Lexeme(_) => DataType::Lexeme,
            DataValue::Form(_) => DataType::Form,
            DataValue::Sense(_) => DataType::Sense,
        }
    }

    /// Run the kind-specific validation
    pub fn validate(&self) -> Result<()> {
        match self {
            DataValue::Quantity(q) => q.validate(),
            DataValue::Time(t) => t.validate(),
            DataValue::GlobeCoordinate(c) => c.validate(),
            DataValue::Url(u) => DataValue::url(u).map(|_| ()),
            DataValue::GeoShape(p) => check_data_page(p, ".map").map(|_| ()),
            DataValue::TabularData(p) => check_data_page(p, ".tab").map(|_| ()),
            DataValue::Form(f) => parse_sub_entity(f, 'F').map(|_| ()),
            DataValue::Sense(s) => parse_sub_entity(s, 'S').map(|_| ()),
            _ => Ok(()),
        }
    }

    /// Value equality with string payloads compared case-insensitively
    ///
    /// Monolingual texts still need the same language code.
    pub fn eq_ignore_case(&self, other: &DataValue) -> bool {
        if let (DataValue::MonolingualText(a), DataValue::MonolingualText(b)) = (self, other) {
            return a.language == b.language && a.text.to_lowercase() == b.text.to_lowercase();
        }
        match (self.text(), other.text()) {
            (Some(a), Some(b)) => self.datatype() == other.datatype() && a.to_lowercase() == b.to_lowercase(),
            _ => self == other,
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            DataValue::String(s)
            | DataValue::ExternalId(s)
            | DataValue::Url(s)
            | DataValue::Math(s)
            | DataValue::CommonsMedia(s)
            | DataValue::GeoShape(s)
            | DataValue::TabularData(s)
            | DataValue::MusicalNotation(s) => Some(s),
            DataValue::MonolingualText(m) => Some(&m.text),
            _ => None,
        }
    }

    /// Serialize into the `{"value": ..., "type": ...}` datavalue object
    pub fn to_json(&self) -> Value {
        let value = match self {
            DataValue::String(s)
            | DataValue::ExternalId(s)
            | DataValue::Url(s)
            | DataValue::Math(s)
            | DataValue::CommonsMedia(s)
            | DataValue::GeoShape(s)
            | DataValue::TabularData(s)
            | DataValue::MusicalNotation(s) => json!(s),
            DataValue::MonolingualText(m) => json!({
                "text": m.text,
                "language": m.language,
            }),
            DataValue::Quantity(q) => {
                let mut value = Map::new();
                value.insert("amount".into(), json!(q.amount));
                value.insert("unit".into(), json!(q.unit));
                if let Some(upper) = &q.upper_bound {
                    value.insert("upperBound".into(), json!(upper));
                }
                if let Some(lower) = &q.lower_bound {
                    value.insert("lowerBound".into(), json!(lower));
                }
                Value::Object(value)
            }
            DataValue::Time(t) => json!({
                "time": t.time,
                "timezone": t.timezone,
                "before": t.before,
                "after": t.after,
                "precision": t.precision,
                "calendarmodel": t.calendarmodel,
            }),
            DataValue::GlobeCoordinate(c) => json!({
                "latitude": c.latitude,
                "longitude": c.longitude,
                "altitude": c.altitude,
                "precision": c.precision,
                "globe": c.globe,
            }),
            DataValue::Item(n) => entity_ref("item", 'Q', *n),
            DataValue::Property(n) => entity_ref("property", 'P', *n),
            DataValue::Lexeme(n) => entity_ref("lexeme", 'L', *n),
            DataValue::Form(id) => json!({ "entity-type": "form", "id": id }),
            DataValue::Sense(id) => json!({ "entity-type": "sense", "id": id }),
        };
        json!({
            "value": value,
            "type": self.datatype().value_type(),
        })
    }

    /// Parse a datavalue object, dispatching on the snak's datatype tag
    pub fn from_json(datatype: DataType, datavalue: &Value) -> Result<Self> {
        let found = datavalue.get("type").and_then(Value::as_str);
        if found != Some(datatype.value_type()) {
            return Err(DomainError::Malformed(format!(
                "Datatype '{}' expects a '{}' datavalue, found {:?}",
                datatype,
                datatype.value_type(),
                found
            )));
        }
        let value = datavalue
            .get("value")
            .ok_or_else(|| DomainError::Malformed("Datavalue without 'value'".to_string()))?;

        let parsed = match datatype {
            DataType::String => DataValue::String(str_field(value)?),
            DataType::ExternalId => DataValue::ExternalId(str_field(value)?),
            DataType::Url => DataValue::Url(str_field(value)?),
            DataType::Math => DataValue::Math(str_field(value)?),
            DataType::CommonsMedia => DataValue::CommonsMedia(str_field(value)?),
            DataType::GeoShape => DataValue::GeoShape(str_field(value)?),
            DataType::TabularData => DataValue::TabularData(str_field(value)?),
            DataType::MusicalNotation => DataValue::MusicalNotation(str_field(value)?),
            DataType::MonolingualText => DataValue::MonolingualText(MonolingualText {
                text: str_field(&value["text"])?,
                language: str_field(&value["language"])?,
            }),
            DataType::Quantity => DataValue::Quantity(Quantity {
                amount: normalize_amount(&str_field(&value["amount"])?)?,
                upper_bound: opt_str_field(&value["upperBound"]),
                lower_bound: opt_str_field(&value["lowerBound"]),
                unit: opt_str_field(&value["unit"]).unwrap_or_else(|| "1".to_string()),
            }),
            DataType::Time => DataValue::Time(Time {
                time: str_field(&value["time"])?,
                timezone: value["timezone"].as_i64().unwrap_or(0),
                before: value["before"].as_u64().unwrap_or(0),
                after: value["after"].as_u64().unwrap_or(0),
                precision: value["precision"]
                    .as_u64()
                    .and_then(|p| u8::try_from(p).ok())
                    .ok_or_else(|| DomainError::Malformed("Time without precision".to_string()))?,
                calendarmodel: opt_str_field(&value["calendarmodel"])
                    .unwrap_or_else(|| GREGORIAN_CALENDAR.to_string()),
            }),
            DataType::GlobeCoordinate => DataValue::GlobeCoordinate(GlobeCoordinate {
                latitude: f64_field(&value["latitude"])?,
                longitude: f64_field(&value["longitude"])?,
                altitude: value["altitude"].as_f64(),
                precision: value["precision"].as_f64().unwrap_or(0.0),
                globe: opt_str_field(&value["globe"]).unwrap_or_else(|| EARTH_GLOBE.to_string()),
            }),
            DataType::Item => DataValue::Item(entity_number(value, 'Q')?),
            DataType::Property => DataValue::Property(entity_number(value, 'P')?),
            DataType::Lexeme => DataValue::Lexeme(entity_number(value, 'L')?),
            DataType::Form => DataValue::Form(str_field(&value["id"])?),
            DataType::Sense => DataValue::Sense(str_field(&value["id"])?),
        };
        Ok(parsed)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.text() {
            return f.write_str(text);
        }
        match self {
            DataValue::Quantity(q) if q.unit == "1" => f.write_str(&q.amount),
            DataValue::Quantity(q) => write!(f, "{} {}", q.amount, q.unit),
            DataValue::Time(t) => write!(f, "{} (precision {})", t.time, t.precision),
            DataValue::GlobeCoordinate(c) => write!(f, "{}, {}", c.latitude, c.longitude),
            DataValue::Item(n) => write!(f, "Q{}", n),
            DataValue::Property(n) => write!(f, "P{}", n),
            DataValue::Lexeme(n) => write!(f, "L{}", n),
            DataValue::Form(id) | DataValue::Sense(id) => f.write_str(id),
            _ => Ok(()),
        }
    }
}

fn entity_ref(entity_type: &str, prefix: char, number: u64) -> Value {
    json!({
        "entity-type": entity_type,
        "numeric-id": number,
        "id": format!("{}{}", prefix, number),
    })
}

fn entity_number(value: &Value, prefix: char) -> Result<u64> {
    if let Some(id) = value.get("id").and_then(Value::as_str) {
        return parse_numeric(id, prefix);
    }
    value
        .get("numeric-id")
        .and_then(Value::as_u64)
        .ok_or_else(|| DomainError::Malformed("Entity reference without id".to_string()))
}

fn str_field(value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DomainError::Malformed(format!("Expected a string, found {}", value)))
}

fn opt_str_field(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn f64_field(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| DomainError::Malformed(format!("Expected a number, found {}", value)))
}

fn check_data_page(page: &str, suffix: &str) -> Result<String> {
    if !page.starts_with("Data:") || !page.ends_with(suffix) {
        return Err(DomainError::InvalidValue(format!(
            "'{}' must be a Data: page ending in {}",
            page, suffix
        )));
    }
    Ok(page.to_string())
}

fn format_amount(amount: f64) -> Result<String> {
    if !amount.is_finite() {
        return Err(DomainError::InvalidValue(format!(
            "Quantity amount {} is not finite",
            amount
        )));
    }
    Ok(format!("{:+}", amount))
}

fn parse_amount(amount: &str) -> Result<f64> {
    amount
        .parse::<f64>()
        .map_err(|_| DomainError::InvalidValue(format!("'{}' is not a decimal amount", amount)))
}

fn normalize_amount(amount: &str) -> Result<String> {
    let amount = amount.trim();
    parse_amount(amount)?;
    if amount.starts_with('+') || amount.starts_with('-') {
        Ok(amount.to_string())
    } else {
        Ok(format!("+{}", amount))
    }
}

fn normalize_time(time: &str) -> Result<String> {
    let time = time.trim();
    let signed = if time.starts_with('+') || time.starts_with('-') {
        time.to_string()
    } else {
        format!("+{}", time)
    };
    let body = &signed[1..];
    let well_formed = body
        .split_once('T')
        .is_some_and(|(date, clock)| date.split('-').count() == 3 && clock.ends_with('Z'));
    if !well_formed {
        return Err(DomainError::InvalidValue(format!(
            "Time '{}' must look like +YYYY-MM-DDThh:mm:ssZ",
            time
        )));
    }
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_value_json() {
        let value = DataValue::item("Q1234").unwrap();
        let json = value.to_json();
        assert_eq!(json["type"], "wikibase-entityid");
        assert_eq!(json["value"]["id"], "Q1234");
        assert_eq!(json["value"]["numeric-id"], 1234);
        assert_eq!(json["value"]["entity-type"], "item");
        assert_eq!(DataValue::item("1234").unwrap(), value);
    }

    #[test]
    fn test_invalid_item_id() {
        assert!(DataValue::item("P31").is_err());
        assert!(DataValue::item("Qx").is_err());
    }

    #[test]
    fn test_quantity_bounds_ordering() {
        let q = Quantity::new(5.06).unwrap().with_bounds(-2.22, 9.99).unwrap();
        assert_eq!(q.amount, "+5.06");
        assert_eq!(q.lower_bound.as_deref(), Some("-2.22"));
        assert!(Quantity::new(5.0).unwrap().with_bounds(6.0, 9.0).is_err());
        assert!(Quantity::new(f64::NAN).is_err());
    }

    #[test]
    fn test_quantity_half_bounds_rejected() {
        let mut q = Quantity::new(1.0).unwrap();
        q.upper_bound = Some("+2".to_string());
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_quantity_unit_expansion() {
        let q = Quantity::new(-5.04).unwrap().with_unit("Q11573").unwrap();
        assert_eq!(q.unit, "http://www.wikidata.org/entity/Q11573");
        let json = DataValue::Quantity(q).to_json();
        assert_eq!(json["value"]["amount"], "-5.04");
        assert!(json["value"].get("upperBound").is_none());
    }

    #[test]
    fn test_time_sign_and_precision() {
        let t = Time::new("458-00-00T00:00:00Z", 9).unwrap();
        assert_eq!(t.time, "+458-00-00T00:00:00Z");
        assert!(Time::new("-0458-00-00T00:00:00Z", 9).is_ok());
        assert!(Time::new("+2021-01-01T15:15:15Z", 15).is_err());
        assert!(Time::new("2021", 9).is_err());
    }

    #[test]
    fn test_coordinate_ranges() {
        assert!(GlobeCoordinate::new(1.2345, -1.2345, 12.0).is_ok());
        assert!(GlobeCoordinate::new(91.0, 0.0, 1.0).is_err());
        assert!(GlobeCoordinate::new(0.0, -361.0, 1.0).is_err());
    }

    #[test]
    fn test_url_schemes() {
        for url in [
            "http://www.wikidata.org",
            "https://www.wikidata.org",
            "ftp://example.com",
            "ssh://user@server/project.git",
            "svn+ssh://user@server:8888/path",
            "git+ssh://git@example.com/repo.git",
            "irc://irc.libera.chat/wikidata",
            "mailto:someone@example.com",
        ] {
            assert!(DataValue::url(url).is_ok(), "{} should be accepted", url);
        }
        for url in ["telnet://example.com", "gopher://example.com", "svn+://x", "mailto:"] {
            assert!(DataValue::url(url).is_err(), "{} should be rejected", url);
        }
        assert!(DataValue::url("www.wikidata.org").is_err());
        assert!(DataValue::url("javascript://alert").is_err());
    }

    #[test]
    fn test_data_pages() {
        assert!(DataValue::geo_shape("Data:xxx.map").is_ok());
        assert!(DataValue::geo_shape("xxx.map").is_err());
        assert!(DataValue::tabular_data("Data:Taipei+Population.tab").is_ok());
        assert!(DataValue::tabular_data("Data:Taipei.map").is_err());
    }

    #[test]
    fn test_parse_dispatches_on_datatype() {
        let wire = json!({"value": "xxx", "type": "string"});
        assert_eq!(
            DataValue::from_json(DataType::ExternalId, &wire).unwrap(),
            DataValue::ExternalId("xxx".to_string())
        );
        assert_eq!(
            DataValue::from_json(DataType::Math, &wire).unwrap(),
            DataValue::Math("xxx".to_string())
        );
        assert!(DataValue::from_json(DataType::Time, &wire).is_err());
    }

    #[test]
    fn test_parse_time_and_form() {
        let time = json!({
            "value": {
                "time": "+2021-01-01T00:00:00Z",
                "timezone": 0, "before": 0, "after": 0, "precision": 11,
                "calendarmodel": GREGORIAN_CALENDAR
            },
            "type": "time"
        });
        let parsed = DataValue::from_json(DataType::Time, &time).unwrap();
        assert_eq!(parsed, DataValue::Time(Time::new("+2021-01-01T00:00:00Z", 11).unwrap()));

        let form = DataValue::form("L123-F123").unwrap();
        assert_eq!(DataValue::from_json(DataType::Form, &form.to_json()).unwrap(), form);
    }

    #[test]
    fn test_infer_datatype() {
        assert_eq!(DataType::infer(&DataValue::sense("L1-S1").unwrap().to_json()), Some(DataType::Sense));
        assert_eq!(DataType::infer(&json!({"type": "string", "value": "x"})), Some(DataType::String));
        assert_eq!(DataType::infer(&json!({"type": "bogus"})), None);
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = DataValue::String("Terra".to_string());
        let b = DataValue::String("terra".to_string());
        assert_ne!(a, b);
        assert!(a.eq_ignore_case(&b));
        assert!(!a.eq_ignore_case(&DataValue::ExternalId("terra".to_string())));
    }

    #[test]
    fn test_case_insensitive_monolingual_needs_same_language() {
        let en = DataValue::monolingual("Terra", "en");
        assert!(en.eq_ignore_case(&DataValue::monolingual("terra", "en")));
        assert!(!en.eq_ignore_case(&DataValue::monolingual("terra", "pt")));
    }
}
