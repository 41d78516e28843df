//! Entity and property identifiers

use crate::entity::EntityType;
use crate::error::{DomainError, Result};
use std::fmt;
use std::str::FromStr;

/// Numeric property identifier, displayed as `P<n>`
///
/// # Examples
///
/// ```
/// use wbi_domain::PropertyId;
///
/// let p: PropertyId = "P31".parse().unwrap();
/// assert_eq!(p, PropertyId::new(31));
/// assert_eq!(p.to_string(), "P31");
/// assert_eq!("31".parse::<PropertyId>().unwrap(), p);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u64);

impl PropertyId {
    /// Create a property id from its number
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// Get the numeric part
    pub fn number(&self) -> u64 {
        self.0
    }
}

impl From<u64> for PropertyId {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl FromStr for PropertyId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        parse_numeric(s, 'P').map(Self)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Canonical identifier of any addressable entity (`Q42`, `P31`, `L7`,
/// `L7-F1`, `L7-S2`, `M123`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(String);

impl EntityId {
    /// Parse and validate an entity id
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if kind_of(s).is_none() {
            return Err(DomainError::InvalidId(format!(
                "'{}' is not a valid entity id",
                s
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Kind of entity the id refers to
    pub fn kind(&self) -> EntityType {
        // Construction guarantees a recognised shape
        kind_of(&self.0).unwrap_or(EntityType::Item)
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn kind_of(s: &str) -> Option<EntityType> {
    let (prefix, rest) = s.split_at_checked(1)?;
    match prefix {
        "Q" if is_digits(rest) => Some(EntityType::Item),
        "P" if is_digits(rest) => Some(EntityType::Property),
        "M" if is_digits(rest) => Some(EntityType::MediaInfo),
        "L" => match rest.split_once('-') {
            None if is_digits(rest) => Some(EntityType::Lexeme),
            Some((lexeme, sub)) if is_digits(lexeme) => {
                let (marker, number) = sub.split_at_checked(1)?;
                match marker {
                    "F" if is_digits(number) => Some(EntityType::Form),
                    "S" if is_digits(number) => Some(EntityType::Sense),
                    _ => None,
                }
            }
            _ => None,
        },
        _ => None,
    }
}

/// Parse `"<prefix><digits>"` or bare `"<digits>"` into the numeric part
pub fn parse_numeric(s: &str, prefix: char) -> Result<u64> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix(prefix).unwrap_or(trimmed);
    if !is_digits(digits) {
        return Err(DomainError::InvalidId(format!(
            "Invalid id ({}), format must be '{}[0-9]+'",
            s, prefix
        )));
    }
    digits
        .parse()
        .map_err(|e| DomainError::InvalidId(format!("Invalid id ({}): {}", s, e)))
}

/// Validate a sub-entity id such as `L123-F4` (marker `F`) or `L123-S4` (marker `S`)
pub(crate) fn parse_sub_entity(s: &str, marker: char) -> Result<String> {
    let expected = match marker {
        'F' => EntityType::Form,
        _ => EntityType::Sense,
    };
    match kind_of(s.trim()) {
        Some(kind) if kind == expected => Ok(s.trim().to_string()),
        _ => Err(DomainError::InvalidId(format!(
            "Invalid id ({}), format must be 'L[0-9]+-{}[0-9]+'",
            s, marker
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_kinds() {
        assert_eq!(EntityId::parse("Q42").unwrap().kind(), EntityType::Item);
        assert_eq!(EntityId::parse("P31").unwrap().kind(), EntityType::Property);
        assert_eq!(EntityId::parse("L7").unwrap().kind(), EntityType::Lexeme);
        assert_eq!(EntityId::parse("L7-F1").unwrap().kind(), EntityType::Form);
        assert_eq!(EntityId::parse("L7-S2").unwrap().kind(), EntityType::Sense);
        assert_eq!(EntityId::parse("M123").unwrap().kind(), EntityType::MediaInfo);
    }

    #[test]
    fn test_entity_id_invalid() {
        assert!(EntityId::parse("").is_err());
        assert!(EntityId::parse("Q").is_err());
        assert!(EntityId::parse("X12").is_err());
        assert!(EntityId::parse("L7-X1").is_err());
        assert!(EntityId::parse("Q12a").is_err());
    }

    #[test]
    fn test_parse_numeric_forms() {
        assert_eq!(parse_numeric("Q123", 'Q').unwrap(), 123);
        assert_eq!(parse_numeric("123", 'Q').unwrap(), 123);
        assert!(parse_numeric("P123", 'Q').is_err());
        assert!(parse_numeric("Qabc", 'Q').is_err());
    }

    #[test]
    fn test_property_ordering_is_numeric() {
        let p2: PropertyId = "P2".parse().unwrap();
        let p10: PropertyId = "P10".parse().unwrap();
        assert!(p2 < p10);
    }

    #[test]
    fn test_sub_entity() {
        assert_eq!(parse_sub_entity("L123-F123", 'F').unwrap(), "L123-F123");
        assert!(parse_sub_entity("L123-S123", 'F').is_err());
        assert_eq!(parse_sub_entity("L123-S123", 'S').unwrap(), "L123-S123");
    }
}
