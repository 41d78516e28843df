//! Entity bodies and their wire JSON mapping

use crate::action::ActionIfExists;
use crate::claim::Claim;
use crate::claims::Claims;
use crate::datavalue::DataType;
use crate::error::{DomainError, Result};
use crate::id::EntityId;
use crate::language::{Aliases, LanguageValues};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of addressable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    /// Item (`Q`)
    Item,
    /// Property (`P`)
    Property,
    /// Lexeme (`L`)
    Lexeme,
    /// Lexeme form (`L-F`)
    Form,
    /// Lexeme sense (`L-S`)
    Sense,
    /// Structured data of a Commons file (`M`)
    MediaInfo,
}

/// Wire field names used by one entity kind
///
/// `None` means the kind has no such field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityFields {
    /// Field holding the claims
    pub claims: &'static str,
    /// Field holding the single-value term map
    pub labels: Option<&'static str>,
    /// Field holding descriptions
    pub descriptions: Option<&'static str>,
    /// Field holding aliases
    pub aliases: Option<&'static str>,
}

impl EntityType {
    /// Wire `type` value
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Item => "item",
            EntityType::Property => "property",
            EntityType::Lexeme => "lexeme",
            EntityType::Form => "form",
            EntityType::Sense => "sense",
            EntityType::MediaInfo => "mediainfo",
        }
    }

    /// Field-name table for this kind
    ///
    /// Media-info names its claims `statements`; lexemes and their parts
    /// carry their term map under their own name.
    pub const fn fields(self) -> EntityFields {
        match self {
            EntityType::Item | EntityType::Property => EntityFields {
                claims: "claims",
                labels: Some("labels"),
                descriptions: Some("descriptions"),
                aliases: Some("aliases"),
            },
            EntityType::Lexeme => EntityFields {
                claims: "claims",
                labels: Some("lemmas"),
                descriptions: None,
                aliases: None,
            },
            EntityType::Form => EntityFields {
                claims: "claims",
                labels: Some("representations"),
                descriptions: None,
                aliases: None,
            },
            EntityType::Sense => EntityFields {
                claims: "claims",
                labels: Some("glosses"),
                descriptions: None,
                aliases: None,
            },
            EntityType::MediaInfo => EntityFields {
                claims: "statements",
                labels: Some("labels"),
                descriptions: Some("descriptions"),
                aliases: None,
            },
        }
    }
}

impl FromStr for EntityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "item" => Ok(EntityType::Item),
            "property" => Ok(EntityType::Property),
            "lexeme" => Ok(EntityType::Lexeme),
            "form" => Ok(EntityType::Form),
            "sense" => Ok(EntityType::Sense),
            "mediainfo" => Ok(EntityType::MediaInfo),
            other => Err(DomainError::Malformed(format!(
                "Unknown entity type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can be attached to an entity as claims
pub trait IntoClaims {
    /// Convert into a list of claims
    fn into_claims(self) -> Vec<Claim>;
}

impl IntoClaims for Claim {
    fn into_claims(self) -> Vec<Claim> {
        vec![self]
    }
}

impl IntoClaims for Vec<Claim> {
    fn into_claims(self) -> Vec<Claim> {
        self
    }
}

impl<const N: usize> IntoClaims for [Claim; N] {
    fn into_claims(self) -> Vec<Claim> {
        self.into()
    }
}

impl IntoClaims for &[Claim] {
    fn into_claims(self) -> Vec<Claim> {
        self.to_vec()
    }
}

/// An entity body
///
/// An entity without an id is unbound: it has never been written, and its
/// wire form carries no deletion markers. Reading or writing it through the
/// SDK binds it to a server id and revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityType,
    id: Option<EntityId>,
    lastrevid: Option<u64>,
    /// Labels (lemmas, representations or glosses for lexeme kinds)
    pub labels: LanguageValues,
    /// Descriptions
    pub descriptions: LanguageValues,
    /// Aliases
    pub aliases: Aliases,
    /// Claims
    pub claims: Claims,
    /// Datatype of a property entity
    pub datatype: Option<DataType>,
    /// Lexical category of a lexeme
    pub lexical_category: Option<EntityId>,
    /// Language of a lexeme
    pub language: Option<EntityId>,
}

impl Entity {
    /// Unbound entity of the given kind
    pub fn new(kind: EntityType) -> Self {
        Self {
            kind,
            id: None,
            lastrevid: None,
            labels: LanguageValues::new(),
            descriptions: LanguageValues::new(),
            aliases: Aliases::new(),
            claims: Claims::new(),
            datatype: None,
            lexical_category: None,
            language: None,
        }
    }

    /// New item
    pub fn item() -> Self {
        Self::new(EntityType::Item)
    }

    /// New property of the given datatype
    pub fn property(datatype: DataType) -> Self {
        let mut property = Self::new(EntityType::Property);
        property.datatype = Some(datatype);
        property
    }

    /// New lexeme
    pub fn lexeme(lexical_category: EntityId, language: EntityId) -> Self {
        let mut lexeme = Self::new(EntityType::Lexeme);
        lexeme.lexical_category = Some(lexical_category);
        lexeme.language = Some(language);
        lexeme
    }

    /// New media-info body
    pub fn media_info() -> Self {
        Self::new(EntityType::MediaInfo)
    }

    /// Point the entity at an existing id
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    /// Entity kind
    pub fn kind(&self) -> EntityType {
        self.kind
    }

    /// Server id, if bound
    pub fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    /// Last known revision
    pub fn lastrevid(&self) -> Option<u64> {
        self.lastrevid
    }

    /// Whether the entity has a server id
    pub fn is_bound(&self) -> bool {
        self.id.is_some()
    }

    /// Record the id and revision the server assigned
    pub fn bind(&mut self, id: EntityId, lastrevid: Option<u64>) {
        self.id = Some(id);
        if lastrevid.is_some() {
            self.lastrevid = lastrevid;
        }
    }

    /// Attach claims under a merge policy
    pub fn add_claims<C: IntoClaims>(&mut self, claims: C, action: ActionIfExists) -> &mut Self {
        self.claims.add(claims.into_claims(), action);
        self
    }

    /// Attach claims given as wire JSON: one claim object or a list of them
    ///
    /// Anything else is rejected as invalid input and leaves the entity untouched.
    pub fn add_claims_json(&mut self, claims: &Value, action: ActionIfExists) -> Result<&mut Self> {
        let parsed = match claims {
            Value::Object(_) => vec![Claim::from_json(claims)?],
            Value::Array(list) => list.iter().map(Claim::from_json).collect::<Result<Vec<_>>>()?,
            other => {
                return Err(DomainError::InvalidInput(format!(
                    "Expected a claim or a list of claims, found {}",
                    other
                )))
            }
        };
        Ok(self.add_claims(parsed, action))
    }

    /// Serialize to the wire payload
    ///
    /// The id is omitted while unbound, and so are term deletion markers,
    /// since there is nothing on the server to delete.
    pub fn to_json(&self) -> Value {
        let fields = self.kind.fields();
        let bound = self.is_bound();
        let mut json = Map::new();

        json.insert("type".into(), json!(self.kind.as_str()));
        if let Some(id) = &self.id {
            json.insert("id".into(), json!(id.as_str()));
        }
        if let Some(name) = fields.labels {
            json.insert(name.into(), self.labels.to_json(bound));
        }
        if let Some(name) = fields.descriptions {
            json.insert(name.into(), self.descriptions.to_json(bound));
        }
        if let Some(name) = fields.aliases {
            json.insert(name.into(), self.aliases.to_json(bound));
        }
        json.insert(fields.claims.into(), self.claims.to_json());

        if let Some(datatype) = self.datatype {
            json.insert("datatype".into(), json!(datatype.as_str()));
        }
        if let Some(category) = &self.lexical_category {
            json.insert("lexicalCategory".into(), json!(category.as_str()));
        }
        if let Some(language) = &self.language {
            json.insert("language".into(), json!(language.as_str()));
        }
        Value::Object(json)
    }

    /// Parse an entity as returned by `wbgetentities` or `wbeditentity`
    pub fn from_json(json: &Value) -> Result<Self> {
        let obj = json
            .as_object()
            .ok_or_else(|| DomainError::Malformed(format!("Expected an entity object, found {}", json)))?;
        if obj.contains_key("missing") {
            let id = obj.get("id").and_then(Value::as_str).unwrap_or("unknown");
            return Err(DomainError::EntityNotFound(id.to_string()));
        }

        let kind: EntityType = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::Malformed("Entity without type".to_string()))?
            .parse()?;
        let fields = kind.fields();
        let field = |name: Option<&str>| name.and_then(|n| obj.get(n)).unwrap_or(&Value::Null);
        let entity_id = |name: &str| {
            obj.get(name)
                .and_then(Value::as_str)
                .map(EntityId::parse)
                .transpose()
        };

        Ok(Self {
            kind,
            id: entity_id("id")?,
            lastrevid: obj.get("lastrevid").and_then(Value::as_u64),
            labels: LanguageValues::from_json(field(fields.labels))?,
            descriptions: LanguageValues::from_json(field(fields.descriptions))?,
            aliases: Aliases::from_json(field(fields.aliases))?,
            claims: Claims::from_json(field(Some(fields.claims)))?,
            datatype: obj
                .get("datatype")
                .and_then(Value::as_str)
                .map(str::parse)
                .transpose()?,
            lexical_category: entity_id("lexicalCategory")?,
            language: entity_id("language")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{AliasAction, TermAction};
    use crate::datavalue::DataValue;
    use crate::id::PropertyId;

    fn earth() -> Entity {
        Entity::from_json(&json!({
            "type": "item",
            "id": "Q2",
            "lastrevid": 1234,
            "labels": {
                "en": {"language": "en", "value": "Earth"},
                "fr": {"language": "fr", "value": "Terre"}
            },
            "descriptions": {"en": {"language": "en", "value": "third planet from the Sun"}},
            "aliases": {"es": [{"language": "es", "value": "Terra"}]},
            "claims": {
                "P31": [{
                    "mainsnak": {
                        "snaktype": "value",
                        "property": "P31",
                        "datatype": "wikibase-item",
                        "datavalue": {
                            "value": {"entity-type": "item", "numeric-id": 3504248, "id": "Q3504248"},
                            "type": "wikibase-entityid"
                        }
                    },
                    "type": "statement",
                    "rank": "normal",
                    "id": "Q2$abc"
                }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_item() {
        let item = earth();
        assert_eq!(item.id().map(EntityId::as_str), Some("Q2"));
        assert_eq!(item.lastrevid(), Some(1234));
        assert_eq!(item.labels.get("en"), "Earth");
        assert!(item.aliases.contains("es", "Terra"));
        assert!(item.descriptions.get("en").contains("planet"));
        assert_eq!(item.claims.get(PropertyId::new(31)).len(), 1);
    }

    #[test]
    fn test_missing_marker() {
        let err = Entity::from_json(&json!({"id": "Q999999999", "missing": ""})).unwrap_err();
        assert_eq!(err, DomainError::EntityNotFound("Q999999999".to_string()));
    }

    #[test]
    fn test_unbound_json_omits_id_and_removals() {
        let mut item = Entity::item();
        item.labels.set("en", Some("x"), TermAction::Replace);
        item.labels.set("en", None, TermAction::Replace);
        let json = item.to_json();
        assert!(json.get("id").is_none());
        assert!(json["labels"].get("en").is_none());
        assert_eq!(json["type"], "item");
    }

    #[test]
    fn test_bound_json_emits_removals() {
        let mut item = earth();
        item.labels.set("fr", None, TermAction::Replace);
        item.aliases.set("es", [""; 0], AliasAction::Append);
        let json = item.to_json();
        assert_eq!(json["id"], "Q2");
        assert_eq!(json["labels"]["fr"], json!({"language": "fr", "remove": ""}));
        assert_eq!(json["aliases"]["es"][0]["remove"], "");
    }

    #[test]
    fn test_media_info_uses_statements() {
        let mut file = Entity::media_info().with_id(EntityId::parse("M123").unwrap());
        file.add_claims(
            Claim::value(PropertyId::new(180), DataValue::Item(146)),
            ActionIfExists::Append,
        );
        let json = file.to_json();
        assert!(json.get("claims").is_none());
        assert_eq!(json["statements"]["P180"][0]["mainsnak"]["property"], "P180");
        assert!(json.get("aliases").is_none());

        let parsed = Entity::from_json(&json).unwrap();
        assert_eq!(parsed.claims.len(), 1);
    }

    #[test]
    fn test_media_info_accepts_empty_arrays() {
        let parsed = Entity::from_json(&json!({
            "type": "mediainfo", "id": "M1", "labels": [], "descriptions": [], "statements": []
        }))
        .unwrap();
        assert!(parsed.claims.is_empty());
        assert!(parsed.labels.is_empty());
    }

    #[test]
    fn test_lexeme_fields() {
        let mut lexeme = Entity::lexeme(
            EntityId::parse("Q1084").unwrap(),
            EntityId::parse("Q1860").unwrap(),
        );
        lexeme.labels.set("en", Some("water"), TermAction::Replace);
        let json = lexeme.to_json();
        assert_eq!(json["lemmas"]["en"]["value"], "water");
        assert_eq!(json["lexicalCategory"], "Q1084");
        assert!(json.get("labels").is_none());
        assert_eq!(Entity::from_json(&json).unwrap(), lexeme);
    }

    #[test]
    fn test_every_kind_has_claims_field() {
        for kind in [
            EntityType::Item,
            EntityType::Property,
            EntityType::Lexeme,
            EntityType::Form,
            EntityType::Sense,
            EntityType::MediaInfo,
        ] {
            let json = Entity::new(kind).to_json();
            assert!(json.get(kind.fields().claims).is_some());
            assert_eq!(kind.as_str().parse::<EntityType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_add_claims_accepts_single_and_list() {
        let claim = Claim::value(PropertyId::new(1), DataValue::String("test".into()));
        let mut item = Entity::item();
        item.add_claims(claim.clone(), ActionIfExists::ForceAppend);
        item.add_claims(vec![claim.clone()], ActionIfExists::ForceAppend);
        item.add_claims([claim.clone()], ActionIfExists::ForceAppend);
        item.add_claims(&[claim][..], ActionIfExists::ForceAppend);
        assert_eq!(item.claims.len(), 4);
    }

    #[test]
    fn test_add_claims_json_rejects_bare_value() {
        let mut item = earth();
        let before = item.clone();
        let err = item
            .add_claims_json(&json!("test"), ActionIfExists::Append)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        let err = item
            .add_claims_json(&json!(["test"]), ActionIfExists::Append)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(item, before);
    }

    #[test]
    fn test_roundtrip_preserves_body() {
        let mut item = earth();
        item.labels.set("de", Some("Erde"), TermAction::Replace);
        item.add_claims(
            Claim::value(PropertyId::new(17), DataValue::Item(30)),
            ActionIfExists::Append,
        );
        let reparsed = Entity::from_json(&item.to_json()).unwrap();
        assert_eq!(reparsed.labels, item.labels);
        assert_eq!(reparsed.descriptions, item.descriptions);
        assert_eq!(reparsed.aliases, item.aliases);
        assert_eq!(reparsed.claims, item.claims);
    }

    #[test]
    fn test_roundtrip_after_replace() {
        let mut item = earth();
        item.add_claims(
            Claim::value(PropertyId::new(31), DataValue::Item(6)),
            ActionIfExists::Replace,
        );
        let json = item.to_json();
        assert_eq!(json["claims"]["P31"][0], json!({"id": "Q2$abc", "remove": ""}));

        let reparsed = Entity::from_json(&json).unwrap();
        assert_eq!(reparsed.labels, item.labels);
        assert_eq!(reparsed.descriptions, item.descriptions);
        assert_eq!(reparsed.aliases, item.aliases);
        assert_eq!(reparsed.claims.live().count(), 1);
        assert_eq!(reparsed.to_json(), json);
    }
}
