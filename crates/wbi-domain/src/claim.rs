//! Claim module - a statement about an entity with qualifiers and references

use crate::datavalue::{DataType, DataValue};
use crate::error::{DomainError, Result};
use crate::id::PropertyId;
use crate::snak::{group_from_json, group_to_json, Snak};
use serde_json::{json, Map, Value};

/// Statement rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rank {
    /// Preferred over normal-ranked statements
    Preferred,
    /// Default rank
    #[default]
    Normal,
    /// Known to be wrong or outdated
    Deprecated,
}

impl Rank {
    /// Wire name of the rank
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Preferred => "preferred",
            Rank::Normal => "normal",
            Rank::Deprecated => "deprecated",
        }
    }

    /// Parse a wire rank name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "preferred" => Some(Rank::Preferred),
            "normal" => Some(Rank::Normal),
            "deprecated" => Some(Rank::Deprecated),
            _ => None,
        }
    }
}

/// A group of snaks citing a source
#[derive(Debug, Clone, Default)]
pub struct Reference {
    /// Server-assigned hash
    pub hash: Option<String>,
    /// Snaks in the group, in order
    pub snaks: Vec<Snak>,
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        same_snaks(&self.snaks, &other.snaks, false)
    }
}

impl Reference {
    /// Empty reference group
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a snak to the group
    pub fn with_snak(mut self, snak: Snak) -> Self {
        self.snaks.push(snak);
        self
    }

    fn to_json(&self) -> Value {
        let (snaks, order) = group_to_json(&self.snaks);
        let mut reference = Map::new();
        reference.insert("snaks".into(), snaks);
        reference.insert("snaks-order".into(), json!(order));
        if let Some(hash) = &self.hash {
            reference.insert("hash".into(), json!(hash));
        }
        Value::Object(reference)
    }

    fn from_json(json: &Value) -> Result<Self> {
        Ok(Self {
            hash: json.get("hash").and_then(Value::as_str).map(str::to_string),
            snaks: group_from_json(json.get("snaks"), json.get("snaks-order"))?,
        })
    }
}

/// A property-value assertion attached to an entity
///
/// A claim marked removed that carries a server id serializes as a deletion
/// instruction; one without an id never reached the server and is dropped
/// from the wire form altogether.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    /// Main property/value pair
    pub mainsnak: Snak,
    /// Qualifier snaks, in order
    pub qualifiers: Vec<Snak>,
    /// Reference groups
    pub references: Vec<Reference>,
    /// Rank
    pub rank: Rank,
    /// Server-assigned statement id (`Q2$...`)
    pub id: Option<String>,
    removed: bool,
}

impl Claim {
    /// Claim around an existing snak
    pub fn new(mainsnak: Snak) -> Self {
        Self {
            mainsnak,
            qualifiers: Vec::new(),
            references: Vec::new(),
            rank: Rank::Normal,
            id: None,
            removed: false,
        }
    }

    /// Claim with a concrete value for `property`
    ///
    /// # Examples
    ///
    /// ```
    /// use wbi_domain::{Claim, DataValue, PropertyId};
    ///
    /// let claim = Claim::value(PropertyId::new(1), DataValue::String("test".into()));
    /// assert_eq!(claim.property().to_string(), "P1");
    /// ```
    pub fn value(property: PropertyId, value: DataValue) -> Self {
        Self::new(Snak::new(property, value))
    }

    /// Deletion instruction for a claim already on the server
    ///
    /// Only the id reaches the wire, so the main snak is a `novalue`
    /// placeholder for `property`.
    pub fn tombstone(property: PropertyId, id: impl Into<String>) -> Self {
        let mut claim = Self::new(Snak::no_value(property, DataType::String));
        claim.id = Some(id.into());
        claim.removed = true;
        claim
    }

    /// Add a qualifier
    pub fn with_qualifier(mut self, qualifier: Snak) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Add a reference group
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    /// Set the rank
    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    /// Property of the main snak
    pub fn property(&self) -> PropertyId {
        self.mainsnak.property
    }

    /// Value of the main snak, if it has one
    pub fn datavalue(&self) -> Option<&DataValue> {
        self.mainsnak.datavalue()
    }

    /// Flag the claim for deletion
    pub fn remove(&mut self) {
        self.removed = true;
    }

    /// Whether the claim is flagged for deletion
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Same property and same main value; qualifiers and references are not considered
    pub fn same_value(&self, other: &Claim) -> bool {
        self.mainsnak == other.mainsnak
    }

    /// Full comparison used by the fast-run diff: main value, qualifiers
    /// as a multiset, and references when `use_refs` is set
    pub fn matches(&self, other: &Claim, use_refs: bool, case_insensitive: bool) -> bool {
        let main = if case_insensitive {
            self.mainsnak.eq_ignore_case(&other.mainsnak)
        } else {
            self.mainsnak == other.mainsnak
        };
        main && same_snaks(&self.qualifiers, &other.qualifiers, case_insensitive)
            && (!use_refs || same_references(&self.references, &other.references, case_insensitive))
    }

    /// Serialize to the wire statement object
    ///
    /// Returns `None` for a removed claim that was never written.
    pub fn to_json(&self) -> Option<Value> {
        if self.removed {
            return self.id.as_ref().map(|id| json!({ "id": id, "remove": "" }));
        }

        let mut claim = Map::new();
        claim.insert("mainsnak".into(), self.mainsnak.to_json());
        claim.insert("type".into(), json!("statement"));
        claim.insert("rank".into(), json!(self.rank.as_str()));
        if !self.qualifiers.is_empty() {
            let (qualifiers, order) = group_to_json(&self.qualifiers);
            claim.insert("qualifiers".into(), qualifiers);
            claim.insert("qualifiers-order".into(), json!(order));
        }
        if !self.references.is_empty() {
            let references: Vec<Value> = self.references.iter().map(Reference::to_json).collect();
            claim.insert("references".into(), json!(references));
        }
        if let Some(id) = &self.id {
            claim.insert("id".into(), json!(id));
        }
        Some(Value::Object(claim))
    }

    /// Parse a wire statement object
    pub fn from_json(json: &Value) -> Result<Self> {
        if !json.is_object() {
            return Err(DomainError::InvalidInput(format!(
                "Expected a claim object, found {}",
                json
            )));
        }
        let mainsnak = Snak::from_json(
            json.get("mainsnak")
                .ok_or_else(|| DomainError::Malformed("Claim without mainsnak".to_string()))?,
        )?;
        let references = json
            .get("references")
            .and_then(Value::as_array)
            .map(|refs| refs.iter().map(Reference::from_json).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            mainsnak,
            qualifiers: group_from_json(json.get("qualifiers"), json.get("qualifiers-order"))?,
            references,
            rank: json
                .get("rank")
                .and_then(Value::as_str)
                .and_then(Rank::parse)
                .unwrap_or_default(),
            id: json.get("id").and_then(Value::as_str).map(str::to_string),
            removed: json.get("remove").is_some(),
        })
    }
}

fn same_snaks(a: &[Snak], b: &[Snak], case_insensitive: bool) -> bool {
    let eq = |x: &Snak, y: &Snak| {
        if case_insensitive {
            x.eq_ignore_case(y)
        } else {
            x == y
        }
    };
    a.len() == b.len()
        && a.iter().all(|x| b.iter().any(|y| eq(x, y)))
        && b.iter().all(|y| a.iter().any(|x| eq(x, y)))
}

fn same_references(a: &[Reference], b: &[Reference], case_insensitive: bool) -> bool {
    let eq = |x: &Reference, y: &Reference| same_snaks(&x.snaks, &y.snaks, case_insensitive);
    a.len() == b.len()
        && a.iter().all(|x| b.iter().any(|y| eq(x, y)))
        && b.iter().all(|y| a.iter().any(|x| eq(x, y)))
}
