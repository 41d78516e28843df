//! Ordered claim collection and the claim merge engine

use crate::action::ActionIfExists;
use crate::claim::Claim;
use crate::error::{DomainError, Result};
use crate::id::PropertyId;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Claims of an entity keyed by property
///
/// Properties iterate in numeric order; claims keep insertion order within
/// their property. Claims flagged for removal stay in the collection until
/// the entity is reloaded from the server, so they can be sent as
/// deletion instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    by_property: BTreeMap<PropertyId, Vec<Claim>>,
}

impl Claims {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `incoming` into the collection under `action`
    ///
    /// KEEP and REPLACE look at what the property held before this call, so
    /// several incoming claims for the same property are treated as one batch.
    ///
    /// # Examples
    ///
    /// ```
    /// use wbi_domain::{ActionIfExists, Claim, Claims, DataValue, PropertyId};
    ///
    /// let p31 = PropertyId::new(31);
    /// let claim = Claim::value(p31, DataValue::Item(1234));
    ///
    /// let mut claims = Claims::new();
    /// claims.add(vec![claim.clone(), claim.clone()], ActionIfExists::Append);
    /// assert_eq!(claims.get(p31).len(), 1);
    ///
    /// claims.add(vec![claim.clone(), claim], ActionIfExists::ForceAppend);
    /// assert_eq!(claims.get(p31).len(), 3);
    /// ```
    pub fn add(&mut self, incoming: impl IntoIterator<Item = Claim>, action: ActionIfExists) {
        let mut batches: BTreeMap<PropertyId, Vec<Claim>> = BTreeMap::new();
        for claim in incoming {
            batches.entry(claim.property()).or_default().push(claim);
        }

        for (property, batch) in batches {
            let existing = self.by_property.entry(property).or_default();
            let has_live = existing.iter().any(|c| !c.is_removed());

            match action {
                ActionIfExists::Append => {
                    for claim in batch {
                        let duplicate = existing
                            .iter()
                            .any(|c| !c.is_removed() && c.same_value(&claim));
                        if !duplicate {
                            existing.push(claim);
                        }
                    }
                }
                ActionIfExists::ForceAppend => existing.extend(batch),
                ActionIfExists::Keep => {
                    if !has_live {
                        existing.extend(batch);
                    }
                }
                ActionIfExists::Replace => {
                    existing.iter_mut().for_each(Claim::remove);
                    existing.extend(batch);
                }
            }

            if existing.is_empty() {
                self.by_property.remove(&property);
            }
        }
    }

    /// Claims for a property, removed ones included
    pub fn get(&self, property: PropertyId) -> &[Claim] {
        self.by_property
            .get(&property)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable claims for a property
    pub fn get_mut(&mut self, property: PropertyId) -> Option<&mut Vec<Claim>> {
        self.by_property.get_mut(&property)
    }

    /// Flag every claim of a property for removal
    pub fn remove_property(&mut self, property: PropertyId) {
        if let Some(claims) = self.by_property.get_mut(&property) {
            claims.iter_mut().for_each(Claim::remove);
        }
    }

    /// Properties that have at least one claim
    pub fn properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.by_property.keys().copied()
    }

    /// All claims, removed ones included
    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.by_property.values().flatten()
    }

    /// Claims not flagged for removal
    pub fn live(&self) -> impl Iterator<Item = &Claim> {
        self.iter().filter(|c| !c.is_removed())
    }

    /// Total number of claims, removed ones included
    pub fn len(&self) -> usize {
        self.by_property.values().map(Vec::len).sum()
    }

    /// Whether the collection holds no claims
    pub fn is_empty(&self) -> bool {
        self.by_property.is_empty()
    }

    /// Serialize to the property-keyed wire map
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (property, claims) in &self.by_property {
            let list: Vec<Value> = claims.iter().filter_map(Claim::to_json).collect();
            if !list.is_empty() {
                map.insert(property.to_string(), Value::Array(list));
            }
        }
        Value::Object(map)
    }

    /// Parse the property-keyed wire map
    ///
    /// An empty JSON array is accepted as an empty map; the API emits one
    /// for entities without statements.
    pub fn from_json(json: &Value) -> Result<Self> {
        let mut claims = Self::new();
        match json {
            Value::Object(map) => {
                for (key, list) in map {
                    let property: PropertyId = key.parse()?;
                    let list = list.as_array().ok_or_else(|| {
                        DomainError::Malformed(format!("Claims for {} are not a list", property))
                    })?;
                    let parsed = list
                        .iter()
                        .map(|claim| parse_listed(property, claim))
                        .collect::<Result<Vec<_>>>()?;
                    if !parsed.is_empty() {
                        claims.by_property.insert(property, parsed);
                    }
                }
                Ok(claims)
            }
            Value::Array(list) if list.is_empty() => Ok(claims),
            Value::Null => Ok(claims),
            other => Err(DomainError::Malformed(format!(
                "Expected a claims object, found {}",
                other
            ))),
        }
    }
}

/// Parse one entry of a property's claim list
///
/// A deletion instruction (`{id, remove}`) has no main snak and takes its
/// property from the list key.
fn parse_listed(property: PropertyId, json: &Value) -> Result<Claim> {
    if json.get("mainsnak").is_none() && json.get("remove").is_some() {
        let id = json.get("id").and_then(Value::as_str).ok_or_else(|| {
            DomainError::Malformed(format!("Removal for {} without a claim id", property))
        })?;
        return Ok(Claim::tombstone(property, id));
    }
    Claim::from_json(json)
}

impl<'a> IntoIterator for &'a Claims {
    type Item = &'a Claim;
    type IntoIter = Box<dyn Iterator<Item = &'a Claim> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datavalue::DataValue;

    const P31: PropertyId = PropertyId::new(31);

    fn instance_of(q: u64) -> Claim {
        Claim::value(P31, DataValue::Item(q))
    }

    /// Two P31 claims with server ids, like an item freshly read from the API
    fn existing() -> Claims {
        let mut claims = Claims::new();
        let mut a = instance_of(3504248);
        a.id = Some("Q2$1".to_string());
        let mut b = instance_of(634);
        b.id = Some("Q2$2".to_string());
        claims.add(vec![a, b], ActionIfExists::ForceAppend);
        claims
    }

    fn values(claims: &Claims) -> Vec<u64> {
        claims
            .get(P31)
            .iter()
            .filter_map(|c| match c.datavalue() {
                Some(DataValue::Item(n)) => Some(*n),
                _ => None,
            })
            .collect()
    }

    fn incoming() -> Vec<Claim> {
        vec![instance_of(1234), instance_of(1234)]
    }

    #[test]
    fn test_append_drops_duplicates() {
        let mut claims = existing();
        claims.add(incoming(), ActionIfExists::Append);
        let v = values(&claims);
        assert_eq!(v.len(), 3);
        assert_eq!(v.iter().filter(|&&n| n == 1234).count(), 1);
    }

    #[test]
    fn test_force_append_keeps_duplicates() {
        let mut claims = existing();
        claims.add(incoming(), ActionIfExists::ForceAppend);
        let v = values(&claims);
        assert_eq!(v.len(), 4);
        assert_eq!(v.iter().filter(|&&n| n == 1234).count(), 2);
    }

    #[test]
    fn test_keep_leaves_populated_property() {
        let mut claims = existing();
        claims.add(incoming(), ActionIfExists::Keep);
        let v = values(&claims);
        assert_eq!(v.len(), 2);
        assert!(!v.contains(&1234));
    }

    #[test]
    fn test_keep_applies_whole_batch_to_empty_property() {
        let mut claims = Claims::new();
        claims.add(
            vec![instance_of(1), instance_of(2)],
            ActionIfExists::Keep,
        );
        assert_eq!(values(&claims), vec![1, 2]);
    }

    #[test]
    fn test_replace_flags_previous_claims() {
        let mut claims = existing();
        claims.add(incoming(), ActionIfExists::Replace);
        let v = values(&claims);
        assert_eq!(v.len(), 4);
        assert_eq!(claims.get(P31).iter().filter(|c| c.is_removed()).count(), 2);

        let json = claims.to_json();
        let wire = json["P31"].as_array().unwrap();
        assert_eq!(wire.len(), 4);
        assert_eq!(wire[0]["remove"], "");
        assert_eq!(wire[0]["id"], "Q2$1");
        assert!(wire[2].get("remove").is_none());
    }

    #[test]
    fn test_other_properties_untouched() {
        let mut claims = existing();
        let p17 = PropertyId::new(17);
        claims.add(vec![Claim::value(p17, DataValue::Item(30))], ActionIfExists::Replace);
        assert!(claims.get(P31).iter().all(|c| !c.is_removed()));
        assert_eq!(claims.get(p17).len(), 1);
    }

    #[test]
    fn test_append_after_replace_sees_only_live_claims() {
        let mut claims = existing();
        claims.add(vec![instance_of(634)], ActionIfExists::Replace);
        claims.add(vec![instance_of(3504248)], ActionIfExists::Append);
        assert_eq!(claims.live().count(), 2);
    }

    #[test]
    fn test_from_json_accepts_empty_array() {
        let claims = Claims::from_json(&serde_json::json!([])).unwrap();
        assert!(claims.is_empty());
        assert!(Claims::from_json(&serde_json::json!("x")).is_err());
    }

    #[test]
    fn test_from_json_reads_removals() {
        let mut claims = Claims::new();
        let mut written = instance_of(5);
        written.id = Some("Q2$1".to_string());
        claims.add(vec![written], ActionIfExists::ForceAppend);
        claims.add(vec![instance_of(6)], ActionIfExists::Replace);

        let json = claims.to_json();
        assert_eq!(json["P31"][0], serde_json::json!({"id": "Q2$1", "remove": ""}));

        let reparsed = Claims::from_json(&json).unwrap();
        assert_eq!(reparsed.get(P31).len(), 2);
        assert!(reparsed.get(P31)[0].is_removed());
        assert_eq!(reparsed.live().count(), 1);
        assert_eq!(reparsed.to_json(), json);

        let anonymous = serde_json::json!({"P31": [{"remove": ""}]});
        assert!(Claims::from_json(&anonymous).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::datavalue::DataValue;
    use proptest::prelude::*;

    fn claim_strategy() -> impl Strategy<Value = Claim> {
        (1u64..4, 1u64..6).prop_map(|(p, q)| Claim::value(PropertyId::new(p), DataValue::Item(q)))
    }

    fn distinct_live(claims: &Claims) -> usize {
        let live: Vec<&Claim> = claims.live().collect();
        live.iter()
            .enumerate()
            .filter(|(i, c)| !live[..*i].iter().any(|d| d.same_value(c)))
            .count()
    }

    proptest! {
        /// Property: APPEND never loses distinct values and never duplicates
        #[test]
        fn test_append_no_duplicates(
            start in prop::collection::vec(claim_strategy(), 0..8),
            incoming in prop::collection::vec(claim_strategy(), 0..8),
        ) {
            let mut claims = Claims::new();
            claims.add(start, ActionIfExists::Append);
            let before = distinct_live(&claims);

            claims.add(incoming, ActionIfExists::Append);
            prop_assert!(distinct_live(&claims) >= before);
            prop_assert_eq!(distinct_live(&claims), claims.live().count());
        }

        /// Property: APPEND of the same batch twice is idempotent
        #[test]
        fn test_append_idempotent(
            start in prop::collection::vec(claim_strategy(), 0..8),
            incoming in prop::collection::vec(claim_strategy(), 0..8),
        ) {
            let mut claims = Claims::new();
            claims.add(start, ActionIfExists::ForceAppend);
            claims.add(incoming.clone(), ActionIfExists::Append);
            let once = claims.clone();
            claims.add(incoming, ActionIfExists::Append);
            prop_assert_eq!(claims, once);
        }

        /// Property: FORCE_APPEND grows by exactly the incoming size
        #[test]
        fn test_force_append_count(
            start in prop::collection::vec(claim_strategy(), 0..8),
            incoming in prop::collection::vec(claim_strategy(), 0..8),
        ) {
            let mut claims = Claims::new();
            claims.add(start, ActionIfExists::ForceAppend);
            let before = claims.len();
            let n = incoming.len();
            claims.add(incoming, ActionIfExists::ForceAppend);
            prop_assert_eq!(claims.len(), before + n);
        }

        /// Property: REPLACE keeps previous claims as removed and adds all incoming
        #[test]
        fn test_replace_counts(
            start in prop::collection::vec(claim_strategy(), 0..8),
            incoming in prop::collection::vec(claim_strategy(), 1..8),
        ) {
            let mut claims = Claims::new();
            claims.add(start, ActionIfExists::ForceAppend);
            let before = claims.clone();
            claims.add(incoming.clone(), ActionIfExists::Replace);

            for property in before.properties() {
                let n_in = incoming.iter().filter(|c| c.property() == property).count();
                let prev = before.get(property).len();
                if n_in > 0 {
                    prop_assert_eq!(claims.get(property).len(), prev + n_in);
                    prop_assert!(claims.get(property)[..prev].iter().all(Claim::is_removed));
                } else {
                    prop_assert_eq!(claims.get(property), before.get(property));
                }
            }
        }

        /// Property: KEEP never touches a populated property
        #[test]
        fn test_keep_semantics(
            start in prop::collection::vec(claim_strategy(), 0..8),
            incoming in prop::collection::vec(claim_strategy(), 0..8),
        ) {
            let mut claims = Claims::new();
            claims.add(start, ActionIfExists::ForceAppend);
            let before = claims.clone();
            claims.add(incoming.clone(), ActionIfExists::Keep);

            for claim in &incoming {
                let property = claim.property();
                if before.get(property).is_empty() {
                    let expected = incoming.iter().filter(|c| c.property() == property).count();
                    prop_assert_eq!(claims.get(property).len(), expected);
                } else {
                    prop_assert_eq!(claims.get(property), before.get(property));
                }
            }
        }
    }
}
