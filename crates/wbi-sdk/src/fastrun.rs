//! Fast-run: skip writes that would not change anything.
//!
//! A [`FastRunContainer`] holds snapshots of server-side claims for the
//! properties named by a [`BaseFilter`]. Candidate claims are diffed against
//! the snapshot to decide whether a write is needed. Containers live in a
//! [`FastRunStore`] owned by the caller and are looked up by the structural
//! [`FastRunKey`], so every entity checked under the same filter shares one
//! container.
//!
//! The cache only saves writes. A failed fetch is always reported, never
//! taken as "nothing to write".

use crate::api::WikibaseApi;
use crate::entity;
use crate::error::{Result, WbiError};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use wbi_domain::{Claim, Claims, DataValue, Entity, EntityId, EntityType, PropertyId};

/// Property-based predicate selecting the entities and claims a container tracks
///
/// Each property maps to an optional entity value: `P31=Q5` admits only
/// entities with a `P31` claim pointing at `Q5`, a bare `P17` admits any
/// entity with a `P17` claim.
///
/// # Examples
///
/// ```
/// use wbi_sdk::BaseFilter;
///
/// let filter: BaseFilter = "P31=Q5, P21".parse().unwrap();
/// assert_eq!(filter.to_string(), "P21,P31=Q5");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BaseFilter(BTreeMap<PropertyId, Option<EntityId>>);

impl BaseFilter {
    /// Empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause
    pub fn with(mut self, property: PropertyId, value: Option<EntityId>) -> Self {
        self.0.insert(property, value);
        self
    }

    /// Whether `property` is part of the filter
    pub fn contains(&self, property: PropertyId) -> bool {
        self.0.contains_key(&property)
    }

    /// Filtered properties in numeric order
    pub fn properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.0.keys().copied()
    }

    /// Whether the filter has no clauses
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether live `claims` satisfy every clause
    pub fn admits(&self, claims: &Claims) -> bool {
        self.0.iter().all(|(property, value)| {
            let mut live = claims.get(*property).iter().filter(|c| !c.is_removed());
            match value.as_ref().map(entity_value) {
                None => live.next().is_some(),
                Some(None) => false,
                Some(Some(expected)) => live.any(|c| c.datavalue() == Some(&expected)),
            }
        })
    }
}

/// Value a claim holds when it points at `id`
fn entity_value(id: &EntityId) -> Option<DataValue> {
    let value = match id.kind() {
        EntityType::Item => DataValue::item(id.as_str()),
        EntityType::Property => DataValue::property(id.as_str()),
        EntityType::Lexeme => DataValue::lexeme(id.as_str()),
        EntityType::Form => DataValue::form(id.as_str()),
        EntityType::Sense => DataValue::sense(id.as_str()),
        EntityType::MediaInfo => return None,
    };
    value.ok()
}

impl FromStr for BaseFilter {
    type Err = WbiError;

    /// Comma-separated `P<n>` or `P<n>=<entity id>` clauses
    fn from_str(s: &str) -> Result<Self> {
        let mut filter = Self::new();
        for clause in s.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let (property, value) = match clause.split_once('=') {
                Some((property, value)) => (property.trim(), Some(EntityId::parse(value)?)),
                None => (clause, None),
            };
            filter = filter.with(property.parse()?, value);
        }
        Ok(filter)
    }
}

impl fmt::Display for BaseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self
            .0
            .iter()
            .map(|(property, value)| match value {
                Some(value) => format!("{}={}", property, value),
                None => property.to_string(),
            })
            .collect();
        f.write_str(&clauses.join(","))
    }
}

/// How candidate claims are compared against a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FastRunOptions {
    /// Properties and values that define the tracked set
    pub base_filter: BaseFilter,
    /// Also compare references
    pub use_refs: bool,
    /// Compare string values ignoring case
    pub case_insensitive: bool,
}

impl FastRunOptions {
    /// Options for `base_filter` with exact comparison
    pub fn new(base_filter: BaseFilter) -> Self {
        Self {
            base_filter,
            ..Self::default()
        }
    }

    /// Cache key for these options against `endpoint`
    pub fn key(&self, endpoint: &str) -> FastRunKey {
        FastRunKey {
            base_filter: self.base_filter.clone(),
            use_refs: self.use_refs,
            case_insensitive: self.case_insensitive,
            endpoint: endpoint.to_string(),
        }
    }
}

/// Identity of a fast-run container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FastRunKey {
    /// Filter signature
    pub base_filter: BaseFilter,
    /// Whether references take part in comparison
    pub use_refs: bool,
    /// Whether string comparison ignores case
    pub case_insensitive: bool,
    /// API endpoint the snapshots came from
    pub endpoint: String,
}

#[derive(Debug, Clone)]
struct Snapshot {
    admitted: bool,
    claims: Vec<Claim>,
}

/// Snapshots of server-side claims under one key
#[derive(Debug, Clone)]
pub struct FastRunContainer {
    key: FastRunKey,
    snapshots: BTreeMap<EntityId, Snapshot>,
    current_id: Option<EntityId>,
}

impl FastRunContainer {
    /// Empty container
    pub fn new(key: FastRunKey) -> Self {
        Self {
            key,
            snapshots: BTreeMap::new(),
            current_id: None,
        }
    }

    /// Key of this container
    pub fn key(&self) -> &FastRunKey {
        &self.key
    }

    /// Entity resolved by the most recent [`find_matching`](Self::find_matching)
    pub fn current_id(&self) -> Option<&EntityId> {
        self.current_id.as_ref()
    }

    /// Whether a snapshot of `id` is held
    pub fn is_loaded(&self, id: &EntityId) -> bool {
        self.snapshots.contains_key(id)
    }

    /// Number of snapshots held
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot is held
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Fetch and snapshot `id` unless it is already held
    pub fn load<A: WikibaseApi + ?Sized>(&mut self, api: &A, id: &EntityId) -> Result<()> {
        if self.is_loaded(id) {
            debug!("Fast-run reusing snapshot of {}", id);
            return Ok(());
        }
        let fetched = entity::get(api, id)?;
        self.observe(&fetched);
        Ok(())
    }

    /// Snapshot an entity already known to reflect server state
    ///
    /// Unbound entities are ignored.
    pub fn observe(&mut self, entity: &Entity) {
        let Some(id) = entity.id() else {
            return;
        };
        let filter = &self.key.base_filter;
        let claims = entity
            .claims
            .live()
            .filter(|c| filter.contains(c.property()))
            .cloned()
            .collect();
        let admitted = filter.admits(&entity.claims);
        debug!("Fast-run snapshot of {} (admitted: {})", id, admitted);
        self.snapshots.insert(id.clone(), Snapshot { admitted, claims });
    }

    /// Whether writing `candidates` to `id` would change the server
    ///
    /// Only candidates for filtered properties are compared. An unbound
    /// entity, or one the filter does not admit, always needs a write.
    pub fn write_required<A: WikibaseApi + ?Sized>(
        &mut self,
        api: &A,
        candidates: &[Claim],
        id: Option<&EntityId>,
    ) -> Result<bool> {
        let Some(id) = id else {
            debug!("Fast-run: unbound entity, write required");
            return Ok(true);
        };
        self.load(api, id)?;
        let Some(snapshot) = self.snapshots.get(id) else {
            return Ok(true);
        };
        if !snapshot.admitted {
            debug!("Fast-run: {} is outside the base filter", id);
            return Ok(true);
        }

        let required = self.relevant(candidates).any(|candidate| {
            if candidate.is_removed() {
                candidate.id.is_some()
                    && snapshot.claims.iter().any(|s| s.id == candidate.id)
            } else {
                !self.held(&snapshot.claims, candidate)
            }
        });
        debug!("Fast-run: write required for {}: {}", id, required);
        Ok(required)
    }

    /// First admitted snapshot holding every live filtered candidate
    ///
    /// Records the result as the current id. Candidates with no filtered
    /// property match nothing.
    pub fn find_matching(&mut self, candidates: &[Claim]) -> Option<EntityId> {
        let wanted: Vec<&Claim> = self
            .relevant(candidates)
            .filter(|c| !c.is_removed())
            .collect();
        let found = if wanted.is_empty() {
            None
        } else {
            self.snapshots
                .iter()
                .filter(|(_, snapshot)| snapshot.admitted)
                .find(|(_, snapshot)| wanted.iter().all(|c| self.held(&snapshot.claims, c)))
                .map(|(id, _)| id.clone())
        };
        self.current_id = found.clone();
        found
    }

    /// Drop the snapshot of `id`
    pub fn invalidate(&mut self, id: &EntityId) {
        if self.snapshots.remove(id).is_some() {
            debug!("Fast-run dropped snapshot of {}", id);
        }
        if self.current_id.as_ref() == Some(id) {
            self.current_id = None;
        }
    }

    fn relevant<'a>(&'a self, candidates: &'a [Claim]) -> impl Iterator<Item = &'a Claim> + 'a {
        candidates
            .iter()
            .filter(move |c| self.key.base_filter.contains(c.property()))
    }

    fn held(&self, snapshot: &[Claim], candidate: &Claim) -> bool {
        snapshot
            .iter()
            .any(|s| candidate.matches(s, self.key.use_refs, self.key.case_insensitive))
    }
}

/// Registry of fast-run containers, one per distinct key
#[derive(Debug, Default)]
pub struct FastRunStore {
    containers: HashMap<FastRunKey, FastRunContainer>,
}

impl FastRunStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Container for `key`, created on first use
    ///
    /// The container's current id is reset on every lookup.
    pub fn container(&mut self, key: FastRunKey) -> &mut FastRunContainer {
        let container = self.containers.entry(key).or_insert_with_key(|key| {
            debug!("Creating fast-run container for [{}]", key.base_filter);
            FastRunContainer::new(key.clone())
        });
        container.current_id = None;
        container
    }

    /// Number of containers
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether the store holds no container
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Drop snapshots of `id` from every container
    pub fn invalidate(&mut self, id: &EntityId) {
        for container in self.containers.values_mut() {
            container.invalidate(id);
        }
    }
}

fn filtered_claims(entity: &Entity, filter: &BaseFilter) -> Vec<Claim> {
    entity
        .claims
        .iter()
        .filter(|c| filter.contains(c.property()))
        .cloned()
        .collect()
}

/// Whether writing `entity` would change the server, judged on the
/// properties of `options.base_filter`
pub fn write_required<A: WikibaseApi + ?Sized>(
    store: &mut FastRunStore,
    api: &A,
    entity: &Entity,
    options: &FastRunOptions,
) -> Result<bool> {
    let candidates = filtered_claims(entity, &options.base_filter);
    store
        .container(options.key(api.endpoint()))
        .write_required(api, &candidates, entity.id())
}

/// Id of a snapshotted entity already holding the filtered claims of `entity`
///
/// A bound entity is loaded first; otherwise only entities loaded earlier
/// into the same container are searched.
pub fn fr_search<A: WikibaseApi + ?Sized>(
    store: &mut FastRunStore,
    api: &A,
    entity: &Entity,
    options: &FastRunOptions,
) -> Result<Option<EntityId>> {
    let candidates = filtered_claims(entity, &options.base_filter);
    let container = store.container(options.key(api.endpoint()));
    if let Some(id) = entity.id() {
        container.load(api, id)?;
    }
    Ok(container.find_matching(&candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Params;
    use serde_json::Value;
    use wbi_domain::ActionIfExists;

    struct Offline;

    impl WikibaseApi for Offline {
        fn call(&self, _action: &str, _params: &Params, _anonymous: bool) -> Result<Value> {
            Err(WbiError::ConnectionError("offline".into()))
        }

        fn is_bot(&self) -> bool {
            false
        }

        fn endpoint(&self) -> &str {
            "offline"
        }
    }

    fn id(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    fn claim(property: u64, item: &str) -> Claim {
        Claim::value(PropertyId::new(property), DataValue::item(item).unwrap())
    }

    fn human(qid: &str, extra: Vec<Claim>) -> Entity {
        let mut entity = Entity::item().with_id(id(qid));
        entity.add_claims(claim(31, "Q5"), ActionIfExists::Append);
        entity.add_claims(extra, ActionIfExists::ForceAppend);
        entity
    }

    fn options() -> FastRunOptions {
        FastRunOptions::new("P31=Q5,P27".parse().unwrap())
    }

    #[test]
    fn test_filter_parse_and_admits() {
        let filter: BaseFilter = "P31=Q5".parse().unwrap();
        assert!(filter.contains(PropertyId::new(31)));
        assert!(filter.admits(&human("Q1", vec![]).claims));
        assert!(!filter.admits(&Entity::item().claims));
        assert!("P31=nonsense".parse::<BaseFilter>().is_err());
    }

    #[test]
    fn test_keys_are_structural() {
        let a = options().key("https://a/w/api.php");
        let b = options().key("https://a/w/api.php");
        let c = options().key("https://b/w/api.php");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut store = FastRunStore::new();
        store.container(a);
        store.container(b);
        store.container(c);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_write_not_required_when_snapshot_matches() {
        let mut container = FastRunContainer::new(options().key("offline"));
        container.observe(&human("Q1", vec![claim(27, "Q30")]));

        let same = [claim(31, "Q5"), claim(27, "Q30")];
        assert!(!container.write_required(&Offline, &same, Some(&id("Q1"))).unwrap());

        let changed = [claim(27, "Q142")];
        assert!(container.write_required(&Offline, &changed, Some(&id("Q1"))).unwrap());
    }

    #[test]
    fn test_unfiltered_properties_are_ignored() {
        let mut container = FastRunContainer::new(options().key("offline"));
        container.observe(&human("Q1", vec![]));
        let other = [claim(106, "Q82594")];
        assert!(!container.write_required(&Offline, &other, Some(&id("Q1"))).unwrap());
    }

    #[test]
    fn test_unbound_or_outside_filter_requires_write() {
        let mut container = FastRunContainer::new(options().key("offline"));
        assert!(container.write_required(&Offline, &[], None).unwrap());

        let mut not_human = Entity::item().with_id(id("Q2"));
        not_human.add_claims(claim(31, "Q6256"), ActionIfExists::Append);
        container.observe(&not_human);
        assert!(container.write_required(&Offline, &[], Some(&id("Q2"))).unwrap());
    }

    #[test]
    fn test_fetch_failure_is_reported() {
        let mut container = FastRunContainer::new(options().key("offline"));
        let result = container.write_required(&Offline, &[claim(31, "Q5")], Some(&id("Q3")));
        assert!(matches!(result, Err(WbiError::ConnectionError(_))));
    }

    #[test]
    fn test_find_matching_sets_current_id() {
        let mut container = FastRunContainer::new(options().key("offline"));
        container.observe(&human("Q1", vec![claim(27, "Q30")]));
        container.observe(&human("Q2", vec![claim(27, "Q142")]));

        let found = container.find_matching(&[claim(27, "Q142")]);
        assert_eq!(found, Some(id("Q2")));
        assert_eq!(container.current_id(), Some(&id("Q2")));

        assert_eq!(container.find_matching(&[claim(27, "Q183")]), None);
        assert_eq!(container.current_id(), None);
    }

    #[test]
    fn test_invalidate_drops_snapshot() {
        let mut store = FastRunStore::new();
        store
            .container(options().key("offline"))
            .observe(&human("Q1", vec![]));
        store.invalidate(&id("Q1"));
        assert!(!store.container(options().key("offline")).is_loaded(&id("Q1")));
    }

    #[test]
    fn test_case_insensitive_keeps_monolingual_language() {
        let name = |text: &str, language: &str| {
            Claim::value(PropertyId::new(1448), DataValue::monolingual(text, language))
        };
        let mut options = FastRunOptions::new("P31=Q5,P1448".parse().unwrap());
        options.case_insensitive = true;
        let mut container = FastRunContainer::new(options.key("offline"));
        container.observe(&human("Q1", vec![name("Terra", "en")]));

        let same = [name("terra", "en")];
        assert!(!container.write_required(&Offline, &same, Some(&id("Q1"))).unwrap());

        let other_language = [name("terra", "pt")];
        assert!(container.write_required(&Offline, &other_language, Some(&id("Q1"))).unwrap());
    }
}
