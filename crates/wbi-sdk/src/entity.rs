//! Reading and writing entities.
//!
//! `get` binds a fresh entity to a server id. `write` is the only operation
//! that changes server state: it sends the entity body through
//! `wbeditentity` and, on success, reloads the entity from the response so
//! it carries the new revision and the server-assigned statement ids. A
//! failed write leaves the entity exactly as it was.

use crate::api::{Params, WikibaseApi};
use crate::error::{Result, WbiError};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use wbi_domain::{Entity, EntityId};

/// Options for a write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Edit summary
    pub summary: Option<String>,
    /// Allow the edit without credentials
    pub allow_anonymous: bool,
    /// Replace all server-side content with the sent body
    pub clear: bool,
}

impl WriteOptions {
    /// Set the edit summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Allow anonymous edits
    pub fn anonymous(mut self, allow: bool) -> Self {
        self.allow_anonymous = allow;
        self
    }
}

/// Fetch an entity by id
pub fn get<A: WikibaseApi + ?Sized>(api: &A, id: &EntityId) -> Result<Entity> {
    let mut params = Params::new();
    params.insert("ids".into(), id.to_string());

    let response = api.call("wbgetentities", &params, true)?;
    let entities = response
        .get("entities")
        .and_then(Value::as_object)
        .ok_or_else(|| WbiError::UnexpectedResponse("wbgetentities without entities".into()))?;
    // Redirects are keyed by the requested id, normalised ids by the canonical one
    let entity = entities
        .get(id.as_str())
        .or_else(|| entities.values().next())
        .ok_or_else(|| WbiError::EntityNotFound(id.to_string()))?;

    let entity = Entity::from_json(entity)?;
    debug!("Loaded {} at revision {:?}", id, entity.lastrevid());
    Ok(entity)
}

/// Write the entity and reload it from the server's answer
///
/// Returns the entity JSON the server sent back.
pub fn write<A: WikibaseApi + ?Sized>(
    api: &A,
    entity: &mut Entity,
    options: &WriteOptions,
) -> Result<Value> {
    let data = entity.to_json();
    submit(api, entity, &data, options)
}

/// Erase all content of a bound entity
pub fn clear<A: WikibaseApi + ?Sized>(
    api: &A,
    entity: &mut Entity,
    options: &WriteOptions,
) -> Result<Value> {
    if !entity.is_bound() {
        return Err(WbiError::InvalidInput(
            "Cannot clear an entity that was never written".to_string(),
        ));
    }
    let options = WriteOptions {
        clear: true,
        ..options.clone()
    };
    submit(api, entity, &json!({}), &options)
}

/// `wbeditentity` parameters for sending `data` on behalf of `entity`
pub fn edit_params<A: WikibaseApi + ?Sized>(
    api: &A,
    entity: &Entity,
    data: &Value,
    options: &WriteOptions,
) -> Result<Params> {
    let mut params = Params::new();
    params.insert("data".into(), serde_json::to_string(data)?);
    match entity.id() {
        Some(id) => params.insert("id".into(), id.to_string()),
        None => params.insert("new".into(), entity.kind().to_string()),
    };
    if let Some(revision) = entity.lastrevid() {
        params.insert("baserevid".into(), revision.to_string());
    }
    if let Some(summary) = options.summary.as_deref().filter(|s| !s.is_empty()) {
        params.insert("summary".into(), summary.to_string());
    }
    if api.is_bot() {
        params.insert("bot".into(), String::new());
    }
    if options.clear {
        params.insert("clear".into(), String::new());
    }
    Ok(params)
}

fn submit<A: WikibaseApi + ?Sized>(
    api: &A,
    entity: &mut Entity,
    data: &Value,
    options: &WriteOptions,
) -> Result<Value> {
    let params = edit_params(api, entity, data, options)?;
    debug!("wbeditentity payload: {:?}", params);

    let response = api.call("wbeditentity", &params, options.allow_anonymous)?;
    let returned = response
        .get("entity")
        .ok_or_else(|| WbiError::UnexpectedResponse("wbeditentity without entity".into()))?;
    let id = returned
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| WbiError::UnexpectedResponse("Written entity without id".into()))?;
    let id = EntityId::parse(id)?;
    let lastrevid = returned.get("lastrevid").and_then(Value::as_u64);

    match Entity::from_json(returned) {
        Ok(reloaded) => *entity = reloaded,
        Err(e) => {
            warn!("Could not reload {} from the write response: {}", id, e);
            entity.bind(id.clone(), lastrevid);
        }
    }
    info!("Wrote {} (revision {:?})", id, lastrevid);
    Ok(returned.clone())
}
