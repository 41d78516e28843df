//! wbi client implementation.

use crate::api::{MediaWikiApi, WikibaseApi};
use crate::config::WbiConfig;
use crate::entity::{self, WriteOptions};
use crate::error::Result;
use crate::fastrun::{self, FastRunOptions, FastRunStore};
use serde_json::Value;
use wbi_domain::{Entity, EntityId};

/// Entity client bound to one API endpoint
///
/// Owns the fast-run store for that endpoint; snapshots of an entity are
/// dropped whenever the client writes it.
pub struct WbiClient<A: WikibaseApi = MediaWikiApi> {
    api: A,
    fast_run: FastRunStore,
}

impl WbiClient<MediaWikiApi> {
    /// Create a client talking HTTP to the configured endpoint
    pub fn new(config: &WbiConfig) -> Result<Self> {
        Ok(Self::with_api(MediaWikiApi::new(config)?))
    }
}

impl<A: WikibaseApi> WbiClient<A> {
    /// Create a client over any API implementation
    pub fn with_api(api: A) -> Self {
        Self {
            api,
            fast_run: FastRunStore::new(),
        }
    }

    /// Underlying API
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch an entity
    pub fn get(&self, id: &EntityId) -> Result<Entity> {
        entity::get(&self.api, id)
    }

    /// Write an entity; see [`entity::write`]
    pub fn write(&mut self, entity: &mut Entity, options: &WriteOptions) -> Result<Value> {
        let returned = entity::write(&self.api, entity, options)?;
        if let Some(id) = entity.id() {
            self.fast_run.invalidate(id);
        }
        Ok(returned)
    }

    /// Erase all content of an entity; see [`entity::clear`]
    pub fn clear(&mut self, entity: &mut Entity, options: &WriteOptions) -> Result<Value> {
        let returned = entity::clear(&self.api, entity, options)?;
        if let Some(id) = entity.id() {
            self.fast_run.invalidate(id);
        }
        Ok(returned)
    }

    /// Whether writing `entity` would change the server; see [`fastrun::write_required`]
    pub fn write_required(&mut self, entity: &Entity, options: &FastRunOptions) -> Result<bool> {
        fastrun::write_required(&mut self.fast_run, &self.api, entity, options)
    }

    /// Resolve the entity already holding the filtered claims; see [`fastrun::fr_search`]
    pub fn fr_search(
        &mut self,
        entity: &Entity,
        options: &FastRunOptions,
    ) -> Result<Option<EntityId>> {
        fastrun::fr_search(&mut self.fast_run, &self.api, entity, options)
    }

    /// Fast-run containers of this client
    pub fn fast_run_store(&mut self) -> &mut FastRunStore {
        &mut self.fast_run
    }
}
