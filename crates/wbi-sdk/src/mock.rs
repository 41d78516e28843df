//! In-memory API for tests and offline use.

use crate::api::{check_error_envelope, Params, WikibaseApi};
use crate::error::{Result, WbiError};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call received by [`MockApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Action name
    pub action: String,
    /// Parameters as sent
    pub params: Params,
    /// Anonymity flag as sent
    pub allow_anonymous: bool,
}

/// Scripted API that records every call
///
/// Responses are queued per action and consumed in order. Queued error
/// envelopes are classified exactly as [`crate::MediaWikiApi`] would.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wbi_sdk::{MockApi, Params, WikibaseApi};
///
/// let api = MockApi::default();
/// api.push_response("wbgetentities", json!({"entities": {}}));
///
/// let response = api.call("wbgetentities", &Params::new(), true).unwrap();
/// assert_eq!(response, json!({"entities": {}}));
/// assert_eq!(api.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockApi {
    endpoint: String,
    is_bot: bool,
    responses: Arc<Mutex<HashMap<String, VecDeque<Value>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockApi {
    /// Mock answering for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            is_bot: false,
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Report edits as bot edits
    pub fn with_bot(mut self, is_bot: bool) -> Self {
        self.is_bot = is_bot;
        self
    }

    /// Queue the next response for `action`
    pub fn push_response(&self, action: &str, response: Value) {
        lock(&self.responses)
            .entry(action.to_string())
            .or_default()
            .push_back(response);
    }

    /// All calls so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Most recent call
    pub fn last_call(&self) -> Option<RecordedCall> {
        lock(&self.calls).last().cloned()
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new("https://wikibase.invalid/w/api.php")
    }
}

impl WikibaseApi for MockApi {
    fn call(&self, action: &str, params: &Params, allow_anonymous: bool) -> Result<Value> {
        lock(&self.calls).push(RecordedCall {
            action: action.to_string(),
            params: params.clone(),
            allow_anonymous,
        });

        let response = lock(&self.responses)
            .get_mut(action)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| {
                WbiError::ConnectionError(format!("No response queued for '{}'", action))
            })?;
        check_error_envelope(response)
    }

    fn is_bot(&self) -> bool {
        self.is_bot
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
