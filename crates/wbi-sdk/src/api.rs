//! MediaWiki action API access.
//!
//! Entity operations depend only on the [`WikibaseApi`] call/return
//! contract; [`MediaWikiApi`] is the HTTP implementation.

use crate::config::WbiConfig;
use crate::error::{Result, WbiError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Request parameters, excluding `action` and `format`
pub type Params = BTreeMap<String, String>;

/// Error message name the server uses for a label/description uniqueness conflict
pub const LABEL_DESCRIPTION_CONFLICT: &str = "wikibase-validator-label-with-description-conflict";

/// CSRF token MediaWiki accepts for anonymous edits
pub const ANONYMOUS_TOKEN: &str = "+\\";

/// Actions that never need an edit token
const READ_ACTIONS: &[&str] = &["wbgetentities", "query", "parse"];

/// A Wikibase API endpoint
pub trait WikibaseApi {
    /// Perform `action` with `params` and return the decoded response
    ///
    /// Error envelopes are returned as errors, never as `Ok`.
    fn call(&self, action: &str, params: &Params, allow_anonymous: bool) -> Result<Value>;

    /// Whether edits are flagged as bot edits
    fn is_bot(&self) -> bool;

    /// Endpoint URL, part of the fast-run cache key
    fn endpoint(&self) -> &str;
}

/// Turn an error envelope into the matching error
///
/// A uniqueness conflict among the envelope's `messages` is reported as
/// [`WbiError::NonUniqueLabelDescriptionPair`]; every other envelope as
/// [`WbiError::Api`]. Both carry the raw payload.
pub fn check_error_envelope(response: Value) -> Result<Value> {
    let Some(error) = response.get("error") else {
        return Ok(response);
    };
    let conflict = error
        .get("messages")
        .and_then(Value::as_array)
        .is_some_and(|messages| {
            messages
                .iter()
                .any(|m| m.get("name").and_then(Value::as_str) == Some(LABEL_DESCRIPTION_CONFLICT))
        });
    if conflict {
        Err(WbiError::NonUniqueLabelDescriptionPair(response))
    } else {
        Err(WbiError::Api(response))
    }
}

/// Blocking HTTP client for a MediaWiki action API
pub struct MediaWikiApi {
    endpoint: String,
    client: reqwest::blocking::Client,
    bearer_token: Option<String>,
    is_bot: bool,
}

impl MediaWikiApi {
    /// Build a client from settings
    pub fn new(config: &WbiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WbiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.mediawiki_api_url.clone(),
            client,
            bearer_token: config.bearer_token.clone(),
            is_bot: config.is_bot,
        })
    }

    fn post(&self, form: &Params) -> Result<Value> {
        let mut request = self.client.post(&self.endpoint).form(form);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?.error_for_status()?;
        Ok(response.json()?)
    }

    fn csrf_token(&self, allow_anonymous: bool) -> Result<String> {
        if self.bearer_token.is_none() {
            if allow_anonymous {
                return Ok(ANONYMOUS_TOKEN.to_string());
            }
            return Err(WbiError::AuthError(
                "Edits need a bearer token unless anonymous editing is allowed".to_string(),
            ));
        }

        let mut form = Params::new();
        form.insert("action".into(), "query".into());
        form.insert("meta".into(), "tokens".into());
        form.insert("type".into(), "csrf".into());
        form.insert("format".into(), "json".into());
        let response = check_error_envelope(self.post(&form)?)?;

        match response.pointer("/query/tokens/csrftoken").and_then(Value::as_str) {
            Some(token) if token != ANONYMOUS_TOKEN => Ok(token.to_string()),
            Some(_) => Err(WbiError::AuthError(
                "Bearer token was not accepted; server issued an anonymous token".to_string(),
            )),
            None => Err(WbiError::UnexpectedResponse(
                "Token response without query.tokens.csrftoken".to_string(),
            )),
        }
    }
}

impl WikibaseApi for MediaWikiApi {
    fn call(&self, action: &str, params: &Params, allow_anonymous: bool) -> Result<Value> {
        let mut form = params.clone();
        form.insert("action".into(), action.to_string());
        form.insert("format".into(), "json".into());
        if !READ_ACTIONS.contains(&action) {
            form.insert("token".into(), self.csrf_token(allow_anonymous)?);
        }

        debug!("POST {} action={}", self.endpoint, action);
        check_error_envelope(self.post(&form)?)
    }

    fn is_bot(&self) -> bool {
        self.is_bot
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
