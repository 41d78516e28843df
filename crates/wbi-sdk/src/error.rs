//! Error types for the wbi SDK.

use serde_json::Value;
use thiserror::Error;
use wbi_domain::DomainError;

/// SDK operation errors
#[derive(Debug, Error)]
pub enum WbiError {
    /// Argument of the wrong shape, rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The server reported the entity as missing
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Another entity already has this label and description in a language
    #[error("Label/description pair is not unique: {}", error_info(.0))]
    NonUniqueLabelDescriptionPair(Value),

    /// Any other error envelope returned by the API
    #[error("MediaWiki API error: {}", error_info(.0))]
    Api(Value),

    /// Authentication or authorization error
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Connection error (network, DNS, timeout)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local value or payload failed validation
    #[error(transparent)]
    Domain(DomainError),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for SDK operations
pub type Result<T> = std::result::Result<T, WbiError>;

impl WbiError {
    /// Raw server payload for the API error categories
    pub fn payload(&self) -> Option<&Value> {
        match self {
            WbiError::NonUniqueLabelDescriptionPair(payload) | WbiError::Api(payload) => {
                Some(payload)
            }
            _ => None,
        }
    }
}

/// `code: info` of an error envelope, or the whole payload when it has neither
fn error_info(payload: &Value) -> String {
    let error = payload.get("error");
    let code = error.and_then(|e| e.get("code")).and_then(Value::as_str);
    let info = error.and_then(|e| e.get("info")).and_then(Value::as_str);
    match (code, info) {
        (Some(code), Some(info)) => format!("{}: {}", code, info),
        (Some(code), None) => code.to_string(),
        (None, Some(info)) => info.to_string(),
        (None, None) => payload.to_string(),
    }
}

impl From<DomainError> for WbiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidInput(msg) => WbiError::InvalidInput(msg),
            DomainError::EntityNotFound(id) => WbiError::EntityNotFound(id),
            other => WbiError::Domain(other),
        }
    }
}

impl From<reqwest::Error> for WbiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            WbiError::ConnectionError(e.to_string())
        } else if e.is_status() {
            match e.status() {
                Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                    WbiError::AuthError(format!("HTTP {}", status))
                }
                Some(status) if status.is_server_error() => {
                    WbiError::HttpError(format!("Server error (HTTP {})", status))
                }
                Some(status) => WbiError::HttpError(format!("HTTP {}: {}", status, e)),
                None => WbiError::HttpError(e.to_string()),
            }
        } else if e.is_decode() {
            WbiError::UnexpectedResponse(e.to_string())
        } else {
            WbiError::ConnectionError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_domain_errors_map_to_categories() {
        let err: WbiError = DomainError::InvalidInput("bad".into()).into();
        assert!(matches!(err, WbiError::InvalidInput(_)));

        let err: WbiError = DomainError::EntityNotFound("Q1".into()).into();
        assert!(matches!(err, WbiError::EntityNotFound(id) if id == "Q1"));

        let err: WbiError = DomainError::InvalidValue("x".into()).into();
        assert!(matches!(err, WbiError::Domain(_)));
    }

    #[test]
    fn test_api_error_display_uses_envelope() {
        let err = WbiError::Api(json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}}));
        assert_eq!(err.to_string(), "MediaWiki API error: badtoken: Invalid CSRF token.");
        assert!(err.payload().is_some());
    }
}
