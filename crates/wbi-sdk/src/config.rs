//! Connection settings for a Wikibase instance.

use crate::error::{Result, WbiError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default MediaWiki action API endpoint
pub const DEFAULT_MEDIAWIKI_API_URL: &str = "https://www.wikidata.org/w/api.php";

/// Default concept URI base
pub const DEFAULT_WIKIBASE_URL: &str = "http://www.wikidata.org";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings used to build an API client
///
/// # Examples
///
/// ```
/// use wbi_sdk::WbiConfig;
///
/// let config = WbiConfig::from_toml_str(r#"
///     mediawiki_api_url = "https://test.wikidata.org/w/api.php"
///     is_bot = true
/// "#).unwrap();
/// assert!(config.is_bot);
/// assert_eq!(config.default_language, "en");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbiConfig {
    /// MediaWiki action API endpoint
    #[serde(default = "default_api_url")]
    pub mediawiki_api_url: String,

    /// Wikibase base URL; concept URIs live under `<wikibase_url>/entity/`
    #[serde(default = "default_wikibase_url")]
    pub wikibase_url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Language used when a command names none
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Flag edits as bot edits
    #[serde(default)]
    pub is_bot: bool,

    /// OAuth 2 bearer token for authenticated edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_MEDIAWIKI_API_URL.to_string()
}

fn default_wikibase_url() -> String {
    DEFAULT_WIKIBASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("wbi/{}", env!("CARGO_PKG_VERSION"))
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for WbiConfig {
    fn default() -> Self {
        Self {
            mediawiki_api_url: default_api_url(),
            wikibase_url: default_wikibase_url(),
            user_agent: default_user_agent(),
            default_language: default_language(),
            is_bot: false,
            bearer_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl WbiConfig {
    /// Parse settings from TOML; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: WbiConfig = toml::from_str(contents)
            .map_err(|e| WbiError::Config(format!("Failed to parse config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WbiError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Concept URI base, e.g. `http://www.wikidata.org/entity/`
    pub fn concept_base(&self) -> String {
        format!("{}/entity/", self.wikibase_url.trim_end_matches('/'))
    }

    fn validate(&self) -> Result<()> {
        if !self.mediawiki_api_url.starts_with("http://")
            && !self.mediawiki_api_url.starts_with("https://")
        {
            return Err(WbiError::Config(format!(
                "mediawiki_api_url must be an http(s) URL, got '{}'",
                self.mediawiki_api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(WbiError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_targets_wikidata() {
        let config = WbiConfig::default();
        assert_eq!(config.mediawiki_api_url, DEFAULT_MEDIAWIKI_API_URL);
        assert_eq!(config.concept_base(), "http://www.wikidata.org/entity/");
        assert!(config.user_agent.starts_with("wbi/"));
        assert!(!config.is_bot);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(WbiConfig::from_toml_str("").unwrap(), WbiConfig::default());
    }

    #[test]
    fn test_rejects_bad_url() {
        let result = WbiConfig::from_toml_str(r#"mediawiki_api_url = "ftp://example.org""#);
        assert!(matches!(result, Err(WbiError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wikibase_url = \"https://example.org/\"").unwrap();
        writeln!(file, "bearer_token = \"secret\"").unwrap();

        let config = WbiConfig::load(file.path()).unwrap();
        assert_eq!(config.concept_base(), "https://example.org/entity/");
        assert_eq!(config.bearer_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = WbiConfig::load("/nonexistent/wbi.toml");
        assert!(matches!(result, Err(WbiError::Config(_))));
    }
}
