//! Multilingual term maps: labels, descriptions and aliases

use crate::action::{AliasAction, TermAction};
use crate::error::{DomainError, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

static EMPTY: LanguageValue = LanguageValue {
    language: String::new(),
    value: String::new(),
    removed: false,
};

/// A term in one language
///
/// A removed term reads as empty; it stays in its map so the wire form can
/// tell the server to delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageValue {
    language: String,
    value: String,
    removed: bool,
}

impl LanguageValue {
    /// Term with a value
    pub fn new(language: &str, value: &str) -> Self {
        Self {
            language: language.to_string(),
            value: value.to_string(),
            removed: false,
        }
    }

    /// Language code
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Current value; empty when absent or removed
    pub fn value(&self) -> &str {
        if self.removed {
            ""
        } else {
            &self.value
        }
    }

    /// Whether the term has no live value
    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    /// Whether the term is flagged for deletion
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Substring test against the live value
    pub fn contains(&self, needle: &str) -> bool {
        self.value().contains(needle)
    }

    /// Flag for deletion
    pub fn remove(&mut self) {
        self.removed = true;
    }

    fn to_json(&self) -> Value {
        if self.removed {
            json!({ "language": self.language, "remove": "" })
        } else {
            json!({ "language": self.language, "value": self.value })
        }
    }

    fn from_json(language: &str, json: &Value) -> Result<Self> {
        let removed = json.get("remove").is_some();
        let value = match json.get("value").and_then(Value::as_str) {
            Some(value) => value,
            None if removed => "",
            None => {
                return Err(DomainError::Malformed(format!(
                    "Term for '{}' without value",
                    language
                )))
            }
        };
        Ok(Self {
            language: json
                .get("language")
                .and_then(Value::as_str)
                .unwrap_or(language)
                .to_string(),
            value: value.to_string(),
            removed,
        })
    }
}

impl PartialEq<str> for LanguageValue {
    fn eq(&self, other: &str) -> bool {
        self.value() == other
    }
}

impl PartialEq<&str> for LanguageValue {
    fn eq(&self, other: &&str) -> bool {
        self.value() == *other
    }
}

impl fmt::Display for LanguageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// One value per language: labels, descriptions, lemmas, representations
/// and glosses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageValues {
    values: BTreeMap<String, LanguageValue>,
}

impl LanguageValues {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Term for a language; an empty term when there is none
    ///
    /// # Examples
    ///
    /// ```
    /// use wbi_domain::{LanguageValues, TermAction};
    ///
    /// let mut labels = LanguageValues::new();
    /// labels.set("en", Some("Earth"), TermAction::Replace);
    /// assert_eq!(labels.get("en"), "Earth");
    /// assert_eq!(labels.get("de"), "");
    /// assert!(labels.get("en").contains("art"));
    /// ```
    pub fn get(&self, language: &str) -> &LanguageValue {
        self.values.get(language).unwrap_or(&EMPTY)
    }

    /// Set the term for a language
    ///
    /// `None` or an empty string flags an existing term for deletion. KEEP
    /// leaves a live, non-empty term alone.
    pub fn set(&mut self, language: &str, value: Option<&str>, action: TermAction) {
        match value.filter(|v| !v.is_empty()) {
            None => {
                if let Some(existing) = self.values.get_mut(language) {
                    existing.remove();
                }
            }
            Some(value) => {
                let keep = action == TermAction::Keep && !self.get(language).is_empty();
                if !keep {
                    self.values
                        .insert(language.to_string(), LanguageValue::new(language, value));
                }
            }
        }
    }

    /// Live terms
    pub fn iter(&self) -> impl Iterator<Item = &LanguageValue> {
        self.values.values().filter(|v| !v.is_removed())
    }

    /// Number of live terms
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether there are no live terms
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize; removal markers only when `with_removals` is set
    pub fn to_json(&self, with_removals: bool) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .filter(|(_, v)| with_removals || !v.is_removed())
            .map(|(lang, v)| (lang.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Parse a language-keyed term map
    pub fn from_json(json: &Value) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (language, term) in object_or_empty(json, "terms")? {
            values.insert(language.clone(), LanguageValue::from_json(language, term)?);
        }
        Ok(Self { values })
    }
}

/// Ordered alias lists per language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aliases {
    values: BTreeMap<String, Vec<LanguageValue>>,
}

impl Aliases {
    /// Empty alias map
    pub fn new() -> Self {
        Self::default()
    }

    /// Live aliases for a language
    pub fn get(&self, language: &str) -> Vec<&str> {
        self.values
            .get(language)
            .map(|list| {
                list.iter()
                    .filter(|a| !a.is_removed())
                    .map(LanguageValue::value)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `value` is a live alias in `language`
    pub fn contains(&self, language: &str, value: &str) -> bool {
        self.get(language).contains(&value)
    }

    /// Update the alias list of a language
    ///
    /// An empty `values` clears the list (flags every alias for deletion)
    /// unless the action is KEEP. KEEP does nothing while live aliases exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use wbi_domain::{AliasAction, Aliases};
    ///
    /// let mut aliases = Aliases::new();
    /// aliases.set("ak", ["a"], AliasAction::Append);
    /// aliases.set("ak", ["b"], AliasAction::Append);
    /// assert_eq!(aliases.get("ak"), vec!["a", "b"]);
    ///
    /// aliases.set("ak", ["c"], AliasAction::Replace);
    /// assert_eq!(aliases.get("ak"), vec!["c"]);
    /// ```
    pub fn set<I, S>(&mut self, language: &str, values: I, action: AliasAction)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        let list = self.values.entry(language.to_string()).or_default();
        let has_live = list.iter().any(|a| !a.is_removed());

        if action == AliasAction::Keep && has_live {
            return;
        }

        if values.is_empty() {
            if action != AliasAction::Keep {
                list.iter_mut().for_each(LanguageValue::remove);
            }
            return;
        }

        match action {
            AliasAction::Replace => {
                *list = values
                    .iter()
                    .map(|v| LanguageValue::new(language, v))
                    .collect();
            }
            AliasAction::Append | AliasAction::Keep => {
                for value in values {
                    let present = list.iter().any(|a| !a.is_removed() && a.value == value);
                    if !present {
                        list.push(LanguageValue::new(language, &value));
                    }
                }
            }
        }
    }

    /// Languages that have live aliases
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, list)| list.iter().any(|a| !a.is_removed()))
            .map(|(lang, _)| lang.as_str())
    }

    /// Serialize
    ///
    /// A language whose aliases were all removed becomes a single
    /// `{language, remove}` entry (only when `with_removals` is set); otherwise
    /// the full live list is sent, which replaces the server-side list.
    pub fn to_json(&self, with_removals: bool) -> Value {
        let mut map = Map::new();
        for (language, list) in &self.values {
            let live: Vec<Value> = list
                .iter()
                .filter(|a| !a.is_removed())
                .map(LanguageValue::to_json)
                .collect();
            if !live.is_empty() {
                map.insert(language.clone(), Value::Array(live));
            } else if with_removals && !list.is_empty() {
                map.insert(
                    language.clone(),
                    json!([{ "language": language, "remove": "" }]),
                );
            }
        }
        Value::Object(map)
    }

    /// Parse a language-keyed alias map
    pub fn from_json(json: &Value) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (language, list) in object_or_empty(json, "aliases")? {
            let list = list.as_array().ok_or_else(|| {
                DomainError::Malformed(format!("Aliases for '{}' are not a list", language))
            })?;
            let parsed = list
                .iter()
                .map(|a| LanguageValue::from_json(language, a))
                .collect::<Result<Vec<_>>>()?;
            values.insert(language.clone(), parsed);
        }
        Ok(Self { values })
    }
}

/// The API sends `[]` instead of `{}` for some empty maps
fn object_or_empty<'a>(json: &'a Value, what: &str) -> Result<Vec<(&'a String, &'a Value)>> {
    match json {
        Value::Object(map) => Ok(map.iter().collect()),
        Value::Array(list) if list.is_empty() => Ok(Vec::new()),
        Value::Null => Ok(Vec::new()),
        other => Err(DomainError::Malformed(format!(
            "Expected {} object, found {}",
            what, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth_descriptions() -> LanguageValues {
        LanguageValues::from_json(&json!({
            "en": {"language": "en", "value": "third planet from the Sun"},
            "fr": {"language": "fr", "value": "planète"}
        }))
        .unwrap()
    }

    #[test]
    fn test_absent_language_reads_empty() {
        let d = earth_descriptions();
        assert_eq!(d.get("xx"), "");
        assert!(d.get("xx").is_empty());
        assert!(d.get("en").contains("planet"));
    }

    #[test]
    fn test_keep_leaves_existing_value() {
        let mut d = earth_descriptions();
        d.set("en", Some("fghjkl"), TermAction::Replace);
        d.set("en", Some("fghjkltest"), TermAction::Keep);
        assert_eq!(d.get("en"), "fghjkl");
        assert_eq!(d.to_json(true)["en"], json!({"language": "en", "value": "fghjkl"}));
    }

    #[test]
    fn test_keep_fills_emptied_value() {
        let mut d = earth_descriptions();
        d.set("en", Some(""), TermAction::Replace);
        d.set("en", Some("zaehjgreytret"), TermAction::Keep);
        assert_eq!(d.to_json(true)["en"], json!({"language": "en", "value": "zaehjgreytret"}));
    }

    #[test]
    fn test_none_flags_removal() {
        let mut d = earth_descriptions();
        d.set("fr", None, TermAction::Replace);
        d.set("non-exist-key", None, TermAction::Replace);
        let json = d.to_json(true);
        assert_eq!(json["fr"], json!({"language": "fr", "remove": ""}));
        assert!(json.get("non-exist-key").is_none());
        assert!(d.to_json(false).get("fr").is_none());
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_alias_sequence() {
        let mut aliases = Aliases::new();
        let none: [&str; 0] = [];
        aliases.set("ak", none, AliasAction::Append);
        aliases.set("ak", ["a"], AliasAction::Append);
        assert_eq!(aliases.get("ak"), vec!["a"]);
        aliases.set("ak", ["b"], AliasAction::Append);
        assert_eq!(aliases.get("ak"), vec!["a", "b"]);
        aliases.set("ak", ["b"], AliasAction::Replace);
        assert_eq!(aliases.get("ak"), vec!["b"]);
        aliases.set("ak", ["c"], AliasAction::Replace);
        assert_eq!(aliases.get("ak"), vec!["c"]);
        aliases.set("ak", ["d"], AliasAction::Keep);
        assert!(!aliases.contains("ak", "d"));

        aliases.set("ak", none, AliasAction::Keep);
        assert!(aliases.to_json(true)["ak"][0].get("remove").is_none());

        aliases.set("ak", none, AliasAction::Append);
        assert!(aliases.to_json(true)["ak"][0].get("remove").is_some());
        assert!(aliases.get("ak").is_empty());
    }

    #[test]
    fn test_alias_append_skips_existing() {
        let mut aliases = Aliases::new();
        aliases.set("en", ["blue planet", "blue planet"], AliasAction::Append);
        assert_eq!(aliases.get("en"), vec!["blue planet"]);
    }

    #[test]
    fn test_alias_parse() {
        let aliases = Aliases::from_json(&json!({
            "es": [{"language": "es", "value": "Terra"}, {"language": "es", "value": "planeta Tierra"}]
        }))
        .unwrap();
        assert!(aliases.contains("es", "Terra"));
        assert_eq!(aliases.languages().collect::<Vec<_>>(), vec!["es"]);
        assert!(Aliases::from_json(&json!([])).unwrap().get("es").is_empty());
    }
}
