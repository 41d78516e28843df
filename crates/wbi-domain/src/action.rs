//! Merge policies for claims, terms and aliases
//!
//! Claims, labels/descriptions and aliases each accept a different set of
//! policies, so each gets its own enum rather than one shared option set.

use crate::error::DomainError;
use std::fmt;
use std::str::FromStr;

/// Policy applied when incoming claims meet claims already on the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionIfExists {
    /// Add claims whose value is not already present for the property
    #[default]
    Append,
    /// Add every incoming claim, duplicates included
    ForceAppend,
    /// Leave a property alone if it already has claims
    Keep,
    /// Mark existing claims of the property removed, then add the incoming ones
    Replace,
}

/// Policy for labels, descriptions and the other single-value term maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TermAction {
    /// Overwrite the current value
    #[default]
    Replace,
    /// Leave an existing non-empty value untouched
    Keep,
}

/// Policy for alias lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AliasAction {
    /// Add values not yet in the list
    #[default]
    Append,
    /// Swap the whole list for the given values
    Replace,
    /// Only touch the list when it has no live aliases
    Keep,
}

impl ActionIfExists {
    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionIfExists::Append => "APPEND",
            ActionIfExists::ForceAppend => "FORCE_APPEND",
            ActionIfExists::Keep => "KEEP",
            ActionIfExists::Replace => "REPLACE",
        }
    }
}

impl TermAction {
    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TermAction::Replace => "REPLACE",
            TermAction::Keep => "KEEP",
        }
    }
}

impl AliasAction {
    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasAction::Append => "APPEND",
            AliasAction::Replace => "REPLACE",
            AliasAction::Keep => "KEEP",
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_uppercase().replace('-', "_")
}

impl FromStr for ActionIfExists {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "APPEND" => Ok(ActionIfExists::Append),
            "FORCE_APPEND" => Ok(ActionIfExists::ForceAppend),
            "KEEP" => Ok(ActionIfExists::Keep),
            "REPLACE" => Ok(ActionIfExists::Replace),
            _ => Err(DomainError::InvalidInput(format!(
                "Unknown claim policy '{}'",
                s
            ))),
        }
    }
}

impl FromStr for TermAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "REPLACE" => Ok(TermAction::Replace),
            "KEEP" => Ok(TermAction::Keep),
            other => Err(DomainError::InvalidInput(format!(
                "Policy '{}' is not valid for labels or descriptions",
                other
            ))),
        }
    }
}

impl FromStr for AliasAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "APPEND" => Ok(AliasAction::Append),
            "REPLACE" => Ok(AliasAction::Replace),
            "KEEP" => Ok(AliasAction::Keep),
            other => Err(DomainError::InvalidInput(format!(
                "Policy '{}' is not valid for aliases",
                other
            ))),
        }
    }
}

impl fmt::Display for ActionIfExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_claim_policy() {
        assert_eq!("append".parse::<ActionIfExists>().unwrap(), ActionIfExists::Append);
        assert_eq!("FORCE_APPEND".parse::<ActionIfExists>().unwrap(), ActionIfExists::ForceAppend);
        assert_eq!("force-append".parse::<ActionIfExists>().unwrap(), ActionIfExists::ForceAppend);
        assert!("merge".parse::<ActionIfExists>().is_err());
    }

    #[test]
    fn test_terms_reject_append() {
        assert!("APPEND".parse::<TermAction>().is_err());
        assert_eq!("keep".parse::<TermAction>().unwrap(), TermAction::Keep);
    }

    #[test]
    fn test_alias_defaults_to_append() {
        assert_eq!(AliasAction::default(), AliasAction::Append);
        assert_eq!(TermAction::default(), TermAction::Replace);
    }
}
