//! Command implementations.

pub mod check;
pub mod claims;
pub mod clear;
pub mod get;
pub mod profile;
pub mod terms;

pub use self::check::execute_check;
pub use self::claims::execute_claims;
pub use self::clear::execute_clear;
pub use self::get::execute_get;
pub use self::profile::execute_profile;
pub use self::terms::{execute_alias, execute_description, execute_label};

use crate::error::{CliError, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use wbi_domain::EntityId;

/// Parse an entity id argument.
pub(crate) fn parse_id(id: &str) -> Result<EntityId> {
    EntityId::parse(id).map_err(|e| CliError::InvalidInput(e.to_string()))
}

/// Read a JSON document from a file or stdin.
pub(crate) fn read_json_input(file: Option<&Path>, stdin: bool) -> Result<Value> {
    let json_data = if stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if let Some(file_path) = file {
        fs::read_to_string(file_path)?
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either --file or --stdin".to_string(),
        ));
    };
    Ok(serde_json::from_str(&json_data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("Q42").unwrap().as_str(), "Q42");
        assert!(matches!(parse_id("42"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_read_json_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{{\"a\": 1}}]").unwrap();
        let value = read_json_input(Some(file.path()), false).unwrap();
        assert_eq!(value[0]["a"], 1);
    }

    #[test]
    fn test_read_json_requires_source() {
        assert!(matches!(read_json_input(None, false), Err(CliError::InvalidInput(_))));
    }
}
