//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use wbi_domain::{Claim, Entity, Snak, SnakValue};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an entity.
    pub fn format_entity(&self, entity: &Entity) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&entity.to_json())?),
            OutputFormat::Table => Ok(self.format_entity_table(entity)),
            OutputFormat::Quiet => Ok(entity.id().map(ToString::to_string).unwrap_or_default()),
        }
    }

    fn format_entity_table(&self, entity: &Entity) -> String {
        let title = match entity.id() {
            Some(id) => format!(
                "{} {} (revision {})",
                entity.kind(),
                id,
                entity.lastrevid().map_or("-".to_string(), |r| r.to_string())
            ),
            None => format!("new {}", entity.kind()),
        };

        let mut sections = vec![self.colorize(&title, "cyan")];
        sections.push(self.terms_table(entity));
        sections.push(self.claims_table(entity));
        sections.join("\n\n")
    }

    fn terms_table(&self, entity: &Entity) -> String {
        let mut rows: Vec<[String; 3]> = Vec::new();
        for term in entity.labels.iter() {
            rows.push(["label".into(), term.language().into(), term.value().into()]);
        }
        for term in entity.descriptions.iter() {
            rows.push(["description".into(), term.language().into(), term.value().into()]);
        }
        for language in entity.aliases.languages() {
            rows.push(["aliases".into(), language.into(), entity.aliases.get(language).join(" | ")]);
        }
        if rows.is_empty() {
            return self.colorize("No terms.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Term", "Language", "Value"]);
        for row in rows {
            builder.push_record(row);
        }
        render(builder)
    }

    fn claims_table(&self, entity: &Entity) -> String {
        let claims: Vec<&Claim> = entity.claims.live().collect();
        if claims.is_empty() {
            return self.colorize("No claims found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Property", "Value", "Rank", "Qualifiers", "References", "ID"]);
        for claim in claims {
            let qualifiers: Vec<String> = claim
                .qualifiers
                .iter()
                .map(|q| format!("{}: {}", q.property, snak_value(q)))
                .collect();
            builder.push_record([
                claim.property().to_string(),
                snak_value(&claim.mainsnak),
                claim.rank.as_str().to_string(),
                qualifiers.join("; "),
                claim.references.len().to_string(),
                claim.id.clone().unwrap_or_default(),
            ]);
        }
        render(builder)
    }

    /// Format the outcome of a write.
    pub fn written(&self, entity: &Entity) -> String {
        let id = entity.id().map(ToString::to_string).unwrap_or_default();
        match self.format {
            OutputFormat::Quiet => id,
            _ => self.success(&format!(
                "Wrote {} (revision {})",
                id,
                entity.lastrevid().map_or("-".to_string(), |r| r.to_string())
            )),
        }
    }

    /// Format a fast-run decision.
    pub fn write_check(&self, id: &str, required: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &serde_json::json!({ "id": id, "write_required": required }),
            )?),
            OutputFormat::Quiet => Ok(required.to_string()),
            OutputFormat::Table if required => {
                Ok(self.warning(&format!("{} differs from the candidate claims", id)))
            }
            OutputFormat::Table => Ok(self.success(&format!("{} is up to date", id))),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn snak_value(snak: &Snak) -> String {
    match &snak.value {
        SnakValue::Value(value) => value.to_string(),
        SnakValue::SomeValue => "unknown value".to_string(),
        SnakValue::NoValue => "no value".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbi_domain::{ActionIfExists, DataValue, EntityId, PropertyId, TermAction};

    fn create_test_entity() -> Entity {
        let mut entity = Entity::item().with_id(EntityId::parse("Q42").unwrap());
        entity.labels.set("en", Some("Douglas Adams"), TermAction::Replace);
        entity.add_claims(
            Claim::value(PropertyId::new(31), DataValue::Item(5)),
            ActionIfExists::Append,
        );
        entity
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_entity(&create_test_entity()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["id"], "Q42");
        assert_eq!(parsed["labels"]["en"]["value"], "Douglas Adams");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_entity(&create_test_entity()).unwrap();
        assert_eq!(output, "Q42");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_entity(&create_test_entity()).unwrap();
        assert!(output.contains("item Q42"));
        assert!(output.contains("Douglas Adams"));
        assert!(output.contains("P31"));
        assert!(output.contains("Q5"));
    }

    #[test]
    fn test_empty_entity() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_entity(&Entity::item()).unwrap();
        assert!(output.contains("new item"));
        assert!(output.contains("No claims found"));
    }

    #[test]
    fn test_write_check_formats() {
        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(quiet.write_check("Q42", true).unwrap(), "true");

        let table = Formatter::new(OutputFormat::Table, false);
        assert_eq!(table.write_check("Q42", false).unwrap(), "✓ Q42 is up to date");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
