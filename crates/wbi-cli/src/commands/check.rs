//! Check command implementation.

use super::{parse_id, read_json_input};
use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use wbi_domain::{ActionIfExists, Entity};
use tracing::debug;
use wbi_sdk::{BaseFilter, FastRunOptions, WbiClient, WikibaseApi};

/// Execute the check command.
///
/// Prints whether writing the candidate claims to the entity would change it.
pub fn execute_check<A: WikibaseApi>(
    args: CheckArgs,
    client: &mut WbiClient<A>,
    formatter: &Formatter,
) -> Result<bool> {
    let id = parse_id(&args.id)?;
    let base_filter: BaseFilter = args.base_filter.parse()?;
    if base_filter.is_empty() {
        return Err(CliError::InvalidInput("The base filter is empty".to_string()));
    }

    let claims = read_json_input(args.file.as_deref(), args.stdin)?;
    let mut candidate = Entity::new(id.kind()).with_id(id.clone());
    candidate.add_claims_json(&claims, ActionIfExists::ForceAppend)?;

    debug!("Checking {} against filter {}", id, base_filter);
    let options = FastRunOptions {
        base_filter,
        use_refs: args.use_refs,
        case_insensitive: args.case_insensitive,
    };
    let required = client.write_required(&candidate, &options)?;
    println!("{}", formatter.write_check(id.as_str(), required)?);
    Ok(required)
}
