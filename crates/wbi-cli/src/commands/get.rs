//! Get command implementation.

use super::parse_id;
use crate::cli::GetArgs;
use crate::error::Result;
use crate::output::Formatter;
use tracing::debug;
use wbi_sdk::{WbiClient, WikibaseApi};

/// Execute the get command.
pub fn execute_get<A: WikibaseApi>(
    args: GetArgs,
    client: &mut WbiClient<A>,
    formatter: &Formatter,
) -> Result<()> {
    let id = parse_id(&args.id)?;
    debug!("Fetching {}", id);
    let entity = client.get(&id)?;
    println!("{}", formatter.format_entity(&entity)?);
    Ok(())
}
