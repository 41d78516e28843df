//! Claims command implementation.

use super::{parse_id, read_json_input};
use crate::cli::ClaimsArgs;
use crate::error::Result;
use crate::output::Formatter;
use tracing::{debug, info};
use wbi_domain::Entity;
use wbi_sdk::{WbiClient, WikibaseApi, WriteOptions};

/// Execute the claims command.
///
/// The input is validated before the entity is fetched.
pub fn execute_claims<A: WikibaseApi>(
    args: ClaimsArgs,
    client: &mut WbiClient<A>,
    options: &WriteOptions,
    formatter: &Formatter,
) -> Result<()> {
    let id = parse_id(&args.id)?;
    let claims = read_json_input(args.file.as_deref(), args.stdin)?;

    Entity::new(id.kind()).add_claims_json(&claims, args.mode.into())?;
    debug!("Claims input for {} is valid", id);

    let mut entity = client.get(&id)?;
    entity.add_claims_json(&claims, args.mode.into())?;

    client.write(&mut entity, options)?;
    info!("Claims written to {}", id);
    println!("{}", formatter.written(&entity));
    Ok(())
}
