//! Label, description and alias command implementations.

use super::parse_id;
use crate::cli::{AliasArgs, TermArgs};
use crate::error::Result;
use crate::output::Formatter;
use tracing::debug;
use wbi_domain::{Entity, LanguageValues, TermAction};
use wbi_sdk::{WbiClient, WikibaseApi, WriteOptions};

/// Execute the label command.
pub fn execute_label<A: WikibaseApi>(
    args: TermArgs,
    client: &mut WbiClient<A>,
    options: &WriteOptions,
    formatter: &Formatter,
) -> Result<()> {
    edit_term(args, client, options, formatter, |entity| &mut entity.labels)
}

/// Execute the description command.
pub fn execute_description<A: WikibaseApi>(
    args: TermArgs,
    client: &mut WbiClient<A>,
    options: &WriteOptions,
    formatter: &Formatter,
) -> Result<()> {
    edit_term(args, client, options, formatter, |entity| &mut entity.descriptions)
}

fn edit_term<A, F>(
    args: TermArgs,
    client: &mut WbiClient<A>,
    options: &WriteOptions,
    formatter: &Formatter,
    terms: F,
) -> Result<()>
where
    A: WikibaseApi,
    F: FnOnce(&mut Entity) -> &mut LanguageValues,
{
    let id = parse_id(&args.id)?;
    let mut entity = client.get(&id)?;
    let action = if args.keep {
        TermAction::Keep
    } else {
        TermAction::Replace
    };
    debug!("Setting {} term in {} ({:?})", id, args.language, action);
    terms(&mut entity).set(&args.language, args.value.as_deref(), action);

    client.write(&mut entity, options)?;
    println!("{}", formatter.written(&entity));
    Ok(())
}

/// Execute the alias command.
pub fn execute_alias<A: WikibaseApi>(
    args: AliasArgs,
    client: &mut WbiClient<A>,
    options: &WriteOptions,
    formatter: &Formatter,
) -> Result<()> {
    let id = parse_id(&args.id)?;
    let mut entity = client.get(&id)?;
    debug!("Editing {} aliases of {}", args.language, id);
    entity
        .aliases
        .set(&args.language, &args.values, args.mode.into());

    client.write(&mut entity, options)?;
    println!("{}", formatter.written(&entity));
    Ok(())
}
