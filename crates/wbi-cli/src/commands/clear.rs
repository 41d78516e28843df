//! Clear command implementation.

use super::parse_id;
use crate::cli::ClearArgs;
use crate::error::Result;
use crate::output::Formatter;
use std::io::{self, Write};
use tracing::info;
use wbi_sdk::{WbiClient, WikibaseApi, WriteOptions};

/// Execute the clear command.
pub fn execute_clear<A: WikibaseApi>(
    args: ClearArgs,
    client: &mut WbiClient<A>,
    options: &WriteOptions,
    formatter: &Formatter,
) -> Result<()> {
    let id = parse_id(&args.id)?;

    // Confirm unless --yes is specified
    if !args.yes {
        print!("Erase all labels, descriptions, aliases and claims of {}? [y/N] ", id);
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    let mut entity = client.get(&id)?;
    client.clear(&mut entity, options)?;
    info!("Cleared {}", id);
    println!("{}", formatter.written(&entity));
    Ok(())
}
