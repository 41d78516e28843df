//! wbi CLI - Command-line interface for reading and editing Wikibase entities.

use clap::Parser;
use wbi_cli::commands;
use wbi_cli::{Cli, Command, Config, Formatter};
use wbi_sdk::WbiClient;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Client for the active profile
fn connect(config: &Config) -> wbi_cli::Result<WbiClient> {
    Ok(WbiClient::new(config.get_active_profile()?)?)
}

fn run() -> wbi_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(&cli);

    // Load or create config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Override profile if specified
    if let Some(profile_name) = cli.profile.clone() {
        config.switch_profile(profile_name)?;
    }

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);
    let options = cli.write_options();

    match cli.command {
        Command::Profile(args) => commands::execute_profile(args, &mut config, &formatter)?,
        Command::Get(args) => commands::execute_get(args, &mut connect(&config)?, &formatter)?,
        Command::Label(args) => {
            commands::execute_label(args, &mut connect(&config)?, &options, &formatter)?
        }
        Command::Description(args) => {
            commands::execute_description(args, &mut connect(&config)?, &options, &formatter)?
        }
        Command::Alias(args) => {
            commands::execute_alias(args, &mut connect(&config)?, &options, &formatter)?
        }
        Command::Claims(args) => {
            commands::execute_claims(args, &mut connect(&config)?, &options, &formatter)?
        }
        Command::Clear(args) => {
            commands::execute_clear(args, &mut connect(&config)?, &options, &formatter)?
        }
        Command::Check(args) => {
            commands::execute_check(args, &mut connect(&config)?, &formatter)?;
        }
    }

    Ok(())
}
