//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs, ProfileSetArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the profile command.
pub fn execute_profile(args: ProfileArgs, config: &mut Config, formatter: &Formatter) -> Result<()> {
    match args.action {
        ProfileAction::List => list_profiles(config, formatter),
        ProfileAction::Show => show_active_profile(config, formatter),
        ProfileAction::Switch { name } => switch_profile(config, name, formatter),
        ProfileAction::Set(set) => set_profile(config, set, formatter),
        ProfileAction::Delete { name } => delete_profile(config, name, formatter),
    }
}

/// List all profiles.
fn list_profiles(config: &Config, formatter: &Formatter) -> Result<()> {
    if config.profiles.is_empty() {
        println!("{}", formatter.info("No profiles configured"));
        return Ok(());
    }

    println!("Available profiles:");
    for (name, profile) in &config.profiles {
        if name == &config.active_profile {
            println!("* {}", formatter.success(name));
        } else {
            println!("  {}", name);
        }
        println!("    API: {}", profile.mediawiki_api_url);
        if profile.is_bot {
            println!("    Bot: yes");
        }
    }

    Ok(())
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;

    println!("Active profile: {}", formatter.success(&config.active_profile));
    println!("  API: {}", profile.mediawiki_api_url);
    println!("  Wikibase: {}", profile.wikibase_url);
    println!("  User agent: {}", profile.user_agent);
    println!("  Language: {}", profile.default_language);
    println!("  Bot: {}", if profile.is_bot { "yes" } else { "no" });
    println!(
        "  Token: {}",
        if profile.bearer_token.is_some() { "set" } else { "none" }
    );

    Ok(())
}

/// Switch to a different profile.
fn switch_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    config.switch_profile(name.clone())?;
    config.save()?;
    println!(
        "{}",
        formatter.success(&format!("Switched to profile '{}'", name))
    );
    Ok(())
}

/// Create or update a profile.
fn set_profile(config: &mut Config, args: ProfileSetArgs, formatter: &Formatter) -> Result<()> {
    let existing = config.profiles.get(&args.name).cloned();
    let action = if existing.is_some() { "Updated" } else { "Created" };
    let mut profile = existing.unwrap_or_default();

    if let Some(url) = args.api_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CliError::InvalidInput(format!(
                "API URL must start with http:// or https://, got '{}'",
                url
            )));
        }
        profile.mediawiki_api_url = url;
    }
    if let Some(url) = args.wikibase_url {
        profile.wikibase_url = url;
    }
    if let Some(agent) = args.user_agent {
        profile.user_agent = agent;
    }
    if let Some(language) = args.language {
        profile.default_language = language;
    }
    if let Some(bot) = args.bot {
        profile.is_bot = bot;
    }
    if let Some(token) = args.bearer_token {
        profile.bearer_token = Some(token).filter(|t| !t.is_empty());
    }

    config.set_profile(args.name.clone(), profile);
    config.save()?;

    println!(
        "{}",
        formatter.success(&format!("{} profile '{}'", action, args.name))
    );

    Ok(())
}

/// Delete a profile.
fn delete_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }

    if config.profiles.remove(&name).is_some() {
        config.save()?;
        println!(
            "{}",
            formatter.success(&format!("Deleted profile '{}'", name))
        );
    } else {
        println!(
            "{}",
            formatter.warning(&format!("Profile '{}' does not exist", name))
        );
    }

    Ok(())
}
