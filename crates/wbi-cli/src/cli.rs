//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wbi_domain::{ActionIfExists, AliasAction};
use wbi_sdk::WriteOptions;

/// wbi - Read and edit Wikibase entities.
#[derive(Debug, Parser)]
#[command(name = "wbi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "WBI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Log requests and cache decisions (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Edit summary for write commands
    #[arg(short, long, global = true)]
    pub summary: Option<String>,

    /// Allow edits without credentials
    #[arg(long, global = true)]
    pub anonymous: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Write options from the global flags.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            summary: self.summary.clone(),
            allow_anonymous: self.anonymous,
            clear: false,
        }
    }

    /// Log filter for the verbosity level; `RUST_LOG` applies when not verbose
    pub fn log_filter(&self) -> EnvFilter {
        match self.verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            1 => EnvFilter::new("wbi_sdk=info,wbi_cli=info"),
            _ => EnvFilter::new("wbi_sdk=debug,wbi_cli=debug"),
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and display an entity
    Get(GetArgs),

    /// Set or remove a label
    Label(TermArgs),

    /// Set or remove a description
    Description(TermArgs),

    /// Edit the aliases of one language
    Alias(AliasArgs),

    /// Add claims from a JSON file or stdin
    Claims(ClaimsArgs),

    /// Erase all content of an entity
    Clear(ClearArgs),

    /// Check whether writing claims would change an entity
    Check(CheckArgs),

    /// Manage configuration profiles
    Profile(ProfileArgs),
}

/// Arguments for the get command.
#[derive(Debug, Parser)]
pub struct GetArgs {
    /// Entity id (e.g. Q42, P31, L7, M123)
    pub id: String,
}

/// Arguments for the label and description commands.
#[derive(Debug, Parser)]
pub struct TermArgs {
    /// Entity id
    pub id: String,

    /// Language code
    pub language: String,

    /// New value; omit to remove the term
    pub value: Option<String>,

    /// Leave an existing term alone
    #[arg(short, long)]
    pub keep: bool,
}

/// Arguments for the alias command.
#[derive(Debug, Parser)]
pub struct AliasArgs {
    /// Entity id
    pub id: String,

    /// Language code
    pub language: String,

    /// Aliases; none removes all aliases of the language
    pub values: Vec<String>,

    /// How to combine with existing aliases
    #[arg(short, long, value_enum, default_value = "append")]
    pub mode: AliasModeArg,
}

/// Arguments for the claims command.
#[derive(Debug, Parser)]
pub struct ClaimsArgs {
    /// Entity id
    pub id: String,

    /// JSON file holding a claim or a list of claims
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Read the claims from stdin
    #[arg(long)]
    pub stdin: bool,

    /// How to combine with existing claims of the same property
    #[arg(short, long, value_enum, default_value = "append")]
    pub mode: ModeArg,
}

/// Arguments for the clear command.
#[derive(Debug, Parser)]
pub struct ClearArgs {
    /// Entity id
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Entity id
    pub id: String,

    /// Base filter, e.g. "P31=Q5,P21"
    #[arg(long = "filter")]
    pub base_filter: String,

    /// JSON file holding the candidate claims
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Read the candidate claims from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Compare references too
    #[arg(long)]
    pub use_refs: bool,

    /// Compare strings ignoring case
    #[arg(long)]
    pub case_insensitive: bool,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set(ProfileSetArgs),

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

/// Settings for `profile set`; unset fields keep their current value.
#[derive(Debug, Parser)]
pub struct ProfileSetArgs {
    /// Profile name
    pub name: String,

    /// MediaWiki API endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    /// Wikibase base URL
    #[arg(long)]
    pub wikibase_url: Option<String>,

    /// User agent
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Default language
    #[arg(long)]
    pub language: Option<String>,

    /// Flag edits as bot edits
    #[arg(long)]
    pub bot: Option<bool>,

    /// OAuth 2 bearer token
    #[arg(long, env = "WBI_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,
}

/// Claim merge policy argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ModeArg {
    /// Add claims whose value is not present yet
    Append,
    /// Add claims unconditionally
    ForceAppend,
    /// Add claims only to properties without claims
    Keep,
    /// Replace all claims of the property
    Replace,
}

/// Alias merge policy argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum AliasModeArg {
    /// Add aliases not present yet
    Append,
    /// Replace the alias list
    Replace,
    /// Only set aliases when there are none
    Keep,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ModeArg> for ActionIfExists {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Append => ActionIfExists::Append,
            ModeArg::ForceAppend => ActionIfExists::ForceAppend,
            ModeArg::Keep => ActionIfExists::Keep,
            ModeArg::Replace => ActionIfExists::Replace,
        }
    }
}

impl From<AliasModeArg> for AliasAction {
    fn from(mode: AliasModeArg) -> Self {
        match mode {
            AliasModeArg::Append => AliasAction::Append,
            AliasModeArg::Replace => AliasAction::Replace,
            AliasModeArg::Keep => AliasAction::Keep,
        }
    }
}
