//! CLI module for lbrule
//!
//! Command-line interface definitions and handlers for the listener rule
//! synchronizer.
//!
//! # Commands
//!
//! - `apply` - Create a rule from a rule file, or update an existing one
//! - `plan` - Show what `apply` would change on an existing rule
//! - `list` - List a listener's rules
//! - `delete` - Delete a rule
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Create a rule, allocating a priority
//! lbrule apply api-rule.toml
//!
//! # Preview an update
//! lbrule plan api-rule.toml --rule-arn arn:aws:elasticloadbalancing:...:listener-rule/app/web/1/2/3
//!
//! # Generate shell completions
//! lbrule completions bash > ~/.bash_completion.d/lbrule
//! ```

pub mod apply;
pub mod completions;
pub mod config;
pub mod delete;
pub mod list;
pub mod output;
pub mod plan;
pub mod setup;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// lbrule - Load balancer listener rule synchronizer
#[derive(Parser, Debug)]
#[command(
    name = "lbrule",
    version,
    about = "Synchronize declared listener rules with a load balancer control plane"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to configuration file (default: ./lbrule.toml if present)
    #[arg(short, long, global = true, env = "LBRULE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the control plane endpoint
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "LBRULE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update a rule from a rule file
    Apply(ApplyArgs),
    /// Show the changes apply would make to an existing rule
    Plan(PlanArgs),
    /// List the rules of a listener
    List(ListArgs),
    /// Delete a rule
    Delete(DeleteArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Rule file (TOML)
    pub file: PathBuf,

    /// Existing rule to update; a new rule is created when omitted
    #[arg(short, long)]
    pub rule_arn: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Rule file (TOML)
    pub file: PathBuf,

    /// Existing rule to compare against
    #[arg(short, long)]
    pub rule_arn: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Listener ARN
    pub listener_arn: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Rule ARN
    pub rule_arn: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "lbrule.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
