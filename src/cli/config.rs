//! Config command handlers

use crate::cli::ConfigInitArgs;
use anyhow::{bail, Context};
use colored::Colorize;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../lbrule.example.toml");

/// Handle `lbrule config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> anyhow::Result<String> {
    if args.output.exists() && !args.force {
        bail!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    fs::write(&args.output, EXAMPLE_CONFIG)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok(format!(
        "{} Configuration file created: {}\n  Set remote.endpoint and the API key before running apply.",
        "✓".green(),
        args.output.display()
    ))
}
