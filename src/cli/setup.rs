//! Shared command setup: configuration, client, rule files

use crate::cli::GlobalArgs;
use crate::config::SyncConfig;
use crate::model::RuleSpec;
use crate::reconcile::RuleReconciler;
use crate::remote::HttpControlPlane;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "lbrule.toml";

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(args: &GlobalArgs) -> anyhow::Result<SyncConfig> {
    let mut config = match &args.config {
        Some(path) => SyncConfig::load(Some(path))
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            SyncConfig::load(Some(Path::new(DEFAULT_CONFIG_FILE)))
                .with_context(|| format!("failed to load config {}", DEFAULT_CONFIG_FILE))?
        }
        None => SyncConfig::default(),
    };

    config = config.with_env_overrides();

    if let Some(endpoint) = &args.endpoint {
        config.remote.endpoint = endpoint.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Reconciler talking to the configured control plane over HTTP.
pub fn build_reconciler(config: &SyncConfig) -> anyhow::Result<RuleReconciler> {
    let remote = HttpControlPlane::from_config(&config.remote)
        .context("failed to set up the control plane client")?;
    Ok(RuleReconciler::new(Arc::new(remote), &config.allocator))
}

/// Read and parse a TOML rule file.
pub fn read_rule_file(path: &Path) -> anyhow::Result<RuleSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule file {}", path.display()))?;
    RuleSpec::from_toml_str(&content)
        .with_context(|| format!("failed to parse rule file {}", path.display()))
}
