//! Apply command implementation

use crate::cli::output::{format_state, format_state_json};
use crate::cli::setup::read_rule_file;
use crate::cli::ApplyArgs;
use crate::reconcile::RuleReconciler;
use anyhow::Context;
use tokio_util::sync::CancellationToken;

/// Handle `lbrule apply` command
///
/// Without `--rule-arn` the rule is created (allocating a priority unless
/// the file pins one); with it the existing rule is updated in place.
pub async fn handle_apply(
    args: &ApplyArgs,
    reconciler: &RuleReconciler,
    cancel: &CancellationToken,
) -> anyhow::Result<String> {
    let spec = read_rule_file(&args.file)?;

    let (state, verb) = match &args.rule_arn {
        Some(rule_arn) => {
            let state = reconciler
                .update(rule_arn, &spec)
                .await
                .with_context(|| format!("failed to update rule {}", rule_arn))?;
            (state, "updated")
        }
        None => {
            let state = reconciler
                .create(&spec, cancel)
                .await
                .with_context(|| format!("failed to create rule from {}", args.file.display()))?;
            (state, "created")
        }
    };

    if args.json {
        format_state_json(&state)
    } else {
        Ok(format_state(&state, verb))
    }
}
