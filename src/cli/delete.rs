//! Delete command implementation

use crate::cli::DeleteArgs;
use crate::reconcile::RuleReconciler;
use anyhow::Context;
use colored::Colorize;

/// Handle `lbrule delete` command. Deleting a missing rule succeeds.
pub async fn handle_delete(args: &DeleteArgs, reconciler: &RuleReconciler) -> anyhow::Result<String> {
    reconciler
        .delete(&args.rule_arn)
        .await
        .with_context(|| format!("failed to delete rule {}", args.rule_arn))?;
    Ok(format!("{} Rule deleted: {}", "✓".green(), args.rule_arn))
}
