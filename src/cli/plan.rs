//! Plan command implementation

use crate::cli::output::format_plan;
use crate::cli::setup::read_rule_file;
use crate::cli::PlanArgs;
use crate::reconcile::RuleReconciler;
use anyhow::Context;

/// Handle `lbrule plan` command
pub async fn handle_plan(args: &PlanArgs, reconciler: &RuleReconciler) -> anyhow::Result<String> {
    let spec = read_rule_file(&args.file)?;
    let plan = reconciler
        .plan(&args.rule_arn, &spec)
        .await
        .with_context(|| format!("failed to plan rule {}", args.rule_arn))?;
    Ok(format_plan(&plan))
}
