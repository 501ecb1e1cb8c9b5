//! List command implementation

use crate::cli::output::{format_rules_json, format_rules_table, RuleView};
use crate::cli::ListArgs;
use crate::reconcile::RuleReconciler;
use anyhow::Context;

/// Handle `lbrule list` command
pub async fn handle_list(args: &ListArgs, reconciler: &RuleReconciler) -> anyhow::Result<String> {
    let rules = reconciler
        .list(&args.listener_arn)
        .await
        .with_context(|| format!("failed to list rules of {}", args.listener_arn))?;
    let views: Vec<RuleView> = rules.iter().map(RuleView::from).collect();

    if args.json {
        format_rules_json(&views)
    } else {
        Ok(format_rules_table(&views))
    }
}
