//! ARN helpers

const RULE_RESOURCE: &str = ":listener-rule/";
const LISTENER_RESOURCE: &str = ":listener/";

/// Derive the listener ARN from a rule ARN.
///
/// Rule ARNs extend their listener's ARN with one trailing id:
/// `...:listener-rule/app/<lb>/<lb-id>/<listener-id>/<rule-id>`.
///
/// # Example
///
/// ```
/// use lbrule::model::listener_arn_from_rule_arn;
///
/// let rule = "arn:aws:elasticloadbalancing:us-east-1:123456789012:listener-rule/app/web/50dc6c495c0c9188/f2f7dc8efc522ab2/9683b2d02a6cabee";
/// assert_eq!(
///     listener_arn_from_rule_arn(rule).as_deref(),
///     Some("arn:aws:elasticloadbalancing:us-east-1:123456789012:listener/app/web/50dc6c495c0c9188/f2f7dc8efc522ab2")
/// );
/// ```
pub fn listener_arn_from_rule_arn(rule_arn: &str) -> Option<String> {
    let (prefix, resource) = rule_arn.split_once(RULE_RESOURCE)?;
    let (listener_path, rule_id) = resource.rsplit_once('/')?;
    if rule_id.is_empty() || listener_path.is_empty() {
        return None;
    }
    Some(format!("{}{}{}", prefix, LISTENER_RESOURCE, listener_path))
}
