//! Paginated scan of a listener's rules.

use crate::remote::{ControlPlane, RemoteError, RulePage};
use async_stream::try_stream;
use futures_util::stream::{Stream, StreamExt};

/// Every page of a listener's rules, following continuation tokens until
/// the control plane stops returning one.
pub fn rule_pages<'a>(
    remote: &'a dyn ControlPlane,
    listener_arn: &'a str,
) -> impl Stream<Item = Result<RulePage, RemoteError>> + Send + 'a {
    try_stream! {
        let mut token: Option<String> = None;
        loop {
            let page = remote.list_rules(listener_arn, token.as_deref()).await?;
            let next = page.next_page_token.clone().filter(|t| !t.is_empty());
            yield page;
            match next {
                Some(next) => token = Some(next),
                None => break,
            }
        }
    }
}

/// Highest non-default priority on the listener, or `0` when it has none.
pub async fn highest_priority(
    remote: &dyn ControlPlane,
    listener_arn: &str,
) -> Result<u32, RemoteError> {
    let pages = rule_pages(remote, listener_arn);
    futures_util::pin_mut!(pages);

    let mut highest = 0;
    while let Some(page) = pages.next().await {
        highest = page?
            .rules
            .iter()
            .filter_map(|rule| rule.priority.value())
            .fold(highest, u32::max);
    }
    Ok(highest)
}
