//! Polling loop that wires a [`WidgetSession`] to the host shim.
//!
//! The host supplies page snapshots and applies effects through plain
//! closures; the loop owns the tick cadence and the config fetches.

use std::time::Duration;

use crate::client::ConfigClient;
use crate::page::PageSnapshot;
use crate::session::{Effect, TickOutcome, WidgetSession};

/// Drives `session` until `snapshot` returns `None`.
///
/// Each pass samples the page, lets the session decide whether a config
/// fetch is needed, and hands any resulting effects to `apply`. Fetch
/// failures are logged and recorded on the session so the next pass
/// retries; they never abort the loop.
pub async fn run<S, A>(
    mut session: WidgetSession,
    client: &ConfigClient,
    shop: &str,
    period: Duration,
    mut snapshot: S,
    mut apply: A,
) -> WidgetSession
where
    S: FnMut() -> Option<PageSnapshot>,
    A: FnMut(Effect),
{
    loop {
        let Some(page) = snapshot() else {
            break;
        };
        if let TickOutcome::FetchNeeded(key) = session.tick(&page) {
            match client.fetch_config(shop, &key).await {
                Ok(config) => {
                    for effect in session.apply_config(&key, config) {
                        apply(effect);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        variant = %key,
                        error = %err,
                        "config fetch failed, will retry on the next pass"
                    );
                    session.fetch_failed(&key);
                }
            }
        }
        tokio::time::sleep(period).await;
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loop_stops_when_the_source_runs_dry() {
        let client = ConfigClient::with_base_urls(
            "http://127.0.0.1:9/proxy",
            "http://127.0.0.1:9/direct",
            1,
        )
        .expect("client construction should not fail");

        let mut remaining = 3u32;
        let mut effects = Vec::new();
        let session = run(
            WidgetSession::new(),
            &client,
            "demo.myshopify.com",
            Duration::ZERO,
            || {
                if remaining == 0 {
                    return None;
                }
                remaining -= 1;
                // No cart form, so no fetch is ever attempted.
                Some(PageSnapshot::default())
            },
            |effect| effects.push(effect),
        )
        .await;

        assert!(effects.is_empty());
        assert!(session.memoized_key().is_none());
    }
}
