use std::time::Duration;

/// Polls `has_synced` until it returns true or `timeout_duration`
/// elapses. Returns whether the sync completed in time. Callers that
/// must not read a watch's cache before its initial listing gate on
/// this.
///
/// Behavior: If multiple ticks are missed, the poll timer waits for the
/// next tick instead of firing immediately.
pub async fn wait_for_cache_sync<F>(
    poll_interval: Duration,
    timeout_duration: Duration,
    has_synced: F,
) -> bool
where
    F: Fn() -> bool,
{
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let wait = async {
        loop {
            if has_synced() {
                return;
            }
            interval.tick().await;
        }
    };

    tokio::time::timeout(timeout_duration, wait).await.is_ok()
}
