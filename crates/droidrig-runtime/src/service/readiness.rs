//! HTTP readiness polling for the driver server.

use std::time::Duration;

use tokio::process::Child;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::deadline::deadline_after;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll `<url>status` until it answers 2xx.
///
/// Fails early if `child` exits, and once `startup_timeout` elapses.
pub async fn wait_for_status(
    base_url: &str,
    startup_timeout: Duration,
    child: &mut Child,
) -> Result<(), String> {
    let status_url = format!("{base_url}status");
    info!(url = %status_url, "Waiting for service to become ready");

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| format!("failed to build HTTP client: {e}"))?;

    let deadline = deadline_after(startup_timeout);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Err(format!("process exited during startup ({status})")),
            Ok(None) => {}
            Err(e) => return Err(format!("failed to query process state: {e}")),
        }

        match client.get(&status_url).send().await {
            Ok(response) if response.status().is_success() => {
                info!(url = %status_url, "Service is ready");
                return Ok(());
            }
            Ok(response) => {
                debug!(status = %response.status(), "Status endpoint not ready, retrying");
            }
            Err(e) => {
                debug!(error = %e, "Status check failed, retrying");
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(format!(
                "{status_url} did not respond within {}s",
                startup_timeout.as_secs()
            ));
        }
        sleep(POLL_INTERVAL.min(remaining)).await;
    }
}
