//! Deadline arithmetic that tolerates arbitrarily large timeouts.

use std::time::Duration;

use tokio::time::Instant;

/// Stand-in for "never" when a timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `Instant::now() + timeout`, saturating to a far-future instant instead
/// of panicking on overflow.
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}
