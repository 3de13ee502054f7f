use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Cancelled;

/// Sleeps for `duration` unless `token` is cancelled first.
///
/// An already-cancelled token wins even for a zero duration, so no new
/// delay starts once shutdown has been observed.
pub(crate) async fn pause(token: &CancellationToken, duration: Duration) -> Result<(), Cancelled> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
