//! Completion polling
//!
//! IDM gives no completion callback, so "finished" is approximated by the
//! target file appearing on disk. Existence is the only signal checked; no
//! size or integrity verification happens here.

use std::path::Path;
use std::time::Duration;

use tokio::fs;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::error::{IdmError, Result};

/// Poll `path` until it exists or `timeout` elapses
///
/// Two timers run against each other: a recurring check tick and the overall
/// deadline. The tick branch is polled first, and the deadline branch takes
/// one final look at the file before giving up, so a file that appears in
/// the same instant the deadline fires still counts as a success.
pub(crate) async fn wait_for_file(
    path: &Path,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let started = Instant::now();
    let deadline = started + timeout;
    let mut ticks = time::interval_at(started + poll_interval, poll_interval);

    loop {
        tokio::select! {
            biased;

            _ = ticks.tick() => {
                if fs::metadata(path).await.is_ok() {
                    debug!("{} appeared after {:?}", path.display(), started.elapsed());
                    return Ok(());
                }
                trace!("{} not present yet", path.display());
                if Instant::now() >= deadline {
                    return Err(timeout_error(path, timeout));
                }
            }

            _ = time::sleep_until(deadline) => {
                if fs::metadata(path).await.is_ok() {
                    debug!("{} appeared right at the deadline", path.display());
                    return Ok(());
                }
                return Err(timeout_error(path, timeout));
            }
        }
    }
}

fn timeout_error(path: &Path, waited: Duration) -> IdmError {
    IdmError::WaitTimeout {
        path: path.to_path_buf(),
        waited,
    }
}
