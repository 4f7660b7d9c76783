//! Launching the IDM executable

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{IdmError, Result};

/// Run the IDM executable with the given arguments and wait for it to exit
///
/// IDM manages the actual transfer in its own process, so the invocation is
/// expected to return quickly. Output is discarded; there is no launch
/// timeout and no retry.
pub(crate) async fn run(executable: &Path, args: &[String]) -> Result<()> {
    debug!("running {} with {:?}", executable.display(), args);

    let status = Command::new(executable)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|source| IdmError::Launch {
            executable: executable.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(IdmError::CommandStatus {
            executable: executable.to_path_buf(),
            status,
        });
    }

    Ok(())
}
