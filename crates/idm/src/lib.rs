//! IDM Bridge Library
//!
//! This library drives a locally installed Internet Download Manager through
//! the `IDMan.exe` command line: it detects the installation, queues or
//! starts downloads, and polls the filesystem to notice when a download has
//! finished.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use idm::{Download, Idm};
//! use std::time::Duration;
//!
//! # async fn example() -> idm::Result<()> {
//! let idm = Idm::new()?;
//!
//! if !idm.verify_installed().await? {
//!     println!("IDM is not installed on this computer");
//!     return Ok(());
//! }
//!
//! let mut download = Download::new("https://example.com/archive.zip")
//!     .silent()
//!     .quit_when_done()
//!     .with_directory(r"C:\downloads");
//!
//! // Hand the transfer over to IDM
//! idm.download(&download).await?;
//!
//! // Block until the file shows up on disk (or the deadline passes)
//! idm.wait_for_finish(&mut download, Duration::from_secs(30)).await?;
//!
//! println!("saved to {}", download.full_path()?.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Notes
//!
//! - **Windows only**: the installation lookup reads the Windows uninstall
//!   registry keys; on other platforms it fails cleanly. Tests substitute an
//!   in-memory [`SoftwareList`].
//! - **One lookup per handle**: the installed-software list is queried once
//!   and cached on the [`Idm`] handle. A failed query is never cached.
//! - **Completion is existence**: [`Idm::wait_for_finish`] only checks that
//!   the target file exists; it does not verify size or integrity.
//! - **No retries**: every operation either succeeds or returns a single
//!   [`IdmError`].

mod client;
mod command;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod install;
mod wait;

// Re-export the main types for convenience
pub use client::Idm;
pub use config::IdmConfig;
pub use download::Download;
pub use error::{IdmError, Result};
pub use http::is_valid_url;
pub use install::{IDM_DISPLAY_NAME, InstalledApp, RegistrySoftwareList, SoftwareList};

#[cfg(test)]
mod tests;
