//! Main entry point for the IDM bridge
//!
//! This module provides the primary `Idm` handle that users interact with.
//! The call chain flows as follows:
//!
//! User Code
//! ↓
//! Idm (this file)
//! ↓
//! install:: lookup / http:: header fetching
//! ↓
//! command:: invocation / wait:: polling

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::info;

use crate::command;
use crate::config::IdmConfig;
use crate::download::Download;
use crate::error::{IdmError, Result};
use crate::http;
use crate::install::{self, InstallState, RegistrySoftwareList, SoftwareList};
use crate::wait;

/// Handle for driving a locally installed IDM
///
/// The handle owns the HTTP client used for file-name resolution and the
/// one-shot installation cache. Construct it once at startup and share it by
/// reference; the installed-software list is queried at most once per handle.
pub struct Idm {
    config: IdmConfig,
    client: Client,
    software_list: Box<dyn SoftwareList>,
    installation: OnceCell<InstallState>,
}

impl Idm {
    /// Create a handle with the default configuration and the platform
    /// installed-software provider
    pub fn new() -> Result<Self> {
        Self::with_config(IdmConfig::default())
    }

    /// Create a handle with a custom configuration
    pub fn with_config(config: IdmConfig) -> Result<Self> {
        Self::with_software_list(config, Box::new(RegistrySoftwareList))
    }

    /// Create a handle with a custom installed-software provider
    ///
    /// Mainly a test seam: lookup behavior can be exercised against an
    /// in-memory software list on any platform.
    pub fn with_software_list(
        config: IdmConfig,
        software_list: Box<dyn SoftwareList>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.head_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|source| IdmError::HttpClient { source })?;

        Ok(Self {
            config,
            client,
            software_list,
            installation: OnceCell::new(),
        })
    }

    /// The configuration this handle was built with
    pub fn config(&self) -> &IdmConfig {
        &self.config
    }

    async fn install_state(&self) -> Result<&InstallState> {
        self.installation
            .get_or_try_init(|| install::locate(self.software_list.as_ref()))
            .await
    }

    /// Check whether IDM is installed on this machine
    ///
    /// The installed-software list is queried once per handle; later calls
    /// return the cached answer. A failed query caches nothing, so the next
    /// call queries again.
    pub async fn verify_installed(&self) -> Result<bool> {
        Ok(matches!(
            self.install_state().await?,
            InstallState::Installed { .. }
        ))
    }

    /// Path of `IDMan.exe`, derived from the registered uninstall command
    pub async fn executable_path(&self) -> Result<PathBuf> {
        match self.install_state().await? {
            InstallState::Installed { executable } => Ok(executable.clone()),
            InstallState::NotInstalled => Err(IdmError::NotInstalled),
        }
    }

    /// Tell IDM to start its main download queue (`/s`)
    pub async fn start_main_queue(&self) -> Result<()> {
        let executable = self.executable_path().await?;
        command::run(&executable, &["/s".to_string()]).await
    }

    /// Add a url to the IDM queue without starting the download (`/d <url> /a`)
    pub async fn add_to_queue(&self, url: &str) -> Result<()> {
        if !http::is_valid_url(url) {
            return Err(IdmError::InvalidUrl {
                url: url.to_string(),
            });
        }

        let executable = self.executable_path().await?;
        let args = ["/d".to_string(), url.to_string(), "/a".to_string()];
        command::run(&executable, &args).await
    }

    /// Hand a download over to IDM (`/d <url>` plus the descriptor flags)
    ///
    /// IDM takes it from here; use [`Idm::wait_for_finish`] to detect the
    /// finished file on disk.
    pub async fn download(&self, download: &Download) -> Result<()> {
        if !http::is_valid_url(download.url()) {
            return Err(IdmError::InvalidUrl {
                url: download.url().to_string(),
            });
        }

        let executable = self.executable_path().await?;
        command::run(&executable, &download.args()).await
    }

    /// Resolve the download's file name from the url headers
    ///
    /// The HEAD response is cached on the descriptor, so calling this twice
    /// fetches once. The header cache is kept even when no file name can be
    /// extracted from it.
    pub async fn resolve_file_name(&self, download: &mut Download) -> Result<()> {
        let headers = match download.headers.take() {
            Some(headers) => headers,
            None => http::fetch_headers(&self.client, download.url()).await?,
        };

        let resolved = http::file_name_from_headers(&headers);
        download.headers = Some(headers);

        download.set_file_name(resolved?);
        Ok(())
    }

    /// Block until the downloaded file appears on disk or `timeout` elapses
    ///
    /// A destination directory is required. The file name is resolved from
    /// the url headers when it was not set explicitly. Existence of the file
    /// is the only completion signal; the poll interval comes from the
    /// configuration.
    pub async fn wait_for_finish(&self, download: &mut Download, timeout: Duration) -> Result<()> {
        if download.directory().is_none_or(|d| d.is_empty()) {
            return Err(IdmError::PathNotProvided);
        }
        if download.file_name().is_none_or(|f| f.is_empty()) {
            self.resolve_file_name(download).await?;
        }

        let path = download.full_path()?;
        info!("waiting up to {:?} for {}", timeout, path.display());
        wait::wait_for_file(&path, timeout, self.config.poll_interval).await
    }
}
