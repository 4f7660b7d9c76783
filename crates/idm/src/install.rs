//! Installed-software lookup and IDM executable discovery
//!
//! IDM does not advertise its install location directly. The executable path
//! is derived from the uninstall command registered in the OS uninstall list:
//! the uninstaller sits next to `IDMan.exe`, so substituting the file name in
//! that command yields the path of the main executable.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{IdmError, Result};

/// Display name IDM registers in the installed-software list
pub const IDM_DISPLAY_NAME: &str = "Internet Download Manager";

/// File name of IDM's uninstaller, as it appears in the uninstall command
const UNINSTALLER_EXE: &str = "Uninstall.exe";

/// File name of the main IDM executable
const MAIN_EXE: &str = "IDMan.exe";

/// One entry of the OS installed-software list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    /// Display name of the application
    pub name: String,
    /// Command registered to uninstall it
    pub uninstall_command: String,
}

/// Source of the installed-software list
///
/// The production implementation reads the Windows uninstall registry keys;
/// tests substitute in-memory lists so lookup behavior can be exercised on
/// any platform.
#[async_trait]
pub trait SoftwareList: Send + Sync {
    /// Return every application registered in the OS uninstall list
    async fn installed_software(&self) -> Result<Vec<InstalledApp>>;
}

/// Installed-software list backed by the Windows uninstall registry keys
#[derive(Debug, Default)]
pub struct RegistrySoftwareList;

#[cfg(windows)]
#[async_trait]
impl SoftwareList for RegistrySoftwareList {
    async fn installed_software(&self) -> Result<Vec<InstalledApp>> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ};

        const UNINSTALL_PATH: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";
        const UNINSTALL_PATH_WOW64: &str =
            r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall";

        let hives = [
            (RegKey::predef(HKEY_LOCAL_MACHINE), UNINSTALL_PATH),
            (RegKey::predef(HKEY_LOCAL_MACHINE), UNINSTALL_PATH_WOW64),
            (RegKey::predef(HKEY_CURRENT_USER), UNINSTALL_PATH),
        ];

        let mut apps = Vec::new();
        let mut opened_any = false;
        let mut last_error = None;

        for (hive, path) in hives {
            let key = match hive.open_subkey_with_flags(path, KEY_READ) {
                Ok(key) => key,
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };
            opened_any = true;

            for entry in key.enum_keys().flatten() {
                let Ok(sub) = key.open_subkey_with_flags(&entry, KEY_READ) else {
                    continue;
                };
                // Entries without a display name are patches and hotfixes
                let Ok(name) = sub.get_value::<String, _>("DisplayName") else {
                    continue;
                };
                let uninstall_command = sub
                    .get_value::<String, _>("UninstallString")
                    .unwrap_or_default();
                apps.push(InstalledApp {
                    name,
                    uninstall_command,
                });
            }
        }

        if !opened_any {
            return Err(IdmError::SoftwareList {
                message: "no uninstall registry key could be opened".to_string(),
                source: last_error,
            });
        }

        debug!("collected {} installed applications", apps.len());
        Ok(apps)
    }
}

#[cfg(not(windows))]
#[async_trait]
impl SoftwareList for RegistrySoftwareList {
    async fn installed_software(&self) -> Result<Vec<InstalledApp>> {
        Err(IdmError::SoftwareList {
            message: "the installed-software list is only available on Windows".to_string(),
            source: None,
        })
    }
}

/// Outcome of one installation lookup, as cached on the handle
#[derive(Debug, Clone)]
pub(crate) enum InstallState {
    NotInstalled,
    Installed { executable: PathBuf },
}

/// Scan the software list for IDM and derive the executable path
///
/// Surrounding quotes (common in registry uninstall strings) are stripped
/// from the derived path. A provider failure propagates as-is so the caller
/// never mistakes "could not query" for "installed".
pub(crate) async fn locate(provider: &dyn SoftwareList) -> Result<InstallState> {
    let apps = provider.installed_software().await?;

    for app in apps {
        if app.name == IDM_DISPLAY_NAME {
            let command = app.uninstall_command.replacen(UNINSTALLER_EXE, MAIN_EXE, 1);
            let executable = PathBuf::from(command.trim().trim_matches('"'));
            debug!("IDM executable resolved to {}", executable.display());
            return Ok(InstallState::Installed { executable });
        }
    }

    warn!("{IDM_DISPLAY_NAME} not present in the installed-software list");
    Ok(InstallState::NotInstalled)
}
