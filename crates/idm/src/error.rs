//! Error types for the IDM bridge
//!
//! Every operation either fully succeeds or returns exactly one of these
//! variants. Nothing in this crate retries or falls back; the caller decides
//! what to do with a failure.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while driving the IDM executable
#[derive(Error, Debug)]
pub enum IdmError {
    /// The given string does not parse as a URL with a host
    #[error("'{url}' is not a valid download url")]
    InvalidUrl { url: String },

    /// IDM was not found in the installed-software list
    #[error("Internet Download Manager is not installed on this machine")]
    NotInstalled,

    /// The OS installed-software query itself failed
    #[error("failed to read the installed-software list: {message}")]
    SoftwareList {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build the http client")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },

    /// The HEAD request used for file-name resolution failed
    #[error("failed to fetch headers for '{url}'")]
    HeaderFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HEAD request returned something other than 200 OK
    #[error("'{url}' answered with status {status} instead of 200")]
    UnexpectedStatus { url: String, status: u16 },

    /// No usable file name in the `Content-Disposition` header
    #[error("no file name found in the url headers")]
    FileNameHeader,

    /// No file name was provided and none could be resolved from the url
    #[error("file name is neither specified nor available in the url headers")]
    FileNameDetection,

    /// A destination directory is required for this operation
    #[error("no download directory provided (required for completion polling)")]
    PathNotProvided,

    /// The polled file never appeared before the deadline
    #[error("'{}' did not appear within {waited:?}", .path.display())]
    WaitTimeout { path: PathBuf, waited: Duration },

    /// The IDM executable could not be launched
    #[error("failed to launch '{}'", .executable.display())]
    Launch {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The IDM executable exited with a failure status
    #[error("'{}' exited with {status}", .executable.display())]
    CommandStatus {
        executable: PathBuf,
        status: ExitStatus,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, IdmError>;
