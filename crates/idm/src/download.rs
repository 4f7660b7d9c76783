//! Download descriptor and IDM argument construction

use std::path::PathBuf;

use reqwest::header::HeaderMap;

use crate::error::{IdmError, Result};

/// One prospective download and its IDM invocation options
///
/// A `Download` is plain data owned by the caller: the url, the optional
/// destination, and the flags serialized into the `IDMan.exe` argument list.
/// Response headers from file-name resolution are cached here so repeated
/// resolutions do not refetch.
#[derive(Debug, Clone)]
pub struct Download {
    url: String,
    directory: Option<String>,
    file_name: Option<String>,
    silent: bool,
    quit_when_done: bool,
    hang_up_when_done: bool,
    pub(crate) headers: Option<HeaderMap>,
}

impl Download {
    /// Create a descriptor for the given url
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            directory: None,
            file_name: None,
            silent: false,
            quit_when_done: false,
            hang_up_when_done: false,
            headers: None,
        }
    }

    /// Set the directory IDM saves into (`/p`)
    pub fn with_directory<S: Into<String>>(mut self, directory: S) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Set the local file name IDM saves as (`/f`)
    pub fn with_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Turn on silent mode so IDM asks no questions (`/n`)
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Ask IDM to exit after the download finishes (`/q`)
    ///
    /// IDM only honors this for its first running copy.
    pub fn quit_when_done(mut self) -> Self {
        self.quit_when_done = true;
        self
    }

    /// Ask IDM to hang up the connection after the download finishes (`/h`)
    pub fn hang_up_when_done(mut self) -> Self {
        self.hang_up_when_done = true;
        self
    }

    /// The download url
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The destination directory, if one was set
    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    /// The local file name, if set explicitly or resolved from headers
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub(crate) fn set_file_name(&mut self, name: String) {
        self.file_name = Some(name);
    }

    /// Serialize the descriptor into `IDMan.exe` arguments
    ///
    /// The order is fixed: `/d <url>`, then the boolean flags, then `/p` and
    /// `/f` when their values are non-empty.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["/d".to_string(), self.url.clone()];

        if self.silent {
            args.push("/n".to_string());
        }
        if self.quit_when_done {
            args.push("/q".to_string());
        }
        if self.hang_up_when_done {
            args.push("/h".to_string());
        }

        if let Some(directory) = self.directory.as_deref().filter(|d| !d.is_empty()) {
            args.push("/p".to_string());
            args.push(directory.to_string());
        }
        if let Some(name) = self.file_name.as_deref().filter(|f| !f.is_empty()) {
            args.push("/f".to_string());
            args.push(name.to_string());
        }

        args
    }

    /// Full path of the file IDM will create
    ///
    /// Requires the directory to be set; the file name must either have been
    /// set explicitly or resolved from the url headers beforehand.
    pub fn full_path(&self) -> Result<PathBuf> {
        let directory = self
            .directory
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or(IdmError::PathNotProvided)?;
        let file_name = self
            .file_name
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or(IdmError::FileNameDetection)?;

        Ok(PathBuf::from(directory).join(file_name))
    }
}
