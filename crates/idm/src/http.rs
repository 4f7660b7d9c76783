//! URL validation, header fetching, and file-name extraction

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{IdmError, Result};

/// Check that a string parses as a URL with a non-empty host
///
/// IDM accepts urls without a scheme, so a string that fails to parse only
/// because the base is missing is retried with an assumed `http://` prefix.
pub fn is_valid_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => has_host(&url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{s}"))
            .map(|url| has_host(&url))
            .unwrap_or(false),
        Err(_) => false,
    }
}

fn has_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| !host.is_empty())
}

/// Issue a HEAD request and return the response headers
///
/// Only a 200 answer is accepted; anything else means the url cannot be
/// trusted for file-name resolution.
pub(crate) async fn fetch_headers(client: &Client, url: &str) -> Result<HeaderMap> {
    debug!("fetching headers for {url}");
    let response = client
        .head(url)
        .send()
        .await
        .map_err(|source| IdmError::HeaderFetch {
            url: url.to_string(),
            source,
        })?;

    if response.status() != StatusCode::OK {
        return Err(IdmError::UnexpectedStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    Ok(response.headers().clone())
}

/// Extract a file name from the `Content-Disposition` header
///
/// The header usually looks like `attachment; filename=file.zip`. The value
/// after the first `=` of the `filename=` token is taken; surrounding quotes
/// and a trailing `;` are stripped.
pub(crate) fn file_name_from_headers(headers: &HeaderMap) -> Result<String> {
    let disposition = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .ok_or(IdmError::FileNameHeader)?;

    for token in disposition.split_whitespace() {
        if !token.contains("filename=") {
            continue;
        }
        if let Some((_, value)) = token.split_once('=') {
            let name = value.trim_end_matches(';').trim_matches(['"', '\'']);
            debug!("resolved file name '{name}' from content disposition");
            return Ok(name.to_string());
        }
    }

    Err(IdmError::FileNameHeader)
}
