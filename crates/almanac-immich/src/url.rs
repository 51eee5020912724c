//! Server URL handling.

use reqwest::Url;

use crate::{Error, Result};

/// Normalise a user-supplied server URL into an API base URL.
///
/// Whitespace and trailing slashes are stripped. A bare host such as
/// `https://photos.example.com` becomes `https://photos.example.com/api`;
/// any other path is kept as given.
pub fn normalize_base_url(raw: &str) -> Result<String> {
  let trimmed = raw.trim().trim_end_matches('/');
  if trimmed.is_empty() {
    return Err(Error::Configuration("server URL is required".into()));
  }

  let mut url = Url::parse(trimmed).map_err(|e| {
    Error::Configuration(format!("invalid server URL {trimmed:?}: {e}"))
  })?;
  if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
    return Err(Error::Configuration(format!(
      "server URL {trimmed:?} must be http(s) with a host"
    )));
  }

  if matches!(url.path(), "" | "/") {
    url.set_path("/api");
    url.set_query(None);
    url.set_fragment(None);
  }
  Ok(url.as_str().trim_end_matches('/').to_owned())
}
