//! Error type for `almanac-immich`.

use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Configuration(String),

  /// The server refused the API key (401 or 403).
  #[error("{method} {url} → {status}: check the API key")]
  Authentication {
    method: Method,
    url:    String,
    status: StatusCode,
  },

  #[error("{method} {url} → {status}: {body}")]
  Status {
    method: Method,
    url:    String,
    status: StatusCode,
    body:   String,
  },

  /// Connection failures and timeouts.
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("unexpected response from {url}: {source}")]
  Decode {
    url:    String,
    #[source]
    source: serde_json::Error,
  },
}

impl Error {
  /// Whether the failure came from the network or an unhealthy server rather
  /// than from the request itself. Nothing retries automatically; this only
  /// informs the caller.
  pub fn is_transient(&self) -> bool {
    match self {
      Self::Transport(_) => true,
      Self::Status { status, .. } => status.is_server_error(),
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
