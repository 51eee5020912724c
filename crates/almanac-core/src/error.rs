//! Error types for `almanac-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown holiday: {0:?}")]
  UnknownHoliday(String),

  #[error("no person found matching {0:?}")]
  PersonNotFound(String),

  #[error(
    "person name {token:?} is ambiguous; matches: {}. Use a more specific \
     name or paste the person UUID",
    candidates.join(", ")
  )]
  AmbiguousPerson {
    token:      String,
    /// Distinct candidate names, sorted.
    candidates: Vec<String>,
  },

  #[error("invalid filter: {0}")]
  InvalidFilter(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
