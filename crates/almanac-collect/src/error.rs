//! Error type for `almanac-collect`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad input: unknown holiday, unresolvable person, invalid filter, …
  #[error(transparent)]
  Core(#[from] almanac_core::Error),

  /// A repository call failed. Never retried.
  #[error("repository error: {0}")]
  Repository(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn repository(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Repository(Box::new(e))
  }

  /// Whether the run failed because of what it was asked to do rather than
  /// because the repository misbehaved.
  pub fn is_input(&self) -> bool { matches!(self, Self::Core(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
