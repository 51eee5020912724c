//! What a collection run reports to whoever started it.

use serde::{Deserialize, Serialize};

/// A message from the worker running a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
  /// One-line summary of what the run is doing now.
  Status { text: String },
  /// `current` of `total` tasks done. `0/0` marks the end of a run.
  Progress { current: usize, total: usize },
  /// A line for the run's log.
  Log { text: String },
}

impl RunEvent {
  pub fn status(text: impl Into<String>) -> Self {
    Self::Status { text: text.into() }
  }

  pub fn log(text: impl Into<String>) -> Self {
    Self::Log { text: text.into() }
  }
}

/// The lifecycle of a collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  #[default]
  Idle,
  Running,
  Completed,
  Cancelled,
  Failed,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  Completed { assets_added: usize, albums: usize },
  Cancelled,
}

impl Outcome {
  pub fn state(&self) -> RunState {
    match self {
      Self::Completed { .. } => RunState::Completed,
      Self::Cancelled => RunState::Cancelled,
    }
  }
}
