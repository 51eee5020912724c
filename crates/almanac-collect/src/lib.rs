//! The collection engine.
//!
//! Everything here is generic over an [`AssetRepository`], so the same code
//! drives the real HTTP client and the in-memory fake used by the tests.
//!
//! [`AssetRepository`]: almanac_core::repository::AssetRepository

pub mod album;
pub mod error;
pub mod people;
pub mod run;
pub mod search;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use run::{RunHandle, RunRequest, run, spawn};
