//! Core types and algorithms for the Almanac album collector.
//!
//! This crate is deliberately free of HTTP and runtime dependencies. Date
//! rules, search windows, person token parsing, and filter composition are all
//! pure; the [`repository::AssetRepository`] trait is the seam to the network.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod event;
pub mod filter;
pub mod holiday;
pub mod person;
pub mod repository;
pub mod target;
pub mod window;

pub use error::{Error, Result};
