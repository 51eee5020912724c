//! The `AssetRepository` trait and the shapes it exchanges.
//!
//! The trait is implemented by the HTTP client in `almanac-immich`. The
//! collection engine (`almanac-collect`) depends on this abstraction only, so
//! it can run against an in-memory fake in tests.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::person::Person;

/// An album as listed by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
  pub id:         Uuid,
  pub album_name: String,
}

/// One page of the full people listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeoplePage {
  #[serde(default)]
  pub people:        Vec<Person>,
  /// Absent on servers that do not report it.
  pub has_next_page: Option<bool>,
  pub total:         Option<usize>,
}

/// Abstraction over the photo repository the collector talks to.
///
/// Every method is a single request; paging and composition live in the
/// engine. All methods return `Send` futures so the collector can run on a
/// spawned tokio task.
pub trait AssetRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Albums ────────────────────────────────────────────────────────────

  /// Every album visible to the caller.
  fn list_albums(
    &self,
  ) -> impl Future<Output = Result<Vec<Album>, Self::Error>> + Send + '_;

  /// Create an empty album named `name`.
  fn create_album<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Album, Self::Error>> + Send + 'a;

  /// Attach `asset_ids` to the album in one bulk call.
  fn add_assets<'a>(
    &'a self,
    album_id: Uuid,
    asset_ids: &'a [Uuid],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── People ────────────────────────────────────────────────────────────

  /// People whose name matches `name` (server-side, usually a prefix or
  /// substring match).
  fn search_people<'a>(
    &'a self,
    name: &'a str,
    with_hidden: bool,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// One page (1-based) of all people.
  fn list_people(
    &self,
    page: u32,
    size: u32,
    with_hidden: bool,
  ) -> impl Future<Output = Result<PeoplePage, Self::Error>> + Send + '_;

  // ── Assets ────────────────────────────────────────────────────────────

  /// Run one page of a metadata search and return the asset ids on it.
  ///
  /// `payload` is the complete request body built by
  /// [`FilterSet::request`](crate::filter::FilterSet::request).
  fn search_assets<'a>(
    &'a self,
    payload: &'a Map<String, Value>,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + 'a;
}
