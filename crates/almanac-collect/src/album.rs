//! Album upsert: find by name or create, then attach assets.

use std::collections::{BTreeSet, HashMap};

use almanac_core::repository::AssetRepository;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{Error, Result};

/// The id of the first album named exactly `name` (case-sensitive), creating
/// an empty one if there is none. `None` if `cancel` fires before either call.
pub async fn ensure_album<R: AssetRepository>(
  repo: &R,
  name: &str,
  cancel: &CancellationToken,
) -> Result<Option<Uuid>> {
  if cancel.is_cancelled() {
    return Ok(None);
  }
  let albums = repo.list_albums().await.map_err(Error::repository)?;
  if let Some(album) = albums.into_iter().find(|a| a.album_name == name) {
    tracing::info!(album = name, album_id = %album.id, "found existing album");
    return Ok(Some(album.id));
  }

  if cancel.is_cancelled() {
    return Ok(None);
  }
  let album = repo.create_album(name).await.map_err(Error::repository)?;
  tracing::info!(album = name, album_id = %album.id, "created album");
  Ok(Some(album.id))
}

/// Attach `asset_ids` to an album in a single call and return how many were
/// sent. Assets already in the album are not filtered out.
pub async fn attach_assets<R: AssetRepository>(
  repo: &R,
  album_id: Uuid,
  asset_ids: &BTreeSet<Uuid>,
) -> Result<usize> {
  if asset_ids.is_empty() {
    tracing::debug!(%album_id, "no assets to add");
    return Ok(0);
  }
  let ids: Vec<Uuid> = asset_ids.iter().copied().collect();
  repo
    .add_assets(album_id, &ids)
    .await
    .map_err(Error::repository)?;
  tracing::info!(%album_id, count = ids.len(), "added assets to album");
  Ok(ids.len())
}

/// Albums resolved so far in one run, keyed by name.
pub struct AlbumBook<'a, R> {
  repo:  &'a R,
  known: HashMap<String, Uuid>,
}

impl<'a, R: AssetRepository> AlbumBook<'a, R> {
  pub fn new(repo: &'a R) -> Self {
    Self {
      repo,
      known: HashMap::new(),
    }
  }

  /// Like [`ensure_album`], but each name hits the repository only once.
  pub async fn ensure(
    &mut self,
    name: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<Uuid>> {
    if let Some(id) = self.known.get(name) {
      return Ok(Some(*id));
    }
    let Some(id) = ensure_album(self.repo, name, cancel).await? else {
      return Ok(None);
    };
    self.known.insert(name.to_owned(), id);
    Ok(Some(id))
  }

  /// Number of distinct albums resolved.
  pub fn len(&self) -> usize { self.known.len() }

  pub fn is_empty(&self) -> bool { self.known.is_empty() }
}
