//! In-memory `AssetRepository` that records every call.

use std::sync::Mutex;

use almanac_core::{
  person::Person,
  repository::{Album, AssetRepository, PeoplePage},
};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("fake repository: {0}")]
pub struct FakeError(String);

/// A repository call, as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  ListAlbums,
  CreateAlbum(String),
  AddAssets(Uuid, Vec<Uuid>),
  SearchPeople(String),
  ListPeople(u32),
  SearchAssets(Map<String, Value>),
}

struct Asset {
  id:       Uuid,
  taken_at: NaiveDateTime,
  people:   Vec<Uuid>,
}

#[derive(Default)]
struct State {
  albums:                Vec<Album>,
  attached:              Vec<(Uuid, Vec<Uuid>)>,
  people:                Vec<Person>,
  people_pages:          Vec<PeoplePage>,
  assets:                Vec<Asset>,
  calls:                 Vec<Call>,
  fail_searches:         bool,
  cancel_on_search:      Option<(usize, CancellationToken)>,
  cancel_on_list_albums: Option<CancellationToken>,
}

#[derive(Default)]
pub struct FakeRepository {
  state: Mutex<State>,
}

pub fn person(name: &str) -> Person {
  Person {
    id:        Uuid::new_v4(),
    name:      name.to_owned(),
    is_hidden: false,
  }
}

impl FakeRepository {
  fn state(&self) -> std::sync::MutexGuard<'_, State> {
    self.state.lock().unwrap()
  }

  pub fn with_people(self, people: impl IntoIterator<Item = Person>) -> Self {
    self.state().people.extend(people);
    self
  }

  /// Serve these pages, in order, from `list_people`.
  pub fn with_people_pages(
    self,
    pages: impl IntoIterator<Item = PeoplePage>,
  ) -> Self {
    self.state().people_pages.extend(pages);
    self
  }

  pub fn add_album(&self, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    self.state().albums.push(Album {
      id,
      album_name: name.to_owned(),
    });
    id
  }

  /// Add `count` assets taken at `taken_at` showing `people`.
  pub fn add_assets_at(
    &self,
    taken_at: NaiveDateTime,
    people: &[Uuid],
    count: usize,
  ) -> Vec<Uuid> {
    let mut state = self.state();
    (0..count)
      .map(|_| {
        let id = Uuid::new_v4();
        state.assets.push(Asset {
          id,
          taken_at,
          people: people.to_vec(),
        });
        id
      })
      .collect()
  }

  /// Make every asset search fail.
  pub fn fail_searches(&self) { self.state().fail_searches = true; }

  /// Cancel `token` while serving the `nth` (1-based) asset search.
  pub fn cancel_on_search(&self, nth: usize, token: CancellationToken) {
    self.state().cancel_on_search = Some((nth, token));
  }

  /// Cancel `token` while serving `list_albums`.
  pub fn cancel_on_list_albums(&self, token: CancellationToken) {
    self.state().cancel_on_list_albums = Some(token);
  }

  pub fn calls(&self) -> Vec<Call> { self.state().calls.clone() }

  pub fn albums(&self) -> Vec<Album> { self.state().albums.clone() }

  /// Every `(album, assets)` attach request received.
  pub fn attached(&self) -> Vec<(Uuid, Vec<Uuid>)> {
    self.state().attached.clone()
  }
}

fn bound(
  payload: &Map<String, Value>,
  key: &str,
) -> Result<NaiveDateTime, FakeError> {
  let text = payload
    .get(key)
    .and_then(Value::as_str)
    .ok_or_else(|| FakeError(format!("missing {key}")))?;
  NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
    .map_err(|e| FakeError(format!("bad {key}: {e}")))
}

fn number(payload: &Map<String, Value>, key: &str) -> Result<usize, FakeError> {
  payload
    .get(key)
    .and_then(Value::as_u64)
    .map(|n| n as usize)
    .ok_or_else(|| FakeError(format!("missing {key}")))
}

impl AssetRepository for FakeRepository {
  type Error = FakeError;

  async fn list_albums(&self) -> Result<Vec<Album>, FakeError> {
    let mut state = self.state();
    state.calls.push(Call::ListAlbums);
    if let Some(token) = &state.cancel_on_list_albums {
      token.cancel();
    }
    Ok(state.albums.clone())
  }

  async fn create_album(&self, name: &str) -> Result<Album, FakeError> {
    let mut state = self.state();
    state.calls.push(Call::CreateAlbum(name.to_owned()));
    let album = Album {
      id:         Uuid::new_v4(),
      album_name: name.to_owned(),
    };
    state.albums.push(album.clone());
    Ok(album)
  }

  async fn add_assets(
    &self,
    album_id: Uuid,
    asset_ids: &[Uuid],
  ) -> Result<(), FakeError> {
    let mut state = self.state();
    state.calls.push(Call::AddAssets(album_id, asset_ids.to_vec()));
    if !state.albums.iter().any(|a| a.id == album_id) {
      return Err(FakeError(format!("no album {album_id}")));
    }
    state.attached.push((album_id, asset_ids.to_vec()));
    Ok(())
  }

  async fn search_people(
    &self,
    name: &str,
    with_hidden: bool,
  ) -> Result<Vec<Person>, FakeError> {
    let mut state = self.state();
    state.calls.push(Call::SearchPeople(name.to_owned()));
    let needle = name.to_lowercase();
    Ok(
      state
        .people
        .iter()
        .filter(|p| with_hidden || !p.is_hidden)
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect(),
    )
  }

  async fn list_people(
    &self,
    page: u32,
    _size: u32,
    _with_hidden: bool,
  ) -> Result<PeoplePage, FakeError> {
    let mut state = self.state();
    state.calls.push(Call::ListPeople(page));
    let index = page as usize - 1;
    Ok(state.people_pages.get(index).cloned().unwrap_or_default())
  }

  async fn search_assets(
    &self,
    payload: &Map<String, Value>,
  ) -> Result<Vec<Uuid>, FakeError> {
    let mut state = self.state();
    state.calls.push(Call::SearchAssets(payload.clone()));

    let searches = state
      .calls
      .iter()
      .filter(|c| matches!(c, Call::SearchAssets(_)))
      .count();
    if let Some((nth, token)) = &state.cancel_on_search
      && *nth == searches
    {
      token.cancel();
    }
    if state.fail_searches {
      return Err(FakeError("search failed".into()));
    }

    let after = bound(payload, "takenAfter")?;
    let before = bound(payload, "takenBefore")?;
    let page = number(payload, "page")?;
    let size = number(payload, "size")?;
    let people: Vec<Uuid> = payload
      .get("personIds")
      .and_then(Value::as_array)
      .map(|ids| {
        ids
          .iter()
          .filter_map(Value::as_str)
          .filter_map(|s| Uuid::parse_str(s).ok())
          .collect()
      })
      .unwrap_or_default();

    let mut matching: Vec<Uuid> = state
      .assets
      .iter()
      .filter(|a| a.taken_at >= after && a.taken_at < before)
      .filter(|a| people.iter().all(|p| a.people.contains(p)))
      .map(|a| a.id)
      .collect();
    matching.sort();

    Ok(
      matching
        .into_iter()
        .skip((page - 1) * size)
        .take(size)
        .collect(),
    )
  }
}
