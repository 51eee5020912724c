//! Metadata search filters.
//!
//! Callers may pass arbitrary extra filters for the repository's metadata
//! search as a JSON object. The engine owns the time bounds and paging, and
//! treats `personIds` as person input rather than a pass-through filter.

use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::{merge_unique, parse_uuid},
  window::DateWindow,
};

/// Keys the engine sets on every request; callers may not supply them.
pub const RESERVED_KEYS: [&str; 4] =
  ["takenAfter", "takenBefore", "page", "size"];

/// Filter key carrying person ids.
pub const PERSON_IDS_KEY: &str = "personIds";

/// Parse the free-form filter text. Blank text means no filters.
pub fn parse_filters(text: &str) -> Result<Map<String, Value>> {
  if text.trim().is_empty() {
    return Ok(Map::new());
  }
  let value: Value = serde_json::from_str(text)
    .map_err(|e| Error::InvalidFilter(format!("invalid JSON: {e}")))?;
  match value {
    Value::Object(map) => Ok(map),
    _ => Err(Error::InvalidFilter(
      "filters must be a JSON object (e.g. {\"isFavorite\": true})".into(),
    )),
  }
}

/// Caller filters validated and split from person constraints, ready to be
/// stamped onto each search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
  base:       Map<String, Value>,
  person_ids: Vec<Uuid>,
}

impl FilterSet {
  /// Validate `raw` and merge its `personIds` with `resolved` ids.
  ///
  /// Ids from the filters come first; duplicates keep their first position.
  pub fn compose(
    mut raw: Map<String, Value>,
    resolved: impl IntoIterator<Item = Uuid>,
  ) -> Result<Self> {
    if let Some(key) = RESERVED_KEYS.iter().find(|k| raw.contains_key(**k)) {
      return Err(Error::InvalidFilter(format!(
        "{key:?} is controlled by the collector and cannot be set as a filter"
      )));
    }

    let mut person_ids = Vec::new();
    if let Some(value) = raw.remove(PERSON_IDS_KEY) {
      merge_unique(&mut person_ids, person_ids_from(&value)?);
    }
    merge_unique(&mut person_ids, resolved);

    Ok(Self {
      base: raw,
      person_ids,
    })
  }

  /// Append person ids resolved after composition, keeping order and
  /// dropping duplicates.
  pub fn with_people(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
    merge_unique(&mut self.person_ids, ids);
    self
  }

  pub fn person_ids(&self) -> &[Uuid] { &self.person_ids }

  pub fn base(&self) -> &Map<String, Value> { &self.base }

  /// The metadata search payload for one page, optionally narrowed to one
  /// person.
  pub fn request(
    &self,
    window: &DateWindow,
    person: Option<Uuid>,
    page: u32,
    size: u32,
  ) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("withDeleted".into(), Value::Bool(false));
    payload.extend(self.base.iter().map(|(k, v)| (k.clone(), v.clone())));
    if let Some(person) = person {
      payload.insert(PERSON_IDS_KEY.into(), json!([person]));
    }
    payload.insert("takenAfter".into(), json!(window.taken_after()));
    payload.insert("takenBefore".into(), json!(window.taken_before()));
    payload.insert("page".into(), json!(page));
    payload.insert("size".into(), json!(size));
    payload
  }
}

fn person_ids_from(value: &Value) -> Result<Vec<Uuid>> {
  let invalid =
    || Error::InvalidFilter("personIds must be a list of UUID strings".into());
  let items = value.as_array().ok_or_else(invalid)?;
  items
    .iter()
    .map(|item| item.as_str().and_then(parse_uuid).ok_or_else(invalid))
    .collect()
}
