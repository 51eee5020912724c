//! Turning people input into person ids, and listing everyone.

use almanac_core::{
  person::{Person, PersonToken, choose, merge_unique, parse_tokens},
  repository::AssetRepository,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{Error, Result};

/// Page size used when listing all people.
pub const PEOPLE_PAGE_SIZE: u32 = 1000;

/// Resolve free-text people input into unique person ids, in first-seen
/// order.
///
/// Literal UUIDs pass through without a lookup. Names are looked up one by
/// one and must resolve to exactly one person. Returns `None` if `cancel`
/// fires before the last lookup.
pub async fn resolve_tokens<R: AssetRepository>(
  repo: &R,
  raw: &str,
  with_hidden: bool,
  cancel: &CancellationToken,
) -> Result<Option<Vec<Uuid>>> {
  let mut ids = Vec::new();
  for token in parse_tokens(raw) {
    let id = match token {
      PersonToken::Id(id) => id,
      PersonToken::Name(name) => {
        if cancel.is_cancelled() {
          return Ok(None);
        }
        let candidates = repo
          .search_people(&name, with_hidden)
          .await
          .map_err(Error::repository)?;
        let person = choose(&name, &candidates)?;
        tracing::debug!(
          token = %name,
          person_id = %person.id,
          person = %person.name,
          "resolved person"
        );
        person.id
      }
    };
    merge_unique(&mut ids, [id]);
  }
  Ok(Some(ids))
}

/// Page through every person known to the repository.
///
/// Stops on an empty page, when the server says there is no next page, once
/// `total` people have been seen, or on a short page from a server that does
/// not report `hasNextPage`. Returns `None` if cancelled.
pub async fn list_all<R: AssetRepository>(
  repo: &R,
  page_size: u32,
  with_hidden: bool,
  cancel: &CancellationToken,
) -> Result<Option<Vec<Person>>> {
  let page_size = page_size.max(1);
  let mut people = Vec::new();
  let mut page = 1;

  loop {
    if cancel.is_cancelled() {
      return Ok(None);
    }
    let batch = repo
      .list_people(page, page_size, with_hidden)
      .await
      .map_err(Error::repository)?;
    if batch.people.is_empty() {
      break;
    }

    let short = batch.people.len() < page_size as usize;
    people.extend(batch.people);

    match (batch.has_next_page, batch.total) {
      (Some(false), _) => break,
      (_, Some(total)) if people.len() >= total => break,
      (None, _) if short => break,
      _ => page += 1,
    }
  }

  tracing::debug!(count = people.len(), pages = page, "listed people");
  Ok(Some(people))
}

/// People with a non-empty name, sorted case-insensitively by name, then id.
pub fn named_sorted(people: Vec<Person>) -> Vec<Person> {
  let mut named: Vec<Person> = people
    .into_iter()
    .filter(|p| !p.name.trim().is_empty())
    .collect();
  named.sort_by_cached_key(|p| (p.name.to_lowercase(), p.id));
  named
}
