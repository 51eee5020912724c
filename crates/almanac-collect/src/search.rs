//! Paginated metadata search and per-person result composition.

use std::collections::BTreeSet;

use almanac_core::{
  filter::FilterSet,
  person::MatchMode,
  repository::AssetRepository,
  window::DateWindow,
};
use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{Error, Result};

/// Assets requested per metadata search page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Searches one date window at a time under a fixed set of filters.
pub struct AssetSearch<'a, R> {
  repo:      &'a R,
  filters:   &'a FilterSet,
  cancel:    &'a CancellationToken,
  page_size: u32,
}

impl<'a, R: AssetRepository> AssetSearch<'a, R> {
  pub fn new(
    repo: &'a R,
    filters: &'a FilterSet,
    cancel: &'a CancellationToken,
  ) -> Self {
    Self {
      repo,
      filters,
      cancel,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }

  pub fn with_page_size(mut self, page_size: u32) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  /// All assets in `window` matching the filters and the selected people.
  ///
  /// With several people, each person is searched separately (concurrently)
  /// and the results are united ([`MatchMode::Any`]) or intersected
  /// ([`MatchMode::All`]). Returns `None` if cancelled, including when only
  /// one of the per-person searches saw the cancellation.
  pub async fn collect(
    &self,
    window: &DateWindow,
    mode: MatchMode,
  ) -> Result<Option<BTreeSet<Uuid>>> {
    if self.cancel.is_cancelled() {
      return Ok(None);
    }

    let found = match self.filters.person_ids() {
      [] => self.paginate(window, None).await?,
      [only] => self.paginate(window, Some(*only)).await?,
      many => {
        let searches = many.iter().map(|id| self.paginate(window, Some(*id)));
        let per_person: Option<Vec<_>> =
          try_join_all(searches).await?.into_iter().collect();
        per_person.map(|sets| combine(sets, mode))
      }
    };

    if let Some(found) = &found {
      tracing::debug!(
        count = found.len(),
        %window,
        people = self.filters.person_ids().len(),
        %mode,
        "search complete"
      );
    }
    Ok(found)
  }

  /// Page through one search until a short or empty page.
  async fn paginate(
    &self,
    window: &DateWindow,
    person: Option<Uuid>,
  ) -> Result<Option<BTreeSet<Uuid>>> {
    let mut found = BTreeSet::new();
    let mut page = 1;
    loop {
      if self.cancel.is_cancelled() {
        tracing::debug!(page, "search interrupted");
        return Ok(None);
      }

      let payload = self.filters.request(window, person, page, self.page_size);
      let ids = self
        .repo
        .search_assets(&payload)
        .await
        .map_err(Error::repository)?;

      let short = ids.len() < self.page_size as usize;
      found.extend(ids);
      if short {
        return Ok(Some(found));
      }
      page += 1;
    }
  }
}

/// Union or intersection of per-person results. An empty intersection is a
/// valid result.
pub fn combine(
  sets: impl IntoIterator<Item = BTreeSet<Uuid>>,
  mode: MatchMode,
) -> BTreeSet<Uuid> {
  match mode {
    MatchMode::Any => sets.into_iter().flatten().collect(),
    MatchMode::All => sets
      .into_iter()
      .reduce(|acc, set| acc.intersection(&set).copied().collect())
      .unwrap_or_default(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveDateTime};
  use serde_json::Map;

  use super::*;
  use crate::testing::{Call, FakeRepository, person};

  fn christmas_eve(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 12, 24)
      .unwrap()
      .and_hms_opt(18, 0, 0)
      .unwrap()
  }

  fn window(year: i32) -> DateWindow {
    DateWindow::around(NaiveDate::from_ymd_opt(year, 12, 25).unwrap(), 1)
      .unwrap()
  }

  fn filters(people: &[Uuid]) -> FilterSet {
    FilterSet::compose(Map::new(), people.iter().copied()).unwrap()
  }

  fn search_calls(repo: &FakeRepository) -> usize {
    repo
      .calls()
      .iter()
      .filter(|c| matches!(c, Call::SearchAssets(_)))
      .count()
  }

  #[tokio::test]
  async fn paginates_until_short_page() {
    let repo = FakeRepository::default();
    let ids = repo.add_assets_at(christmas_eve(2020), &[], 250);
    let filters = filters(&[]);
    let cancel = CancellationToken::new();

    let found = AssetSearch::new(&repo, &filters, &cancel)
      .collect(&window(2020), MatchMode::Any)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(found, ids.into_iter().collect());
    assert_eq!(search_calls(&repo), 3);
  }

  #[tokio::test]
  async fn exact_multiple_of_page_size_ends_on_empty_page() {
    let repo = FakeRepository::default();
    repo.add_assets_at(christmas_eve(2020), &[], 20);
    let filters = filters(&[]);
    let cancel = CancellationToken::new();

    let found = AssetSearch::new(&repo, &filters, &cancel)
      .with_page_size(10)
      .collect(&window(2020), MatchMode::Any)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(found.len(), 20);
    assert_eq!(search_calls(&repo), 3);
  }

  #[tokio::test]
  async fn window_excludes_other_years() {
    let repo = FakeRepository::default();
    repo.add_assets_at(christmas_eve(2019), &[], 3);
    let ours = repo.add_assets_at(christmas_eve(2020), &[], 2);
    let filters = filters(&[]);
    let cancel = CancellationToken::new();

    let found = AssetSearch::new(&repo, &filters, &cancel)
      .collect(&window(2020), MatchMode::Any)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(found, ours.into_iter().collect());
  }

  #[tokio::test]
  async fn single_person_is_injected_into_the_request() {
    let a = person("A");
    let repo = FakeRepository::default();
    let with_a = repo.add_assets_at(christmas_eve(2020), &[a.id], 2);
    repo.add_assets_at(christmas_eve(2020), &[], 5);
    let filters = filters(&[a.id]);
    let cancel = CancellationToken::new();

    let found = AssetSearch::new(&repo, &filters, &cancel)
      .collect(&window(2020), MatchMode::All)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(found, with_a.into_iter().collect());
    let calls = repo.calls();
    let Call::SearchAssets(payload) = &calls[0] else {
      panic!("expected a search");
    };
    assert_eq!(payload["personIds"], serde_json::json!([a.id]));
  }

  async fn composed(
    repo: &FakeRepository,
    people: &[Uuid],
    mode: MatchMode,
  ) -> BTreeSet<Uuid> {
    let filters = filters(people);
    let cancel = CancellationToken::new();
    AssetSearch::new(repo, &filters, &cancel)
      .collect(&window(2020), mode)
      .await
      .unwrap()
      .unwrap()
  }

  #[tokio::test]
  async fn any_is_union_and_all_is_intersection_in_either_order() {
    let (a, b) = (person("A"), person("B"));
    let repo = FakeRepository::default();
    let only_a = repo.add_assets_at(christmas_eve(2020), &[a.id], 2);
    let only_b = repo.add_assets_at(christmas_eve(2020), &[b.id], 3);
    let both = repo.add_assets_at(christmas_eve(2020), &[a.id, b.id], 1);

    let union: BTreeSet<Uuid> =
      only_a.iter().chain(&only_b).chain(&both).copied().collect();
    let intersection: BTreeSet<Uuid> = both.iter().copied().collect();

    for order in [[a.id, b.id], [b.id, a.id]] {
      assert_eq!(composed(&repo, &order, MatchMode::Any).await, union);
      assert_eq!(composed(&repo, &order, MatchMode::All).await, intersection);
    }
  }

  #[tokio::test]
  async fn empty_intersection_is_a_valid_result() {
    let (a, b) = (person("A"), person("B"));
    let repo = FakeRepository::default();
    repo.add_assets_at(christmas_eve(2020), &[a.id], 2);
    repo.add_assets_at(christmas_eve(2020), &[b.id], 2);
    assert!(composed(&repo, &[a.id, b.id], MatchMode::All).await.is_empty());
  }

  #[tokio::test]
  async fn cancelled_search_reports_cancelled_not_empty() {
    let (a, b) = (person("A"), person("B"));
    let repo = FakeRepository::default();
    repo.add_assets_at(christmas_eve(2020), &[a.id, b.id], 1);
    let cancel = CancellationToken::new();
    repo.cancel_on_search(1, cancel.clone());
    let filters = filters(&[a.id, b.id]);

    let found = AssetSearch::new(&repo, &filters, &cancel)
      .collect(&window(2020), MatchMode::All)
      .await
      .unwrap();
    assert!(found.is_none());
  }

  #[tokio::test]
  async fn failing_sub_search_fails_the_whole_search() {
    let (a, b) = (person("A"), person("B"));
    let repo = FakeRepository::default();
    repo.fail_searches();
    let filters = filters(&[a.id, b.id]);
    let cancel = CancellationToken::new();

    let err = AssetSearch::new(&repo, &filters, &cancel)
      .collect(&window(2020), MatchMode::Any)
      .await
      .unwrap_err();
    assert!(!err.is_input());
  }

  #[test]
  fn combine_of_nothing_is_empty() {
    assert!(combine(Vec::new(), MatchMode::All).is_empty());
    assert!(combine(Vec::new(), MatchMode::Any).is_empty());
  }
}
