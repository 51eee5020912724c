//! The collection orchestrator: targets × years → search → album.

use std::sync::Arc;

use almanac_core::{
  event::{Outcome, RunEvent, RunState},
  filter::FilterSet,
  person::MatchMode,
  repository::AssetRepository,
  target::{CalendarTarget, TargetDate, YearRange, task_count},
  window::DateWindow,
};
use serde_json::{Map, Value};
use tokio::{
  sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    watch,
  },
  task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
  Result,
  album::{AlbumBook, attach_assets},
  people::resolve_tokens,
  search::{AssetSearch, DEFAULT_PAGE_SIZE},
};

/// Days searched on either side of each target date unless told otherwise.
pub const DEFAULT_DELTA_DAYS: u32 = 7;

// ─── Request ─────────────────────────────────────────────────────────────────

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
  pub targets:            Vec<CalendarTarget>,
  pub years:              YearRange,
  pub delta_days:         u32,
  /// Free-text people input; see [`almanac_core::person::parse_tokens`].
  pub people:             String,
  pub match_mode:         MatchMode,
  /// Extra metadata search filters, not yet validated.
  pub filters:            Map<String, Value>,
  pub people_with_hidden: bool,
  pub page_size:          u32,
}

impl RunRequest {
  pub fn new(targets: Vec<CalendarTarget>, years: YearRange) -> Self {
    Self {
      targets,
      years,
      delta_days: DEFAULT_DELTA_DAYS,
      people: String::new(),
      match_mode: MatchMode::default(),
      filters: Map::new(),
      people_with_hidden: false,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }

  /// Number of (target, year) tasks this request expands into.
  pub fn task_count(&self) -> usize { task_count(&self.targets, &self.years) }
}

// ─── Run ─────────────────────────────────────────────────────────────────────

fn emit(events: &UnboundedSender<RunEvent>, event: RunEvent) {
  // A caller that stopped listening does not stop the run.
  let _ = events.send(event);
}

fn say(events: &UnboundedSender<RunEvent>, text: String) {
  emit(events, RunEvent::status(text.clone()));
  emit(events, RunEvent::log(text));
}

/// Run one collection to the end, reporting through `events`.
///
/// Cancellation is not an error: it ends the run with
/// [`Outcome::Cancelled`]. Progress is reset to `0/0` however the run ends.
pub async fn run<R: AssetRepository>(
  repo: &R,
  request: &RunRequest,
  events: &UnboundedSender<RunEvent>,
  cancel: &CancellationToken,
) -> Result<Outcome> {
  let result = execute(repo, request, events, cancel).await;
  emit(events, RunEvent::Progress {
    current: 0,
    total:   0,
  });

  match &result {
    Ok(Outcome::Completed {
      assets_added,
      albums,
    }) => {
      tracing::info!(assets_added, albums, "collection completed");
      say(
        events,
        format!("Completed: Added {assets_added} assets to {albums} albums"),
      );
    }
    Ok(Outcome::Cancelled) => {
      tracing::info!("collection cancelled");
      say(events, "Operation cancelled".into());
    }
    Err(e) => {
      tracing::warn!(error = %e, "collection failed");
      say(events, format!("Error: {e}"));
    }
  }
  result
}

async fn execute<R: AssetRepository>(
  repo: &R,
  request: &RunRequest,
  events: &UnboundedSender<RunEvent>,
  cancel: &CancellationToken,
) -> Result<Outcome> {
  say(events, "Starting asset collection...".into());

  if request.targets.is_empty() {
    return Err(
      almanac_core::Error::InvalidInput(
        "select at least one holiday or date".into(),
      )
      .into(),
    );
  }
  let filters = FilterSet::compose(request.filters.clone(), [])?;
  let total = request.task_count();
  tracing::info!(
    targets = request.targets.len(),
    start_year = request.years.start(),
    end_year = request.years.end(),
    delta_days = request.delta_days,
    total,
    "starting collection"
  );

  let filters = if request.people.trim().is_empty() {
    filters
  } else {
    emit(events, RunEvent::status("Resolving people filter..."));
    let Some(ids) =
      resolve_tokens(repo, &request.people, request.people_with_hidden, cancel)
        .await?
    else {
      return Ok(Outcome::Cancelled);
    };
    emit(events, RunEvent::log(format!("Resolved {} people", ids.len())));
    filters.with_people(ids)
  };

  emit(events, RunEvent::Progress { current: 0, total });

  let search =
    AssetSearch::new(repo, &filters, cancel).with_page_size(request.page_size);
  let mut book = AlbumBook::new(repo);
  let mut current = 0;
  let mut assets_added = 0;

  for target in &request.targets {
    let Some(album_id) = book.ensure(&target.album, cancel).await? else {
      return Ok(Outcome::Cancelled);
    };

    for year in target.years(&request.years) {
      if cancel.is_cancelled() {
        return Ok(Outcome::Cancelled);
      }
      let date = target.date_in(year)?;
      let window = DateWindow::around(date, request.delta_days)?;

      let what = match target.date {
        TargetDate::Specific {
          every_year: false,
          ..
        } => format!("{} ({date})", target.label()),
        _ => format!("{} {year}", target.label()),
      };
      emit(events, RunEvent::status(format!("Searching {what}...")));

      let Some(found) = search.collect(&window, request.match_mode).await?
      else {
        return Ok(Outcome::Cancelled);
      };
      emit(
        events,
        RunEvent::log(format!(
          "{what}: found {} assets in {window}",
          found.len()
        )),
      );

      if cancel.is_cancelled() {
        return Ok(Outcome::Cancelled);
      }
      assets_added += attach_assets(repo, album_id, &found).await?;
      current += 1;
      emit(events, RunEvent::Progress { current, total });
    }
  }

  Ok(Outcome::Completed {
    assets_added,
    albums: book.len(),
  })
}

// ─── Background runs ─────────────────────────────────────────────────────────

/// A run executing on its own tokio task.
pub struct RunHandle {
  pub events: UnboundedReceiver<RunEvent>,
  pub state:  watch::Receiver<RunState>,
  pub cancel: CancellationToken,
  pub task:   JoinHandle<Result<Outcome>>,
}

impl RunHandle {
  /// Ask the run to stop at its next cancellation point.
  pub fn cancel(&self) { self.cancel.cancel(); }
}

/// Start `request` on a new tokio task.
pub fn spawn<R>(repo: Arc<R>, request: RunRequest) -> RunHandle
where
  R: AssetRepository + 'static,
{
  let (events_tx, events) = mpsc::unbounded_channel();
  let (state_tx, state) = watch::channel(RunState::Idle);
  let cancel = CancellationToken::new();

  let token = cancel.clone();
  let task = tokio::spawn(async move {
    state_tx.send_replace(RunState::Running);
    let result = run(repo.as_ref(), &request, &events_tx, &token).await;
    state_tx.send_replace(match &result {
      Ok(outcome) => outcome.state(),
      Err(_) => RunState::Failed,
    });
    result
  });

  RunHandle {
    events,
    state,
    cancel,
    task,
  }
}
