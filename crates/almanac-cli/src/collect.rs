//! `almanac collect`: run a collection and render its progress.

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use almanac_collect::{RunHandle, spawn};
use almanac_core::{
  event::{Outcome, RunEvent},
  holiday::Holiday,
  person::MatchMode,
  target::DEFAULT_SPECIFIC_ALBUM,
};
use almanac_immich::ImmichClient;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use crate::preset::{DateChoice, HolidayChoice, Preset};

/// Exit status of a run stopped with Ctrl-C.
pub const EXIT_CANCELLED: u8 = 130;

#[derive(Args, Debug, Default)]
pub struct CollectArgs {
  /// Start from a saved preset; flags given here override it.
  #[arg(long, value_name = "FILE")]
  pub preset: Option<PathBuf>,

  /// Write the effective settings to a preset file before running.
  #[arg(long, value_name = "FILE")]
  pub save_preset: Option<PathBuf>,

  /// Holiday to collect, optionally into a named album (`Easter=Spring`).
  /// Repeatable.
  #[arg(long = "holiday", value_name = "NAME[=ALBUM]")]
  pub holidays: Vec<String>,

  /// Collect every supported holiday into albums named after them.
  #[arg(long, conflicts_with = "holidays")]
  pub all_holidays: bool,

  /// A specific date to collect around, such as a birthday.
  #[arg(long, value_name = "YYYY-MM-DD")]
  pub date: Option<NaiveDate>,

  /// Album for `--date` [default: "Specific Date Search"].
  #[arg(long, value_name = "NAME", requires = "date")]
  pub date_album: Option<String>,

  /// Search `--date` in every year of the range instead of once.
  #[arg(long, requires = "date")]
  pub every_year: bool,

  /// First year searched [default: 2007].
  #[arg(long, value_name = "YEAR")]
  pub start_year: Option<i32>,

  /// Last year searched [default: current year].
  #[arg(long, value_name = "YEAR")]
  pub end_year: Option<i32>,

  /// Days searched on either side of each date [default: 7].
  #[arg(long, value_name = "DAYS")]
  pub delta: Option<u32>,

  /// People to require: names or ids separated by commas or newlines.
  #[arg(long, value_name = "TEXT")]
  pub people: Option<String>,

  /// Whether assets need any or all of the selected people.
  #[arg(long = "match", value_name = "any|all")]
  pub match_mode: Option<MatchMode>,

  /// Let names match hidden people too.
  #[arg(long)]
  pub with_hidden: bool,

  /// Extra metadata search filters as a JSON object.
  #[arg(long, value_name = "JSON")]
  pub filters: Option<String>,
}

fn holiday_choice(arg: &str) -> HolidayChoice {
  match arg.split_once('=') {
    Some((name, album)) => HolidayChoice {
      name:  name.trim().to_owned(),
      album: Some(album.trim().to_owned()).filter(|a| !a.is_empty()),
    },
    None => HolidayChoice {
      name:  arg.trim().to_owned(),
      album: None,
    },
  }
}

impl CollectArgs {
  /// Layer the flags over `preset`.
  pub fn apply(&self, preset: &mut Preset) {
    if self.all_holidays {
      preset.holidays = Holiday::all()
        .map(|h| HolidayChoice {
          name:  h.to_string(),
          album: None,
        })
        .collect();
    } else if !self.holidays.is_empty() {
      preset.holidays =
        self.holidays.iter().map(|h| holiday_choice(h)).collect();
    }

    if let Some(date) = self.date {
      preset.date = Some(DateChoice {
        date,
        album: self
          .date_album
          .clone()
          .unwrap_or_else(|| DEFAULT_SPECIFIC_ALBUM.to_owned()),
        every_year: self.every_year,
      });
    }

    if let Some(year) = self.start_year {
      preset.start_year = Some(year);
    }
    if let Some(year) = self.end_year {
      preset.end_year = Some(year);
    }
    if let Some(delta) = self.delta {
      preset.delta_days = delta;
    }
    if let Some(people) = &self.people {
      preset.people = people.clone();
    }
    if let Some(mode) = self.match_mode {
      preset.match_mode = mode;
    }
    if self.with_hidden {
      preset.with_hidden = true;
    }
    if let Some(filters) = &self.filters {
      preset.filters = filters.clone();
    }
  }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Turns run events into terminal lines.
#[derive(Debug, Default)]
pub struct Renderer {
  last_status: Option<String>,
}

impl Renderer {
  /// The line to print for `event`, if any. Log lines that repeat the
  /// preceding status are skipped.
  pub fn line(&mut self, event: &RunEvent) -> Option<String> {
    match event {
      RunEvent::Status { text } => {
        self.last_status = Some(text.clone());
        Some(text.clone())
      }
      RunEvent::Log { text } if self.last_status.as_ref() == Some(text) => None,
      RunEvent::Log { text } => Some(format!("  {text}")),
      RunEvent::Progress { current, total } if *current > 0 => {
        Some(format!("[{current}/{total}]"))
      }
      RunEvent::Progress { .. } => None,
    }
  }
}

/// Print events until the run ends, cancelling it on Ctrl-C.
async fn follow(handle: &mut RunHandle) {
  let mut renderer = Renderer::default();
  loop {
    tokio::select! {
      event = handle.events.recv() => match event {
        Some(event) => if let Some(line) = renderer.line(&event) {
          println!("{line}");
        },
        None => break,
      },
      signal = tokio::signal::ctrl_c(), if !handle.cancel.is_cancelled() => {
        if let Err(e) = signal {
          tracing::warn!(error = %e, "could not listen for Ctrl-C");
        }
        eprintln!("Cancelling...");
        handle.cancel.cancel();
      }
    }
  }
}

// ─── Command ─────────────────────────────────────────────────────────────────

pub async fn execute(
  args: &CollectArgs,
  client: ImmichClient,
  current_year: i32,
) -> Result<ExitCode> {
  let mut preset = match &args.preset {
    Some(path) => Preset::load(path)?,
    None => Preset::default(),
  };
  args.apply(&mut preset);

  if let Some(path) = &args.save_preset {
    preset.save(path)?;
    tracing::info!(path = %path.display(), "saved preset");
  }

  let request = preset.request(current_year)?;
  let mut handle = spawn(Arc::new(client), request);
  follow(&mut handle).await;

  match (&mut handle.task).await.context("collection task panicked")? {
    Ok(Outcome::Completed { .. }) => Ok(ExitCode::SUCCESS),
    Ok(Outcome::Cancelled) => Ok(ExitCode::from(EXIT_CANCELLED)),
    // Already reported through the event stream.
    Err(_) => Ok(ExitCode::FAILURE),
  }
}
