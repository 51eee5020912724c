//! Saved collection settings.
//!
//! A preset is a TOML file holding everything `almanac collect` needs except
//! the server connection. Flags given on the command line are layered over a
//! loaded preset, and the result can be written back with `--save-preset`.

use std::path::Path;

use almanac_collect::{RunRequest, search::DEFAULT_PAGE_SIZE};
use almanac_core::{
  filter::parse_filters,
  holiday::Holiday,
  person::MatchMode,
  target::{CalendarTarget, DEFAULT_SPECIFIC_ALBUM, YearRange},
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First year searched when none is given.
pub const DEFAULT_START_YEAR: i32 = 2007;

/// Accepted year inputs, inclusive.
pub const YEAR_LIMITS: (i32, i32) = (1900, 2100);

/// A holiday to collect and, optionally, the album to collect it into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayChoice {
  pub name:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub album: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateChoice {
  pub date:       NaiveDate,
  #[serde(default = "default_date_album")]
  pub album:      String,
  #[serde(default)]
  pub every_year: bool,
}

fn default_date_album() -> String { DEFAULT_SPECIFIC_ALBUM.to_owned() }

// Plain values come before tables so the TOML serializer can emit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
  pub delta_days:  u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_year:  Option<i32>,
  /// Defaults to the current year when the run starts.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end_year:    Option<i32>,
  pub people:      String,
  pub match_mode:  MatchMode,
  pub with_hidden: bool,
  /// Extra metadata search filters as JSON text.
  pub filters:     String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date:        Option<DateChoice>,
  pub holidays:    Vec<HolidayChoice>,
}

impl Default for Preset {
  fn default() -> Self {
    Self {
      delta_days:  almanac_collect::run::DEFAULT_DELTA_DAYS,
      start_year:  None,
      end_year:    None,
      people:      String::new(),
      match_mode:  MatchMode::Any,
      with_hidden: false,
      filters:     String::new(),
      date:        None,
      holidays:    Vec::new(),
    }
  }
}

/// Reject years outside [`YEAR_LIMITS`].
pub fn check_year(year: i32) -> Result<i32, almanac_core::Error> {
  let (min, max) = YEAR_LIMITS;
  if (min..=max).contains(&year) {
    Ok(year)
  } else {
    Err(almanac_core::Error::InvalidInput(format!(
      "year {year} is outside {min}-{max}"
    )))
  }
}

impl Preset {
  pub fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading preset {}", path.display()))?;
    toml::from_str(&raw)
      .with_context(|| format!("parsing preset {}", path.display()))
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    let raw = toml::to_string_pretty(self).context("serialising preset")?;
    std::fs::write(path, raw)
      .with_context(|| format!("writing preset {}", path.display()))
  }

  /// Calendar targets: the specific date first, then holidays in the order
  /// they were chosen.
  pub fn targets(&self) -> Result<Vec<CalendarTarget>, almanac_core::Error> {
    let mut targets = Vec::new();
    if let Some(choice) = &self.date {
      targets.push(
        CalendarTarget::specific(choice.date, choice.every_year)
          .with_album(album_or(&choice.album, DEFAULT_SPECIFIC_ALBUM)),
      );
    }
    for choice in &self.holidays {
      let holiday = Holiday::from_name(&choice.name)?;
      let target = CalendarTarget::holiday(holiday);
      targets.push(match choice.album.as_deref() {
        Some(album) if !album.trim().is_empty() => {
          target.with_album(album.trim())
        }
        _ => target,
      });
    }
    Ok(targets)
  }

  pub fn years(
    &self,
    current_year: i32,
  ) -> Result<YearRange, almanac_core::Error> {
    let start = check_year(self.start_year.unwrap_or(DEFAULT_START_YEAR))?;
    let end = check_year(self.end_year.unwrap_or(current_year))?;
    YearRange::new(start, end)
  }

  /// Validate the preset into a run request. Nothing here touches the
  /// network.
  pub fn request(
    &self,
    current_year: i32,
  ) -> Result<RunRequest, almanac_core::Error> {
    Ok(RunRequest {
      delta_days: self.delta_days,
      people: self.people.clone(),
      match_mode: self.match_mode,
      filters: parse_filters(&self.filters)?,
      people_with_hidden: self.with_hidden,
      page_size: DEFAULT_PAGE_SIZE,
      ..RunRequest::new(self.targets()?, self.years(current_year)?)
    })
  }
}

fn album_or<'a>(album: &'a str, fallback: &'a str) -> &'a str {
  match album.trim() {
    "" => fallback,
    trimmed => trimmed,
  }
}
