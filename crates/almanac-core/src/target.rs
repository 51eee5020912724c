//! Calendar targets and the per-year tasks they expand into.

use chrono::{Datelike, NaiveDate};

use crate::{Error, Result, holiday::Holiday};

/// Default album name for a specific-date target.
pub const DEFAULT_SPECIFIC_ALBUM: &str = "Specific Date Search";

/// Which day a target is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDate {
  Holiday(Holiday),
  /// A particular date such as a birthday. With `every_year` its month and
  /// day are searched in every year of the range; otherwise only `date`
  /// itself is searched, once.
  Specific { date: NaiveDate, every_year: bool },
}

/// A date rule paired with the album its assets are collected into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarTarget {
  pub album: String,
  pub date:  TargetDate,
}

impl CalendarTarget {
  /// A holiday target collecting into an album named after the holiday.
  pub fn holiday(holiday: Holiday) -> Self {
    Self {
      album: holiday.to_string(),
      date:  TargetDate::Holiday(holiday),
    }
  }

  pub fn specific(date: NaiveDate, every_year: bool) -> Self {
    Self {
      album: DEFAULT_SPECIFIC_ALBUM.to_owned(),
      date:  TargetDate::Specific { date, every_year },
    }
  }

  pub fn with_album(mut self, album: impl Into<String>) -> Self {
    self.album = album.into();
    self
  }

  /// A short label for status messages.
  pub fn label(&self) -> String {
    match self.date {
      TargetDate::Holiday(h) => h.to_string(),
      TargetDate::Specific { .. } => self.album.clone(),
    }
  }

  /// Number of tasks this target contributes over `years`.
  pub fn task_count(&self, years: &YearRange) -> usize {
    match self.date {
      TargetDate::Specific {
        every_year: false, ..
      } => 1,
      _ => years.year_count(),
    }
  }

  /// The years this target is searched in. A one-off specific date is
  /// searched in its own year only.
  pub fn years(&self, years: &YearRange) -> Vec<i32> {
    match self.date {
      TargetDate::Specific {
        date,
        every_year: false,
      } => vec![date.year()],
      _ => years.iter().collect(),
    }
  }

  /// The concrete date of this target in `year`.
  pub fn date_in(&self, year: i32) -> Result<NaiveDate> {
    match self.date {
      TargetDate::Holiday(holiday) => holiday.date_in(year),
      TargetDate::Specific {
        date,
        every_year: false,
      } => Ok(date),
      TargetDate::Specific {
        date,
        every_year: true,
      } => move_to_year(date, year),
    }
  }
}

/// `date` moved to `year`, with Feb 29 landing on Feb 28 in common years.
fn move_to_year(date: NaiveDate, year: i32) -> Result<NaiveDate> {
  date
    .with_year(year)
    .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
    .ok_or_else(|| Error::InvalidInput(format!("cannot move {date} to {year}")))
}

/// Total tasks across all `targets`, computable before any network call.
pub fn task_count(targets: &[CalendarTarget], years: &YearRange) -> usize {
  targets.iter().map(|t| t.task_count(years)).sum()
}

// ─── Years ───────────────────────────────────────────────────────────────────

/// An inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
  start: i32,
  end:   i32,
}

impl YearRange {
  pub fn new(start: i32, end: i32) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidInput(format!(
        "start year {start} is after end year {end}"
      )));
    }
    Ok(Self { start, end })
  }

  pub fn single(year: i32) -> Self {
    Self {
      start: year,
      end:   year,
    }
  }

  pub fn start(&self) -> i32 { self.start }

  pub fn end(&self) -> i32 { self.end }

  /// Number of years in the range; never zero.
  pub fn year_count(&self) -> usize {
    usize::try_from(i64::from(self.end) - i64::from(self.start) + 1)
      .unwrap_or(usize::MAX)
  }

  pub fn iter(&self) -> impl Iterator<Item = i32> + use<> {
    self.start..=self.end
  }
}
