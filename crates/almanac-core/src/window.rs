//! Search windows around a target date.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Format used for the repository's `takenAfter` / `takenBefore` bounds.
const BOUND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A half-open `[start, end)` range of local time searched for one target
/// date in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
  pub start: NaiveDateTime,
  /// Exclusive.
  pub end:   NaiveDateTime,
}

impl DateWindow {
  /// The window of `2 * delta_days + 1` whole calendar days centered on
  /// `date`. With `delta_days == 0` this is exactly the day of `date`.
  pub fn around(date: NaiveDate, delta_days: u32) -> Result<Self> {
    let delta = Days::new(u64::from(delta_days));
    let first = date.checked_sub_days(delta);
    let last = date.checked_add_days(delta).and_then(|d| d.succ_opt());
    match (first, last) {
      (Some(first), Some(after_last)) => Ok(Self {
        start: first.and_time(NaiveTime::MIN),
        end:   after_last.and_time(NaiveTime::MIN),
      }),
      _ => Err(Error::InvalidInput(format!(
        "a {delta_days}-day window around {date} leaves the calendar"
      ))),
    }
  }

  /// Number of calendar days covered.
  pub fn days(&self) -> i64 { (self.end - self.start).num_days() }

  pub fn taken_after(&self) -> String {
    self.start.format(BOUND_FORMAT).to_string()
  }

  pub fn taken_before(&self) -> String {
    self.end.format(BOUND_FORMAT).to_string()
  }
}

impl std::fmt::Display for DateWindow {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}..{}", self.taken_after(), self.taken_before())
  }
}

#[cfg(test)]
mod tests {
  use chrono::Timelike;

  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn zero_delta_spans_the_calendar_day() {
    let w = DateWindow::around(ymd(2024, 7, 4), 0).unwrap();
    assert_eq!(w.start, ymd(2024, 7, 4).and_time(NaiveTime::MIN));
    assert_eq!(w.end, ymd(2024, 7, 5).and_time(NaiveTime::MIN));
    assert_eq!(w.days(), 1);
  }

  #[test]
  fn delta_seven_spans_fifteen_days_centered_on_date() {
    let d = ymd(2024, 12, 25);
    let w = DateWindow::around(d, 7).unwrap();
    assert_eq!(w.days(), 15);
    assert_eq!(w.start.date(), ymd(2024, 12, 18));
    assert_eq!(w.end.date(), ymd(2025, 1, 2));
    assert_eq!(w.start.hour(), 0);
    // The target day sits exactly in the middle.
    assert_eq!((d - w.start.date()).num_days(), 7);
    assert_eq!((w.end.date() - d).num_days(), 8);
  }

  #[test]
  fn window_crosses_leap_day() {
    let w = DateWindow::around(ymd(2024, 3, 1), 1).unwrap();
    assert_eq!(w.start.date(), ymd(2024, 2, 29));
    assert_eq!(w.end.date(), ymd(2024, 3, 3));
  }

  #[test]
  fn bounds_use_naive_iso_format() {
    let w = DateWindow::around(ymd(2020, 12, 25), 1).unwrap();
    assert_eq!(w.taken_after(), "2020-12-24T00:00:00");
    assert_eq!(w.taken_before(), "2020-12-27T00:00:00");
  }

  #[test]
  fn window_past_the_end_of_time_is_rejected() {
    assert!(DateWindow::around(NaiveDate::MAX, 0).is_err());
  }
}
