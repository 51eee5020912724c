//! Holiday date rules.
//!
//! Every supported holiday maps to exactly one [`DateRule`]; resolving a rule
//! for a year is pure integer arithmetic over the proleptic Gregorian
//! calendar.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{Error, Result};

// ─── Rules ───────────────────────────────────────────────────────────────────

/// How a holiday's date is derived from the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
  /// The same month and day every year.
  Fixed { month: u32, day: u32 },
  /// The `nth` occurrence (1-based) of `weekday` in `month`.
  NthWeekday { month: u32, weekday: Weekday, nth: u8 },
  /// The last occurrence of `weekday` in `month`.
  LastWeekday { month: u32, weekday: Weekday },
  /// Gregorian Easter Sunday.
  Easter,
}

impl DateRule {
  /// The concrete date this rule produces in `year`.
  pub fn resolve(&self, year: i32) -> Result<NaiveDate> {
    let date = match *self {
      Self::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
      Self::NthWeekday {
        month,
        weekday,
        nth,
      } => nth_weekday_of_month(year, month, weekday, nth),
      Self::LastWeekday { month, weekday } => {
        last_weekday_of_month(year, month, weekday)
      }
      Self::Easter => easter_sunday(year),
    };
    date.ok_or_else(|| {
      Error::InvalidInput(format!("no date for {self:?} in year {year}"))
    })
  }
}

fn nth_weekday_of_month(
  year: i32,
  month: u32,
  weekday: Weekday,
  nth: u8,
) -> Option<NaiveDate> {
  let mut date = NaiveDate::from_ymd_opt(year, month, 1)?;
  while date.weekday() != weekday {
    date = date.succ_opt()?;
  }
  let weeks = u64::from(nth.checked_sub(1)?);
  let date = date.checked_add_days(Days::new(7 * weeks))?;
  // A fifth Monday that spills into the next month is not a valid answer.
  (date.month() == month).then_some(date)
}

fn last_weekday_of_month(
  year: i32,
  month: u32,
  weekday: Weekday,
) -> Option<NaiveDate> {
  let (next_year, next_month) = if month == 12 {
    (year.checked_add(1)?, 1)
  } else {
    (year, month + 1)
  };
  let mut date = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
  while date.weekday() != weekday {
    date = date.pred_opt()?;
  }
  Some(date)
}

/// Anonymous Gregorian computus (Meeus/Jones/Butcher).
fn easter_sunday(year: i32) -> Option<NaiveDate> {
  let a = year.rem_euclid(19);
  let b = year.div_euclid(100);
  let c = year.rem_euclid(100);
  let d = b.div_euclid(4);
  let e = b.rem_euclid(4);
  let f = (b + 8).div_euclid(25);
  let g = (b - f + 1).div_euclid(3);
  let h = (19 * a + b - d - g + 15).rem_euclid(30);
  let i = c.div_euclid(4);
  let k = c.rem_euclid(4);
  let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
  let m = (a + 11 * h + 22 * l).div_euclid(451);
  let month = (h + l - 7 * m + 114).div_euclid(31);
  let day = (h + l - 7 * m + 114).rem_euclid(31) + 1;
  NaiveDate::from_ymd_opt(
    year,
    u32::try_from(month).ok()?,
    u32::try_from(day).ok()?,
  )
}

// ─── Holidays ────────────────────────────────────────────────────────────────

/// The holidays Almanac knows how to place on the calendar.
///
/// The display form is the human name (`"Martin Luther King Jr. Day"`), which
/// is also the default album name. [`FromStr`] accepts it in any ASCII case.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Holiday {
  #[strum(to_string = "New Year's Day")]
  NewYearsDay,
  #[strum(to_string = "Martin Luther King Jr. Day")]
  MartinLutherKingJrDay,
  #[strum(to_string = "Presidents' Day")]
  PresidentsDay,
  #[strum(to_string = "Easter")]
  Easter,
  #[strum(to_string = "Memorial Day")]
  MemorialDay,
  #[strum(to_string = "Juneteenth")]
  Juneteenth,
  #[strum(to_string = "Independence Day")]
  IndependenceDay,
  #[strum(to_string = "Labor Day")]
  LaborDay,
  #[strum(to_string = "Columbus Day")]
  ColumbusDay,
  #[strum(to_string = "Halloween")]
  Halloween,
  #[strum(to_string = "Veterans Day")]
  VeteransDay,
  #[strum(to_string = "Thanksgiving")]
  Thanksgiving,
  #[strum(to_string = "Christmas")]
  Christmas,
}

impl Holiday {
  /// All holidays in calendar order.
  pub fn all() -> impl Iterator<Item = Holiday> { Self::iter() }

  pub fn rule(self) -> DateRule {
    use Weekday::{Mon, Thu};
    match self {
      Self::NewYearsDay => DateRule::Fixed { month: 1, day: 1 },
      Self::MartinLutherKingJrDay => DateRule::NthWeekday {
        month:   1,
        weekday: Mon,
        nth:     3,
      },
      Self::PresidentsDay => DateRule::NthWeekday {
        month:   2,
        weekday: Mon,
        nth:     3,
      },
      Self::Easter => DateRule::Easter,
      Self::MemorialDay => DateRule::LastWeekday {
        month:   5,
        weekday: Mon,
      },
      Self::Juneteenth => DateRule::Fixed { month: 6, day: 19 },
      Self::IndependenceDay => DateRule::Fixed { month: 7, day: 4 },
      Self::LaborDay => DateRule::NthWeekday {
        month:   9,
        weekday: Mon,
        nth:     1,
      },
      Self::ColumbusDay => DateRule::NthWeekday {
        month:   10,
        weekday: Mon,
        nth:     2,
      },
      Self::Halloween => DateRule::Fixed { month: 10, day: 31 },
      Self::VeteransDay => DateRule::Fixed { month: 11, day: 11 },
      Self::Thanksgiving => DateRule::NthWeekday {
        month:   11,
        weekday: Thu,
        nth:     4,
      },
      Self::Christmas => DateRule::Fixed { month: 12, day: 25 },
    }
  }

  /// The date of this holiday in `year`.
  pub fn date_in(self, year: i32) -> Result<NaiveDate> {
    self.rule().resolve(year)
  }

  /// Parse a holiday by its display name.
  pub fn from_name(name: &str) -> Result<Self> {
    Self::from_str(name.trim())
      .map_err(|_| Error::UnknownHoliday(name.to_owned()))
  }
}

/// Resolve a holiday given by name for `year`.
///
/// Fails with [`Error::UnknownHoliday`] when the name is not recognised.
pub fn resolve(year: i32, name: &str) -> Result<NaiveDate> {
  Holiday::from_name(name)?.date_in(year)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn easter_matches_published_dates() {
    let known = [
      (1818, 3, 22),
      (1943, 4, 25),
      (1961, 4, 2),
      (2000, 4, 23),
      (2008, 3, 23),
      (2011, 4, 24),
      (2019, 4, 21),
      (2024, 3, 31),
      (2025, 4, 20),
      (2038, 4, 25),
      (2285, 3, 22),
    ];
    for (y, m, d) in known {
      assert_eq!(resolve(y, "Easter").unwrap(), ymd(y, m, d), "year {y}");
    }
  }

  #[test]
  fn easter_is_always_a_sunday_in_range() {
    for year in 1583..=2500 {
      let date = Holiday::Easter.date_in(year).unwrap();
      assert_eq!(date.weekday(), Weekday::Sun, "year {year}");
      assert!(date >= ymd(year, 3, 22) && date <= ymd(year, 4, 25));
    }
  }

  #[test]
  fn thanksgiving_is_fourth_thursday_of_november() {
    for year in 1900..=2100 {
      let date = resolve(year, "Thanksgiving").unwrap();
      assert_eq!(date.weekday(), Weekday::Thu);
      assert_eq!(date.month(), 11);
      // The fourth Thursday always lands on the 22nd through the 28th.
      assert!((22..=28).contains(&date.day()), "year {year}: {date}");
    }
  }

  #[test]
  fn monday_holidays_for_2024() {
    assert_eq!(
      resolve(2024, "Martin Luther King Jr. Day").unwrap(),
      ymd(2024, 1, 15)
    );
    assert_eq!(resolve(2024, "Presidents' Day").unwrap(), ymd(2024, 2, 19));
    assert_eq!(resolve(2024, "Memorial Day").unwrap(), ymd(2024, 5, 27));
    assert_eq!(resolve(2024, "Labor Day").unwrap(), ymd(2024, 9, 2));
    assert_eq!(resolve(2024, "Columbus Day").unwrap(), ymd(2024, 10, 14));
  }

  #[test]
  fn memorial_day_when_may_ends_on_monday() {
    // May 31st 2021 was a Monday.
    assert_eq!(Holiday::MemorialDay.date_in(2021).unwrap(), ymd(2021, 5, 31));
  }

  #[test]
  fn labor_day_when_september_starts_on_monday() {
    assert_eq!(Holiday::LaborDay.date_in(2025).unwrap(), ymd(2025, 9, 1));
  }

  #[test]
  fn fixed_holidays() {
    assert_eq!(resolve(2023, "New Year's Day").unwrap(), ymd(2023, 1, 1));
    assert_eq!(resolve(2023, "Juneteenth").unwrap(), ymd(2023, 6, 19));
    assert_eq!(resolve(2023, "Independence Day").unwrap(), ymd(2023, 7, 4));
    assert_eq!(resolve(2023, "Halloween").unwrap(), ymd(2023, 10, 31));
    assert_eq!(resolve(2023, "Veterans Day").unwrap(), ymd(2023, 11, 11));
    assert_eq!(resolve(2023, "Christmas").unwrap(), ymd(2023, 12, 25));
  }

  #[test]
  fn unknown_holiday_names_the_input() {
    let err = resolve(2024, "Festivus").unwrap_err();
    assert!(matches!(&err, Error::UnknownHoliday(n) if n == "Festivus"));
    assert!(err.to_string().contains("Festivus"));
  }

  #[test]
  fn display_names_round_trip() {
    assert_eq!(Holiday::all().count(), 13);
    for holiday in Holiday::all() {
      assert_eq!(Holiday::from_name(&holiday.to_string()).unwrap(), holiday);
    }
    assert_eq!(Holiday::from_name(" labor day ").unwrap(), Holiday::LaborDay);
  }

  #[test]
  fn fifth_weekday_that_does_not_exist_is_an_error() {
    let rule = DateRule::NthWeekday {
      month:   2,
      weekday: Weekday::Mon,
      nth:     5,
    };
    // February 2023 has only four Mondays.
    assert!(matches!(rule.resolve(2023), Err(Error::InvalidInput(_))));
  }
}
