//! `almanac holidays` and `almanac people`.

use std::process::ExitCode;

use almanac_collect::people::{PEOPLE_PAGE_SIZE, list_all, named_sorted};
use almanac_core::{
  holiday::Holiday,
  person::{PeopleQuery, Person},
};
use almanac_immich::ImmichClient;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::{collect::EXIT_CANCELLED, preset::check_year};

/// `(date, name)` for every holiday in `year`, in calendar order.
pub fn holiday_table(year: i32) -> Result<Vec<(NaiveDate, Holiday)>> {
  let year = check_year(year)?;
  let mut rows = Holiday::all()
    .map(|h| Ok((h.date_in(year)?, h)))
    .collect::<Result<Vec<_>, almanac_core::Error>>()?;
  rows.sort_by_key(|(date, _)| *date);
  Ok(rows)
}

pub fn holidays(year: i32) -> Result<()> {
  for (date, holiday) in holiday_table(year)? {
    println!("{}  {holiday}", date.format("%a %Y-%m-%d"));
  }
  Ok(())
}

/// One pasteable line per person, for `--people`.
pub fn person_line(person: &Person) -> String {
  format!("{}  # {}", person.id, person.name)
}

/// Named people matching `search`, sorted by name.
pub fn select_people(people: Vec<Person>, search: Option<&str>) -> Vec<Person> {
  let query = PeopleQuery::parse(search.unwrap_or_default());
  named_sorted(people)
    .into_iter()
    .filter(|p| query.matches(&p.name))
    .collect()
}

pub async fn people(
  client: &ImmichClient,
  search: Option<&str>,
  with_hidden: bool,
) -> Result<ExitCode> {
  let cancel = CancellationToken::new();
  let listing = list_all(client, PEOPLE_PAGE_SIZE, with_hidden, &cancel);
  let all = tokio::select! {
    all = listing => all.context("listing people")?,
    _ = tokio::signal::ctrl_c() => {
      cancel.cancel();
      None
    }
  };
  let Some(all) = all else {
    return Ok(ExitCode::from(EXIT_CANCELLED));
  };

  let total = all.len();
  let shown = select_people(all, search);
  for person in &shown {
    println!("{}", person_line(person));
  }
  tracing::info!(shown = shown.len(), total, "listed people");
  Ok(ExitCode::SUCCESS)
}
