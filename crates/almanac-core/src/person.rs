//! People: token parsing, name disambiguation, and the picker's search
//! expressions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Length of a hyphenated UUID such as `3f1c…-…-…-…-…`.
const UUID_TEXT_LEN: usize = 36;

/// A person as the repository describes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:        Uuid,
  #[serde(default)]
  pub name:      String,
  #[serde(default)]
  pub is_hidden: bool,
}

/// How assets are matched when several people are selected.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MatchMode {
  /// Assets showing any of the people (union).
  #[default]
  Any,
  /// Assets showing all of the people (intersection).
  All,
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// One entry of the free-text people input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonToken {
  /// A literal person id; no lookup needed.
  Id(Uuid),
  /// A name to resolve through the repository's person search.
  Name(String),
}

/// Parse a hyphenated UUID, rejecting the simple, braced and URN forms.
pub fn parse_uuid(text: &str) -> Option<Uuid> {
  if text.len() != UUID_TEXT_LEN {
    return None;
  }
  Uuid::try_parse(text).ok()
}

/// Split free text into person tokens.
///
/// Entries are separated by commas or newlines. Anything after a `#` is a
/// comment. An entry whose first 36 characters form a UUID is taken as that
/// id, so both `"<uuid>  # Jane"` and `"<uuid> - Jane"` work.
pub fn parse_tokens(raw: &str) -> Vec<PersonToken> {
  raw
    .split([',', '\n'])
    .filter_map(|part| {
      let candidate = part.split('#').next().unwrap_or_default().trim();
      if candidate.is_empty() {
        return None;
      }
      let id = candidate.get(..UUID_TEXT_LEN).and_then(parse_uuid);
      Some(match id {
        Some(id) => PersonToken::Id(id),
        None => PersonToken::Name(candidate.to_owned()),
      })
    })
    .collect()
}

// ─── Disambiguation ──────────────────────────────────────────────────────────

/// Pick the person a name token refers to among search candidates.
///
/// A single case-insensitive exact match wins even when partial matches
/// exist; failing that, a lone candidate wins. Everything else is ambiguous.
pub fn choose<'a>(token: &str, candidates: &'a [Person]) -> Result<&'a Person> {
  if candidates.is_empty() {
    return Err(Error::PersonNotFound(token.to_owned()));
  }

  let wanted = token.trim().to_lowercase();
  let mut exact = candidates
    .iter()
    .filter(|p| p.name.trim().to_lowercase() == wanted);
  if let (Some(person), None) = (exact.next(), exact.next()) {
    return Ok(person);
  }

  if let [only] = candidates {
    return Ok(only);
  }

  let names: BTreeSet<&str> = candidates
    .iter()
    .map(|p| p.name.as_str())
    .filter(|n| !n.is_empty())
    .collect();
  Err(Error::AmbiguousPerson {
    token:      token.to_owned(),
    candidates: names.into_iter().map(str::to_owned).collect(),
  })
}

/// Append `ids` to `into`, skipping ids already present.
pub fn merge_unique(into: &mut Vec<Uuid>, ids: impl IntoIterator<Item = Uuid>) {
  for id in ids {
    if !into.contains(&id) {
      into.push(id);
    }
  }
}

// ─── Picker search ───────────────────────────────────────────────────────────

/// A people-list filter in disjunctive normal form.
///
/// Clauses are separated by `,`, `;`, `|`, `||` or the word `or`; the terms
/// within a clause are separated by whitespace, `&`, `&&` or the word `and`.
/// A name matches when every term of at least one clause is a
/// case-insensitive substring of it. An empty query matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeopleQuery {
  clauses: Vec<Vec<String>>,
}

impl PeopleQuery {
  pub fn parse(expr: &str) -> Self {
    let normalized: String = expr
      .chars()
      .map(|c| match c {
        ',' | ';' | '|' => '\n',
        '&' => ' ',
        c => c,
      })
      .collect();

    let mut clauses = Vec::new();
    for part in normalized.split('\n') {
      let mut clause: Vec<String> = Vec::new();
      for word in part.split_whitespace() {
        if word.eq_ignore_ascii_case("or") {
          if !clause.is_empty() {
            clauses.push(std::mem::take(&mut clause));
          }
          continue;
        }
        if word.eq_ignore_ascii_case("and") {
          continue;
        }
        let term = word.trim_matches(['"', '\'']).to_lowercase();
        if !term.is_empty() {
          clause.push(term);
        }
      }
      if !clause.is_empty() {
        clauses.push(clause);
      }
    }
    Self { clauses }
  }

  pub fn is_empty(&self) -> bool { self.clauses.is_empty() }

  pub fn matches(&self, name: &str) -> bool {
    if self.clauses.is_empty() {
      return true;
    }
    let name = name.to_lowercase();
    self
      .clauses
      .iter()
      .any(|clause| clause.iter().all(|term| name.contains(term.as_str())))
  }
}
