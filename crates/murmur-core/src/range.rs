//! Time ranges requested in free text.
//!
//! Only one literal form is recognised:
//! `from 2025-07-08T00:00:00Z to 2025-07-09T00:00:00Z`. The original strings
//! are kept so the history query is issued for exactly what the user typed.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::{Error, Result};

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"from (\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z) to (\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z)",
  )
  .expect("range pattern is valid")
});

/// A closed UTC interval with the literal timestamps it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
  start_raw: String,
  end_raw:   String,
  start:     DateTime<Utc>,
  end:       DateTime<Utc>,
}

impl TimeRange {
  /// Parse two RFC 3339 timestamps. `start` must not be after `end`.
  pub fn parse(start: &str, end: &str) -> Result<Self> {
    let start_at = parse_instant(start)?;
    let end_at = parse_instant(end)?;
    if start_at > end_at {
      return Err(Error::InvertedRange { start: start.to_string(), end: end.to_string() });
    }
    Ok(Self {
      start_raw: start.to_string(),
      end_raw:   end.to_string(),
      start:     start_at,
      end:       end_at,
    })
  }

  /// The start timestamp exactly as written.
  pub fn start_literal(&self) -> &str { &self.start_raw }

  /// The end timestamp exactly as written.
  pub fn end_literal(&self) -> &str { &self.end_raw }

  pub fn start(&self) -> DateTime<Utc> { self.start }

  pub fn end(&self) -> DateTime<Utc> { self.end }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(value)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|source| Error::InvalidTimestamp { value: value.to_string(), source })
}

/// Find the first `from <ts> to <ts>` range in `text`.
///
/// Returns `Ok(None)` when the pattern is absent and an error when it is
/// present but names an impossible instant or an inverted range.
pub fn extract_range(text: &str) -> Result<Option<TimeRange>> {
  let Some(caps) = RANGE_PATTERN.captures(text) else {
    return Ok(None);
  };
  TimeRange::parse(&caps[1], &caps[2]).map(Some)
}
