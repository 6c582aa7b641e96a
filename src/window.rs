/// Time window filtering for conversation analysis.
///
/// Parses window strings (e.g. '2023', '2023-05', '2023-05-14', 'life') into
/// an inclusive UTC date range and filters messages by it.
use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;

use crate::model::Message;
use crate::timefmt::date_from_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Year,
    Month,
    Day,
    Life,
}

/// A parsed time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowScope {
    /// Window key as provided by the user
    pub key: String,
    pub kind: WindowKind,
    /// First included day, `None` for the whole history
    pub from: Option<NaiveDate>,
    /// Last included day, `None` for the whole history
    pub to: Option<NaiveDate>,
}

impl Default for WindowScope {
    fn default() -> Self {
        Self::life()
    }
}

impl fmt::Display for WindowScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl WindowScope {
    /// The unrestricted window.
    pub fn life() -> Self {
        WindowScope {
            key: "life".to_string(),
            kind: WindowKind::Life,
            from: None,
            to: None,
        }
    }

    /// Parse a window string into a WindowScope
    ///
    /// Supported formats:
    /// - "2023" → entire year 2023
    /// - "2023-05" → May 2023
    /// - "2023-05-14" → specific day
    /// - "life" → everything
    pub fn parse(window: &str) -> Result<Self> {
        let window = window.trim();

        if window.eq_ignore_ascii_case("life") {
            return Ok(Self::life());
        }

        let invalid = || {
            anyhow!(
                "Invalid window format: '{}'. Expected: '2023', '2023-05', '2023-05-14', or 'life'",
                window
            )
        };

        let parts: Vec<&str> = window.split('-').collect();
        let (from, to, kind) = match parts.as_slice() {
            [year] => {
                let year = parse_year(year).ok_or_else(invalid)?;
                let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
                let to = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
                (from, to, WindowKind::Year)
            }
            [year, month] => {
                let year = parse_year(year).ok_or_else(invalid)?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
                let to = last_day_of_month(from).ok_or_else(invalid)?;
                (from, to, WindowKind::Month)
            }
            [_, _, _] => {
                let day = NaiveDate::parse_from_str(window, "%Y-%m-%d").map_err(|_| invalid())?;
                (day, day, WindowKind::Day)
            }
            _ => return Err(invalid()),
        };

        Ok(WindowScope {
            key: window.to_string(),
            kind,
            from: Some(from),
            to: Some(to),
        })
    }

    /// Whether a millisecond timestamp falls inside the window.
    pub fn contains_millis(&self, ts_millis: i64) -> bool {
        if self.kind == WindowKind::Life {
            return true;
        }
        match date_from_millis(ts_millis) {
            Some(date) => {
                self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
            }
            None => false,
        }
    }

    /// Messages inside the window, in their original order.
    pub fn filter_messages(&self, messages: &[Message]) -> Vec<Message> {
        messages
            .iter()
            .filter(|m| self.contains_millis(m.timestamp_ms))
            .cloned()
            .collect()
    }
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() != 4 {
        return None;
    }
    s.parse().ok()
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}
