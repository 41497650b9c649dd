//! Inclusive calendar-day ranges for analytics queries.

use crate::error::{InsightsError, InsightsResult};
use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An inclusive `[start, end]` span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days`-long window ending on `today`.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: today - Duration::days(span),
            end: today,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Number of calendar days covered, zero for an inverted range.
    pub fn len_days(&self) -> u64 {
        if self.is_valid() {
            (self.end - self.start).num_days() as u64 + 1
        } else {
            0
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day from `start` to `end` inclusive. Empty for an inverted range.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        let first = if self.is_valid() { Some(self.start) } else { None };
        std::iter::successors(first, move |day| day.succ_opt().filter(|next| *next <= end))
    }

    /// Parse request bounds.
    ///
    /// Both bounds absent selects the trailing `default_days` window ending on
    /// `today`. Accepts `YYYY-MM-DD` or RFC3339 timestamps (the date part is
    /// kept). A single bound, an unparseable bound, an inverted range or a range
    /// longer than `max_days` is rejected.
    pub fn parse(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
        default_days: u32,
        max_days: u32,
    ) -> InsightsResult<Self> {
        let range = match (start, end) {
            (None, None) => return Ok(Self::trailing(today, default_days)),
            (Some(s), Some(e)) => Self::new(parse_day(s)?, parse_day(e)?),
            (Some(_), None) => {
                return Err(InsightsError::Validation(
                    "Start date is provided but end date is missing".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(InsightsError::Validation(
                    "End date is provided but start date is missing".to_string(),
                ))
            }
        };

        if !range.is_valid() {
            return Err(InsightsError::Validation(
                "Start date must not be later than end date".to_string(),
            ));
        }
        if range.len_days() > u64::from(max_days) {
            return Err(InsightsError::Validation(format!(
                "Date range spans {} days, maximum is {}",
                range.len_days(),
                max_days
            )));
        }
        Ok(range)
    }
}

fn parse_day(s: &str) -> InsightsResult<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .ok_or_else(|| {
            InsightsError::Validation(format!(
                "Invalid date '{}'. Supported formats: YYYY-MM-DD or RFC3339",
                s
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_days_inclusive() {
        let range = DateRange::new(day("2024-02-27"), day("2024-03-01"));
        let days: Vec<_> = range.days().collect();
        assert_eq!(
            days,
            vec![
                day("2024-02-27"),
                day("2024-02-28"),
                day("2024-02-29"),
                day("2024-03-01")
            ]
        );
        assert_eq!(range.len_days(), 4);
    }

    #[test]
    fn test_single_day_and_inverted() {
        let single = DateRange::new(day("2024-01-01"), day("2024-01-01"));
        assert_eq!(single.days().count(), 1);

        let inverted = DateRange::new(day("2024-01-05"), day("2024-01-01"));
        assert!(!inverted.is_valid());
        assert_eq!(inverted.len_days(), 0);
        assert_eq!(inverted.days().count(), 0);
    }

    #[test]
    fn test_trailing_window() {
        let range = DateRange::trailing(day("2024-01-30"), 30);
        assert_eq!(range.start, day("2024-01-01"));
        assert_eq!(range.len_days(), 30);
    }

    #[test]
    fn test_parse_defaults_and_formats() {
        let today = day("2024-06-15");
        let range = DateRange::parse(None, None, today, 7, 366).unwrap();
        assert_eq!(range, DateRange::new(day("2024-06-09"), today));

        let range = DateRange::parse(
            Some("2024-01-01"),
            Some("2024-01-31T23:59:59Z"),
            today,
            7,
            366,
        )
        .unwrap();
        assert_eq!(range, DateRange::new(day("2024-01-01"), day("2024-01-31")));
    }

    #[test]
    fn test_parse_rejections() {
        let today = day("2024-06-15");
        assert!(DateRange::parse(Some("2024-01-01"), None, today, 7, 366).is_err());
        assert!(DateRange::parse(None, Some("2024-01-01"), today, 7, 366).is_err());
        assert!(DateRange::parse(Some("yesterday"), Some("2024-01-01"), today, 7, 366).is_err());
        assert!(DateRange::parse(Some("2024-02-01"), Some("2024-01-01"), today, 7, 366).is_err());
        assert!(DateRange::parse(Some("2024-01-01"), Some("2024-01-31"), today, 7, 30).is_err());
        assert!(DateRange::parse(Some("2024-01-01"), Some("2024-01-30"), today, 7, 30).is_ok());
    }
}
