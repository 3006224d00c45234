// Sampling period and calendar-aligned bucket math
use chrono::{Datelike, Duration, Months, NaiveDateTime, NaiveTime, Timelike};
use std::str::FromStr;
use thiserror::Error;

/// Resampling period selected by the user. Buckets are aligned to calendar
/// boundaries: half-hours and hours to the clock, days to midnight, months
/// to the first of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplePeriod {
    ThirtyMinutes,
    Hour,
    Day,
    Month,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sampling period `{0}`; expected one of 30m, 1h, 1d, 1mo")]
pub struct ParsePeriodError(pub String);

impl SamplePeriod {
    pub fn token(&self) -> &'static str {
        match self {
            SamplePeriod::ThirtyMinutes => "30m",
            SamplePeriod::Hour => "1h",
            SamplePeriod::Day => "1d",
            SamplePeriod::Month => "1mo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SamplePeriod::ThirtyMinutes => "30 minutes",
            SamplePeriod::Hour => "hour",
            SamplePeriod::Day => "day",
            SamplePeriod::Month => "month",
        }
    }

    /// The edge of the bucket containing `ts`.
    pub fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let midnight = ts.date().and_time(NaiveTime::MIN);
        match self {
            SamplePeriod::ThirtyMinutes => {
                let minute = ts.minute() - ts.minute() % 30;
                midnight + Duration::hours(i64::from(ts.hour())) + Duration::minutes(i64::from(minute))
            }
            SamplePeriod::Hour => midnight + Duration::hours(i64::from(ts.hour())),
            SamplePeriod::Day => midnight,
            SamplePeriod::Month => {
                let first = ts.date().with_day(1).unwrap_or_else(|| ts.date());
                first.and_time(NaiveTime::MIN)
            }
        }
    }

    /// The edge of the bucket after the one starting at `edge`.
    pub fn advance(&self, edge: NaiveDateTime) -> NaiveDateTime {
        match self {
            SamplePeriod::ThirtyMinutes => edge + Duration::minutes(30),
            SamplePeriod::Hour => edge + Duration::hours(1),
            SamplePeriod::Day => edge + Duration::days(1),
            SamplePeriod::Month => match edge.date().checked_add_months(Months::new(1)) {
                Some(next) => next.and_time(NaiveTime::MIN),
                None => edge,
            },
        }
    }
}

impl FromStr for SamplePeriod {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30m" => Ok(SamplePeriod::ThirtyMinutes),
            "1h" => Ok(SamplePeriod::Hour),
            "1d" => Ok(SamplePeriod::Day),
            "1mo" => Ok(SamplePeriod::Month),
            other => Err(ParsePeriodError(other.to_string())),
        }
    }
}
