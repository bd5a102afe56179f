use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};

use crate::{
    api::measurements::HistoryResolution,
    core::interval::Interval,
    prelude::*,
    tariff::parse_time_zone,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TimeRange {
    /// Since the local midnight.
    Today,

    /// The previous local calendar day.
    Yesterday,

    /// Since the local midnight seven days ago.
    #[value(name = "7days")]
    SevenDays,

    /// Since the local midnight thirty days ago.
    #[value(name = "30days")]
    ThirtyDays,

    /// Between `--start` and `--end`.
    Custom,
}

impl TimeRange {
    /// Grouped history resolution the backend is asked for.
    pub const fn resolution(self) -> HistoryResolution {
        match self {
            Self::Today | Self::Yesterday => HistoryResolution::OneMinute,
            Self::SevenDays => HistoryResolution::FifteenMinutes,
            Self::ThirtyDays | Self::Custom => HistoryResolution::OneHour,
        }
    }
}

#[derive(Parser)]
pub struct RangeArgs {
    #[clap(long = "range", env = "TIME_RANGE", value_enum, default_value = "today")]
    pub range: TimeRange,

    /// Custom range start, RFC 3339.
    #[clap(long, env = "RANGE_START", required_if_eq("range", "custom"))]
    pub start: Option<DateTime<Utc>>,

    /// Custom range end, RFC 3339. Defaults to now.
    #[clap(long, env = "RANGE_END")]
    pub end: Option<DateTime<Utc>>,

    /// Override the grouped history resolution.
    #[clap(long, env = "HISTORY_RESOLUTION", value_enum)]
    pub resolution: Option<HistoryResolution>,

    /// Time zone of the calendar days and of the tariff low-rate window.
    #[clap(
        long = "time-zone",
        env = "TIME_ZONE",
        default_value = "Europe/London",
        value_parser = parse_time_zone,
    )]
    pub time_zone: Tz,
}

impl RangeArgs {
    /// Resolve the range into an interval, anchoring the calendar ranges to the local midnight.
    pub fn interval(&self, now: DateTime<Utc>) -> Result<Interval> {
        let today = now.with_timezone(&self.time_zone).date_naive();
        let days_ago = |n_days| -> Result<DateTime<Utc>> {
            local_midnight(today - Days::new(n_days), self.time_zone)
        };
        match self.range {
            TimeRange::Today => Interval::try_new(days_ago(0)?, now),
            TimeRange::Yesterday => {
                Interval::try_new(days_ago(1)?, days_ago(0)? - TimeDelta::milliseconds(1))
            }
            TimeRange::SevenDays => Interval::try_new(days_ago(7)?, now),
            TimeRange::ThirtyDays => Interval::try_new(days_ago(30)?, now),
            TimeRange::Custom => {
                let start = self.start.context("`--start` is required for a custom range")?;
                Interval::try_new(start, self.end.unwrap_or(now))
            }
        }
    }

    pub fn resolution(&self) -> HistoryResolution {
        self.resolution.unwrap_or_else(|| self.range.resolution())
    }
}

fn local_midnight(date: NaiveDate, time_zone: Tz) -> Result<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    let local = midnight
        .and_local_timezone(time_zone)
        .earliest()
        .with_context(|| format!("`{midnight}` does not exist in `{time_zone}`"))?;
    Ok(local.with_timezone(&Utc))
}
