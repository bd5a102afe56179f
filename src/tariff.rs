use std::cmp::Ordering;

use bon::Builder;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::{
    prelude::*,
    quantity::{cost::Cost, rate::KilowattHourRate},
};

/// Local time-of-day window in which grid import is billed at the low rate.
///
/// The window may wrap midnight, for example `23:30–05:30`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LowRateWindow {
    /// Inclusive.
    pub start: NaiveTime,

    /// Exclusive.
    pub end: NaiveTime,
}

impl LowRateWindow {
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(self, time: NaiveTime) -> bool {
        match self.start.cmp(&self.end) {
            Ordering::Equal => false,
            Ordering::Less => (self.start <= time) && (time < self.end),
            Ordering::Greater => (time >= self.start) || (time < self.end),
        }
    }
}

/// Day/night tariff.
///
/// The low-rate window is evaluated in [`Tariff::time_zone`], never in the host time zone.
#[must_use]
#[derive(Copy, Clone, Debug, Builder)]
pub struct Tariff {
    pub low_rate: KilowattHourRate,
    pub high_rate: KilowattHourRate,
    pub export_rate: KilowattHourRate,

    /// Standing charge per calendar day.
    pub standing_charge: Cost,

    pub low_rate_window: LowRateWindow,
    pub time_zone: Tz,
}

impl Tariff {
    #[must_use]
    pub fn is_low_rate(&self, timestamp: DateTime<Utc>) -> bool {
        self.low_rate_window.contains(timestamp.with_timezone(&self.time_zone).time())
    }

    #[must_use]
    pub fn local_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.time_zone).date_naive()
    }
}

/// Parse the IANA time zone name, for example `Europe/London`.
pub fn parse_time_zone(value: &str) -> Result<Tz> {
    value
        .parse::<Tz>()
        .map_err(|error| Error::msg(format!("`{value}` is not a known time zone: {error}")))
}

/// Parse the `HH:MM` time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .with_context(|| format!("`{value}` is not a valid `HH:MM` time of day"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn time(value: &str) -> NaiveTime {
        parse_time_of_day(value).unwrap()
    }

    fn tariff() -> Tariff {
        Tariff::builder()
            .low_rate(KilowattHourRate::from_minor_units(6.67))
            .high_rate(KilowattHourRate::from_minor_units(28.22))
            .export_rate(KilowattHourRate::from_minor_units(15.0))
            .standing_charge(Cost::from_minor_units(44.84))
            .low_rate_window(LowRateWindow::new(time("23:30"), time("05:30")))
            .time_zone(chrono_tz::Europe::London)
            .build()
    }

    #[test]
    fn wrapping_window_ok() {
        let window = LowRateWindow::new(time("23:30"), time("05:30"));
        assert!(window.contains(time("23:31")));
        assert!(window.contains(time("00:00")));
        assert!(window.contains(time("05:00")));
        assert!(!window.contains(time("05:31")));
        assert!(!window.contains(time("12:00")));
    }

    #[test]
    fn boundaries_ok() {
        let window = LowRateWindow::new(time("23:30"), time("05:30"));
        assert!(window.contains(time("23:30")));
        assert!(!window.contains(time("05:30")));
    }

    #[test]
    fn daytime_window_ok() {
        let window = LowRateWindow::new(time("01:00"), time("04:00"));
        assert!(window.contains(time("01:00")));
        assert!(window.contains(time("03:59")));
        assert!(!window.contains(time("04:00")));
        assert!(!window.contains(time("23:00")));
    }

    #[test]
    fn empty_window_never_matches() {
        let window = LowRateWindow::new(time("02:00"), time("02:00"));
        assert!(!window.contains(time("02:00")));
        assert!(!window.contains(time("14:00")));
    }

    #[test]
    fn is_low_rate_uses_tariff_time_zone() {
        let tariff = tariff();

        // 23:00 UTC is 00:00 BST in summer.
        let summer = Utc.with_ymd_and_hms(2025, 7, 1, 23, 0, 0).unwrap();
        assert!(tariff.is_low_rate(summer));

        // 05:00 UTC is 06:00 BST, outside the window, although 05:00 would be inside.
        let summer_morning = Utc.with_ymd_and_hms(2025, 7, 1, 5, 0, 0).unwrap();
        assert!(!tariff.is_low_rate(summer_morning));

        // In winter London is on UTC.
        let winter_morning = Utc.with_ymd_and_hms(2025, 1, 15, 5, 0, 0).unwrap();
        assert!(tariff.is_low_rate(winter_morning));
    }

    #[test]
    fn local_date_uses_tariff_time_zone() {
        let tariff = tariff();
        let timestamp = Utc.with_ymd_and_hms(2025, 7, 1, 23, 30, 0).unwrap();
        assert_eq!(tariff.local_date(timestamp), NaiveDate::from_ymd_opt(2025, 7, 2).unwrap());
    }

    #[test]
    fn parse_time_zone_ok() -> Result {
        assert_eq!(parse_time_zone("Europe/London")?, chrono_tz::Europe::London);
        assert!(parse_time_zone("Mars/Olympus").is_err());
        Ok(())
    }

    #[test]
    fn parse_time_of_day_rejects_garbage() {
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("noon").is_err());
    }
}
