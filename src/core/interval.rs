use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Utc};

use crate::prelude::*;

/// Closed time interval used to select snapshots.
#[derive(Copy, Clone, Eq, PartialEq)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Utc>,

    /// Inclusive.
    pub end: DateTime<Utc>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..={:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        ensure!(start <= end, "the interval start `{start}` is after its end `{end}`");
        Ok(Self::new(start, end))
    }

    #[must_use]
    pub fn contains(self, other: DateTime<Utc>) -> bool {
        (self.start <= other) && (other <= self.end)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    #[test]
    fn contains_is_inclusive() -> Result {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        let interval = Interval::try_new(start, end)?;
        assert!(interval.contains(start));
        assert!(interval.contains(end));
        assert!(!interval.contains(end + TimeDelta::milliseconds(1)));
        Ok(())
    }

    #[test]
    fn try_new_rejects_reversed() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(Interval::try_new(start, end).is_err());
    }
}
