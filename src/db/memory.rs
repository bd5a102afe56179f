use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::{
    core::{interval::Interval, snapshot::Snapshot},
    db::{HourlyStore, Store},
    prelude::*,
    statistics::hourly::HourlyAggregate,
};

/// In-memory store fake.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<Vec<Snapshot>>,
    hourly: Mutex<Vec<HourlyAggregate>>,
}

impl MemoryStore {
    /// Inserted hourly aggregates in the insertion order.
    pub fn hourly(&self) -> Result<Vec<HourlyAggregate>> {
        Ok(self.hourly.lock().map_err(|_| Error::msg("poisoned"))?.clone())
    }
}

impl Store for MemoryStore {
    fn append(&self, snapshot: &Snapshot) -> Result {
        self.snapshots.lock().map_err(|_| Error::msg("poisoned"))?.push(snapshot.clone());
        Ok(())
    }

    fn query(&self, interval: Interval) -> Result<Vec<Snapshot>> {
        let mut snapshots: Vec<_> = self
            .snapshots
            .lock()
            .map_err(|_| Error::msg("poisoned"))?
            .iter()
            .filter(|snapshot| interval.contains(snapshot.timestamp))
            .cloned()
            .collect();
        Snapshot::sort(&mut snapshots);
        Ok(snapshots)
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut snapshots = self.snapshots.lock().map_err(|_| Error::msg("poisoned"))?;
        let n_before = snapshots.len();
        snapshots.retain(|snapshot| snapshot.timestamp >= cutoff);
        Ok(n_before - snapshots.len())
    }

    fn estimate_storage_bytes(&self) -> u64 {
        0
    }
}

impl HourlyStore for MemoryStore {
    fn insert_hourly(&self, aggregate: &HourlyAggregate) -> Result {
        self.hourly.lock().map_err(|_| Error::msg("poisoned"))?.push(*aggregate);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    #[test]
    fn prune_older_than_ok() -> Result {
        let store = MemoryStore::default();
        let cutoff = Utc.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap();
        for offset in [-2, -1, 0, 1] {
            store.append(&Snapshot::builder().timestamp(cutoff + TimeDelta::days(offset)).build())?;
        }
        let everything = Interval::new(cutoff - TimeDelta::days(7), cutoff + TimeDelta::days(7));
        let before = store.query(everything)?;

        assert_eq!(store.prune_older_than(cutoff)?, 2);
        let after = store.query(everything)?;
        assert_eq!(after, before[2..]);
        assert_eq!(store.estimate_storage_bytes(), 0);
        Ok(())
    }
}
