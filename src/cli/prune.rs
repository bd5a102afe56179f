use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser;

use crate::{
    cli::db::DbArgs,
    db::{Db, Store},
    prelude::*,
};

#[derive(Parser)]
pub struct RetentionArgs {
    /// How long the snapshots are kept.
    #[clap(long = "retention", env = "RETENTION", default_value = "7days")]
    retention: humantime::Duration,

    /// How long the hourly aggregates are kept.
    #[clap(long = "hourly-retention", env = "HOURLY_RETENTION", default_value = "30days")]
    hourly_retention: humantime::Duration,
}

impl RetentionArgs {
    /// Delete everything older than the retention periods.
    ///
    /// Returns the numbers of deleted snapshots and hourly aggregates.
    #[instrument(skip_all)]
    pub fn apply(&self, db: &Db, now: DateTime<Utc>) -> Result<(usize, usize)> {
        let n_snapshots = db.prune_older_than(now - TimeDelta::from_std(*self.retention)?)?;
        let n_aggregates =
            db.prune_hourly_older_than(now - TimeDelta::from_std(*self.hourly_retention)?)?;
        Ok((n_snapshots, n_aggregates))
    }
}

#[derive(Parser)]
pub struct PruneArgs {
    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    retention: RetentionArgs,
}

impl PruneArgs {
    pub fn run(&self) -> Result {
        let (n_snapshots, n_aggregates) = self.retention.apply(&self.db.open()?, Utc::now())?;
        info!(n_snapshots, n_aggregates, "pruned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        core::snapshot::Snapshot,
        db::HourlyStore,
        quantity::{energy::KilowattHours, power::Watts},
        statistics::{flow::Flow, hourly::HourlyAggregate},
    };

    #[test]
    fn apply_ok() -> Result {
        let retention = RetentionArgs::try_parse_from(["pv3-monitor"])?;
        let db = Db::open_in_memory()?;
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        for days in [1, 8, 31] {
            let timestamp = now - TimeDelta::days(days);
            db.append(&Snapshot::builder().timestamp(timestamp).build())?;
            db.insert_hourly(&HourlyAggregate {
                timestamp,
                grid_power: Watts::ZERO,
                house_power: Watts::ZERO,
                battery_power: Watts::ZERO,
                battery_soc: 50.0,
                grid: Flow::<KilowattHours>::default(),
                grid_import_low: KilowattHours::ZERO,
                grid_import_high: KilowattHours::ZERO,
                battery: Flow::<KilowattHours>::default(),
            })?;
        }

        assert_eq!(retention.apply(&db, now)?, (2, 1));
        assert_eq!(db.count_measurements()?, 1);
        assert_eq!(db.count_hourly()?, 2);
        Ok(())
    }
}
