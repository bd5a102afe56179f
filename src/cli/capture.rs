use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use bon::Builder;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::Parser;
use signal_hook::{consts::TERM_SIGNALS, flag};
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    api::backend,
    cli::{backend::BackendArgs, db::DbArgs, prune::RetentionArgs, tariff::TariffArgs},
    core::{interval::Interval, snapshot::Snapshot},
    db::{Db, HourlyStore, Store},
    prelude::*,
    statistics::hourly::{HourlyAggregate, start_of_hour},
    tariff::{Tariff, parse_time_zone},
};

#[derive(Parser)]
pub struct CaptureArgs {
    #[clap(long = "capture-interval", env = "CAPTURE_INTERVAL", default_value = "1min")]
    interval: humantime::Duration,

    /// Time zone of the tariff low-rate window.
    #[clap(
        long = "time-zone",
        env = "TIME_ZONE",
        default_value = "Europe/London",
        value_parser = parse_time_zone,
    )]
    time_zone: Tz,

    #[clap(flatten)]
    tariff: TariffArgs,

    #[clap(flatten)]
    retention: RetentionArgs,

    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    backend: BackendArgs,
}

impl CaptureArgs {
    pub async fn run(self) -> Result {
        let db = self.db.open()?;
        match self.retention.apply(&db, Utc::now()) {
            Ok((n_snapshots, n_aggregates)) => info!(n_snapshots, n_aggregates, "pruned"),
            Err(error) => warn!("failed to prune the store: {error:#}"),
        }
        Capturer::builder()
            .db(db)
            .client(self.backend.client()?)
            .tariff(self.tariff.tariff(self.time_zone))
            .interval(self.interval)
            .build()
            .run()
            .await
    }
}

#[derive(Builder)]
struct Capturer {
    db: Db,
    client: backend::Client,
    tariff: Tariff,

    #[builder(into)]
    interval: Duration,
}

impl Capturer {
    /// Capture until terminated. A second termination signal exits immediately.
    #[instrument(skip_all, fields(interval = ?self.interval))]
    async fn run(self) -> Result {
        let should_terminate = Arc::new(AtomicBool::new(false));
        for signal in TERM_SIGNALS {
            flag::register_conditional_shutdown(*signal, 1, Arc::clone(&should_terminate))?;
            flag::register(*signal, Arc::clone(&should_terminate))?;
        }

        let mut interval = interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut recorder = Recorder::new(self.tariff);
        info!("capturing…");
        while !should_terminate.load(Ordering::Relaxed) {
            interval.tick().await;
            let now = Utc::now();
            let snapshot =
                self.client.get_current().await.map(|measurements| measurements.to_snapshot(now));
            recorder.record(&self.db, now, snapshot);
        }

        info!("terminating…");
        Ok(())
    }
}

/// Appends the captured snapshots and rolls up every completed hour.
struct Recorder {
    tariff: Tariff,
    current_hour: Option<DateTime<Utc>>,
}

impl Recorder {
    const fn new(tariff: Tariff) -> Self {
        Self { tariff, current_hour: None }
    }

    /// Record one capture attempt made at `now`.
    ///
    /// Failures are logged and never stop the capture.
    fn record<S: Store + HourlyStore>(
        &mut self,
        store: &S,
        now: DateTime<Utc>,
        snapshot: Result<Snapshot>,
    ) {
        match snapshot.and_then(|snapshot| store.append(&snapshot).map(|()| snapshot)) {
            Ok(snapshot) => info!(
                grid_power = ?snapshot.grid_power,
                battery_power = ?snapshot.battery_power,
                battery_soc = snapshot.battery_soc,
                "captured",
            ),
            Err(error) => warn!("failed to capture a snapshot: {error:#}"),
        }

        let hour = start_of_hour(now);
        if let Some(previous_hour) = self.current_hour
            && previous_hour < hour
            && let Err(error) = self.roll_up(store, previous_hour, now)
        {
            warn!(%previous_hour, "failed to roll up the hour: {error:#}");
        }
        self.current_hour = Some(hour);
    }

    /// Aggregate the completed hour, closing it with the first snapshot after it.
    fn roll_up<S: Store + HourlyStore>(
        &self,
        store: &S,
        hour: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result {
        let snapshots = store.query(Interval::try_new(hour, now)?)?;
        let tariff = self.tariff;
        let aggregate = HourlyAggregate::from_snapshots(hour, &snapshots, |timestamp| {
            tariff.is_low_rate(timestamp)
        });
        if let Some(aggregate) = aggregate {
            store.insert_hourly(&aggregate)?;
            info!(%hour, grid = ?aggregate.grid, "rolled up");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{db::memory::MemoryStore, quantity::power::Watts};

    struct FailingStore;

    impl Store for FailingStore {
        fn append(&self, _snapshot: &Snapshot) -> Result {
            bail!("disk is full")
        }

        fn query(&self, _interval: Interval) -> Result<Vec<Snapshot>> {
            bail!("disk is full")
        }

        fn prune_older_than(&self, _cutoff: DateTime<Utc>) -> Result<usize> {
            bail!("disk is full")
        }

        fn estimate_storage_bytes(&self) -> u64 {
            0
        }
    }

    impl HourlyStore for FailingStore {
        fn insert_hourly(&self, _aggregate: &HourlyAggregate) -> Result {
            bail!("disk is full")
        }
    }

    fn recorder() -> Result<Recorder> {
        let tariff = TariffArgs::try_parse_from(["pv3-monitor"])?.tariff(chrono_tz::Europe::London);
        Ok(Recorder::new(tariff))
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap() + TimeDelta::minutes(minutes)
    }

    fn snapshot(timestamp: DateTime<Utc>) -> Snapshot {
        Snapshot::builder().timestamp(timestamp).grid_power(Watts::from(1000.0)).build()
    }

    #[test]
    fn store_failures_do_not_stop_recording() -> Result {
        let mut recorder = recorder()?;
        for minutes in [0, 30, 60, 90] {
            recorder.record(&FailingStore, at(minutes), Ok(snapshot(at(minutes))));
        }
        assert_eq!(recorder.current_hour, Some(at(60)));
        Ok(())
    }

    #[test]
    fn failed_fetch_is_skipped() -> Result {
        let store = MemoryStore::default();
        let mut recorder = recorder()?;
        recorder.record(&store, at(0), Err(Error::msg("connection refused")));
        recorder.record(&store, at(1), Ok(snapshot(at(1))));

        let snapshots = store.query(Interval::new(at(0), at(1)))?;
        assert_eq!(snapshots, [snapshot(at(1))]);
        Ok(())
    }

    #[test]
    fn hour_boundary_rolls_up_previous_hour() -> Result {
        let store = MemoryStore::default();
        let mut recorder = recorder()?;
        for minutes in [0, 15, 30, 45, 60] {
            recorder.record(&store, at(minutes), Ok(snapshot(at(minutes))));
        }

        let aggregates = store.hourly()?;
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].timestamp, at(0));
        assert_abs_diff_eq!(aggregates[0].grid.import.0, 1.0);
        assert_abs_diff_eq!(aggregates[0].grid_import_high.0, 1.0);

        recorder.record(&store, at(75), Ok(snapshot(at(75))));
        assert_eq!(store.hourly()?.len(), 1, "the hour is rolled up only once");
        Ok(())
    }
}
