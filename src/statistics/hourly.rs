use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use itertools::Itertools;

use crate::{
    core::snapshot::Snapshot,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts},
    statistics::{
        flow::Flow,
        integrator::{EnergyTotals, PowerIntegrator},
    },
};

/// Coarse roll-up of one UTC hour of snapshots.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HourlyAggregate {
    /// Start of the hour.
    pub timestamp: DateTime<Utc>,

    /// Time-weighted average powers.
    pub grid_power: Watts,
    pub house_power: Watts,
    pub battery_power: Watts,

    /// Mean state of charge, percent.
    pub battery_soc: f64,

    pub grid: Flow<KilowattHours>,
    pub grid_import_low: KilowattHours,
    pub grid_import_high: KilowattHours,

    /// Import is charging, export is discharging.
    pub battery: Flow<KilowattHours>,
}

impl HourlyAggregate {
    /// Roll up the snapshots of the hour which starts at `hour`.
    ///
    /// Every interval which starts within the hour is integrated, including the last one, which
    /// is closed by the first snapshot after the hour. Other snapshots outside the hour are
    /// ignored. Returns `None` when no interval starts within the hour.
    #[instrument(skip_all, fields(%hour))]
    pub fn from_snapshots(
        hour: DateTime<Utc>,
        snapshots: &[Snapshot],
        is_low_rate: impl Fn(DateTime<Utc>) -> bool,
    ) -> Option<Self> {
        let end = hour + TimeDelta::hours(1);
        let sorted = snapshots
            .iter()
            .filter(|snapshot| snapshot.timestamp >= hour)
            .sorted_by_key(|snapshot| snapshot.timestamp)
            .collect_vec();
        let n_within = sorted.partition_point(|snapshot| snapshot.timestamp < end);
        let snapshots = sorted.into_iter().take(n_within + 1).cloned().collect_vec();
        if snapshots.len() < 2 {
            debug!(n_snapshots = snapshots.len(), "not enough snapshots");
            return None;
        }

        let totals = EnergyTotals::integrate(&snapshots, is_low_rate);
        let mut grid_power = PowerIntegrator::default();
        let mut house_power = PowerIntegrator::default();
        let mut battery_power = PowerIntegrator::default();
        for (current, next) in snapshots.iter().tuple_windows() {
            let time_delta = next.timestamp - current.timestamp;
            if time_delta > TimeDelta::zero() {
                grid_power.add(current.grid_power, time_delta);
                house_power.add(current.house_power, time_delta);
                battery_power.add(current.battery_power, time_delta);
            }
        }

        let within = &snapshots[..n_within];
        #[expect(clippy::cast_precision_loss)]
        let battery_soc =
            within.iter().map(|snapshot| snapshot.battery_soc).sum::<f64>() / within.len() as f64;

        Some(Self {
            timestamp: hour,
            grid_power: grid_power.average()?,
            house_power: house_power.average()?,
            battery_power: battery_power.average()?,
            battery_soc,
            grid: totals.grid,
            grid_import_low: totals.grid_import_low,
            grid_import_high: totals.grid_import_high,
            battery: totals.battery,
        })
    }
}

/// Start of the UTC hour containing the timestamp.
pub fn start_of_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.duration_trunc(TimeDelta::hours(1)).unwrap_or(timestamp)
}
