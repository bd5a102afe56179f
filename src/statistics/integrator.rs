use chrono::{DateTime, TimeDelta, Utc};
use derive_more::AddAssign;
use itertools::Itertools;

use crate::{
    core::snapshot::Snapshot,
    quantity::{Quantity, energy::KilowattHours, power::Watts},
    statistics::flow::Flow,
};

/// EV charging is assumed whenever the auxiliary load exceeds this.
pub const EV_CHARGING_THRESHOLD: Watts = Quantity(50.0);

/// Power accumulator over time.
#[derive(Copy, Clone, Debug, Default, AddAssign)]
pub struct PowerIntegrator {
    pub time_delta: TimeDelta,
    pub value: KilowattHours,
}

impl PowerIntegrator {
    pub fn add(&mut self, power: Watts, time_delta: TimeDelta) {
        self.time_delta += time_delta;
        self.value += power * time_delta;
    }

    /// Time-weighted average power.
    pub fn average(self) -> Option<Watts> {
        self.value / self.time_delta
    }
}

/// Energy totals of a window of snapshots.
#[must_use]
#[derive(Copy, Clone, Debug, Default)]
pub struct EnergyTotals {
    pub grid: Flow<KilowattHours>,
    pub grid_import_low: KilowattHours,
    pub grid_import_high: KilowattHours,

    /// Import is charging, export is discharging.
    pub battery: Flow<KilowattHours>,

    pub solar: KilowattHours,
    pub ev_charging: KilowattHours,

    /// Total time covered by the integrated intervals.
    pub time_delta: TimeDelta,
}

impl EnergyTotals {
    /// Integrate the snapshots with the zero-order hold.
    ///
    /// The snapshots must be sorted by timestamp. Each adjacent pair contributes the power of the
    /// earlier snapshot held over the pair's time delta, and pairs with a non-positive time delta
    /// are skipped.
    pub fn integrate(
        snapshots: &[Snapshot],
        is_low_rate: impl Fn(DateTime<Utc>) -> bool,
    ) -> Self {
        let mut this = Self::default();
        for (current, next) in snapshots.iter().tuple_windows() {
            let time_delta = next.timestamp - current.timestamp;
            if time_delta <= TimeDelta::zero() {
                continue;
            }
            this.time_delta += time_delta;

            let grid = Flow::from_signed(current.grid_power) * time_delta;
            if is_low_rate(current.timestamp) {
                this.grid_import_low += grid.import;
            } else {
                this.grid_import_high += grid.import;
            }
            this.grid += grid;

            // Positive battery power is discharging, hence the negation.
            this.battery += Flow::from_signed(-current.battery_power) * time_delta;

            if let Some(solar_power) = current.solar_power
                && solar_power.is_positive()
            {
                this.solar += solar_power * time_delta;
            }
            if let Some(aux_power) = current.aux_power
                && aux_power > EV_CHARGING_THRESHOLD
            {
                this.ev_charging += aux_power * time_delta;
            }
        }
        this
    }
}
