use std::borrow::Cow;

use crate::{
    core::{interval::Interval, snapshot::Snapshot},
    prelude::*,
    quantity::{Quantity, cost::Cost, energy::KilowattHours},
    statistics::{flow::Flow, integrator::EnergyTotals},
    tariff::Tariff,
};

/// Tariff costs of a summary window, in the major currency unit.
#[must_use]
#[derive(Copy, Clone, Debug, Default)]
pub struct Costs {
    pub import_low: Cost,
    pub import_high: Cost,
    pub standing_charge: Cost,

    /// Low- and high-rate import plus the standing charge.
    pub import_total: Cost,

    pub export_credit: Cost,
    pub net: Cost,

    /// What the import would have cost if all of it had been billed at the high rate.
    pub all_peak: Cost,

    /// Saved by the low-rate window compared to [`Costs::all_peak`].
    pub savings: Cost,
}

impl Costs {
    pub fn new(totals: &EnergyTotals, tariff: &Tariff, standing_days: u32) -> Self {
        let import_low = totals.grid_import_low * tariff.low_rate;
        let import_high = totals.grid_import_high * tariff.high_rate;
        let standing_charge = tariff.standing_charge * f64::from(standing_days);
        let import_total = import_low + import_high + standing_charge;
        let export_credit = totals.grid.export * tariff.export_rate;
        let all_peak =
            (totals.grid_import_low + totals.grid_import_high) * tariff.high_rate + standing_charge;
        Self {
            import_low,
            import_high,
            standing_charge,
            import_total,
            export_credit,
            net: import_total - export_credit,
            all_peak,
            savings: all_peak - import_total,
        }
    }
}

/// Energy and cost aggregates of a window of snapshots.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct DailySummary {
    /// From the first to the last snapshot.
    pub interval: Interval,

    pub n_snapshots: usize,

    pub grid: Flow<KilowattHours>,
    pub grid_import_low: KilowattHours,
    pub grid_import_high: KilowattHours,

    /// Import is charging, export is discharging.
    pub battery: Flow<KilowattHours>,

    /// Round-trip efficiency, percent. Exactly zero when nothing was charged.
    pub battery_efficiency: f64,

    /// `None` when no snapshot tracks the solar power.
    pub solar: Option<KilowattHours>,

    /// `None` when no snapshot tracks the auxiliary load.
    pub ev_charging: Option<KilowattHours>,

    /// House consumption estimate, only available when the solar power is tracked.
    pub house_consumption: Option<KilowattHours>,

    /// Number of local calendar days spanned by the window.
    pub standing_days: u32,

    pub costs: Costs,
}

/// Summarize the snapshots.
///
/// Returns `None` when there are fewer than two snapshots, since at least one interval is needed.
#[instrument(skip_all, fields(n_snapshots = snapshots.len()))]
pub fn summarize(snapshots: &[Snapshot], tariff: &Tariff) -> Option<DailySummary> {
    if snapshots.len() < 2 {
        debug!("not enough snapshots");
        return None;
    }
    let snapshots: Cow<'_, [Snapshot]> =
        if snapshots.is_sorted_by_key(|snapshot| snapshot.timestamp) {
            Cow::Borrowed(snapshots)
        } else {
            let mut snapshots = snapshots.to_vec();
            Snapshot::sort(&mut snapshots);
            Cow::Owned(snapshots)
        };
    let (first, last) = (snapshots.first()?, snapshots.last()?);
    let interval = Interval::new(first.timestamp, last.timestamp);

    let totals = EnergyTotals::integrate(&snapshots, |timestamp| tariff.is_low_rate(timestamp));
    let solar = snapshots
        .iter()
        .any(|snapshot| snapshot.solar_power.is_some())
        .then_some(totals.solar);
    let ev_charging = snapshots
        .iter()
        .any(|snapshot| snapshot.aux_power.is_some())
        .then_some(totals.ev_charging);
    let house_consumption = solar.map(|solar| {
        (totals.grid.import + solar + totals.battery.export
            - totals.grid.export
            - totals.battery.import
            - ev_charging.unwrap_or(Quantity::ZERO))
        .max(Quantity::ZERO)
    });
    let battery_efficiency = if totals.battery.import.is_positive() {
        totals.battery.export / totals.battery.import * 100.0
    } else {
        0.0
    };

    let standing_days = {
        let n_days = (tariff.local_date(last.timestamp) - tariff.local_date(first.timestamp))
            .num_days()
            + 1;
        u32::try_from(n_days).unwrap_or(1)
    };

    Some(DailySummary {
        interval,
        n_snapshots: snapshots.len(),
        grid: totals.grid,
        grid_import_low: totals.grid_import_low,
        grid_import_high: totals.grid_import_high,
        battery: totals.battery,
        battery_efficiency,
        solar,
        ev_charging,
        house_consumption,
        standing_days,
        costs: Costs::new(&totals, tariff, standing_days),
    })
}
