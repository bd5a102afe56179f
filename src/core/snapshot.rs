use bon::Builder;
use chrono::{DateTime, Utc};

use crate::quantity::power::Watts;

/// One set of simultaneous readings taken at one instant.
///
/// Snapshots are never mutated once captured.
#[must_use]
#[derive(Clone, Debug, PartialEq, Builder)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,

    /// Positive when importing from the grid, negative when exporting.
    #[builder(default)]
    pub grid_power: Watts,

    #[builder(default)]
    pub house_power: Watts,

    /// Positive when the battery is discharging, negative when it is charging.
    #[builder(default)]
    pub battery_power: Watts,

    /// `None` means that solar generation is not tracked, which is different from zero generation.
    pub solar_power: Option<Watts>,

    /// Auxiliary load, used to detect EV charging.
    pub aux_power: Option<Watts>,

    /// State of charge, percent.
    #[builder(default)]
    pub battery_soc: f64,

    /// Usable capacity, percent. Never exceeds the state of charge.
    #[builder(default)]
    pub battery_usable: f64,

    #[builder(default)]
    pub battery_voltage: f64,

    #[builder(default)]
    pub grid_voltage: f64,

    pub cell_temp_avg: Option<f64>,
    pub cell_temp_max: Option<f64>,
    pub cell_temp_min: Option<f64>,
    pub bms_temp: Option<f64>,
}

impl Snapshot {
    /// Sort the snapshots by timestamp, which integration relies on.
    pub fn sort(snapshots: &mut [Self]) {
        snapshots.sort_by_key(|snapshot| snapshot.timestamp);
    }
}
