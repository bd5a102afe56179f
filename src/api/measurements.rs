use std::fmt::{Display, Formatter};

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::Deserialize;

use crate::{core::snapshot::Snapshot, quantity::power::Watts};

/// Latest readings of the device as reported by the backend.
///
/// Every reading may be missing.
#[must_use]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CurrentMeasurements {
    /// State of charge, percent.
    pub soc: Option<f64>,

    /// State of health, percent.
    pub soh: Option<f64>,

    /// Usable capacity, percent.
    pub battery_capacity: Option<f64>,

    pub battery_voltage: Option<f64>,
    pub battery_power: Option<Watts>,

    pub cell_temp_avg: Option<f64>,
    pub cell_temp_max: Option<f64>,
    pub cell_temp_min: Option<f64>,
    pub bms_temp_avg: Option<f64>,

    pub grid_power: Option<Watts>,
    pub house_power: Option<Watts>,
    pub solar_power: Option<Watts>,
    pub aux_power: Option<Watts>,

    pub grid_voltage: Option<f64>,
    pub grid_frequency: Option<f64>,
}

impl CurrentMeasurements {
    /// Capture the measurements as a snapshot taken at the timestamp.
    ///
    /// Missing powers become zero, while missing solar and auxiliary powers stay untracked.
    /// The timestamp is truncated to the millisecond precision of the store.
    pub fn to_snapshot(&self, timestamp: DateTime<Utc>) -> Snapshot {
        let battery_soc = self.soc.unwrap_or_default();
        Snapshot::builder()
            .timestamp(timestamp.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(timestamp))
            .grid_power(self.grid_power.unwrap_or_default())
            .house_power(self.house_power.unwrap_or_default())
            .battery_power(self.battery_power.unwrap_or_default())
            .maybe_solar_power(self.solar_power)
            .maybe_aux_power(self.aux_power)
            .battery_soc(battery_soc)
            .battery_usable(self.battery_capacity.unwrap_or(battery_soc).min(battery_soc))
            .battery_voltage(self.battery_voltage.unwrap_or_default())
            .grid_voltage(self.grid_voltage.unwrap_or_default())
            .maybe_cell_temp_avg(self.cell_temp_avg)
            .maybe_cell_temp_max(self.cell_temp_max)
            .maybe_cell_temp_min(self.cell_temp_min)
            .maybe_bms_temp(self.bms_temp_avg)
            .build()
    }
}

/// Bucket size of the grouped history.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum HistoryResolution {
    #[value(name = "1m")]
    OneMinute,

    #[value(name = "15m")]
    FifteenMinutes,

    #[value(name = "1h")]
    OneHour,
}

impl Display for HistoryResolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneMinute => write!(f, "1m"),
            Self::FifteenMinutes => write!(f, "15m"),
            Self::OneHour => write!(f, "1h"),
        }
    }
}

/// Metrics requested from the grouped history.
pub const GROUPED_METRICS: [&str; 10] = [
    "soc",
    "battery_capacity",
    "grid_power",
    "house_power",
    "battery_power",
    "solar_power",
    "aux_power",
    "battery_voltage",
    "grid_voltage",
    "cell_temp_avg",
];

/// One bucket of the grouped history, shaped like a snapshot.
#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct GroupedHistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub grid_power: Option<Watts>,
    pub house_power: Option<Watts>,
    pub battery_power: Option<Watts>,
    pub solar_power: Option<Watts>,
    pub aux_power: Option<Watts>,
    pub battery_soc: Option<f64>,
    pub battery_usable: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub grid_voltage: Option<f64>,
    pub cell_temp_avg: Option<f64>,
}

impl From<GroupedHistoryRecord> for Snapshot {
    fn from(record: GroupedHistoryRecord) -> Self {
        let battery_soc = record.battery_soc.unwrap_or_default();
        Self::builder()
            .timestamp(record.timestamp)
            .grid_power(record.grid_power.unwrap_or_default())
            .house_power(record.house_power.unwrap_or_default())
            .battery_power(record.battery_power.unwrap_or_default())
            .maybe_solar_power(record.solar_power)
            .maybe_aux_power(record.aux_power)
            .battery_soc(battery_soc)
            .battery_usable(record.battery_usable.unwrap_or(battery_soc).min(battery_soc))
            .battery_voltage(record.battery_voltage.unwrap_or_default())
            .grid_voltage(record.grid_voltage.unwrap_or_default())
            .maybe_cell_temp_avg(record.cell_temp_avg)
            .build()
    }
}
