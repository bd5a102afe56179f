use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::{
    core::{interval::Interval, snapshot::Snapshot},
    db::Store,
    prelude::*,
};

pub const HEADER: [&str; 8] = [
    "timestamp",
    "grid_power",
    "house_power",
    "battery_power",
    "battery_soc",
    "battery_voltage",
    "grid_voltage",
    "cell_temp_avg",
];

/// One exported CSV row.
#[derive(Debug, Serialize, Deserialize)]
pub struct CsvRecord {
    /// ISO-8601 with milliseconds.
    pub timestamp: String,

    pub grid_power: f64,
    pub house_power: f64,
    pub battery_power: f64,
    pub battery_soc: f64,
    pub battery_voltage: f64,
    pub grid_voltage: f64,

    /// Empty when unknown.
    pub cell_temp_avg: Option<f64>,
}

impl From<&Snapshot> for CsvRecord {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            grid_power: snapshot.grid_power.0,
            house_power: snapshot.house_power.0,
            battery_power: snapshot.battery_power.0,
            battery_soc: snapshot.battery_soc,
            battery_voltage: snapshot.battery_voltage,
            grid_voltage: snapshot.grid_voltage,
            cell_temp_avg: snapshot.cell_temp_avg,
        }
    }
}

/// Render the snapshots as CSV, header included.
pub fn to_csv(snapshots: &[Snapshot]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for snapshot in snapshots {
        writer.serialize(CsvRecord::from(snapshot))?;
    }
    let bytes = writer.into_inner().context("failed to flush the CSV writer")?;
    Ok(String::from_utf8(bytes)?)
}

/// Export the snapshots within the interval as CSV.
#[instrument(skip_all, fields(?interval))]
pub fn export_range<S: Store + ?Sized>(store: &S, interval: Interval) -> Result<String> {
    let snapshots = store.query(interval)?;
    info!(n_snapshots = snapshots.len(), "exporting…");
    to_csv(&snapshots)
}
