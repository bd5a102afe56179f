pub mod export;
pub mod hourly;
#[cfg(test)]
pub mod memory;

use std::{
    fs,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use crate::{
    core::{interval::Interval, snapshot::Snapshot},
    prelude::*,
    quantity::power::Watts,
    statistics::hourly::HourlyAggregate,
};

/// Append-only, time-indexed snapshot store.
pub trait Store {
    /// Insert the snapshot. Timestamps are not required to be unique.
    fn append(&self, snapshot: &Snapshot) -> Result;

    /// Snapshots within the closed interval, ascending by timestamp.
    fn query(&self, interval: Interval) -> Result<Vec<Snapshot>>;

    /// Delete the snapshots strictly older than the cutoff and return how many were deleted.
    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Best-effort storage usage, `0` when unknown.
    fn estimate_storage_bytes(&self) -> u64;
}

/// Sink for the hourly roll-ups.
pub trait HourlyStore {
    fn insert_hourly(&self, aggregate: &HourlyAggregate) -> Result;
}

/// SQLite-backed store.
#[must_use]
pub struct Db {
    connection: Mutex<Connection>,
}

impl Db {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create `{}`", parent.display()))?;
        }
        let connection = Connection::open(path)
            .with_context(|| format!("failed to open the database at `{}`", path.display()))?;
        let this = Self::with_connection(connection)?;
        info!("opened");
        Ok(this)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS measurements (
                    id              INTEGER PRIMARY KEY AUTOINCREMENT,
                    timestamp       INTEGER NOT NULL,
                    grid_power      REAL NOT NULL,
                    house_power     REAL NOT NULL,
                    battery_power   REAL NOT NULL,
                    solar_power     REAL,
                    aux_power       REAL,
                    battery_soc     REAL NOT NULL,
                    battery_usable  REAL NOT NULL,
                    battery_voltage REAL NOT NULL,
                    grid_voltage    REAL NOT NULL,
                    cell_temp_avg   REAL,
                    cell_temp_max   REAL,
                    cell_temp_min   REAL,
                    bms_temp        REAL
                );

                CREATE INDEX IF NOT EXISTS idx_measurements_timestamp ON measurements(timestamp);

                CREATE TABLE IF NOT EXISTS hourly (
                    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
                    timestamp             INTEGER NOT NULL,
                    grid_power            REAL NOT NULL,
                    house_power           REAL NOT NULL,
                    battery_power         REAL NOT NULL,
                    battery_soc           REAL NOT NULL,
                    grid_import_kwh       REAL NOT NULL,
                    grid_export_kwh       REAL NOT NULL,
                    grid_import_low_kwh   REAL NOT NULL,
                    grid_import_high_kwh  REAL NOT NULL,
                    battery_charge_kwh    REAL NOT NULL,
                    battery_discharge_kwh REAL NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_hourly_timestamp ON hourly(timestamp);",
            )
            .context("failed to initialize the database schema")?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|_| Error::msg("the database connection mutex is poisoned"))
    }

    pub fn count_measurements(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM measurements")
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let count: i64 = self.connection()?.query_row(sql, [], |row| row.get(0))?;
        Ok(u64::try_from(count)?)
    }

    /// Timestamp of the latest snapshot, if any.
    pub fn last_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        self.connection()?
            .query_row("SELECT MAX(timestamp) FROM measurements", [], |row| {
                row.get::<_, Option<i64>>(0)?.map(from_timestamp_millis).transpose()
            })
            .context("failed to query the latest timestamp")
    }

    fn page_bytes(&self) -> Result<u64> {
        let connection = self.connection()?;
        let page_count: i64 = connection.query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = connection.query_row("PRAGMA page_size", [], |row| row.get(0))?;
        Ok(u64::try_from(page_count)? * u64::try_from(page_size)?)
    }
}

impl Store for Db {
    fn append(&self, snapshot: &Snapshot) -> Result {
        self.connection()?
            .execute(
                "INSERT INTO measurements (
                    timestamp, grid_power, house_power, battery_power, solar_power, aux_power,
                    battery_soc, battery_usable, battery_voltage, grid_voltage,
                    cell_temp_avg, cell_temp_max, cell_temp_min, bms_temp
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    snapshot.timestamp.timestamp_millis(),
                    snapshot.grid_power.0,
                    snapshot.house_power.0,
                    snapshot.battery_power.0,
                    snapshot.solar_power.map(|power| power.0),
                    snapshot.aux_power.map(|power| power.0),
                    snapshot.battery_soc,
                    snapshot.battery_usable,
                    snapshot.battery_voltage,
                    snapshot.grid_voltage,
                    snapshot.cell_temp_avg,
                    snapshot.cell_temp_max,
                    snapshot.cell_temp_min,
                    snapshot.bms_temp,
                ],
            )
            .context("failed to insert the snapshot")?;
        Ok(())
    }

    #[instrument(skip_all, fields(?interval))]
    fn query(&self, interval: Interval) -> Result<Vec<Snapshot>> {
        let connection = self.connection()?;
        let mut statement = connection.prepare_cached(
            "SELECT
                timestamp, grid_power, house_power, battery_power, solar_power, aux_power,
                battery_soc, battery_usable, battery_voltage, grid_voltage,
                cell_temp_avg, cell_temp_max, cell_temp_min, bms_temp
            FROM measurements
            WHERE timestamp >= ?1 AND timestamp <= ?2
            ORDER BY timestamp, id",
        )?;
        let snapshots = statement
            .query_map(
                params![interval.start.timestamp_millis(), interval.end.timestamp_millis()],
                snapshot_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to query the snapshots")?;
        debug!(n_snapshots = snapshots.len(), "queried");
        Ok(snapshots)
    }

    #[instrument(skip_all, fields(%cutoff))]
    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let n_deleted = self
            .connection()?
            .execute(
                "DELETE FROM measurements WHERE timestamp < ?1",
                params![cutoff.timestamp_millis()],
            )
            .context("failed to prune the snapshots")?;
        info!(n_deleted, "pruned");
        Ok(n_deleted)
    }

    fn estimate_storage_bytes(&self) -> u64 {
        self.page_bytes().unwrap_or_else(|error| {
            warn!("failed to estimate the storage usage: {error:#}");
            0
        })
    }
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        timestamp: from_timestamp_millis(row.get(0)?)?,
        grid_power: Watts::from(row.get::<_, f64>(1)?),
        house_power: Watts::from(row.get::<_, f64>(2)?),
        battery_power: Watts::from(row.get::<_, f64>(3)?),
        solar_power: row.get::<_, Option<f64>>(4)?.map(Watts::from),
        aux_power: row.get::<_, Option<f64>>(5)?.map(Watts::from),
        battery_soc: row.get(6)?,
        battery_usable: row.get(7)?,
        battery_voltage: row.get(8)?,
        grid_voltage: row.get(9)?,
        cell_temp_avg: row.get(10)?,
        cell_temp_max: row.get(11)?,
        cell_temp_min: row.get(12)?,
        bms_temp: row.get(13)?,
    })
}

fn from_timestamp_millis(millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, millis))
}
