use chrono::{DateTime, Utc};
use rusqlite::{Row, params};

use crate::{
    core::interval::Interval,
    db::{Db, HourlyStore, from_timestamp_millis},
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts},
    statistics::{flow::Flow, hourly::HourlyAggregate},
};

impl HourlyStore for Db {
    fn insert_hourly(&self, aggregate: &HourlyAggregate) -> Result {
        self.connection()?
            .execute(
                "INSERT INTO hourly (
                    timestamp, grid_power, house_power, battery_power, battery_soc,
                    grid_import_kwh, grid_export_kwh, grid_import_low_kwh, grid_import_high_kwh,
                    battery_charge_kwh, battery_discharge_kwh
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    aggregate.timestamp.timestamp_millis(),
                    aggregate.grid_power.0,
                    aggregate.house_power.0,
                    aggregate.battery_power.0,
                    aggregate.battery_soc,
                    aggregate.grid.import.0,
                    aggregate.grid.export.0,
                    aggregate.grid_import_low.0,
                    aggregate.grid_import_high.0,
                    aggregate.battery.import.0,
                    aggregate.battery.export.0,
                ],
            )
            .context("failed to insert the hourly aggregate")?;
        Ok(())
    }
}

impl Db {
    #[instrument(skip_all, fields(?interval))]
    pub fn query_hourly(&self, interval: Interval) -> Result<Vec<HourlyAggregate>> {
        let connection = self.connection()?;
        let mut statement = connection.prepare_cached(
            "SELECT
                timestamp, grid_power, house_power, battery_power, battery_soc,
                grid_import_kwh, grid_export_kwh, grid_import_low_kwh, grid_import_high_kwh,
                battery_charge_kwh, battery_discharge_kwh
            FROM hourly
            WHERE timestamp >= ?1 AND timestamp <= ?2
            ORDER BY timestamp, id",
        )?;
        let aggregates = statement
            .query_map(
                params![interval.start.timestamp_millis(), interval.end.timestamp_millis()],
                aggregate_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to query the hourly aggregates")?;
        Ok(aggregates)
    }

    #[instrument(skip_all, fields(%cutoff))]
    pub fn prune_hourly_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let n_deleted = self
            .connection()?
            .execute("DELETE FROM hourly WHERE timestamp < ?1", params![cutoff.timestamp_millis()])
            .context("failed to prune the hourly aggregates")?;
        info!(n_deleted, "pruned");
        Ok(n_deleted)
    }

    pub fn count_hourly(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM hourly")
    }
}

fn aggregate_from_row(row: &Row<'_>) -> rusqlite::Result<HourlyAggregate> {
    Ok(HourlyAggregate {
        timestamp: from_timestamp_millis(row.get(0)?)?,
        grid_power: Watts::from(row.get::<_, f64>(1)?),
        house_power: Watts::from(row.get::<_, f64>(2)?),
        battery_power: Watts::from(row.get::<_, f64>(3)?),
        battery_soc: row.get(4)?,
        grid: Flow {
            import: KilowattHours::from(row.get::<_, f64>(5)?),
            export: KilowattHours::from(row.get::<_, f64>(6)?),
        },
        grid_import_low: KilowattHours::from(row.get::<_, f64>(7)?),
        grid_import_high: KilowattHours::from(row.get::<_, f64>(8)?),
        battery: Flow {
            import: KilowattHours::from(row.get::<_, f64>(9)?),
            export: KilowattHours::from(row.get::<_, f64>(10)?),
        },
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn aggregate(timestamp: DateTime<Utc>) -> HourlyAggregate {
        HourlyAggregate {
            timestamp,
            grid_power: Watts::from(250.0),
            house_power: Watts::from(400.0),
            battery_power: Watts::from(-150.0),
            battery_soc: 64.5,
            grid: Flow { import: KilowattHours::from(0.25), export: KilowattHours::ZERO },
            grid_import_low: KilowattHours::from(0.1),
            grid_import_high: KilowattHours::from(0.15),
            battery: Flow { import: KilowattHours::from(0.15), export: KilowattHours::ZERO },
        }
    }

    #[test]
    fn insert_query_prune_ok() -> Result {
        let db = Db::open_in_memory()?;
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        let old = now - TimeDelta::days(31);
        db.insert_hourly(&aggregate(old))?;
        db.insert_hourly(&aggregate(now))?;
        assert_eq!(db.count_hourly()?, 2);

        let aggregates = db.query_hourly(Interval::new(now, now))?;
        assert_eq!(aggregates, [aggregate(now)]);

        assert_eq!(db.prune_hourly_older_than(now - TimeDelta::days(30))?, 1);
        assert_eq!(db.count_hourly()?, 1);
        assert_eq!(db.count_measurements()?, 0);
        Ok(())
    }
}
