use chrono::{DateTime, Utc};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    api::{
        alarms::AlarmStatus,
        settings::{CollectionMode, CollectionSettings},
    },
    fmt::{FormattedBytes, FormattedPercentage},
    quantity::cost::Cost,
    statistics::{hourly::HourlyAggregate, summary::DailySummary},
    tariff::Tariff,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn value_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

fn optional_cell<T: ToString>(value: Option<T>) -> Cell {
    value.map_or_else(|| value_cell("n/a").add_attribute(Attribute::Dim), value_cell)
}

fn cost_cell(cost: Cost) -> Cell {
    value_cell(cost).fg(if cost.is_positive() { Color::Red } else { Color::Green })
}

pub fn build_summary_table(
    summary: &DailySummary,
    tariff: &Tariff,
    mode: CollectionMode,
) -> Table {
    let to_local = |timestamp: DateTime<Utc>| {
        timestamp.with_timezone(&tariff.time_zone).format("%b %d %H:%M").to_string()
    };
    let costs = &summary.costs;

    let mut table = new_table();
    table.set_header(vec!["", "Value"]);
    table.add_row(vec![
        Cell::new("Window"),
        value_cell(format!(
            "{} – {}",
            to_local(summary.interval.start),
            to_local(summary.interval.end),
        )),
    ]);
    table.add_row(vec![
        Cell::new(format!("Snapshots ({mode:?})")).add_attribute(Attribute::Dim),
        value_cell(summary.n_snapshots).add_attribute(Attribute::Dim),
    ]);
    table.add_row(vec![
        Cell::new(format!("Grid import, low rate ({})", tariff.low_rate)),
        value_cell(summary.grid_import_low).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new(format!("Grid import, high rate ({})", tariff.high_rate)),
        value_cell(summary.grid_import_high).fg(Color::Red),
    ]);
    table.add_row(vec![Cell::new("Grid import"), value_cell(summary.grid.import)]);
    table.add_row(vec![Cell::new("Grid export"), value_cell(summary.grid.export)]);
    table.add_row(vec![Cell::new("Battery charge"), value_cell(summary.battery.import)]);
    table.add_row(vec![Cell::new("Battery discharge"), value_cell(summary.battery.export)]);
    table.add_row(vec![
        Cell::new("Battery efficiency"),
        value_cell(FormattedPercentage(summary.battery_efficiency)),
    ]);
    table.add_row(vec![Cell::new("Solar"), optional_cell(summary.solar)]);
    table.add_row(vec![Cell::new("EV charging"), optional_cell(summary.ev_charging)]);
    table.add_row(vec![Cell::new("House consumption"), optional_cell(summary.house_consumption)]);
    table.add_row(vec![Cell::new("Low-rate import cost"), value_cell(costs.import_low)]);
    table.add_row(vec![Cell::new("High-rate import cost"), value_cell(costs.import_high)]);
    table.add_row(vec![
        Cell::new(format!("Standing charge ({} days)", summary.standing_days)),
        value_cell(costs.standing_charge),
    ]);
    table.add_row(vec![
        Cell::new("Import total").add_attribute(Attribute::Bold),
        value_cell(costs.import_total).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Export credit"),
        value_cell(costs.export_credit).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Net cost").add_attribute(Attribute::Bold),
        cost_cell(costs.net).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("All at the high rate").add_attribute(Attribute::Dim),
        value_cell(costs.all_peak).add_attribute(Attribute::Dim),
    ]);
    table.add_row(vec![
        Cell::new("Savings"),
        value_cell(costs.savings).fg(if costs.savings.is_negative() {
            Color::Red
        } else {
            Color::Green
        }),
    ]);
    table
}

pub fn build_hourly_table(aggregates: &[HourlyAggregate], tariff: &Tariff) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Date", "Hour", "Grid", "House", "Battery", "SoC", "Import", "Export", "Charge",
        "Discharge", "Cost",
    ]);
    for aggregate in aggregates {
        let local = aggregate.timestamp.with_timezone(&tariff.time_zone);
        table.add_row(vec![
            Cell::new(local.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(local.format("%H:%M")).fg(if tariff.is_low_rate(aggregate.timestamp) {
                Color::Green
            } else {
                Color::Reset
            }),
            value_cell(aggregate.grid_power),
            value_cell(aggregate.house_power),
            value_cell(aggregate.battery_power).fg(if aggregate.battery_power.is_negative() {
                Color::Green
            } else if aggregate.battery_power.is_positive() {
                Color::DarkYellow
            } else {
                Color::Reset
            }),
            value_cell(FormattedPercentage(aggregate.battery_soc)),
            value_cell(aggregate.grid.import),
            value_cell(aggregate.grid.export).add_attribute(Attribute::Dim),
            value_cell(aggregate.battery.import),
            value_cell(aggregate.battery.export),
            cost_cell(
                aggregate.grid_import_low * tariff.low_rate
                    + aggregate.grid_import_high * tariff.high_rate
                    - aggregate.grid.export * tariff.export_rate,
            ),
        ]);
    }
    table
}

pub fn build_storage_table(
    n_bytes: u64,
    n_snapshots: u64,
    n_aggregates: u64,
    last_timestamp: Option<DateTime<Utc>>,
) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Value"]);
    table.add_row(vec![Cell::new("Size"), value_cell(FormattedBytes(n_bytes))]);
    table.add_row(vec![Cell::new("Snapshots"), value_cell(n_snapshots)]);
    table.add_row(vec![Cell::new("Hourly aggregates"), value_cell(n_aggregates)]);
    table.add_row(vec![Cell::new("Last snapshot"), optional_cell(last_timestamp)]);
    table
}

pub fn build_alarms_table(status: &AlarmStatus) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Alarm", "State"]);
    for (name, is_active) in &status.all_alarms {
        table.add_row(vec![
            Cell::new(name),
            if *is_active {
                Cell::new("active").fg(Color::Red).add_attribute(Attribute::Bold)
            } else {
                Cell::new("ok").fg(Color::Green)
            },
        ]);
    }
    table.add_row(vec![
        Cell::new(format!("{} updated at {}", status.device_id, status.updated_at))
            .add_attribute(Attribute::Dim),
        Cell::new(status.active_count).fg(if status.active_count == 0 {
            Color::Green
        } else {
            Color::Red
        }),
    ]);
    table
}

pub fn build_settings_table(settings: &CollectionSettings) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        Cell::new("Collection mode"),
        Cell::new(format!("{:?}", settings.collection_mode)),
    ]);
    table.add_row(vec![
        Cell::new("Collection interval"),
        Cell::new(humantime::format_duration(settings.collection_interval)),
    ]);
    table.add_row(vec![Cell::new("MQTT host"), Cell::new(&settings.mqtt_host)]);
    table.add_row(vec![Cell::new("MQTT port"), Cell::new(settings.mqtt_port)]);
    table.add_row(vec![Cell::new("Device"), Cell::new(&settings.device_id)]);
    table
}
