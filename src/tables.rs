use chrono::{DateTime, Local};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::series::PriceSeries,
    quantity::price::VatPrice,
    sensor::{SensorSet, SensorState},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn price_cell(price: VatPrice) -> Cell {
    Cell::new(price.incl_vat.0).set_alignment(CellAlignment::Right)
}

pub fn build_series_table(series: &PriceSeries) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Date",
        "Start",
        "End",
        "Market",
        "Purchasing",
        "Energy tax",
        "Total",
        "Total excl. VAT",
    ]);
    for period in series.iter() {
        table.add_row(vec![
            Cell::new(period.interval.start.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(period.interval.start.format("%H:%M")),
            Cell::new(period.interval.end.format("%b %d %H:%M")).add_attribute(Attribute::Dim),
            price_cell(period.market_price),
            price_cell(period.purchasing_cost),
            price_cell(period.energy_tax),
            price_cell(period.total).add_attribute(Attribute::Bold),
            Cell::new(period.total.excl_vat.0)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
        ]);
    }
    table
}

/// What would be published to Home Assistant right now.
pub fn build_sensors_table(
    sensors: &SensorSet,
    series: &PriceSeries,
    now: DateTime<Local>,
) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Entity", "State", "Unit"]);
    for sensor in sensors.iter() {
        let state = sensors.state(sensor, Some(series), now);
        let color = if state.state == SensorState::UNAVAILABLE { Color::DarkGrey } else { Color::Reset };
        table.add_row(vec![
            Cell::new(sensors.entity_id(sensor)),
            Cell::new(&state.state).set_alignment(CellAlignment::Right).fg(color),
            Cell::new(state.attributes.unit_of_measurement).add_attribute(Attribute::Dim),
        ]);
    }
    table
}
