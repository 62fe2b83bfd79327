//! Home Assistant sensor entities for the price components.

use async_trait::async_trait;
use bon::Builder;
use chrono::{DateTime, Local};
use enumset::EnumSet;
use serde::Serialize;

use crate::{
    core::{component::Component, day::Day, period::GasPricePeriod, series::PriceSeries},
    prelude::*,
    quantity::price::CubicMeterPrice,
};

/// Destination of the sensor states.
#[async_trait]
pub trait SensorSink: Sync {
    async fn publish(&self, entity_id: &str, state: &SensorState) -> Result;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Sensor {
    pub day: Day,
    pub component: Component,
}

/// Published sensors and their naming.
#[must_use]
#[derive(Clone, Builder)]
pub struct SensorSet {
    /// Entity ID prefix, for example `better_gas` for `sensor.better_gas_current_total_price`.
    #[builder(into)]
    entity_prefix: String,

    /// Friendly name prefix, for example `Better Gas` for «Better Gas Current Total Price».
    #[builder(into)]
    name_prefix: String,

    #[builder(default = Component::all())]
    components: EnumSet<Component>,
}

impl SensorSet {
    pub fn iter(&self) -> impl Iterator<Item = Sensor> {
        let components = self.components;
        Day::ALL
            .into_iter()
            .flat_map(move |day| components.iter().map(move |component| Sensor { day, component }))
    }

    #[must_use]
    pub fn entity_id(&self, sensor: Sensor) -> String {
        format!(
            "sensor.{}_{}_{}",
            self.entity_prefix,
            sensor.day.slug(),
            sensor.component.slug()
        )
    }

    #[must_use]
    pub fn friendly_name(&self, sensor: Sensor) -> String {
        format!("{} {} {}", self.name_prefix, sensor.day.title(), sensor.component.title())
    }

    /// Resolve the sensor state from the last known series.
    ///
    /// The sensor is unavailable when nothing has been fetched yet, or the fetched periods
    /// do not cover the sensor's day anymore.
    pub fn state(
        &self,
        sensor: Sensor,
        series: Option<&PriceSeries>,
        now: DateTime<Local>,
    ) -> SensorState {
        let Some(series) = series else {
            return self.unavailable(sensor);
        };
        let period = match sensor.day.lookup_time(now) {
            Ok(time) => series.at(time),
            Err(error) => {
                warn!(?sensor, "{error:#}");
                None
            }
        };
        let Some(period) = period else {
            return self.unavailable(sensor);
        };
        let value = period.component(sensor.component);
        SensorState {
            state: value.incl_vat.0.normalize().to_string(),
            attributes: Attributes {
                last_updated: Some(series.fetched_at),
                from: Some(period.interval.start),
                till: Some(period.interval.end),
                price_excl_vat: Some(value.excl_vat),
                breakdown: (sensor.component == Component::Total).then(|| Breakdown::from(period)),
                ..Attributes::new(self.friendly_name(sensor))
            },
        }
    }

    pub fn unavailable(&self, sensor: Sensor) -> SensorState {
        SensorState {
            state: SensorState::UNAVAILABLE.to_owned(),
            attributes: Attributes::new(self.friendly_name(sensor)),
        }
    }
}

/// Body of `POST /api/states/<entity_id>`.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct SensorState {
    pub state: String,
    pub attributes: Attributes,
}

impl SensorState {
    pub const UNAVAILABLE: &'static str = "unavailable";
}

#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct Attributes {
    pub friendly_name: String,
    pub unit_of_measurement: &'static str,
    pub icon: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Local>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Local>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub till: Option<DateTime<Local>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_excl_vat: Option<CubicMeterPrice>,

    #[serde(flatten)]
    pub breakdown: Option<Breakdown>,
}

impl Attributes {
    fn new(friendly_name: String) -> Self {
        Self {
            friendly_name,
            unit_of_measurement: CubicMeterPrice::UNIT,
            icon: "mdi:meter-gas",
            last_updated: None,
            from: None,
            till: None,
            price_excl_vat: None,
            breakdown: None,
        }
    }
}

/// Every component of the total price.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Breakdown {
    pub market_price_incl_vat: CubicMeterPrice,
    pub market_price_excl_vat: CubicMeterPrice,
    pub energy_tax_incl_vat: CubicMeterPrice,
    pub energy_tax_excl_vat: CubicMeterPrice,
    pub purchasing_cost_incl_vat: CubicMeterPrice,
    pub purchasing_cost_excl_vat: CubicMeterPrice,
}

impl From<&GasPricePeriod> for Breakdown {
    fn from(period: &GasPricePeriod) -> Self {
        Self {
            market_price_incl_vat: period.market_price.incl_vat,
            market_price_excl_vat: period.market_price.excl_vat,
            energy_tax_incl_vat: period.energy_tax.incl_vat,
            energy_tax_excl_vat: period.energy_tax.excl_vat,
            purchasing_cost_incl_vat: period.purchasing_cost.incl_vat,
            purchasing_cost_excl_vat: period.purchasing_cost.excl_vat,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{core::interval::Interval, quantity::price::VatPrice};

    fn sensors() -> SensorSet {
        SensorSet::builder().entity_prefix("better_gas").name_prefix("Better Gas").build()
    }

    fn midnight() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap()
    }

    fn price(excl_vat: &str, incl_vat: &str) -> Result<VatPrice> {
        Ok(VatPrice::new(CubicMeterPrice::from_str(excl_vat)?, CubicMeterPrice::from_str(incl_vat)?))
    }

    fn series() -> Result<PriceSeries> {
        let period = GasPricePeriod::builder()
            .interval(Interval::try_new(midnight(), midnight() + TimeDelta::days(1))?)
            .market_price(price("0.28", "0.34")?)
            .purchasing_cost(price("0.08", "0.10")?)
            .energy_tax(price("0.58", "0.70")?)
            .total(price("0.95", "1.14")?)
            .build();
        PriceSeries::try_new(midnight(), vec![period], Vec::new())
    }

    #[test]
    fn test_all_sensors() {
        let sensors = sensors();
        let entity_ids: Vec<_> = sensors.iter().map(|sensor| sensors.entity_id(sensor)).collect();
        assert_eq!(
            entity_ids,
            [
                "sensor.better_gas_current_market_price",
                "sensor.better_gas_current_purchasing_cost",
                "sensor.better_gas_current_energy_tax",
                "sensor.better_gas_current_total_price",
                "sensor.better_gas_next_market_price",
                "sensor.better_gas_next_purchasing_cost",
                "sensor.better_gas_next_energy_tax",
                "sensor.better_gas_next_total_price",
            ]
        );
    }

    #[test]
    fn test_selected_components() {
        let sensors = SensorSet::builder()
            .entity_prefix("gas")
            .name_prefix("Gas")
            .components(Component::Total | Component::EnergyTax)
            .build();
        assert_eq!(sensors.iter().count(), 4);
        assert!(sensors.iter().all(|sensor| matches!(
            sensor.component,
            Component::Total | Component::EnergyTax
        )));
    }

    #[test]
    fn test_state_without_series_is_unavailable() {
        let sensor = Sensor { day: Day::Current, component: Component::MarketPrice };
        let state = sensors().state(sensor, None, midnight());
        assert_eq!(state.state, SensorState::UNAVAILABLE);
        assert_eq!(state.attributes.friendly_name, "Better Gas Current Market Price");
    }

    #[test]
    fn test_current_total_state() -> Result {
        let series = series()?;
        let sensor = Sensor { day: Day::Current, component: Component::Total };
        let state = sensors().state(sensor, Some(&series), midnight() + TimeDelta::hours(15));
        assert_eq!(state.state, "1.14");
        assert_eq!(state.attributes.price_excl_vat, Some(CubicMeterPrice::from_str("0.95")?));
        assert!(state.attributes.breakdown.is_some());

        let json = serde_json::to_value(&state)?;
        assert_eq!(json["state"], "1.14");
        assert_eq!(json["attributes"]["unit_of_measurement"], "€/m³");
        assert_eq!(json["attributes"]["energy_tax_incl_vat"], 0.7);
        assert_eq!(json["attributes"]["price_excl_vat"], 0.95);
        Ok(())
    }

    #[test]
    fn test_next_state_unavailable_until_published() -> Result {
        let series = series()?;
        let sensor = Sensor { day: Day::Next, component: Component::MarketPrice };
        let state = sensors().state(sensor, Some(&series), midnight() + TimeDelta::hours(15));
        assert_eq!(state.state, SensorState::UNAVAILABLE);

        let json = serde_json::to_value(&state)?;
        assert!(json["attributes"].get("from").is_none());
        assert!(json["attributes"].get("market_price_incl_vat").is_none());
        Ok(())
    }

    #[test]
    fn test_only_total_carries_breakdown() -> Result {
        let series = series()?;
        let sensor = Sensor { day: Day::Current, component: Component::EnergyTax };
        let state = sensors().state(sensor, Some(&series), midnight());
        assert_eq!(state.state, "0.7");
        assert!(state.attributes.breakdown.is_none());
        Ok(())
    }

    #[test]
    fn test_state_drops_trailing_zeros() -> Result {
        let series = series()?;
        let sensor = Sensor { day: Day::Current, component: Component::PurchasingCost };
        let state = sensors().state(sensor, Some(&series), midnight());
        assert_eq!(state.state, "0.1");
        assert_eq!(serde_json::to_value(&state)?["attributes"]["price_excl_vat"], 0.08);
        Ok(())
    }
}
