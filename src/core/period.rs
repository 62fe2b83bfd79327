use bon::Builder;

use crate::{
    core::{component::Component, interval::Interval},
    quantity::price::VatPrice,
};

/// Price breakdown over a single period, normally a whole day.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Builder)]
pub struct GasPricePeriod {
    pub interval: Interval,
    pub market_price: VatPrice,

    #[builder(default = VatPrice::ZERO)]
    pub purchasing_cost: VatPrice,

    #[builder(default = VatPrice::ZERO)]
    pub energy_tax: VatPrice,

    pub total: VatPrice,
}

impl GasPricePeriod {
    pub const fn component(&self, component: Component) -> VatPrice {
        match component {
            Component::MarketPrice => self.market_price,
            Component::PurchasingCost => self.purchasing_cost,
            Component::EnergyTax => self.energy_tax,
            Component::Total => self.total,
        }
    }

    /// Round every component separately.
    ///
    /// The total must already be summed from the unrounded components.
    pub fn round_to_cents(self) -> Self {
        Self {
            interval: self.interval,
            market_price: self.market_price.round_to_cents(),
            purchasing_cost: self.purchasing_cost.round_to_cents(),
            energy_tax: self.energy_tax.round_to_cents(),
            total: self.total.round_to_cents(),
        }
    }
}
