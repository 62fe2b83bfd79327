use enumset::EnumSet;

/// Price component exposed as a sensor.
#[derive(Debug, clap::ValueEnum, enumset::EnumSetType)]
pub enum Component {
    /// Wholesale market price.
    MarketPrice,

    /// Supplier's purchasing cost («inkoopvergoeding»).
    PurchasingCost,

    /// Energy tax («energiebelasting»).
    EnergyTax,

    /// All-in price: the market price plus every additional cost.
    Total,
}

impl Component {
    pub fn all() -> EnumSet<Self> {
        EnumSet::all()
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::MarketPrice => "market_price",
            Self::PurchasingCost => "purchasing_cost",
            Self::EnergyTax => "energy_tax",
            Self::Total => "total_price",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::MarketPrice => "Market Price",
            Self::PurchasingCost => "Purchasing Cost",
            Self::EnergyTax => "Energy Tax",
            Self::Total => "Total Price",
        }
    }
}
