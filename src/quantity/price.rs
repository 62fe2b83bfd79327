use std::fmt::{Debug, Display, Formatter};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Gas price in euro per cubic meter.
#[must_use]
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Deserialize,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Sub,
)]
pub struct CubicMeterPrice(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] pub Decimal);

impl CubicMeterPrice {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub const UNIT: &'static str = "€/m³";

    /// Round to whole cents, midpoints away from zero.
    pub fn round_to_cents(self) -> Self {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Display for CubicMeterPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, Self::UNIT)
    }
}

impl Debug for CubicMeterPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.0, Self::UNIT)
    }
}

/// Price with and without VAT.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, derive_more::Add, derive_more::AddAssign)]
pub struct VatPrice {
    pub excl_vat: CubicMeterPrice,
    pub incl_vat: CubicMeterPrice,
}

impl VatPrice {
    pub const ZERO: Self = Self { excl_vat: CubicMeterPrice::ZERO, incl_vat: CubicMeterPrice::ZERO };

    pub const fn new(excl_vat: CubicMeterPrice, incl_vat: CubicMeterPrice) -> Self {
        Self { excl_vat, incl_vat }
    }

    pub fn round_to_cents(self) -> Self {
        Self::new(self.excl_vat.round_to_cents(), self.incl_vat.round_to_cents())
    }
}
