use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::{core::series::PriceSeries, prelude::*};

/// Anything that can fetch the gas prices for today and tomorrow.
#[async_trait]
pub trait GasPriceSource: Sync {
    async fn get_price_series(&self, now: DateTime<Local>) -> Result<PriceSeries>;
}
