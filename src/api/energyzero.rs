//! [EnergyZero](https://www.energyzero.nl) GraphQL client for the daily gas prices.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use itertools::Itertools;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    api::client,
    core::{
        day::Day,
        interval::Interval,
        period::GasPricePeriod,
        series::PriceSeries,
        source::GasPriceSource,
    },
    prelude::*,
    quantity::price::{CubicMeterPrice, VatPrice},
};

pub const DEFAULT_URL: &str = "https://api.energyzero.nl/v1/gql";

pub struct Api {
    client: Client,
    url: Url,
}

impl Api {
    pub fn try_new(url: Url) -> Result<Self> {
        Ok(Self { client: client::try_new()?, url })
    }

    #[instrument(skip_all, fields(url = %self.url))]
    async fn call(&self, request: &Request) -> Result<Data> {
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .context("failed to call EnergyZero")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("EnergyZero responded with `{status}`: {body}");
        }
        response
            .json::<Response>()
            .await
            .context("failed to deserialize the response")?
            .into_data()
    }
}

#[async_trait]
impl GasPriceSource for Api {
    #[instrument(skip_all, fields(now = %now))]
    async fn get_price_series(&self, now: DateTime<Local>) -> Result<PriceSeries> {
        let today = now.date_naive();
        let request = Request::new(Day::Current.interval(today)?, Day::Next.interval(today)?);
        let data = self.call(&request).await?;
        let current = data.current.context("no prices for today")?.try_into_periods()?;
        let next = match data.next {
            Some(next) => next.try_into_periods()?,
            None => Vec::new(),
        };
        info!(n_current = current.len(), n_next = next.len(), "fetched");
        PriceSeries::try_new(now, current, next)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    operation_name: &'static str,
    query: &'static str,
    variables: Variables,
}

impl Request {
    fn new(current: Interval, next: Interval) -> Self {
        Self {
            operation_name: "EnergyMarketPricesGas",
            query: include_str!("energyzero/gas_prices.graphql"),
            variables: Variables {
                current_from: current.start,
                current_till: current.end,
                next_from: next.start,
                next_till: next.end,
            },
        }
    }
}

#[derive(Serialize)]
struct Variables {
    #[serde(rename = "gasCurrentFrom")]
    current_from: DateTime<Local>,

    #[serde(rename = "gasCurrentTill")]
    current_till: DateTime<Local>,

    #[serde(rename = "gasNextFrom")]
    next_from: DateTime<Local>,

    #[serde(rename = "gasNextTill")]
    next_till: DateTime<Local>,
}

#[serde_as]
#[derive(Deserialize)]
struct Response {
    data: Option<Data>,

    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    errors: Vec<ResponseError>,
}

impl Response {
    fn into_data(self) -> Result<Data> {
        if !self.errors.is_empty() {
            bail!(
                "EnergyZero returned errors: {}",
                self.errors.iter().map(|error| error.message.as_str()).join("; ")
            );
        }
        self.data.context("there is no data in the response")
    }
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

#[derive(Deserialize)]
struct Data {
    current: Option<MarketPrices>,
    next: Option<MarketPrices>,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketPrices {
    average_incl: Option<CubicMeterPrice>,
    average_excl: Option<CubicMeterPrice>,

    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    prices: Vec<Price>,
}

impl MarketPrices {
    fn try_into_periods(self) -> Result<Vec<GasPricePeriod>> {
        debug!(average_incl = ?self.average_incl, average_excl = ?self.average_excl, "averages");
        self.prices
            .into_iter()
            .sorted_by_key(|price| price.from)
            .map(Price::try_into_period)
            .collect()
    }
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Price {
    from: DateTime<Local>,
    till: DateTime<Local>,
    energy_price_excl: CubicMeterPrice,
    energy_price_incl: CubicMeterPrice,

    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    additional_costs: Vec<AdditionalCost>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdditionalCost {
    name: String,

    #[serde(default)]
    price_excl: CubicMeterPrice,

    #[serde(default)]
    price_incl: CubicMeterPrice,
}

impl Price {
    /// Split the additional costs by name, while the total includes every one of them.
    fn try_into_period(self) -> Result<GasPricePeriod> {
        let market_price = VatPrice::new(self.energy_price_excl, self.energy_price_incl);
        let mut purchasing_cost = VatPrice::ZERO;
        let mut energy_tax = VatPrice::ZERO;
        let mut total = market_price;
        for cost in self.additional_costs {
            let value = VatPrice::new(cost.price_excl, cost.price_incl);
            total += value;
            match cost.name.as_str() {
                "Energy tax" => energy_tax = value,
                "Purchasing cost" => purchasing_cost = value,
                name => warn!(name, ?value, "unknown additional cost, only counted in the total"),
            }
        }
        Ok(GasPricePeriod::builder()
            .interval(Interval::try_new(self.from, self.till)?)
            .market_price(market_price)
            .purchasing_cost(purchasing_cost)
            .energy_tax(energy_tax)
            .total(total)
            .build()
            .round_to_cents())
    }
}
