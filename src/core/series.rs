use chrono::{DateTime, Local};
use itertools::Itertools;

use crate::{core::period::GasPricePeriod, prelude::*};

/// Successfully fetched prices for today and, once published, tomorrow.
///
/// Replaced as a whole on every successful fetch.
#[must_use]
#[derive(Clone, Debug)]
pub struct PriceSeries {
    pub fetched_at: DateTime<Local>,
    today: Vec<GasPricePeriod>,
    tomorrow: Option<Vec<GasPricePeriod>>,
}

impl PriceSeries {
    /// Build the series, checking that each day's periods are sorted, contiguous,
    /// and do not overlap.
    ///
    /// Empty `tomorrow` means that the prices are not published yet.
    pub fn try_new(
        fetched_at: DateTime<Local>,
        today: Vec<GasPricePeriod>,
        tomorrow: Vec<GasPricePeriod>,
    ) -> Result<Self> {
        ensure!(!today.is_empty(), "there are no prices for today");
        ensure_contiguous(&today).context("invalid prices for today")?;
        ensure_contiguous(&tomorrow).context("invalid prices for tomorrow")?;
        let tomorrow = if tomorrow.is_empty() { None } else { Some(tomorrow) };
        Ok(Self { fetched_at, today, tomorrow })
    }

    pub fn today(&self) -> &[GasPricePeriod] {
        &self.today
    }

    pub fn tomorrow(&self) -> Option<&[GasPricePeriod]> {
        self.tomorrow.as_deref()
    }

    /// All the periods in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &GasPricePeriod> {
        self.today.iter().chain(self.tomorrow.iter().flatten())
    }

    /// Find the period that covers the moment.
    ///
    /// Returns [`None`] when the moment is outside the fetched range, which is how stale data expires.
    #[must_use]
    pub fn at(&self, time: DateTime<Local>) -> Option<&GasPricePeriod> {
        self.iter().find(|period| period.interval.contains(time))
    }
}

fn ensure_contiguous(periods: &[GasPricePeriod]) -> Result {
    for (left, right) in periods.iter().tuple_windows() {
        ensure!(
            left.interval.end <= right.interval.start,
            "the periods `{:?}` and `{:?}` overlap or are out of order",
            left.interval,
            right.interval,
        );
        ensure!(
            left.interval.end == right.interval.start,
            "there is a gap between `{:?}` and `{:?}`",
            left.interval,
            right.interval,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        core::interval::Interval,
        quantity::price::{CubicMeterPrice, VatPrice},
    };

    fn period(start: DateTime<Local>, hours: i64, value: i64) -> Result<GasPricePeriod> {
        let price = VatPrice::new(CubicMeterPrice(value.into()), CubicMeterPrice(value.into()));
        Ok(GasPricePeriod::builder()
            .interval(Interval::try_new(start, start + TimeDelta::hours(hours))?)
            .market_price(price)
            .total(price)
            .build())
    }

    fn midnight() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_tomorrow_absent() -> Result {
        let series = PriceSeries::try_new(midnight(), vec![period(midnight(), 24, 1)?], Vec::new())?;
        assert!(series.tomorrow().is_none());
        assert_eq!(series.today().len(), 1);
        Ok(())
    }

    #[test]
    fn test_tomorrow_does_not_affect_today() -> Result {
        let today = vec![period(midnight(), 24, 1)?];
        let tomorrow = vec![period(midnight() + TimeDelta::days(1), 24, 2)?];
        let before = PriceSeries::try_new(midnight(), today.clone(), Vec::new())?;
        let after = PriceSeries::try_new(midnight(), today, tomorrow)?;
        assert_eq!(before.today(), after.today());
        assert_eq!(after.tomorrow().map(<[_]>::len), Some(1));
        Ok(())
    }

    #[test]
    fn test_no_prices_for_today_is_error() {
        assert!(PriceSeries::try_new(midnight(), Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_overlap_is_error() -> Result {
        let today = vec![period(midnight(), 12, 1)?, period(midnight() + TimeDelta::hours(6), 12, 2)?];
        assert!(PriceSeries::try_new(midnight(), today, Vec::new()).is_err());
        Ok(())
    }

    #[test]
    fn test_gap_is_error() -> Result {
        let today = vec![period(midnight(), 6, 1)?, period(midnight() + TimeDelta::hours(12), 12, 2)?];
        assert!(PriceSeries::try_new(midnight(), today, Vec::new()).is_err());
        Ok(())
    }

    #[test]
    fn test_at() -> Result {
        let series = PriceSeries::try_new(
            midnight(),
            vec![period(midnight(), 12, 1)?, period(midnight() + TimeDelta::hours(12), 12, 2)?],
            vec![period(midnight() + TimeDelta::days(1), 24, 3)?],
        )?;
        let value_at = |hours: i64| {
            series.at(midnight() + TimeDelta::hours(hours)).map(|period| period.total.incl_vat)
        };
        assert_eq!(value_at(1), Some(CubicMeterPrice(Decimal::from(1))));
        assert_eq!(value_at(13), Some(CubicMeterPrice(Decimal::from(2))));
        assert_eq!(value_at(25), Some(CubicMeterPrice(Decimal::from(3))));
        assert_eq!(value_at(48), None);
        assert_eq!(value_at(-1), None);
        Ok(())
    }
}
