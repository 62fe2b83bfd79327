use std::{future::Future, pin::pin, time::Duration};

use bon::Builder;
use chrono::{DateTime, Local};
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    api::heartbeat::Heartbeat,
    core::{series::PriceSeries, source::GasPriceSource},
    prelude::*,
    sensor::{SensorSet, SensorSink, SensorState},
};

/// Fetches the prices and publishes the sensors, keeping the last known good series
/// when a fetch fails.
#[derive(Builder)]
pub struct Poller<S, K> {
    source: S,
    sink: K,
    sensors: SensorSet,

    #[builder(default)]
    heartbeat: Heartbeat,

    #[builder(skip)]
    last_known: Option<PriceSeries>,
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TickOutcome {
    pub is_fetched: bool,
    pub n_failed_sensors: usize,
}

impl TickOutcome {
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.is_fetched && self.n_failed_sensors == 0
    }
}

impl<S: GasPriceSource, K: SensorSink> Poller<S, K> {
    #[must_use]
    pub const fn last_known(&self) -> Option<&PriceSeries> {
        self.last_known.as_ref()
    }

    /// Fetch the prices and replace the last known series, or keep it on failure.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self, now: DateTime<Local>) -> bool {
        match self.source.get_price_series(now).await {
            Ok(series) => {
                self.last_known = Some(series);
                true
            }
            Err(error) => {
                error!("failed to fetch the prices, keeping the last known ones: {error:#}");
                false
            }
        }
    }

    /// Publish every sensor from the last known series.
    ///
    /// Returns the number of sensors that failed to publish.
    #[instrument(skip_all)]
    pub async fn publish(&self, now: DateTime<Local>) -> usize {
        let mut n_failed = 0;
        for sensor in self.sensors.iter() {
            let state = self.sensors.state(sensor, self.last_known.as_ref(), now);
            if !self.publish_one(&self.sensors.entity_id(sensor), &state).await {
                n_failed += 1;
            }
        }
        n_failed
    }

    /// Mark all the sensors unavailable, like when the integration is unloaded.
    #[instrument(skip_all)]
    pub async fn publish_unavailable(&self) -> usize {
        let mut n_failed = 0;
        for sensor in self.sensors.iter() {
            let state = self.sensors.unavailable(sensor);
            if !self.publish_one(&self.sensors.entity_id(sensor), &state).await {
                n_failed += 1;
            }
        }
        n_failed
    }

    async fn publish_one(&self, entity_id: &str, state: &SensorState) -> bool {
        match self.sink.publish(entity_id, state).await {
            Ok(()) => true,
            Err(error) => {
                warn!(entity_id, "failed to publish: {error:#}");
                false
            }
        }
    }

    pub async fn tick(&mut self, now: DateTime<Local>) -> TickOutcome {
        let is_fetched = self.refresh(now).await;
        let n_failed_sensors = self.publish(now).await;
        let outcome = TickOutcome { is_fetched, n_failed_sensors };
        info!(is_fetched, n_failed_sensors, "tick");
        if outcome.is_ok() {
            self.heartbeat.send().await;
        }
        outcome
    }

    /// Tick every `period` until `shutdown` resolves, then mark the sensors unavailable.
    ///
    /// The first tick happens immediately. A tick in progress is abandoned on shutdown.
    pub async fn run(mut self, period: Duration, shutdown: impl Future<Output = ()>) {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                _ = async {
                    interval.tick().await;
                    self.tick(Local::now()).await
                } => {}
            }
        }

        info!("shutting down…");
        let n_failed = self.publish_unavailable().await;
        if n_failed != 0 {
            warn!(n_failed, "could not mark some sensors unavailable");
        }
    }
}
