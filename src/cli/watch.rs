use std::time::Duration;

use clap::Parser;
use tokio::signal;

use crate::{
    cli::{EnergyZeroArgs, HeartbeatArgs, HomeAssistantConnectionArgs, SensorArgs},
    poller::Poller,
    prelude::*,
};

#[derive(Parser)]
pub struct WatchArgs {
    #[clap(long = "polling-interval", env = "POLLING_INTERVAL", default_value = "1h")]
    polling_interval: humantime::Duration,

    #[clap(flatten)]
    pub energyzero: EnergyZeroArgs,

    #[clap(flatten)]
    pub home_assistant: HomeAssistantConnectionArgs,

    #[clap(flatten)]
    pub sensors: SensorArgs,

    #[clap(flatten)]
    pub heartbeat: HeartbeatArgs,
}

impl WatchArgs {
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        self.polling_interval.into()
    }

    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        ensure!(!self.polling_interval().is_zero(), "the polling interval must be positive");
        let home_assistant = self.home_assistant.try_new_client()?;
        let message = home_assistant.check().await.context("Home Assistant is not ready")?;
        info!(status = %message, "connected to Home Assistant");

        Poller::builder()
            .source(self.energyzero.try_new_client()?)
            .sink(home_assistant)
            .sensors(self.sensors.sensor_set())
            .heartbeat(self.heartbeat.heartbeat())
            .build()
            .run(self.polling_interval(), shutdown_signal())
            .await;
        Ok(())
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("received the interrupt signal"),
        Err(error) => {
            error!("failed to listen for the interrupt signal: {error:#}");
            std::future::pending::<()>().await;
        }
    }
}
