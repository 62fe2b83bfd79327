use chrono::Local;
use clap::Parser;

use crate::{
    cli::{EnergyZeroArgs, HeartbeatArgs, HomeAssistantConnectionArgs, SensorArgs},
    poller::Poller,
    prelude::*,
};

#[derive(Parser)]
pub struct PublishArgs {
    #[clap(flatten)]
    pub energyzero: EnergyZeroArgs,

    #[clap(flatten)]
    pub home_assistant: HomeAssistantConnectionArgs,

    #[clap(flatten)]
    pub sensors: SensorArgs,

    #[clap(flatten)]
    pub heartbeat: HeartbeatArgs,
}

impl PublishArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        let outcome = Poller::builder()
            .source(self.energyzero.try_new_client()?)
            .sink(self.home_assistant.try_new_client()?)
            .sensors(self.sensors.sensor_set())
            .heartbeat(self.heartbeat.heartbeat())
            .build()
            .tick(Local::now())
            .await;
        ensure!(outcome.is_fetched, "failed to fetch the prices");
        ensure!(
            outcome.n_failed_sensors == 0,
            "failed to publish {} sensor(s)",
            outcome.n_failed_sensors,
        );
        Ok(())
    }
}
