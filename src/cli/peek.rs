use chrono::Local;
use clap::Parser;

use crate::{
    cli::{EnergyZeroArgs, SensorArgs},
    core::source::GasPriceSource,
    prelude::*,
    tables::{build_sensors_table, build_series_table},
};

#[derive(Parser)]
pub struct PeekArgs {
    #[clap(flatten)]
    pub energyzero: EnergyZeroArgs,

    #[clap(flatten)]
    pub sensors: SensorArgs,
}

impl PeekArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        let now = Local::now();
        let series = self.energyzero.try_new_client()?.get_price_series(now).await?;
        if series.tomorrow().is_none() {
            info!("tomorrow's prices are not published yet");
        }
        println!("{}", build_series_table(&series));
        println!("{}", build_sensors_table(&self.sensors.sensor_set(), &series, now));
        Ok(())
    }
}
