mod peek;
mod publish;
mod watch;

use clap::{Parser, Subcommand};
use enumset::EnumSet;
use reqwest::Url;

pub use self::{peek::PeekArgs, publish::PublishArgs, watch::WatchArgs};
use crate::{
    api::{energyzero, heartbeat::Heartbeat, home_assistant},
    core::component::Component,
    prelude::*,
    sensor::SensorSet,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: poll the prices and keep the Home Assistant sensors up to date.
    #[clap(name = "watch")]
    Watch(Box<WatchArgs>),

    /// Fetch the prices and update the sensors once, for example from cron.
    #[clap(name = "publish")]
    Publish(Box<PublishArgs>),

    /// Fetch the prices and print them, without touching Home Assistant.
    #[clap(name = "peek")]
    Peek(PeekArgs),
}

#[derive(Parser)]
pub struct EnergyZeroArgs {
    /// EnergyZero GraphQL endpoint.
    #[clap(long = "energyzero-url", env = "ENERGYZERO_URL", default_value = energyzero::DEFAULT_URL)]
    pub energyzero_url: Url,
}

impl EnergyZeroArgs {
    pub fn try_new_client(&self) -> Result<energyzero::Api> {
        energyzero::Api::try_new(self.energyzero_url.clone())
    }
}

#[derive(Parser)]
pub struct HomeAssistantConnectionArgs {
    /// Home Assistant API access token.
    #[clap(long = "home-assistant-access-token", env = "HOME_ASSISTANT_ACCESS_TOKEN")]
    pub access_token: String,

    /// Home Assistant API base URL. For example: `http://localhost:8123/api`.
    #[clap(long = "home-assistant-api-base-url", env = "HOME_ASSISTANT_API_BASE_URL")]
    pub base_url: Url,
}

impl HomeAssistantConnectionArgs {
    pub fn try_new_client(&self) -> Result<home_assistant::Api> {
        home_assistant::Api::try_new(&self.access_token, self.base_url.clone())
    }
}

#[derive(Parser)]
pub struct SensorArgs {
    /// Entity ID prefix: `sensor.<prefix>_<current|next>_<component>`.
    #[clap(long = "entity-prefix", env = "ENTITY_PREFIX", default_value = "better_gas")]
    pub entity_prefix: String,

    /// Friendly name prefix.
    #[clap(long = "name-prefix", env = "NAME_PREFIX", default_value = "Better Gas")]
    pub name_prefix: String,

    /// Price components to publish.
    #[clap(
        long = "components",
        env = "COMPONENTS",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "market-price,purchasing-cost,energy-tax,total",
    )]
    pub components: Vec<Component>,
}

impl SensorArgs {
    #[must_use]
    pub fn components(&self) -> EnumSet<Component> {
        self.components.iter().copied().collect()
    }

    pub fn sensor_set(&self) -> SensorSet {
        SensorSet::builder()
            .entity_prefix(&self.entity_prefix)
            .name_prefix(&self.name_prefix)
            .components(self.components())
            .build()
    }
}

#[derive(Parser)]
pub struct HeartbeatArgs {
    /// URL to `POST` after every successful update.
    #[clap(long = "heartbeat-url", env = "HEARTBEAT_URL")]
    pub heartbeat_url: Option<Url>,
}

impl HeartbeatArgs {
    pub fn heartbeat(&self) -> Heartbeat {
        Heartbeat::new(self.heartbeat_url.clone())
    }
}
