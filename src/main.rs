#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod poller;
mod prelude;
mod quantity;
mod sensor;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Watch(args) => args.run().await?,
        Command::Publish(args) => args.run().await?,
        Command::Peek(args) => args.run().await?,
    }

    info!("done!");
    Ok(())
}
