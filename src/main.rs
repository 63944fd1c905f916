mod app;
mod color;
mod config;
mod data;
mod pipeline;
mod render;
mod state;
mod ui;

use clap::Parser;

use config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::parse();
    log::debug!("{config:?}");

    pipeline::run(&config)
}
