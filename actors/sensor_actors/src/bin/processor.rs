use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sensor_actor::{ActorConfig, init_tracing};
use sensor_actors::cli::{BusArgs, parse_interval};
use sensor_actors::processor::comfort_processor;
use sensor_actors::run_actor;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "processor", about = "Derives heat index and dew point from temperature and humidity")]
struct Args {
    #[command(flatten)]
    bus: BusArgs,

    /// Temperature input topic
    #[arg(long, env = "TEMP_TOPIC", default_value = "sensoren/temperature")]
    temp_topic: String,

    /// Humidity input topic
    #[arg(long, env = "HUMIDITY_TOPIC", default_value = "sensoren/humidity")]
    humidity_topic: String,

    /// Topic processed records are published on
    #[arg(long, env = "OUTPUT_TOPIC", default_value = "sensoren/processed")]
    output_topic: String,

    /// Minimum seconds between processed records
    #[arg(long, env = "PUBLISH_INTERVAL", default_value = "1.0", value_parser = parse_interval)]
    publish_interval: Duration,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing(&["sensor_actors=info", concat!(env!("CARGO_CRATE_NAME"), "=info")])?;
    let args = Args::parse();

    info!(
        temperature = args.temp_topic,
        humidity = args.humidity_topic,
        output = args.output_topic,
        interval = ?args.publish_interval,
        "processor configured"
    );

    let actor = comfort_processor(
        &args.temp_topic,
        &args.humidity_topic,
        &args.output_topic,
        args.publish_interval,
    );
    let config = args
        .bus
        .apply(ActorConfig::new("processor").with_inputs(actor.input_patterns()));

    run_actor(config, actor).await
}
