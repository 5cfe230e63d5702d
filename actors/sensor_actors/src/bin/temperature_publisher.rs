use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sensor_actor::{ActorConfig, init_tracing};
use sensor_actors::cli::{BusArgs, parse_finite, parse_interval};
use sensor_actors::publisher::{SimulatedPublisher, TemperatureSignal};
use sensor_actors::run_actor;
use sensor_formulas::DiurnalTemperature;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "temperature_publisher", about = "Publishes a simulated diurnal temperature")]
struct Args {
    #[command(flatten)]
    bus: BusArgs,

    /// Topic readings are published on
    #[arg(long, env = "PUB_TOPIC", default_value = "sensoren/temperature")]
    pub_topic: String,

    /// Mean temperature in °C
    #[arg(long, env = "BASE_TEMP", default_value_t = 20.0, value_parser = parse_finite)]
    base_temp: f64,

    /// Amplitude of the daily swing in °C
    #[arg(long, env = "DAY_VARIATION", default_value_t = 5.0, value_parser = parse_finite)]
    day_variation: f64,

    /// Half-width of the random noise in °C
    #[arg(long, env = "NOISE_LEVEL", default_value_t = 0.5, value_parser = parse_finite)]
    noise_level: f64,

    /// Seconds between readings
    #[arg(long, env = "PUBLISH_INTERVAL", default_value = "1.0", value_parser = parse_interval)]
    publish_interval: Duration,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing(&["sensor_actors=info", concat!(env!("CARGO_CRATE_NAME"), "=info")])?;
    let args = Args::parse();

    let model = DiurnalTemperature {
        base: args.base_temp,
        variation: args.day_variation,
        noise: args.noise_level,
    };
    info!(topic = args.pub_topic, ?model, "simulating temperature");

    let actor = SimulatedPublisher::new(
        args.pub_topic,
        args.publish_interval,
        2,
        TemperatureSignal::new(model),
    )
    .with_unit("°C");
    let config = args.bus.apply(ActorConfig::new("temperature"));

    run_actor(config, actor).await
}
