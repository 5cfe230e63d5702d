use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sensor_actor::{ActorConfig, init_tracing};
use sensor_actors::cli::{BusArgs, parse_finite, parse_interval};
use sensor_actors::publisher::{HumiditySignal, SimulatedPublisher};
use sensor_actors::run_actor;
use sensor_formulas::DiurnalHumidity;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "humidity_publisher", about = "Publishes a simulated diurnal relative humidity")]
struct Args {
    #[command(flatten)]
    bus: BusArgs,

    /// Topic readings are published on
    #[arg(long, env = "PUB_TOPIC", default_value = "sensoren/humidity")]
    pub_topic: String,

    /// Mean relative humidity in %
    #[arg(long, env = "BASE_HUMIDITY", default_value_t = 60.0, value_parser = parse_finite)]
    base_humidity: f64,

    /// Amplitude of the daily swing in %
    #[arg(long, env = "DAY_VARIATION", default_value_t = 15.0, value_parser = parse_finite)]
    day_variation: f64,

    /// Half-width of the random noise in %
    #[arg(long, env = "NOISE_LEVEL", default_value_t = 2.0, value_parser = parse_finite)]
    noise_level: f64,

    /// Seconds between readings
    #[arg(long, env = "PUBLISH_INTERVAL", default_value = "1.0", value_parser = parse_interval)]
    publish_interval: Duration,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing(&["sensor_actors=info", concat!(env!("CARGO_CRATE_NAME"), "=info")])?;
    let args = Args::parse();

    let model = DiurnalHumidity {
        base: args.base_humidity,
        variation: args.day_variation,
        noise: args.noise_level,
    };
    info!(topic = args.pub_topic, ?model, "simulating humidity");

    let actor = SimulatedPublisher::new(args.pub_topic, args.publish_interval, 1, HumiditySignal::new(model))
        .with_unit("%");
    let config = args.bus.apply(ActorConfig::new("humidity"));

    run_actor(config, actor).await
}
