use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sensor_actor::{ActorConfig, init_tracing};
use sensor_actors::cli::{BusArgs, parse_finite, parse_interval};
use sensor_actors::publisher::SimulatedPublisher;
use sensor_actors::run_actor;
use sensor_formulas::SineWave;

#[derive(Debug, Parser)]
#[command(name = "sine_publisher", about = "Publishes sin(counter), advancing the counter per reading")]
struct Args {
    #[command(flatten)]
    bus: BusArgs,

    /// Topic readings are published on
    #[arg(long, env = "PUB_TOPIC", default_value = "sensoren/python1")]
    pub_topic: String,

    /// Radians the counter advances per reading
    #[arg(long, default_value_t = 0.1, value_parser = parse_finite)]
    step: f64,

    /// Seconds between readings
    #[arg(long, env = "PUBLISH_INTERVAL", default_value = "1.0", value_parser = parse_interval)]
    publish_interval: Duration,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing(&["sensor_actors=info", concat!(env!("CARGO_CRATE_NAME"), "=info")])?;
    let args = Args::parse();

    let actor = SimulatedPublisher::new(args.pub_topic, args.publish_interval, 6, SineWave::new(args.step));
    let config = args.bus.apply(ActorConfig::new("sine"));

    run_actor(config, actor).await
}
