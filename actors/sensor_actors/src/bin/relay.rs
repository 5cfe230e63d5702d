use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sensor_actor::{ActorConfig, init_tracing};
use sensor_actors::cli::{BusArgs, parse_interval};
use sensor_actors::processor::relay;
use sensor_actors::run_actor;

#[derive(Debug, Parser)]
#[command(name = "relay", about = "Republishes one stream at a bounded rate")]
struct Args {
    #[command(flatten)]
    bus: BusArgs,

    /// Input topic
    #[arg(long, env = "SUB_TOPIC", default_value = "sensoren/python1")]
    sub_topic: String,

    /// Output topic
    #[arg(long, env = "PUB_TOPIC", default_value = "sensoren/relay")]
    pub_topic: String,

    /// Minimum seconds between republished values
    #[arg(long, env = "PUBLISH_INTERVAL", default_value = "1.0", value_parser = parse_interval)]
    publish_interval: Duration,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing(&["sensor_actors=info", concat!(env!("CARGO_CRATE_NAME"), "=info")])?;
    let args = Args::parse();

    let actor = relay(&args.sub_topic, &args.pub_topic, args.publish_interval);
    let config = args
        .bus
        .apply(ActorConfig::new("relay").with_inputs(actor.input_patterns()));

    run_actor(config, actor).await
}
