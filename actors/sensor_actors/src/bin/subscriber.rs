use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use sensor_actor::{ActorConfig, init_tracing};
use sensor_actors::cli::BusArgs;
use sensor_actors::run_actor;
use sensor_actors::subscriber::SubscriberActor;

#[derive(Debug, Parser)]
#[command(name = "subscriber", about = "Logs every sensor reading")]
struct Args {
    #[command(flatten)]
    bus: BusArgs,

    /// Topic pattern to listen on
    #[arg(long, env = "SUB_TOPIC", default_value = "sensoren/+")]
    sub_topic: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing(&["sensor_actors=info", concat!(env!("CARGO_CRATE_NAME"), "=info")])?;
    let args = Args::parse();

    let config = args.bus.apply(
        ActorConfig::new("subscriber")
            .with_input(args.sub_topic)
            .with_command_topic("feedback/python1"),
    );

    run_actor(config, SubscriberActor::new()).await
}
