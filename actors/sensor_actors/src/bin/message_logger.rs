use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sensor_actor::{ActorConfig, init_tracing};
use sensor_actors::cli::BusArgs;
use sensor_actors::message_log::{DEFAULT_BACKUP_COUNT, DEFAULT_MAX_LOG_SIZE, LoggerActor};
use sensor_actors::run_actor;

#[derive(Debug, Parser)]
#[command(name = "message_logger", about = "Writes every bus message to a rotating log file")]
struct Args {
    #[command(flatten)]
    bus: BusArgs,

    /// Topic pattern to record
    #[arg(long, env = "TOPIC_FILTER", default_value = "#")]
    topic_filter: String,

    /// Directory holding the log files
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Size in bytes at which the log rotates
    #[arg(long, env = "MAX_LOG_SIZE", default_value_t = DEFAULT_MAX_LOG_SIZE)]
    max_log_size: u64,

    /// Number of rotated files kept
    #[arg(long, env = "BACKUP_COUNT", default_value_t = DEFAULT_BACKUP_COUNT)]
    backup_count: usize,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing(&["sensor_actors=info", concat!(env!("CARGO_CRATE_NAME"), "=info")])?;
    let args = Args::parse();

    let actor = LoggerActor::open(&args.log_dir, args.max_log_size, args.backup_count)
        .with_context(|| format!("opening log directory {}", args.log_dir.display()))?;
    let config = args
        .bus
        .apply(ActorConfig::new("logger").with_input(args.topic_filter));

    run_actor(config, actor).await
}
