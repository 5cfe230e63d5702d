//! # sensor_actors
//!
//! The concrete actors of the sensor deployment, each shipped as its own
//! binary:
//!
//! - `temperature_publisher`, `humidity_publisher`, `sine_publisher`:
//!   simulated single-value sensors ([`publisher`]).
//! - `processor`: fuses temperature and humidity into heat index and dew
//!   point ([`processor`]).
//! - `relay`: republishes one stream at a bounded rate.
//! - `subscriber`: logs every sensor reading ([`subscriber`]).
//! - `message_logger`: writes every bus message to a rotating log file
//!   ([`message_log`]).

pub mod cli;
pub mod message_log;
pub mod processor;
pub mod publisher;
pub mod subscriber;

use std::process::ExitCode;

use anyhow::Result;
use sensor_actor::{Actor, ActorConfig, ActorRunner};
use tracing::{error, info};

/// Run `actor` until it is stopped and map the outcome to an exit code.
///
/// Stops by command or signal exit with success; a fault inside the loop
/// exits with failure after teardown. A connection failure is logged and
/// returned.
///
/// # Errors
///
/// Returns an error if the actor could not connect or subscribe.
pub async fn run_actor<A: Actor>(config: ActorConfig, actor: A) -> Result<ExitCode> {
    let name = config.name.clone();
    match ActorRunner::new(config).run(actor).await {
        Ok(outcome) => {
            info!(actor = name, reason = %outcome.reason, ticks = outcome.ticks, "actor exited");
            Ok(if outcome.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(e) => {
            error!(actor = name, error = ?e, "actor failed to start");
            Err(e)
        }
    }
}
