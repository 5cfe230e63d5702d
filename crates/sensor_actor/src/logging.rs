//! Tracing setup shared by every actor binary.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` is honoured; `directives` (e.g. `["processor=info"]`) are
/// added on top so the binary's own events show up without configuration.
///
/// # Errors
///
/// Returns an error if a directive does not parse or a global subscriber
/// is already installed.
pub fn init_tracing(directives: &[&str]) -> Result<()> {
    let mut filter = EnvFilter::from_default_env()
        .add_directive("sensor_actor=info".parse()?)
        .add_directive("sensor_net=info".parse()?);
    for directive in directives {
        filter = filter.add_directive(directive.parse()?);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!(e))
}
