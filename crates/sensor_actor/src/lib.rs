//! # sensor_actor
//!
//! Actor runtime for the sensor bus.
//!
//! This crate provides the harness that turns an actor into a standalone
//! bus-connected process. Each actor:
//!
//! 1. Connects to NATS.
//! 2. Subscribes to its input topics and its `feedback/<name>` command topic.
//! 3. Dispatches inbound messages and ticks until a `stop` command or a
//!    termination signal arrives.
//! 4. Unsubscribes and disconnects.
//!
//! Actors that derive values from several streams use [`FusionActor`]: a
//! [`LatestValueStore`] fed by the inputs and a [`FusionEngine`] that
//! publishes at most once per interval, and only from complete snapshots.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use sensor_actor::{ActorConfig, ActorRunner, FusionActor, InputBinding, Passthrough};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let actor = FusionActor::new(
//!         vec![InputBinding::new("sensoren/python1", "python1")],
//!         vec!["python1".to_string()],
//!         "sensoren/relay",
//!         Duration::from_secs(1),
//!         Passthrough::new("python1", 6),
//!     );
//!     let config = ActorConfig::new("relay").with_inputs(actor.input_patterns());
//!
//!     ActorRunner::new(config).run(actor).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod fusion;
pub mod fusion_actor;
pub mod lifecycle;
pub mod logging;
pub mod runner;
pub mod signals;
pub mod store;

pub use config::ActorConfig;
pub use context::TickContext;
pub use fusion::{Derive, DeriveError, FusionEngine, FusionTick, Passthrough, PublicationGate};
pub use fusion_actor::{FusionActor, InputBinding, RESET_COMMAND};
pub use lifecycle::{Lifecycle, LifecycleState, StopReason};
pub use logging::init_tracing;
pub use runner::{Actor, ActorRunner, RunOutcome};
pub use store::{LatestValueStore, MissingStream, Snapshot};
