//! # sensor_net
//!
//! Bus transport layer for the sensor actors.
//!
//! This crate provides:
//!
//! - [`topics`]: the `sensoren/…` and `feedback/…` topic hierarchy and
//!   wildcard matching.
//! - [`messages`]: typed inbound/outbound messages and records.
//! - [`codec`]: payload parsing and rendering helpers.
//! - [`bus`]: the [`Bus`] capability actors are written against.
//! - [`connection`]: the NATS-backed [`Bus`].
//! - [`memory`]: an in-process [`Bus`] for tests.
//! - [`error`]: network-layer error types.

pub mod bus;
pub mod codec;
pub mod connection;
pub mod error;
pub mod memory;
pub mod messages;
pub mod topics;

pub use bus::Bus;
pub use codec::{Command, format_reading, parse_reading};
pub use connection::NatsConnection;
pub use error::{NetError, ParseError};
pub use memory::MemoryBus;
pub use messages::{InboundMessage, Outbound, Payload, ProcessedRecord, ScalarReading, StreamReading};
