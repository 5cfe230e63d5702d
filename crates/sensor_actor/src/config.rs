//! Actor configuration.

use std::time::Duration;

use sensor_net::topics;

/// Default interval between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Default capacity of the inbound message channel.
pub const DEFAULT_INBOUND_CAPACITY: usize = 256;

/// Configuration for an actor process.
#[derive(Debug, Clone)]
pub struct ActorConfig {
    /// Human-readable actor name (e.g. `"processor"`).
    pub name: String,
    /// Topic patterns carrying input data.
    pub inputs: Vec<String>,
    /// Topic carrying remote commands (defaults to `feedback/<name>`).
    pub command_topic: String,
    /// Optional NATS URL override (defaults to `NATS_URL` env or localhost).
    pub nats_url: Option<String>,
    /// Client name announced to the server (defaults to the actor name).
    pub client_name: Option<String>,
    /// Idle wait between ticks; also bounds shutdown latency.
    pub tick_interval: Duration,
    /// Capacity of the bounded inbound channel.
    pub inbound_capacity: usize,
}

impl ActorConfig {
    /// Create a config with no inputs and the conventional command topic.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            command_topic: topics::feedback(&name),
            name,
            inputs: Vec::new(),
            nats_url: None,
            client_name: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
        }
    }

    /// Add an input topic pattern.
    #[must_use]
    pub fn with_input(mut self, pattern: impl Into<String>) -> Self {
        self.inputs.push(pattern.into());
        self
    }

    /// Add several input topic patterns.
    #[must_use]
    pub fn with_inputs<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Override the command topic.
    #[must_use]
    pub fn with_command_topic(mut self, topic: impl Into<String>) -> Self {
        self.command_topic = topic.into();
        self
    }

    /// Override the NATS URL for this actor.
    #[must_use]
    pub fn with_nats_url(mut self, url: impl Into<String>) -> Self {
        self.nats_url = Some(url.into());
        self
    }

    /// Override the client name announced to the server.
    #[must_use]
    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    /// Override the tick interval (at least 1 ms).
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Override the inbound channel capacity (at least 1).
    #[must_use]
    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity.max(1);
        self
    }

    /// The client name to announce, falling back to the actor name.
    #[must_use]
    pub fn client_name(&self) -> &str {
        self.client_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ActorConfig::new("processor");
        assert_eq!(config.command_topic, "feedback/processor");
        assert_eq!(config.client_name(), "processor");
        assert!(config.inputs.is_empty());
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn test_builder() {
        let config = ActorConfig::new("logger")
            .with_inputs(["#"])
            .with_input("sensoren/+")
            .with_command_topic("feedback/log")
            .with_client_name("MessageLogger")
            .with_inbound_capacity(0);
        assert_eq!(config.inputs, vec!["#", "sensoren/+"]);
        assert_eq!(config.command_topic, "feedback/log");
        assert_eq!(config.client_name(), "MessageLogger");
        assert_eq!(config.inbound_capacity, 1);
    }
}
