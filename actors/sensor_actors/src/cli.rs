//! Command-line and environment configuration shared by the binaries.

use std::time::Duration;

use clap::Args;
use sensor_actor::ActorConfig;

/// Bus flags every actor accepts.
#[derive(Debug, Clone, Args)]
pub struct BusArgs {
    /// NATS server URL (falls back to `nats://localhost:4222`).
    #[arg(long, env = "NATS_URL")]
    pub nats_url: Option<String>,

    /// Client name announced to the server.
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// Command topic (defaults to `feedback/<actor>`).
    #[arg(long, env = "FEEDBACK_TOPIC")]
    pub feedback_topic: Option<String>,
}

impl BusArgs {
    /// Apply the overrides to an actor config.
    #[must_use]
    pub fn apply(&self, mut config: ActorConfig) -> ActorConfig {
        if let Some(url) = &self.nats_url {
            config = config.with_nats_url(url.clone());
        }
        if let Some(client_id) = &self.client_id {
            config = config.with_client_name(client_id.clone());
        }
        if let Some(topic) = &self.feedback_topic {
            config = config.with_command_topic(topic.clone());
        }
        config
    }
}

/// Parse a positive number of seconds (e.g. `1.0`, `0.25`).
///
/// # Errors
///
/// Returns a message if the value is not a positive, finite number.
pub fn parse_interval(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("{value:?} is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("{value:?} must be a positive number of seconds"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

/// Parse a finite number, for simulation parameters.
///
/// # Errors
///
/// Returns a message if the value is not a number or is NaN or infinite.
pub fn parse_finite(value: &str) -> Result<f64, String> {
    let number: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("{value:?} is not a number"))?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(format!("{value:?} must be a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestArgs {
        #[command(flatten)]
        bus: BusArgs,
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1.0").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_interval("0.25").unwrap(), Duration::from_millis(250));
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("-1").is_err());
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("inf").is_err());
    }

    #[test]
    fn test_parse_finite() {
        assert_eq!(parse_finite("0.5").unwrap(), 0.5);
        assert_eq!(parse_finite(" -3 ").unwrap(), -3.0);
        assert!(parse_finite("NaN").is_err());
        assert!(parse_finite("inf").is_err());
        assert!(parse_finite("-infinity").is_err());
        assert!(parse_finite("warm").is_err());
    }

    #[test]
    fn test_finite_flag_rejects_nan() {
        #[derive(Debug, Parser)]
        struct NoiseArgs {
            #[arg(long, default_value_t = 0.5, value_parser = parse_finite)]
            noise_level: f64,
        }

        assert_eq!(NoiseArgs::parse_from(["test"]).noise_level, 0.5);
        assert_eq!(
            NoiseArgs::parse_from(["test", "--noise-level", "1.5"]).noise_level,
            1.5
        );
        assert!(NoiseArgs::try_parse_from(["test", "--noise-level", "NaN"]).is_err());
    }

    #[test]
    fn test_bus_args_override_config() {
        let args = TestArgs::parse_from([
            "test",
            "--nats-url",
            "nats://bus:4222",
            "--client-id",
            "DataProcessor",
            "--feedback-topic",
            "feedback/custom",
        ]);
        let config = args.bus.apply(ActorConfig::new("processor"));
        assert_eq!(config.nats_url.as_deref(), Some("nats://bus:4222"));
        assert_eq!(config.client_name(), "DataProcessor");
        assert_eq!(config.command_topic, "feedback/custom");
    }

    #[test]
    fn test_bus_args_keep_defaults() {
        let bus = BusArgs {
            nats_url: None,
            client_id: None,
            feedback_topic: None,
        };
        let config = bus.apply(ActorConfig::new("processor"));
        assert_eq!(config.command_topic, "feedback/processor");
        assert!(config.nats_url.is_none());
    }
}
