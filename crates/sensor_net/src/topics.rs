//! Topic hierarchy.
//!
//! Topics are `/`-separated paths. Sensor readings live under `sensoren/`,
//! remote control commands under `feedback/<actor>`. Patterns use `+` to
//! match exactly one level and a trailing `#` to match any remainder.
//!
//! The NATS transport uses `.` separators with `*` and `>` wildcards, so
//! topics are translated with [`to_subject`] and [`from_subject`] at the
//! transport boundary only.

use crate::error::NetError;

/// Root level for sensor reading topics.
pub const SENSOR_ROOT: &str = "sensoren";

/// Root level for command topics.
pub const FEEDBACK_ROOT: &str = "feedback";

/// Matches every direct child of [`SENSOR_ROOT`].
pub const SENSOR_WILDCARD: &str = "sensoren/+";

/// Matches every topic.
pub const ALL_TOPICS: &str = "#";

const LEVEL_SEPARATOR: char = '/';
const SINGLE_LEVEL: &str = "+";
const MULTI_LEVEL: &str = "#";

// ── Builders ────────────────────────────────────────────────────────────────

/// Build the topic a sensor of the given kind publishes on.
///
/// `sensoren/<kind>`
#[must_use]
pub fn sensor(kind: &str) -> String {
    format!("{SENSOR_ROOT}/{kind}")
}

/// Build the command topic for an actor.
///
/// `feedback/<actor>`
#[must_use]
pub fn feedback(actor: &str) -> String {
    format!("{FEEDBACK_ROOT}/{actor}")
}

/// The last level of a topic, e.g. `temperature` for `sensoren/temperature`.
#[must_use]
pub fn leaf(topic: &str) -> &str {
    topic.rsplit(LEVEL_SEPARATOR).next().unwrap_or(topic)
}

// ── Matching ────────────────────────────────────────────────────────────────

/// Returns `true` if `topic` is matched by `pattern`.
///
/// `+` matches exactly one level, `#` (only valid as the final level)
/// matches zero or more remaining levels. Anything else must match the
/// level literally.
#[must_use]
pub fn matches(pattern: &str, topic: &str) -> bool {
    let mut pattern_levels = pattern.split(LEVEL_SEPARATOR);
    let mut topic_levels = topic.split(LEVEL_SEPARATOR);

    loop {
        match (pattern_levels.next(), topic_levels.next()) {
            (Some(MULTI_LEVEL), _) => return true,
            (Some(SINGLE_LEVEL), Some(_)) => {}
            (Some(p), Some(t)) if p == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Check that a topic or pattern is well formed.
///
/// # Errors
///
/// Returns [`NetError::InvalidTopic`] for empty topics, empty levels, levels
/// containing `.` or whitespace, a `#` anywhere but the final level, or a
/// wildcard mixed with other characters inside one level.
pub fn validate(topic: &str) -> Result<(), NetError> {
    let invalid = |reason| NetError::InvalidTopic {
        topic: topic.to_string(),
        reason,
    };

    if topic.is_empty() {
        return Err(invalid("topic is empty"));
    }

    let levels: Vec<&str> = topic.split(LEVEL_SEPARATOR).collect();
    let last = levels.len() - 1;
    for (idx, level) in levels.iter().enumerate() {
        if level.is_empty() {
            return Err(invalid("empty level"));
        }
        if level.contains('.') || level.chars().any(char::is_whitespace) {
            return Err(invalid("level contains '.' or whitespace"));
        }
        if *level == MULTI_LEVEL && idx != last {
            return Err(invalid("'#' must be the final level"));
        }
        if *level != MULTI_LEVEL && *level != SINGLE_LEVEL && level.contains(['+', '#']) {
            return Err(invalid("wildcard must occupy a whole level"));
        }
    }
    Ok(())
}

// ── Transport translation ───────────────────────────────────────────────────

/// Translate a topic or pattern to a NATS subject.
///
/// `sensoren/+` becomes `sensoren.*`, `#` becomes `>`.
///
/// # Errors
///
/// Returns [`NetError::InvalidTopic`] if the topic fails [`validate`].
pub fn to_subject(topic: &str) -> Result<String, NetError> {
    validate(topic)?;
    let subject = topic
        .split(LEVEL_SEPARATOR)
        .map(|level| match level {
            SINGLE_LEVEL => "*",
            MULTI_LEVEL => ">",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(".");
    Ok(subject)
}

/// Translate a concrete NATS subject back to a topic.
#[must_use]
pub fn from_subject(subject: &str) -> String {
    subject.replace('.', "/")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_builders() {
        assert_eq!(sensor("temperature"), "sensoren/temperature");
        assert_eq!(feedback("processor"), "feedback/processor");
        assert_eq!(leaf("sensoren/humidity"), "humidity");
        assert_eq!(leaf("flat"), "flat");
    }

    #[test]
    fn test_single_level_wildcard() {
        assert!(matches(SENSOR_WILDCARD, "sensoren/temperature"));
        assert!(matches(SENSOR_WILDCARD, "sensoren/processed"));
        assert!(!matches(SENSOR_WILDCARD, "sensoren"));
        assert!(!matches(SENSOR_WILDCARD, "sensoren/a/b"));
        assert!(!matches(SENSOR_WILDCARD, "feedback/processor"));
    }

    #[test]
    fn test_multi_level_wildcard() {
        assert!(matches(ALL_TOPICS, "sensoren/temperature"));
        assert!(matches(ALL_TOPICS, "feedback/logger"));
        assert!(matches("sensoren/#", "sensoren"));
        assert!(matches("sensoren/#", "sensoren/a/b"));
        assert!(!matches("sensoren/#", "feedback/a"));
    }

    #[test]
    fn test_literal_match() {
        assert!(matches("feedback/processor", "feedback/processor"));
        assert!(!matches("feedback/processor", "feedback/logger"));
        assert!(!matches("feedback/processor", "feedback/processor/x"));
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert!(validate("").is_err());
        assert!(validate("sensoren//x").is_err());
        assert!(validate("sensoren/a.b").is_err());
        assert!(validate("sensoren/a b").is_err());
        assert!(validate("#/sensoren").is_err());
        assert!(validate("sensoren/temp+").is_err());
        assert!(validate("sensoren/+").is_ok());
        assert!(validate("#").is_ok());
    }

    #[test]
    fn test_subject_translation() {
        assert_eq!(to_subject("sensoren/+").unwrap(), "sensoren.*");
        assert_eq!(to_subject("#").unwrap(), ">");
        assert_eq!(to_subject("feedback/logger").unwrap(), "feedback.logger");
        assert_eq!(from_subject("sensoren.temperature"), "sensoren/temperature");
        assert!(to_subject("bad topic").is_err());
    }

    proptest! {
        #[test]
        fn prop_topic_matches_itself(levels in prop::collection::vec("[a-z0-9_-]{1,8}", 1..5)) {
            let topic = levels.join("/");
            prop_assert!(matches(&topic, &topic));
            prop_assert!(matches(ALL_TOPICS, &topic));
        }

        #[test]
        fn prop_plus_matches_any_single_leaf(leaf_level in "[a-z0-9_-]{1,12}") {
            let topic = sensor(&leaf_level);
            prop_assert!(matches(SENSOR_WILDCARD, &topic));
            prop_assert_eq!(from_subject(&to_subject(&topic).unwrap()), topic);
        }
    }
}
