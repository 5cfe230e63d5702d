//! Payload codec helpers.
//!
//! Single-value streams carry a UTF-8 decimal string; composite records are
//! JSON. Command payloads are plain text.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{NetError, ParseError};

/// Parse a single numeric reading from a payload.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns a [`ParseError`] naming why the payload was rejected.
pub fn parse_reading(payload: &[u8]) -> Result<f64, ParseError> {
    let text = std::str::from_utf8(payload)?.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    let value: f64 = text.parse().map_err(|_| ParseError::NotNumeric {
        text: text.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ParseError::NonFinite {
            text: text.to_string(),
        });
    }
    Ok(value)
}

/// Render a reading with a fixed number of decimals.
#[must_use]
pub fn format_reading(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

/// Encode a record to JSON bytes.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode_record<T: Serialize>(record: &T) -> Result<Vec<u8>, NetError> {
    Ok(serde_json::to_vec(record)?)
}

/// Decode a JSON record.
///
/// # Errors
///
/// Returns [`ParseError::Record`] if the payload is not a valid record.
pub fn decode_record<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ParseError> {
    serde_json::from_slice(payload).map_err(ParseError::Record)
}

/// A command received on an actor's command topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Shut the actor down.
    Stop,
    /// Any other token, passed on to the actor unchanged (trimmed).
    Other(String),
}

impl Command {
    /// The token that requests shutdown, compared case-insensitively.
    pub const STOP_TOKEN: &'static str = "stop";

    /// Parse a command payload.
    ///
    /// The payload is trimmed and compared case-insensitively against
    /// [`Command::STOP_TOKEN`]. Invalid UTF-8 is decoded lossily and can never
    /// be a stop command.
    #[must_use]
    pub fn parse(payload: &[u8]) -> Self {
        let text = String::from_utf8_lossy(payload);
        let text = text.trim();
        if text.eq_ignore_ascii_case(Self::STOP_TOKEN) {
            Self::Stop
        } else {
            Self::Other(text.to_string())
        }
    }

    /// Returns `true` for [`Command::Stop`].
    #[must_use]
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reading() {
        assert!((parse_reading(b"20.00").unwrap() - 20.0).abs() < f64::EPSILON);
        assert!((parse_reading(b" -3.5\n").unwrap() + 3.5).abs() < f64::EPSILON);
        assert!((parse_reading(b"60").unwrap() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_reading_rejects_text() {
        assert!(matches!(
            parse_reading(b"abc"),
            Err(ParseError::NotNumeric { text }) if text == "abc"
        ));
        assert!(matches!(parse_reading(b"   "), Err(ParseError::Empty)));
        assert!(matches!(parse_reading(&[0xFF, 0xFE]), Err(ParseError::Utf8(_))));
        assert!(matches!(parse_reading(b"NaN"), Err(ParseError::NonFinite { .. })));
        assert!(matches!(parse_reading(b"inf"), Err(ParseError::NonFinite { .. })));
    }

    #[test]
    fn test_format_reading() {
        assert_eq!(format_reading(20.0, 2), "20.00");
        assert_eq!(format_reading(61.26, 1), "61.3");
        assert_eq!(format_reading(0.099_833_4, 6), "0.099833");
    }

    #[test]
    fn test_decode_record_rejects_garbage() {
        let result: Result<serde_json::Value, _> = decode_record(b"{not json");
        assert!(matches!(result, Err(ParseError::Record(_))));
    }

    #[test]
    fn test_command_stop_variants() {
        for payload in ["stop", "STOP", "Stop", "stop ", "  sToP\n"] {
            assert_eq!(Command::parse(payload.as_bytes()), Command::Stop, "{payload:?}");
        }
    }

    #[test]
    fn test_command_other() {
        assert_eq!(Command::parse(b"pause"), Command::Other("pause".to_string()));
        assert_eq!(Command::parse(b"stopp"), Command::Other("stopp".to_string()));
        assert_eq!(Command::parse(b"s top"), Command::Other("s top".to_string()));
        assert!(!Command::parse(b"").is_stop());
    }
}
