use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Message delivered by the relay to room members. Validated at the boundary:
/// a payload that is not one of these shapes is rejected, not field-probed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RelayMessage {
    Command {
        value: String,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    Selection {
        // The original broadcast named this field "option".
        #[serde(alias = "option")]
        value: String,
        #[serde(default)]
        timestamp: Option<i64>,
    },
}

impl RelayMessage {
    /// The scan token carried by the message.
    pub fn token(&self) -> &str {
        match self {
            RelayMessage::Command { value, .. } => value,
            RelayMessage::Selection { value, .. } => value,
        }
    }
}

pub fn parse_relay_message(raw: &str) -> AppResult<RelayMessage> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("malformed relay message: {}", e)))
}

/// Reply to the phone-facing scan callout.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScanResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection_message() {
        let msg = parse_relay_message(r#"{"type":"selection","value":"q7_B","timestamp":1712000}"#)
            .expect("selection should parse");
        assert_eq!(msg.token(), "q7_B");
        assert!(matches!(msg, RelayMessage::Selection { .. }));
    }

    #[test]
    fn parses_selection_with_legacy_option_field() {
        let msg = parse_relay_message(r#"{"type":"selection","option":"q7_C"}"#)
            .expect("legacy field should parse");
        assert_eq!(msg.token(), "q7_C");
    }

    #[test]
    fn parses_command_message() {
        let msg =
            parse_relay_message(r#"{"type":"command","value":"c:r"}"#).expect("command should parse");
        assert!(matches!(msg, RelayMessage::Command { .. }));
        assert_eq!(msg.token(), "c:r");
    }

    #[test]
    fn rejects_missing_value() {
        let result = parse_relay_message(r#"{"type":"selection","timestamp":42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_type() {
        let result = parse_relay_message(r#"{"type":"connected","connectionId":"abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_object_payload() {
        assert!(parse_relay_message("\"q7_B\"").is_err());
        assert!(parse_relay_message("not json").is_err());
    }
}
