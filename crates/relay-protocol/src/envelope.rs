//! Request and response envelope schemas.
//!
//! Requests arrive as single JSON lines. Parsing is split from structural
//! validation so the dispatcher can distinguish undecodable payloads from
//! decodable ones that are missing required fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::status::StatusResult;

/// Inbound command envelope naming a plugin and its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Identity of the plugin addressed by this command.
    #[serde(default)]
    pub name: String,
    /// Declared command type; `None` means the peer omitted the field and
    /// the `sync` default applies.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub command_type: Option<String>,
    /// Arguments forwarded verbatim to the plugin. May be empty.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl CommandEnvelope {
    /// Parses a raw request line into an envelope.
    ///
    /// Trailing whitespace (including the line delimiter) is trimmed before
    /// decoding. The result is not yet validated; call
    /// [`CommandEnvelope::validate`] to enforce the schema invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] when the payload is empty or is
    /// not a JSON object matching the envelope shape.
    pub fn parse(raw: &[u8]) -> Result<Self, ProtocolError> {
        let trimmed = trim_trailing_whitespace(raw);
        if trimmed.is_empty() {
            return Err(ProtocolError::malformed("empty request line"));
        }
        serde_json::from_slice(trimmed).map_err(ProtocolError::from_json_error)
    }

    /// Enforces the envelope invariants: `name` present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Invalid`] when the name is missing, empty,
    /// or whitespace-only.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.trim().is_empty() {
            return Err(ProtocolError::invalid("name field is empty"));
        }
        Ok(())
    }

    /// Returns the normalised plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.trim()
    }

    /// Returns the effective command type, applying the `sync` default.
    #[must_use]
    pub fn command_type(&self) -> &str {
        self.command_type
            .as_deref()
            .unwrap_or(crate::SYNC_COMMAND_TYPE)
    }

    /// Returns `true` when the peer omitted the `type` field.
    #[must_use]
    pub fn command_type_defaulted(&self) -> bool {
        self.command_type.is_none()
    }
}

/// Outbound response envelope delivered for every inbound command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Plugin identity, or a literal context string when none resolved.
    pub plugin: String,
    /// Status-coded outcome of the command.
    pub status: StatusResult,
    /// Plugin-produced payload; defaults to the empty string.
    #[serde(default = "empty_values")]
    pub values: Value,
}

impl ResponseEnvelope {
    /// Builds a response with the default empty values payload.
    pub fn new(plugin: impl Into<String>, status: StatusResult) -> Self {
        Self {
            plugin: plugin.into(),
            status,
            values: empty_values(),
        }
    }

    /// Builds a response carrying a plugin-produced payload.
    pub fn with_values(plugin: impl Into<String>, status: StatusResult, values: Value) -> Self {
        Self {
            plugin: plugin.into(),
            status,
            values,
        }
    }
}

/// Default payload carried when a plugin produced no values.
#[must_use]
pub fn empty_values() -> Value {
    Value::String(String::new())
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |position| position + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusKind;

    #[test]
    fn parses_full_envelope() {
        let raw = br#"{"name":"echo","type":"sync","data":{"command":"ping"}}"#;
        let envelope = CommandEnvelope::parse(raw).expect("parse");
        assert_eq!(envelope.name(), "echo");
        assert_eq!(envelope.command_type(), "sync");
        assert!(!envelope.command_type_defaulted());
        assert_eq!(envelope.data.get("command").map(String::as_str), Some("ping"));
    }

    #[test]
    fn missing_type_defaults_to_sync() {
        let raw = br#"{"name":"echo","data":{}}"#;
        let envelope = CommandEnvelope::parse(raw).expect("parse");
        assert!(envelope.command_type_defaulted());
        assert_eq!(envelope.command_type(), "sync");
    }

    #[test]
    fn missing_data_defaults_to_empty_map() {
        let raw = br#"{"name":"echo"}"#;
        let envelope = CommandEnvelope::parse(raw).expect("parse");
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn trims_line_delimiter_before_decoding() {
        let raw = b"{\"name\":\"echo\"}  \r\n";
        let envelope = CommandEnvelope::parse(raw).expect("parse");
        assert_eq!(envelope.name(), "echo");
    }

    #[test]
    fn rejects_empty_payload() {
        let error = CommandEnvelope::parse(b"  \n").expect_err("should reject");
        assert!(matches!(error, ProtocolError::Malformed { .. }));
    }

    #[test]
    fn rejects_non_json_payload() {
        let error = CommandEnvelope::parse(b"not json").expect_err("should reject");
        assert!(matches!(error, ProtocolError::Malformed { .. }));
    }

    #[test]
    fn validate_rejects_missing_name() {
        let envelope = CommandEnvelope::parse(br#"{"data":{}}"#).expect("parse");
        let error = envelope.validate().expect_err("should reject");
        assert!(matches!(error, ProtocolError::Invalid { .. }));
    }

    #[test]
    fn validate_rejects_blank_name() {
        let envelope = CommandEnvelope::parse(br#"{"name":"   "}"#).expect("parse");
        assert!(envelope.validate().is_err());
    }

    #[test]
    fn response_values_default_to_empty_string() {
        let raw = r#"{"plugin":"server","status":{"code":0,"message":"command completed"}}"#;
        let envelope: ResponseEnvelope = serde_json::from_str(raw).expect("decode");
        assert_eq!(envelope.values, empty_values());
    }

    #[test]
    fn response_encodes_status_and_plugin() {
        let envelope = ResponseEnvelope::new("echo", StatusKind::Success.result());
        let encoded = serde_json::to_string(&envelope).expect("encode");
        assert!(encoded.contains(r#""plugin":"echo""#));
        assert!(encoded.contains(r#""code":0"#));
        assert!(encoded.contains(r#""values":"""#));
    }
}
