//! Status registry mapping symbolic outcome kinds to wire results.
//!
//! Every response carries a [`StatusResult`] derived from a [`StatusKind`].
//! Codes and messages are protocol constants: they never change across
//! calls or releases, so clients may test against them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of outcome kinds reported by the dispatch core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// The command completed as requested.
    Success,
    /// The plugin resolved but its `command` argument was absent.
    UnspecifiedCommand,
    /// The plugin resolved but does not support the requested command.
    UnsupportedCommand,
    /// The request payload was not a valid command envelope.
    InvalidJson,
    /// No plugin is registered under the requested name.
    PluginNotFound,
    /// The plugin raised a failure the dispatcher could not classify.
    PluginErrorUnknown,
    /// Informational greeting emitted when a connection is established.
    ConnectionFormed,
}

impl StatusKind {
    /// Stable numeric code identifying this outcome on the wire.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::UnspecifiedCommand => 1,
            Self::UnsupportedCommand => 2,
            Self::InvalidJson => 3,
            Self::PluginNotFound => 4,
            Self::PluginErrorUnknown => 5,
            Self::ConnectionFormed => 6,
        }
    }

    /// Stable human-readable message paired with the code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Success => "command completed",
            Self::UnspecifiedCommand => "no command specified",
            Self::UnsupportedCommand => "command not supported",
            Self::InvalidJson => "request was not a valid command envelope",
            Self::PluginNotFound => "plugin not found",
            Self::PluginErrorUnknown => "plugin failed with an unknown error",
            Self::ConnectionFormed => "connection formed",
        }
    }

    /// Builds the wire form of this outcome.
    #[must_use]
    pub fn result(self) -> StatusResult {
        StatusResult {
            code: self.code(),
            message: self.message().to_owned(),
            further_info: None,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::UnspecifiedCommand => "unspecified_command",
            Self::UnsupportedCommand => "unsupported_command",
            Self::InvalidJson => "invalid_json",
            Self::PluginNotFound => "plugin_not_found",
            Self::PluginErrorUnknown => "plugin_error_unknown",
            Self::ConnectionFormed => "connection_formed",
        };
        formatter.write_str(label)
    }
}

/// Wire form of an outcome: a stable code, its message, and optional detail.
///
/// `further_info` is populated only on the unknown-plugin-error path and is
/// omitted from the serialized form everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    /// Stable numeric outcome code.
    pub code: i32,
    /// Stable human-readable outcome message.
    pub message: String,
    /// Diagnostic detail carried on the unknown-error path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub further_info: Option<String>,
}

impl StatusResult {
    /// Attaches diagnostic detail to this result.
    #[must_use]
    pub fn with_further_info(mut self, detail: impl Into<String>) -> Self {
        self.further_info = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(StatusKind::Success, 0)]
    #[case(StatusKind::UnspecifiedCommand, 1)]
    #[case(StatusKind::UnsupportedCommand, 2)]
    #[case(StatusKind::InvalidJson, 3)]
    #[case(StatusKind::PluginNotFound, 4)]
    #[case(StatusKind::PluginErrorUnknown, 5)]
    #[case(StatusKind::ConnectionFormed, 6)]
    fn codes_are_protocol_constants(#[case] kind: StatusKind, #[case] code: i32) {
        assert_eq!(kind.code(), code);
    }

    #[test]
    fn results_are_referentially_stable() {
        let first = StatusKind::PluginNotFound.result();
        let second = StatusKind::PluginNotFound.result();
        assert_eq!(first, second);
    }

    #[test]
    fn result_round_trips_through_wire_form() {
        let result = StatusKind::UnsupportedCommand.result();
        let encoded = serde_json::to_string(&result).expect("encode");
        let decoded: StatusResult = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded.code, result.code);
        assert_eq!(decoded.message, result.message);
        assert_eq!(decoded.further_info, None);
    }

    #[test]
    fn further_info_is_omitted_unless_populated() {
        let bare = serde_json::to_string(&StatusKind::Success.result()).expect("encode");
        assert!(!bare.contains("further_info"));

        let detailed = StatusKind::PluginErrorUnknown
            .result()
            .with_further_info("execution: worker exploded");
        let encoded = serde_json::to_string(&detailed).expect("encode");
        assert!(encoded.contains(r#""further_info":"execution: worker exploded""#));
    }
}
