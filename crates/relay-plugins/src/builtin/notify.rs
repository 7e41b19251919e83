//! Plugin posting operator notifications through the logging sink.
//!
//! A headless daemon has no display surface, so notifications land in the
//! structured log stream.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{info, warn};

use relay_protocol::{StatusKind, empty_values};

use crate::capability::{Continuation, Plugin};
use crate::error::PluginError;

const NOTIFY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::notify");

/// Identity the notify plugin is registered under.
pub const NOTIFY_ID: &str = "notify";

/// Emits an operator notification for each command.
///
/// Arguments: `message` (required), `level` (`info` default, or `warn`).
/// The instance counts deliveries across commands; the singleton state
/// survives for the lifetime of the run.
#[derive(Debug, Default)]
pub struct NotifyPlugin {
    delivered: u64,
}

impl NotifyPlugin {
    /// Builds the plugin with a zeroed delivery counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for NotifyPlugin {
    fn id(&self) -> &str {
        NOTIFY_ID
    }

    fn run(
        &mut self,
        continuation: Continuation<'_>,
        data: &BTreeMap<String, String>,
    ) -> Result<(), PluginError> {
        let Some(message) = data.get("message") else {
            continuation(StatusKind::UnspecifiedCommand, empty_values());
            return Ok(());
        };

        let level = data.get("level").map_or("info", String::as_str);
        match level {
            "info" => info!(target: NOTIFY_TARGET, notification = %message, "operator notification"),
            "warn" => warn!(target: NOTIFY_TARGET, notification = %message, "operator notification"),
            _ => {
                continuation(StatusKind::UnsupportedCommand, empty_values());
                return Ok(());
            }
        }

        self.delivered += 1;
        continuation(
            StatusKind::Success,
            json!({"delivered": self.delivered, "level": level}),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn run_with(
        plugin: &mut NotifyPlugin,
        data: &BTreeMap<String, String>,
    ) -> (StatusKind, serde_json::Value) {
        let mut reported = None;
        plugin
            .run(&mut |status, values| reported = Some((status, values)), data)
            .expect("run");
        reported.expect("continuation invoked")
    }

    #[test]
    fn missing_message_reports_unspecified_command() {
        let mut plugin = NotifyPlugin::new();
        let (status, _values) = run_with(&mut plugin, &BTreeMap::new());
        assert_eq!(status, StatusKind::UnspecifiedCommand);
    }

    #[rstest]
    #[case::info("info", StatusKind::Success)]
    #[case::warn("warn", StatusKind::Success)]
    #[case::unknown("shouting", StatusKind::UnsupportedCommand)]
    fn level_selection(#[case] level: &str, #[case] expected: StatusKind) {
        let mut plugin = NotifyPlugin::new();
        let data = BTreeMap::from([
            ("message".to_owned(), "disk full".to_owned()),
            ("level".to_owned(), level.to_owned()),
        ]);
        let (status, _values) = run_with(&mut plugin, &data);
        assert_eq!(status, expected);
    }

    #[test]
    fn delivery_counter_persists_across_commands() {
        let mut plugin = NotifyPlugin::new();
        let data = BTreeMap::from([("message".to_owned(), "backup finished".to_owned())]);

        let (first_status, first_values) = run_with(&mut plugin, &data);
        let (_second_status, second_values) = run_with(&mut plugin, &data);

        assert_eq!(first_status, StatusKind::Success);
        assert_eq!(first_values, json!({"delivered": 1, "level": "info"}));
        assert_eq!(second_values["delivered"], json!(2));
    }
}
