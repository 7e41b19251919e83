//! Envelope routing from raw request bytes to plugin invocation.

use tracing::{error, info, warn};

use relay_plugins::{PluginError, PluginRegistry};
use relay_protocol::{
    CommandEnvelope, DISPATCHER_ID, ResponseEnvelope, StatusKind, UNRESOLVED_PLUGIN,
};

use crate::transport::{Responder, TransportHandler};

use super::DISPATCH_TARGET;
use super::errors::DispatchError;

/// Routes inbound commands to plugin instances.
///
/// The router owns the plugin registry: instances are resolved and invoked
/// on the single dispatch flow, so no locking is involved. Every call to
/// [`TransportHandler::command_received`] produces exactly one response.
pub struct CommandRouter {
    registry: PluginRegistry,
}

impl CommandRouter {
    /// Builds a router over a frozen registry.
    #[must_use]
    pub fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }

    /// Returns the registry, primarily for inspection in tests.
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    fn dispatch(
        &mut self,
        raw: &[u8],
        responder: &mut dyn Responder,
    ) -> Result<(), DispatchError> {
        let envelope = match CommandEnvelope::parse(raw) {
            Ok(envelope) => envelope,
            Err(error) => return reject(responder, error.into()),
        };

        if envelope.command_type_defaulted() {
            warn!(
                target: DISPATCH_TARGET,
                plugin = envelope.name(),
                "command type absent, defaulting to sync"
            );
        }

        if let Err(error) = envelope.validate() {
            return reject(responder, error.into());
        }

        let name = envelope.name().to_owned();
        // Absence short-circuits: the peer is told the plugin is unknown
        // and no invocation is attempted.
        let Some(plugin) = self.registry.resolve(&name) else {
            return reject(responder, DispatchError::unresolved(name));
        };

        let mut outcome = None;
        let invocation = plugin.run(
            &mut |status, values| outcome = Some((status, values)),
            &envelope.data,
        );

        match invocation {
            Ok(()) => match outcome {
                Some((status, values)) => {
                    responder.send(&ResponseEnvelope::with_values(
                        name,
                        status.result(),
                        values,
                    ))?;
                    Ok(())
                }
                None => reject(
                    responder,
                    DispatchError::invocation(
                        name.clone(),
                        PluginError::execution(name, "completed without reporting an outcome"),
                    ),
                ),
            },
            Err(source) => reject(responder, DispatchError::invocation(name, source)),
        }
    }
}

/// Reports a dispatch failure to the peer as a status-coded response.
fn reject(responder: &mut dyn Responder, error: DispatchError) -> Result<(), DispatchError> {
    let Some(status) = error.status() else {
        return Err(error);
    };

    let envelope = match &error {
        DispatchError::UnresolvedPlugin { name } => {
            warn!(target: DISPATCH_TARGET, plugin = %name, %error, "command rejected");
            ResponseEnvelope::new(UNRESOLVED_PLUGIN, status.result())
        }
        DispatchError::PluginInvocation { name, source } => {
            error!(
                target: DISPATCH_TARGET,
                plugin = %name,
                kind = source.kind(),
                %source,
                "plugin invocation failed"
            );
            let detail = format!("{}: {source}", source.kind());
            ResponseEnvelope::new(name, status.result().with_further_info(detail))
        }
        _ => {
            warn!(target: DISPATCH_TARGET, %error, "command rejected");
            ResponseEnvelope::new(DISPATCHER_ID, status.result())
        }
    };

    responder.send(&envelope)?;
    Ok(())
}

impl TransportHandler for CommandRouter {
    fn connection_formed(&mut self, responder: &mut dyn Responder) {
        info!(target: DISPATCH_TARGET, "connection formed");
        let greeting = ResponseEnvelope::new(DISPATCHER_ID, StatusKind::ConnectionFormed.result());
        if let Err(send_error) = responder.send(&greeting) {
            warn!(
                target: DISPATCH_TARGET,
                error = %send_error,
                "failed to deliver connection greeting"
            );
        }
    }

    fn command_received(&mut self, raw: &[u8], responder: &mut dyn Responder) {
        if let Err(dispatch_error) = self.dispatch(raw, responder) {
            // Only delivery failures end up here; the peer is unreachable,
            // so the failure can only be logged.
            warn!(
                target: DISPATCH_TARGET,
                error = %dispatch_error,
                "failed to deliver response"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::rstest;
    use serde_json::json;

    use relay_plugins::builtin::{ECHO_ID, EchoPlugin, NOTIFY_ID, NotifyPlugin};
    use relay_plugins::{Continuation, Plugin};
    use relay_protocol::empty_values;

    use crate::transport::{QuitHandle, RecordingResponder};

    use super::super::server_plugin::ServerPlugin;
    use super::*;

    /// Plugin whose invocation always fails.
    struct FaultyPlugin;

    impl Plugin for FaultyPlugin {
        fn id(&self) -> &str {
            "faulty"
        }

        fn run(
            &mut self,
            _continuation: Continuation<'_>,
            _data: &BTreeMap<String, String>,
        ) -> Result<(), PluginError> {
            Err(PluginError::execution("faulty", "backing store is gone"))
        }
    }

    /// Plugin that returns without touching the continuation.
    struct SilentPlugin;

    impl Plugin for SilentPlugin {
        fn id(&self) -> &str {
            "silent"
        }

        fn run(
            &mut self,
            _continuation: Continuation<'_>,
            _data: &BTreeMap<String, String>,
        ) -> Result<(), PluginError> {
            Ok(())
        }
    }

    fn router_with_builtins(quit: &QuitHandle) -> CommandRouter {
        let mut builder = PluginRegistry::builder();
        builder
            .register(ECHO_ID, || Box::new(EchoPlugin::new()))
            .expect("register echo");
        builder
            .register(NOTIFY_ID, || Box::new(NotifyPlugin::new()))
            .expect("register notify");
        builder
            .register("faulty", || Box::new(FaultyPlugin))
            .expect("register faulty");
        builder
            .register("silent", || Box::new(SilentPlugin))
            .expect("register silent");
        builder
            .register_instance(Box::new(ServerPlugin::new(quit.clone())))
            .expect("register server");
        CommandRouter::new(builder.build())
    }

    fn single_response(router: &mut CommandRouter, raw: &[u8]) -> ResponseEnvelope {
        let mut responder = RecordingResponder::default();
        router.command_received(raw, &mut responder);
        assert_eq!(responder.sent.len(), 1, "exactly one response per command");
        responder.sent.remove(0)
    }

    #[rstest]
    #[case::not_json(b"not json at all".as_slice())]
    #[case::empty(b"\n".as_slice())]
    #[case::missing_name(br#"{"data":{"command":"quit"}}"#.as_slice())]
    #[case::blank_name(br#"{"name":"  ","data":{}}"#.as_slice())]
    fn unusable_payloads_report_invalid_json(#[case] raw: &[u8]) {
        let mut router = router_with_builtins(&QuitHandle::new());
        let response = single_response(&mut router, raw);
        assert_eq!(response.status.code, StatusKind::InvalidJson.code());
        assert_eq!(response.plugin, DISPATCHER_ID);
        assert_eq!(response.status.further_info, None);
    }

    #[test]
    fn unknown_plugin_reports_not_found_with_literal_context() {
        let mut router = router_with_builtins(&QuitHandle::new());
        let response = single_response(&mut router, br#"{"name":"nonexistent","data":{}}"#);
        assert_eq!(response.status.code, StatusKind::PluginNotFound.code());
        assert_eq!(response.plugin, UNRESOLVED_PLUGIN);
        assert_eq!(response.values, empty_values());
    }

    #[test]
    fn unknown_plugin_short_circuits_without_invocation() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut builder = PluginRegistry::builder();
        let constructions = Arc::clone(&attempts);
        builder
            .register("tracked", move || {
                constructions.fetch_add(1, Ordering::SeqCst);
                Box::new(SilentPlugin)
            })
            .expect("register tracked");
        let mut router = CommandRouter::new(builder.build());

        let response = single_response(&mut router, br#"{"name":"nonexistent","data":{}}"#);
        assert_eq!(response.status.code, StatusKind::PluginNotFound.code());
        assert_eq!(attempts.load(Ordering::SeqCst), 0, "no plugin activated");
        assert!(!router.registry().is_active("tracked"));
    }

    #[test]
    fn resolved_plugin_outcome_is_packaged_under_its_identity() {
        let mut router = router_with_builtins(&QuitHandle::new());
        let response = single_response(
            &mut router,
            br#"{"name":"echo","type":"sync","data":{"command":"ping"}}"#,
        );
        assert_eq!(response.plugin, ECHO_ID);
        assert_eq!(response.status.code, StatusKind::Success.code());
        assert_eq!(response.values, json!({"command": "ping"}));
    }

    #[test]
    fn server_quit_command_reports_success_and_trips_quit() {
        let quit = QuitHandle::new();
        let mut router = router_with_builtins(&quit);
        let response = single_response(
            &mut router,
            br#"{"name":"server","type":"sync","data":{"command":"quit"}}"#,
        );
        assert_eq!(response.plugin, DISPATCHER_ID);
        assert_eq!(response.status.code, StatusKind::Success.code());
        assert!(quit.is_requested());
    }

    #[test]
    fn server_without_command_reports_unspecified() {
        let mut router = router_with_builtins(&QuitHandle::new());
        let response = single_response(&mut router, br#"{"name":"server","data":{}}"#);
        assert_eq!(
            response.status.code,
            StatusKind::UnspecifiedCommand.code()
        );
    }

    #[test]
    fn plugin_failure_reports_unknown_error_with_detail() {
        let mut router = router_with_builtins(&QuitHandle::new());
        let response = single_response(&mut router, br#"{"name":"faulty","data":{}}"#);
        assert_eq!(
            response.status.code,
            StatusKind::PluginErrorUnknown.code()
        );
        assert_eq!(response.plugin, "faulty");
        let detail = response.status.further_info.expect("further info");
        assert!(detail.starts_with("execution:"));
        assert!(detail.contains("backing store is gone"));
    }

    #[test]
    fn plugin_skipping_the_continuation_reports_unknown_error() {
        let mut router = router_with_builtins(&QuitHandle::new());
        let response = single_response(&mut router, br#"{"name":"silent","data":{}}"#);
        assert_eq!(
            response.status.code,
            StatusKind::PluginErrorUnknown.code()
        );
        assert!(response.status.further_info.is_some());
    }

    #[test]
    fn plugin_state_persists_across_commands() {
        let mut router = router_with_builtins(&QuitHandle::new());
        let request = br#"{"name":"notify","data":{"message":"first"}}"#;

        let first = single_response(&mut router, request);
        let second = single_response(&mut router, request);

        assert_eq!(first.values["delivered"], json!(1));
        assert_eq!(second.values["delivered"], json!(2));
    }

    #[test]
    fn missing_type_is_tolerated() {
        let mut router = router_with_builtins(&QuitHandle::new());
        let response = single_response(&mut router, br#"{"name":"echo","data":{}}"#);
        assert_eq!(response.status.code, StatusKind::Success.code());
    }

    #[test]
    fn connection_formed_greets_with_dispatcher_identity() {
        let mut router = router_with_builtins(&QuitHandle::new());
        let mut responder = RecordingResponder::default();
        router.connection_formed(&mut responder);

        assert_eq!(responder.sent.len(), 1);
        let greeting = &responder.sent[0];
        assert_eq!(greeting.plugin, DISPATCHER_ID);
        assert_eq!(
            greeting.status.code,
            StatusKind::ConnectionFormed.code()
        );
    }
}
