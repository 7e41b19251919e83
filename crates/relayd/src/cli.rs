//! CLI argument definitions for the relay daemon.

use std::str::FromStr;

use clap::Parser;

use relay_config::{Config, LogFormat, SocketEndpoint, TransportKind};

/// Command-line interface for the relay dispatch daemon.
#[derive(Parser, Debug)]
#[command(name = "relayd", version, about = "Remote-command dispatch daemon")]
pub struct Cli {
    /// Transport collaborator to bind (`socket` or `ssh`).
    #[arg(value_name = "TRANSPORT", value_parser = parse_transport)]
    pub transport: Option<TransportKind>,

    /// Listen endpoint override (`tcp://host:port` or `unix:///path`).
    #[arg(long, value_name = "ENDPOINT", value_parser = parse_endpoint)]
    pub listen: Option<SocketEndpoint>,

    /// Tracing filter override (for example `info,relayd::dispatch=debug`).
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Log output format override (`json` or `compact`).
    #[arg(long, value_name = "FORMAT", value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Resolves the daemon configuration: defaults with CLI overrides.
    #[must_use]
    pub fn into_config(self) -> Config {
        let mut config = Config::default();
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(log_filter) = self.log_filter {
            config.log_filter = log_filter;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        config
    }
}

fn parse_transport(value: &str) -> Result<TransportKind, String> {
    TransportKind::from_str(value).map_err(|_| format!("unsupported transport kind '{value}'"))
}

fn parse_endpoint(value: &str) -> Result<SocketEndpoint, String> {
    SocketEndpoint::from_str(value).map_err(|parse_error| parse_error.to_string())
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    LogFormat::from_str(value).map_err(|_| format!("unsupported log format '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_resolves_defaults() {
        let cli = Cli::parse_from(["relayd"]);
        let config = cli.into_config();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn positional_argument_selects_the_transport() {
        let cli = Cli::parse_from(["relayd", "ssh"]);
        assert_eq!(cli.transport, Some(TransportKind::Ssh));
    }

    #[test]
    fn rejects_unknown_transport_kinds() {
        let result = Cli::try_parse_from(["relayd", "telegraph"]);
        assert!(result.is_err());
    }

    #[test]
    fn listen_override_is_applied() {
        let cli = Cli::parse_from(["relayd", "--listen", "tcp://127.0.0.1:22001"]);
        let config = cli.into_config();
        assert_eq!(config.listen, SocketEndpoint::tcp("127.0.0.1", 22001));
    }

    #[test]
    fn rejects_malformed_listen_endpoints() {
        let result = Cli::try_parse_from(["relayd", "--listen", "ftp://127.0.0.1:21"]);
        assert!(result.is_err());
    }

    #[test]
    fn log_overrides_are_applied() {
        let cli = Cli::parse_from(["relayd", "--log-filter", "debug", "--log-format", "compact"]);
        let config = cli.into_config();
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.log_format(), LogFormat::Compact);
    }
}
