//! Transport collaborator selection.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Transport collaborators selectable at daemon launch.
///
/// The daemon ships a socket listener; `ssh` names the alternate
/// collaborator slot and is rejected at launch until one is linked in.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TransportKind {
    /// TCP or Unix domain socket listener.
    #[default]
    Socket,
    /// SSH channel listener provided by an external collaborator.
    Ssh,
}

/// Errors encountered while parsing a [`TransportKind`] from text.
pub type TransportKindParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_is_the_default() {
        assert_eq!(TransportKind::default(), TransportKind::Socket);
    }

    #[test]
    fn parses_known_kinds() {
        assert_eq!("socket".parse::<TransportKind>(), Ok(TransportKind::Socket));
        assert_eq!("SSH".parse::<TransportKind>(), Ok(TransportKind::Ssh));
    }

    #[test]
    fn rejects_unknown_kinds() {
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }
}
