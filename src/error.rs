//! Error taxonomy shared by the dispatcher, the connection lifecycle and parameter access.

use crate::connection::ConnectionState;
use crate::status::ConnectionStatus;
use crate::units::UnitError;
use crate::variant::VariantTag;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport could not be invoked at all.
    #[error("Transport: {0}")]
    Transport(#[from] TransportError),
    /// The transport was invoked but reported that the call failed.
    #[error("Protocol: message {message} failed")]
    Protocol { message: &'static str },
    #[error("Connection: {0}")]
    Connection(#[from] ConnectError),
    #[error("Not connected")]
    NotConnected,
    /// A catalog entry is missing or lacks the tag the operation needs.
    #[error("Catalog fault: {0}")]
    CatalogFault(String),
    #[error("Tag mismatch: expected {expected}, found {found}")]
    TagMismatch { expected: VariantTag, found: VariantTag },
    #[error("Value {value} cannot be stored as {tag} for {parameter}")]
    InvalidValue {
        parameter: &'static str,
        tag: VariantTag,
        value: f64,
    },
    #[error("Invalid state: connection is {state:?}")]
    InvalidState { state: ConnectionState },
    #[error("Unit: {0}")]
    Unit(#[from] UnitError),
    #[error("Wire: {0}")]
    Wire(#[from] WireError),
    #[error("Config: {0}")]
    Config(#[from] ConfigError),
}

/// Failure to reach the transport (library missing, symbol unresolved, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(msg: impl Into<String>) -> Self {
        TransportError(msg.into())
    }
}

/// Why OPEN_COMMS did not report `connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("Device not found")]
    NoDeviceFound,
    #[error("Multiple devices found")]
    MultipleDevicesFound,
    #[error("Timeout")]
    Timeout,
    #[error("Handle registration failed")]
    HandleRegistrationFailed,
    #[error("Allocation failed")]
    AllocationFailed,
    #[error("Serial number required")]
    SerialNumberRequired,
    #[error("Already open")]
    AlreadyOpen,
    #[error("Properties incorrect")]
    PropertiesIncorrect,
    #[error("Invalid port configuration")]
    PortConfig,
    #[error("Communication error")]
    CommsStreams,
    #[error("Unhandled error")]
    Unhandled,
    /// No recognised error bit was set.
    #[error("Unspecified connection failure (status {0:#x})")]
    Unspecified(u32),
}

impl ConnectError {
    /// Error bits in the order they are checked; the first set bit wins.
    const PRECEDENCE: [(fn(ConnectionStatus) -> bool, ConnectError); 11] = [
        (ConnectionStatus::error_no_device_found, ConnectError::NoDeviceFound),
        (ConnectionStatus::error_multiple_devices_found, ConnectError::MultipleDevicesFound),
        (ConnectionStatus::error_timeout, ConnectError::Timeout),
        (ConnectionStatus::error_handle_registration_failed, ConnectError::HandleRegistrationFailed),
        (ConnectionStatus::error_allocation_failed, ConnectError::AllocationFailed),
        (ConnectionStatus::error_serial_number_required, ConnectError::SerialNumberRequired),
        (ConnectionStatus::error_already_open, ConnectError::AlreadyOpen),
        (ConnectionStatus::error_properties_incorrect, ConnectError::PropertiesIncorrect),
        (ConnectionStatus::error_port_config, ConnectError::PortConfig),
        (ConnectionStatus::error_comms_streams, ConnectError::CommsStreams),
        (ConnectionStatus::error_unhandled, ConnectError::Unhandled),
    ];

    /// Map an OPEN_COMMS status to the error it reports. Returns `None` when `connected` is set.
    pub fn from_status(status: ConnectionStatus) -> Option<ConnectError> {
        if status.connected() {
            return None;
        }
        let err = Self::PRECEDENCE
            .iter()
            .find(|(is_set, _)| is_set(status))
            .map(|(_, e)| *e)
            .unwrap_or(ConnectError::Unspecified(status.to_bits()));
        Some(err)
    }
}

/// Fixed-layout buffer could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("{what}: expected {expected} bytes, got {actual}")]
    Size {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Tag {0} has no scalar representation in a variant slot")]
    PointerTag(VariantTag),
    #[error("{0} arguments supplied, a call envelope holds 3")]
    TooManyArguments(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_is_not_an_error() {
        assert_eq!(ConnectError::from_status(ConnectionStatus::from_bits(0b1)), None);
        // connected wins even when error bits are also set
        assert_eq!(ConnectError::from_status(ConnectionStatus::from_bits(0b1011)), None);
    }

    #[test]
    fn first_error_bit_wins() {
        let s = ConnectionStatus::from_bits((1 << 3) | (1 << 1));
        assert_eq!(ConnectError::from_status(s), Some(ConnectError::NoDeviceFound));
        let s = ConnectionStatus::from_bits((1 << 11) | (1 << 9));
        assert_eq!(ConnectError::from_status(s), Some(ConnectError::PortConfig));
    }

    #[test]
    fn no_bits_is_unspecified() {
        assert_eq!(
            ConnectError::from_status(ConnectionStatus::from_bits(1 << 20)),
            Some(ConnectError::Unspecified(1 << 20))
        );
    }
}
