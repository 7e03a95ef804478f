//! Boundary to the native controller library.
//!
//! A [`Transport`] performs one synchronous call at a time. The session serialises every call
//! through its lock, so implementations need not be reentrant.

use crate::envelope::{RawVariant, Slot};
use crate::error::TransportError;
use crate::structs::{CommsInfo, SerialCommsInfo, UsbCommsInfo};
use std::path::Path;

/// Identifier of an open channel. Zero means "no channel".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct CommsHandle(pub u64);

impl CommsHandle {
    pub const NONE: CommsHandle = CommsHandle(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl std::fmt::Display for CommsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

pub trait Transport: Send {
    /// Bring the library up. `Ok(false)` means it refused to start.
    fn initialise(&self, log_path: &Path, license_path: &Path) -> Result<bool, TransportError>;

    /// Release the library. Called once per successful initialise.
    fn exit(&self);

    /// Write the library version, NUL-terminated, into `buf`.
    fn version(&self, buf: &mut [u8]) -> Result<bool, TransportError>;

    /// Issue one message. `Ok(false)` means the call itself failed.
    fn process_message(
        &self,
        opcode: u32,
        handle: CommsHandle,
        result: &mut RawVariant,
        args: &mut [Slot<'_>; 3],
    ) -> Result<bool, TransportError>;

    fn serial_comms_info(&self, port: &str) -> Result<CommsInfo, TransportError> {
        Ok(CommsInfo::Serial(SerialCommsInfo::new(port)))
    }

    fn usb_comms_info(&self, serial_number: Option<&str>) -> Result<CommsInfo, TransportError> {
        Ok(CommsInfo::Usb(UsbCommsInfo::new(serial_number)))
    }
}
