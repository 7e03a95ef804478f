//! # linkam: command/response client for Linkam controllers
//!
//! A host talks to a Linkam temperature/environment controller by issuing typed messages
//! through the vendor library. Each call carries an opcode, a channel handle, three 8-byte
//! input slots and one output slot. This crate supplies everything above that call:
//!
//! - **Catalogs**: [`message`] maps each message to its opcode and result kind;
//!   [`parameter`] maps each stage value to its id, value kind and physical unit.
//! - **Values**: [`Variant`] is the typed form of a slot; [`envelope`] is the only place
//!   the untagged 8-byte image exists.
//! - **Status words**: [`status`] decodes connection/controller/stage bitmasks with
//!   explicit mask and shift.
//! - **Dispatch**: [`Session`] owns the transport, serialises every call and maps failures
//!   to [`Error`].
//! - **Channels**: [`Connection`] opens and closes a channel and offers parameter
//!   get/set/range with unit tagging, plus string and telemetry reads.
//!
//! The native library sits behind the [`Transport`] trait. [`sim::SimulatedController`]
//! implements it in-process.
//!
//! ## Example
//!
//! ```no_run
//! use linkam::{sim::SimulatedController, Parameter, Session, SessionConfig};
//! use linkam::units::{Quantity, Unit};
//!
//! # fn main() -> linkam::Result<()> {
//! let session = Session::open(SimulatedController::new(), SessionConfig::default())?;
//! let stage = session.connect_usb(None)?;
//! println!("{}", stage.get(Parameter::Heater1Temp)?);
//! stage.set(Parameter::HeaterSetpoint, Quantity::new(310.0, Unit::Kelvin))?;
//! stage.enable_heater(true)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod envelope;
pub mod error;
pub mod message;
pub mod parameter;
pub mod session;
pub mod sim;
pub mod status;
pub mod structs;
pub mod transport;
pub mod units;
pub mod variant;

pub use config::{LoggingLevel, SessionConfig};
pub use connection::{ConnectTarget, Connection, ConnectionState, Reading, SetValue};
pub use envelope::{Arg, Reply};
pub use error::{ConnectError, Error, Result, TransportError};
pub use message::{Message, OpcodeLookup};
pub use parameter::Parameter;
pub use session::Session;
pub use status::StatusWord;
pub use transport::{CommsHandle, Transport};
pub use variant::{Variant, VariantTag};
