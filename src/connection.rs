//! One channel to a controller: open/close lifecycle, parameter access and telemetry reads.

use crate::envelope::{Arg, Reply, WireOrder};
use crate::error::{ConnectError, Error, Result};
use crate::message::Message;
use crate::parameter::{self, Parameter, ParameterDescriptor};
use crate::session::Session;
use crate::status::{ControllerConfig, ControllerStatus, StageConfig};
use crate::structs::{ControllerErrorCode, HeaterDetails, RhUnit, Running, WireStruct};
use crate::transport::{CommsHandle, Transport};
use crate::units::{Quantity, Unit};
use crate::variant::{Variant, VariantTag};
use byteorder::ByteOrder;
use std::fmt;
use tracing::{debug, info, warn};

const NAME_LEN: u32 = 26;
const SERIAL_LEN: u32 = 18;
const VERSION_LEN: u32 = 64;
const SENSOR_HARDWARE_VERSION_LEN: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Opening,
    Open,
    /// Closed after having been open. A new connection is needed to reconnect.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    Serial { port: String },
    /// `None` connects to the only controller present.
    Usb { serial_number: Option<String> },
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectTarget::Serial { port } => write!(f, "serial:{}", port),
            ConnectTarget::Usb { serial_number: Some(sn) } => write!(f, "usb:{}", sn),
            ConnectTarget::Usb { serial_number: None } => write!(f, "usb"),
        }
    }
}

/// A parameter reading: tagged with the parameter's unit when it declares one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Quantity(Quantity),
    Value(Variant),
}

impl Reading {
    fn tag(value: Variant, unit: Option<Unit>) -> Self {
        match (unit, value.as_f64()) {
            (Some(unit), Some(magnitude)) => Reading::Quantity(Quantity::new(magnitude, unit)),
            _ => Reading::Value(value),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Quantity(q) => Some(q.magnitude),
            Reading::Value(v) => v.as_f64(),
        }
    }

    pub fn quantity(&self) -> Option<Quantity> {
        match self {
            Reading::Quantity(q) => Some(*q),
            Reading::Value(_) => None,
        }
    }

    pub fn value(&self) -> Option<Variant> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::Quantity(_) => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Quantity(q) => write!(f, "{}", q),
            Reading::Value(v) => write!(f, "{:?}", v),
        }
    }
}

/// What may be written to a parameter.
///
/// Plain numbers are stored in the parameter's declared kind; quantities are first converted
/// to its declared unit; typed values must already be of the declared kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetValue {
    Number(f64),
    Quantity(Quantity),
    Variant(Variant),
}

impl From<f64> for SetValue {
    fn from(n: f64) -> Self {
        SetValue::Number(n)
    }
}

impl From<f32> for SetValue {
    fn from(n: f32) -> Self {
        SetValue::Number(n as f64)
    }
}

impl From<i32> for SetValue {
    fn from(n: i32) -> Self {
        SetValue::Number(n as f64)
    }
}

impl From<u32> for SetValue {
    fn from(n: u32) -> Self {
        SetValue::Number(n as f64)
    }
}

impl From<bool> for SetValue {
    fn from(b: bool) -> Self {
        SetValue::Variant(Variant::Boolean(b))
    }
}

impl From<Quantity> for SetValue {
    fn from(q: Quantity) -> Self {
        SetValue::Quantity(q)
    }
}

impl From<Variant> for SetValue {
    fn from(v: Variant) -> Self {
        SetValue::Variant(v)
    }
}

impl From<Reading> for SetValue {
    fn from(r: Reading) -> Self {
        match r {
            Reading::Quantity(q) => SetValue::Quantity(q),
            Reading::Value(v) => SetValue::Variant(v),
        }
    }
}

/// A channel to one controller, multiplexed over its session.
///
/// Closed on drop. Every operation other than [`open`](Connection::open) and
/// [`close`](Connection::close) requires the connection to be open.
pub struct Connection<'s, T: Transport> {
    session: &'s Session<T>,
    target: ConnectTarget,
    state: ConnectionState,
    handle: CommsHandle,
}

impl<'s, T: Transport> Connection<'s, T> {
    pub fn new(session: &'s Session<T>, target: ConnectTarget) -> Self {
        Connection {
            session,
            target,
            state: ConnectionState::Closed,
            handle: CommsHandle::NONE,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn target(&self) -> &ConnectTarget {
        &self.target
    }

    /// The open handle, or [`Error::NotConnected`].
    pub fn handle(&self) -> Result<CommsHandle> {
        match self.state {
            ConnectionState::Open => Ok(self.handle),
            _ => Err(Error::NotConnected),
        }
    }

    /// Open the channel.
    ///
    /// On failure the connection returns to `Closed` and may be opened again. Opening an
    /// already open or finished connection is [`Error::InvalidState`].
    pub fn open(&mut self) -> Result<()> {
        if self.state != ConnectionState::Closed {
            return Err(Error::InvalidState { state: self.state });
        }
        self.state = ConnectionState::Opening;
        match self.open_comms() {
            Ok(handle) => {
                self.handle = handle;
                self.state = ConnectionState::Open;
                info!(peer = %self.target, %handle, "Connection opened");
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Closed;
                warn!(peer = %self.target, error = %e, "Connection failed");
                Err(e)
            }
        }
    }

    fn open_comms(&self) -> Result<CommsHandle> {
        // descriptor build and OPEN_COMMS form one critical section
        let transport = self.session.lock();
        let info = match &self.target {
            ConnectTarget::Serial { port } => transport.serial_comms_info(port)?,
            ConnectTarget::Usb { serial_number } => transport.usb_comms_info(serial_number.as_deref())?,
        };
        let mut info_buf = info.encode()?;
        let mut handle_buf = [0u8; 8];
        let reply = self.session.dispatch(
            Message::OpenComms,
            CommsHandle::NONE,
            [Arg::Ptr(info_buf.as_mut_slice()), Arg::Ptr(&mut handle_buf)],
        )?;
        let status = match reply.field(VariantTag::ConnectionStatus)? {
            Variant::ConnectionStatus(status) => status,
            other => return Err(mismatch(VariantTag::ConnectionStatus, other)),
        };
        debug!(?status, "OPEN_COMMS status");
        if let Some(err) = ConnectError::from_status(status) {
            return Err(err.into());
        }
        Ok(CommsHandle(WireOrder::read_u64(&handle_buf)))
    }

    /// Close the channel. A no-op unless the connection is open.
    pub fn close(&mut self) -> Result<()> {
        if self.state != ConnectionState::Open {
            return Ok(());
        }
        let handle = std::mem::replace(&mut self.handle, CommsHandle::NONE);
        self.state = ConnectionState::Finished;
        self.session.dispatch(Message::CloseComms, handle, std::iter::empty())?;
        info!(%handle, "Connection closed");
        Ok(())
    }

    fn call<'a, I>(&self, message: Message, args: I) -> Result<Reply>
    where
        I: IntoIterator<Item = Arg<'a>>,
    {
        let handle = self.handle()?;
        self.session.dispatch(message, handle, args)
    }

    fn query(&self, message: Message, tag: VariantTag) -> Result<Variant> {
        Ok(self.call(message, std::iter::empty())?.field(tag)?)
    }

    fn read_string(&self, message: Message, len: u32) -> Result<String> {
        let handle = self.handle()?;
        self.session.read_string(message, len, handle)
    }

    /// Fill a wire struct through a pointer argument. A `false` reply is a protocol error.
    fn read_struct<S: WireStruct>(&self, message: Message, args: impl FnOnce(&mut [u8]) -> [Arg<'_>; 2]) -> Result<S> {
        let mut buf = vec![0u8; S::SIZE];
        let reply = self.call(message, args(buf.as_mut_slice()))?;
        if reply.as_bool() == Some(false) {
            return Err(Error::Protocol { message: message.name() });
        }
        Ok(S::decode(&buf)?)
    }

    fn read_value(&self, message: Message, descriptor: &ParameterDescriptor) -> Result<Reading> {
        let handle = self.handle()?;
        if descriptor.value_tag == VariantTag::Ptr {
            return Err(Error::CatalogFault(format!(
                "{} is not a scalar parameter",
                descriptor.name()
            )));
        }
        let reply = self.session.dispatch(
            message,
            handle,
            [Arg::Value(Variant::StageValueType(descriptor.id))],
        )?;
        let value = reply.field(descriptor.value_tag)?;
        Ok(Reading::tag(value, descriptor.unit))
    }

    /// Read `parameter`, tagged with its unit when it declares one.
    pub fn get(&self, parameter: Parameter) -> Result<Reading> {
        self.handle()?;
        self.read_value(Message::GetValue, parameter::descriptor(parameter)?)
    }

    /// Read the `(min, max)` bounds of `parameter`, in that order, as the device reports them.
    pub fn get_range(&self, parameter: Parameter) -> Result<(Reading, Reading)> {
        self.handle()?;
        let descriptor = parameter::descriptor(parameter)?;
        let min = self.read_value(Message::GetMinValue, descriptor)?;
        let max = self.read_value(Message::GetMaxValue, descriptor)?;
        Ok((min, max))
    }

    /// Write `parameter`. Returns the device's acceptance flag; `false` is not an error.
    pub fn set(&self, parameter: Parameter, value: impl Into<SetValue>) -> Result<bool> {
        let handle = self.handle()?;
        let descriptor = parameter::descriptor(parameter)?;
        let tag = descriptor.value_tag;
        let variant = match value.into() {
            SetValue::Variant(v) if v.tag() == tag => v,
            SetValue::Variant(v) => return Err(mismatch(tag, v)),
            SetValue::Quantity(q) => {
                let magnitude = match descriptor.unit {
                    Some(unit) => q.magnitude_in(unit)?,
                    None => q.magnitude,
                };
                store_number(descriptor, magnitude)?
            }
            SetValue::Number(n) => store_number(descriptor, n)?,
        };
        let reply = self.session.dispatch(
            Message::SetValue,
            handle,
            [Arg::Value(Variant::StageValueType(descriptor.id)), Arg::Value(variant)],
        )?;
        let accepted = reply.as_bool() == Some(true);
        if !accepted {
            debug!(parameter = descriptor.name(), ?variant, "set refused");
        }
        Ok(accepted)
    }

    fn enable(&self, message: Message, enabled: bool) -> Result<bool> {
        let reply = self.call(message, [Arg::Value(Variant::Boolean(enabled))])?;
        Ok(reply.as_bool() == Some(true))
    }

    /// Start or stop the temperature controller.
    pub fn enable_heater(&self, enabled: bool) -> Result<bool> {
        self.enable(Message::StartHeating, enabled)
    }

    pub fn enable_humidity(&self, enabled: bool) -> Result<bool> {
        self.enable(Message::StartHumidity, enabled)
    }

    pub fn enable_vacuum(&self, enabled: bool) -> Result<bool> {
        self.enable(Message::StartVacuum, enabled)
    }

    pub fn controller_config(&self) -> Result<ControllerConfig> {
        match self.query(Message::GetControllerConfig, VariantTag::ControllerConfig)? {
            Variant::ControllerConfig(c) => Ok(c),
            other => Err(mismatch(VariantTag::ControllerConfig, other)),
        }
    }

    pub fn controller_status(&self) -> Result<ControllerStatus> {
        match self.query(Message::GetStatus, VariantTag::ControllerStatus)? {
            Variant::ControllerStatus(s) => Ok(s),
            other => Err(mismatch(VariantTag::ControllerStatus, other)),
        }
    }

    pub fn stage_config(&self) -> Result<StageConfig> {
        match self.query(Message::GetStageConfig, VariantTag::StageConfig)? {
            Variant::StageConfig(c) => Ok(c),
            other => Err(mismatch(VariantTag::StageConfig, other)),
        }
    }

    pub fn controller_error(&self) -> Result<ControllerErrorCode> {
        match self.query(Message::GetControllerError, VariantTag::ControllerError)? {
            Variant::ControllerError(e) => Ok(e),
            other => Err(mismatch(VariantTag::ControllerError, other)),
        }
    }

    pub fn controller_firmware_version(&self) -> Result<String> {
        self.read_string(Message::GetControllerFirmwareVersion, VERSION_LEN)
    }

    pub fn controller_hardware_version(&self) -> Result<String> {
        self.read_string(Message::GetControllerHardwareVersion, VERSION_LEN)
    }

    pub fn controller_name(&self) -> Result<String> {
        self.read_string(Message::GetControllerName, NAME_LEN)
    }

    pub fn controller_serial(&self) -> Result<String> {
        self.read_string(Message::GetControllerSerial, SERIAL_LEN)
    }

    pub fn stage_firmware_version(&self) -> Result<String> {
        self.read_string(Message::GetStageFirmwareVersion, VERSION_LEN)
    }

    pub fn stage_hardware_version(&self) -> Result<String> {
        self.read_string(Message::GetStageHardwareVersion, VERSION_LEN)
    }

    pub fn stage_name(&self) -> Result<String> {
        self.read_string(Message::GetStageName, NAME_LEN)
    }

    pub fn stage_serial(&self) -> Result<String> {
        self.read_string(Message::GetStageSerial, SERIAL_LEN)
    }

    pub fn humidity_sensor_name(&self) -> Result<String> {
        self.read_string(Message::GetHumidityControllerSensorName, NAME_LEN)
    }

    pub fn humidity_sensor_serial(&self) -> Result<String> {
        self.read_string(Message::GetHumidityControllerSensorSerial, SERIAL_LEN)
    }

    pub fn humidity_sensor_hardware_version(&self) -> Result<String> {
        self.read_string(
            Message::GetHumidityControllerSensorHardwareVersion,
            SENSOR_HARDWARE_VERSION_LEN,
        )
    }

    /// Regulator characteristics of heater `channel` (0-based).
    pub fn heater_details(&self, channel: u8) -> Result<HeaterDetails> {
        let channel = u32::from(channel) + 1;
        self.read_struct(Message::GetControllerHeaterDetails, |buf| {
            [Arg::Ptr(buf), Arg::Value(Variant::Uint32(channel))]
        })
    }

    pub fn humidity_details(&self) -> Result<RhUnit> {
        let id = parameter::descriptor(Parameter::StageHumidityUnitData)?.id;
        self.read_struct(Message::GetValue, |buf| {
            [Arg::Value(Variant::StageValueType(id)), Arg::Ptr(buf)]
        })
    }

    pub fn program_state(&self) -> Result<Running> {
        self.read_struct(Message::GetProgramState, |buf| {
            [Arg::Value(Variant::Uint32(1)), Arg::Ptr(buf)]
        })
    }
}

impl<T: Transport> Drop for Connection<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close connection");
        }
    }
}

impl<T: Transport> fmt::Debug for Connection<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("target", &self.target)
            .field("state", &self.state)
            .field("handle", &self.handle)
            .finish()
    }
}

fn mismatch(expected: VariantTag, found: Variant) -> Error {
    Error::TagMismatch {
        expected,
        found: found.tag(),
    }
}

fn store_number(descriptor: &ParameterDescriptor, value: f64) -> Result<Variant> {
    let tag = descriptor.value_tag;
    if tag == VariantTag::Ptr {
        return Err(Error::CatalogFault(format!(
            "{} is not a scalar parameter",
            descriptor.name()
        )));
    }
    Variant::from_f64(tag, value).ok_or(Error::InvalidValue {
        parameter: descriptor.name(),
        tag,
        value,
    })
}
