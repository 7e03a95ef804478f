//! In-process stand-in for the native controller library.
//!
//! [`SimulatedController`] answers the same messages a single-heater stage with a humidity
//! generator would. It keeps a call log and lets tests inject connection errors, refused
//! calls or an unreachable library. Clones share state, so a test can keep one clone for
//! inspection after handing another to a [`Session`](crate::Session).

use crate::envelope::{decode_string, RawVariant, Slot, WireOrder};
use crate::error::TransportError;
use crate::message::{self, Message, OpcodeLookup};
use crate::parameter::{self, Parameter, PARAMETERS};
use crate::status::{ConnectionStatus, ControllerConfig, ControllerStatus, ProgramStatus, RhStatus, StageConfig};
use crate::structs::{
    CommsInfo, ControllerErrorCode, HeaterDetails, RhUnit, Running, WireStruct,
};
use crate::transport::{CommsHandle, Transport};
use crate::variant::{Variant, VariantTag};
use byteorder::ByteOrder;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

pub const SIM_VERSION: &str = "3.0.15.0 (simulated)";
pub const SIM_CONTROLLER_SERIAL: &str = "SIM00000001";

/// One call seen by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRecord {
    pub opcode: u32,
    pub handle: CommsHandle,
}

impl CallRecord {
    pub fn message(&self) -> Option<Message> {
        match message::by_opcode(self.opcode) {
            OpcodeLookup::Unique(d) => Some(d.message),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct SimState {
    unreachable: bool,
    initialise_ok: bool,
    initialised: bool,
    exits: u32,
    logging_level: Option<u32>,
    open_status: ConnectionStatus,
    next_handle: u64,
    open_handles: BTreeSet<u64>,
    refused: HashSet<u32>,
    rejected_sets: HashSet<u32>,
    values: HashMap<u32, Variant>,
    ranges: HashMap<u32, (Variant, Variant)>,
    strings: HashMap<Message, Vec<u8>>,
    heaters: Vec<HeaterDetails>,
    rh_unit: RhUnit,
    running: Running,
    controller_config: ControllerConfig,
    controller_status: ControllerStatus,
    stage_config: StageConfig,
    controller_error: ControllerErrorCode,
    calls: Vec<CallRecord>,
}

impl Default for SimState {
    fn default() -> Self {
        let mut values: HashMap<u32, Variant> = PARAMETERS
            .iter()
            .filter(|d| d.value_tag != VariantTag::Ptr)
            .filter_map(|d| RawVariant::zeroed().decode(d.value_tag).ok().map(|v| (d.id, v)))
            .collect();
        let mut ranges = HashMap::new();
        let mut seed = |p: Parameter, value: f32, range: Option<(f32, f32)>| {
            if let Ok(d) = parameter::descriptor(p) {
                values.insert(d.id, Variant::Float32(value));
                if let Some((lo, hi)) = range {
                    ranges.insert(d.id, (Variant::Float32(lo), Variant::Float32(hi)));
                }
            }
        };
        seed(Parameter::Heater1Temp, 25.0, Some((-196.0, 600.0)));
        seed(Parameter::HeaterSetpoint, 25.0, Some((-196.0, 600.0)));
        seed(Parameter::HeaterRate, 10.0, Some((0.01, 150.0)));
        seed(Parameter::Humidity, 40.0, Some((0.0, 90.0)));
        seed(Parameter::HumiditySetpoint, 40.0, Some((0.0, 90.0)));

        let strings = [
            (Message::GetControllerName, "T96-S"),
            (Message::GetControllerSerial, SIM_CONTROLLER_SERIAL),
            (Message::GetControllerFirmwareVersion, "T96 v3.1.2"),
            (Message::GetControllerHardwareVersion, "T96 rev C"),
            (Message::GetStageName, "LTS420"),
            (Message::GetStageSerial, "LTS00000042"),
            (Message::GetStageFirmwareVersion, "LTS v1.4"),
            (Message::GetStageHardwareVersion, "LTS rev B"),
            (Message::GetHumidityControllerSensorName, "RH95"),
            (Message::GetHumidityControllerSensorSerial, "RH0000007"),
            (Message::GetHumidityControllerSensorHardwareVersion, "1.2"),
        ]
        .into_iter()
        .map(|(m, s)| (m, s.as_bytes().to_vec()))
        .collect();

        let running = Running {
            time_left: 0.0,
            lnp_speed: 0.0,
            voltage: 12.0,
            current: 0.5,
            pwm: 10.0,
            status: ProgramStatus::from_bits(ProgramStatus::HOLD.mask() as u32),
            aux_status: 0,
            dll_status: ControllerStatus::default(),
        };

        SimState {
            unreachable: false,
            initialise_ok: true,
            initialised: false,
            exits: 0,
            logging_level: None,
            open_status: ConnectionStatus::from_bits(ConnectionStatus::CONNECTED.mask() as u32),
            next_handle: 1,
            open_handles: BTreeSet::new(),
            refused: HashSet::new(),
            rejected_sets: HashSet::new(),
            values,
            ranges,
            strings,
            heaters: vec![HeaterDetails {
                min_limit: -196.0,
                max_limit: 600.0,
                max_rate: 150.0,
                max_v: 24.0,
                max_i: 5.0,
            }],
            rh_unit: RhUnit {
                rh: 40.0,
                rh_setpoint: 40.0,
                rh_temp: 25.0,
                status: RhStatus::from_bits(RhStatus::PRESENT.mask() as u32),
                ..Default::default()
            },
            running,
            controller_config: ControllerConfig::from_bits(
                ControllerConfig::SUPPORTS_HEATER.mask() | ControllerConfig::HUMIDITY_READY.mask(),
            ),
            controller_status: ControllerStatus::default(),
            stage_config: StageConfig::from_bits(
                StageConfig::STANDARD_STAGE.mask()
                    | StageConfig::HEATER1.mask()
                    | StageConfig::SUPPORTS_HUMIDITY.mask(),
            ),
            controller_error: ControllerErrorCode::from_code(0),
            calls: Vec::new(),
        }
    }
}

/// Handle-less messages; everything else needs an open handle.
fn needs_handle(message: Message) -> bool {
    !matches!(
        message,
        Message::OpenComms | Message::EnableLogging | Message::DisableLogging
    )
}

fn boolean(result: &mut RawVariant, b: bool) {
    *result = RawVariant::encode(&Variant::Boolean(b));
}

fn arg(args: &[Slot<'_>; 3], index: usize, tag: VariantTag) -> Option<Variant> {
    args[index].value().and_then(|raw| raw.decode(tag).ok())
}

impl SimState {
    fn controller_serial(&self) -> String {
        self.strings
            .get(&Message::GetControllerSerial)
            .map(|s| decode_string(s))
            .unwrap_or_default()
    }

    fn open_comms(&mut self, result: &mut RawVariant, args: &mut [Slot<'_>; 3]) -> bool {
        let info = match args[0].buffer().map(|b| CommsInfo::decode(b)) {
            Some(Ok(info)) => info,
            _ => return false,
        };
        let mut status = self.open_status;
        if let CommsInfo::Usb(usb) = &info {
            if let Some(sn) = &usb.serial_number {
                if *sn != self.controller_serial() {
                    status = ConnectionStatus::from_bits(ConnectionStatus::ERROR_NO_DEVICE_FOUND.mask() as u32);
                }
            }
        }
        if status.connected() {
            let handle = self.next_handle;
            self.next_handle += 1;
            self.open_handles.insert(handle);
            match args[1].buffer() {
                Some(buf) if buf.len() >= 8 => WireOrder::write_u64(&mut buf[..8], handle),
                _ => return false,
            }
        }
        *result = RawVariant::encode(&Variant::ConnectionStatus(status));
        true
    }

    fn write_string(&self, message: Message, result: &mut RawVariant, args: &mut [Slot<'_>; 3]) -> bool {
        let has_flag = message::descriptor(message).and_then(|d| d.result_tag) == Some(VariantTag::Boolean);
        let size = arg(args, 1, VariantTag::Uint32).and_then(|v| v.as_u64()).unwrap_or(0) as usize;
        let Some(text) = self.strings.get(&message) else {
            if has_flag {
                boolean(result, false);
            }
            return has_flag;
        };
        let Some(buf) = args[0].buffer() else {
            return false;
        };
        let n = text.len().min(size).min(buf.len());
        buf[..n].copy_from_slice(&text[..n]);
        if n < buf.len() {
            buf[n] = 0;
        }
        if has_flag {
            boolean(result, true);
        }
        true
    }

    fn get_value(&mut self, message: Message, result: &mut RawVariant, args: &mut [Slot<'_>; 3]) -> bool {
        let Some(id) = arg(args, 0, VariantTag::StageValueType).and_then(|v| v.as_u64()) else {
            return false;
        };
        let id = id as u32;
        if message == Message::GetValue && Some(id) == parameter::descriptor(Parameter::StageHumidityUnitData).ok().map(|d| d.id) {
            return match args[1].buffer() {
                Some(buf) => self.rh_unit.encode_into(buf).is_ok(),
                None => false,
            };
        }
        let value = match message {
            Message::GetMinValue => self.ranges.get(&id).map(|r| r.0),
            Message::GetMaxValue => self.ranges.get(&id).map(|r| r.1),
            _ => self.values.get(&id).copied(),
        };
        match value {
            Some(v) => {
                *result = RawVariant::encode(&v);
                true
            }
            None => false,
        }
    }

    fn set_value(&mut self, result: &mut RawVariant, args: &mut [Slot<'_>; 3]) -> bool {
        let Some(id) = arg(args, 0, VariantTag::StageValueType).and_then(|v| v.as_u64()) else {
            return false;
        };
        let Ok(descriptor) = parameter::by_id(id as u32) else {
            return false;
        };
        let Some(value) = arg(args, 1, descriptor.value_tag) else {
            return false;
        };
        let in_range = match (self.ranges.get(&descriptor.id), value.as_f64()) {
            (Some((lo, hi)), Some(x)) => {
                lo.as_f64().map_or(true, |lo| x >= lo) && hi.as_f64().map_or(true, |hi| x <= hi)
            }
            _ => true,
        };
        let accepted = in_range && !self.rejected_sets.contains(&descriptor.id);
        if accepted {
            self.values.insert(descriptor.id, value);
        }
        boolean(result, accepted);
        true
    }

    fn process(&mut self, message: Message, handle: CommsHandle, result: &mut RawVariant, args: &mut [Slot<'_>; 3]) -> bool {
        if needs_handle(message) && !self.open_handles.contains(&handle.0) {
            return false;
        }
        match message {
            Message::OpenComms => self.open_comms(result, args),
            Message::CloseComms => {
                self.open_handles.remove(&handle.0);
                boolean(result, true);
                true
            }
            Message::EnableLogging => {
                self.logging_level = arg(args, 0, VariantTag::Uint32).and_then(|v| v.as_u64()).map(|l| l as u32);
                boolean(result, true);
                true
            }
            Message::GetControllerConfig => {
                *result = RawVariant::encode(&Variant::ControllerConfig(self.controller_config));
                true
            }
            Message::GetStatus => {
                *result = RawVariant::encode(&Variant::ControllerStatus(self.controller_status));
                true
            }
            Message::GetStageConfig => {
                *result = RawVariant::encode(&Variant::StageConfig(self.stage_config));
                true
            }
            Message::GetControllerError => {
                *result = RawVariant::encode(&Variant::ControllerError(self.controller_error));
                true
            }
            Message::GetValue | Message::GetMinValue | Message::GetMaxValue => self.get_value(message, result, args),
            Message::SetValue => self.set_value(result, args),
            Message::StartHeating | Message::StartHumidity | Message::StartVacuum => {
                let Some(on) = arg(args, 0, VariantTag::Boolean).and_then(|v| v.as_bool()) else {
                    return false;
                };
                let bits = match message {
                    Message::StartHeating => ControllerStatus::HEATER1_STARTED.mask(),
                    Message::StartHumidity => ControllerStatus::HUMIDITY_CTRL_STARTED.mask(),
                    _ => ControllerStatus::VACUUM_CTRL_STARTED.mask(),
                };
                let raw = self.controller_status.to_bits();
                self.controller_status = ControllerStatus::from_bits(if on { raw | bits } else { raw & !bits });
                self.running.dll_status = self.controller_status;
                boolean(result, true);
                true
            }
            Message::GetControllerHeaterDetails => {
                let channel = arg(args, 1, VariantTag::Uint32).and_then(|v| v.as_u64()).unwrap_or(0) as usize;
                let details = channel.checked_sub(1).and_then(|i| self.heaters.get(i)).copied();
                match (details, args[0].buffer()) {
                    (Some(d), Some(buf)) => boolean(result, d.encode_into(buf).is_ok()),
                    _ => boolean(result, false),
                }
                true
            }
            Message::GetProgramState => {
                let ok = match args[1].buffer() {
                    Some(buf) => self.running.encode_into(buf).is_ok(),
                    None => false,
                };
                boolean(result, ok);
                true
            }
            m if self.strings.contains_key(&m) || is_string_message(m) => self.write_string(m, result, args),
            _ => false,
        }
    }
}

fn is_string_message(message: Message) -> bool {
    matches!(
        message,
        Message::GetControllerName
            | Message::GetControllerSerial
            | Message::GetControllerFirmwareVersion
            | Message::GetControllerHardwareVersion
            | Message::GetStageName
            | Message::GetStageSerial
            | Message::GetStageFirmwareVersion
            | Message::GetStageHardwareVersion
            | Message::GetHumidityControllerSensorName
            | Message::GetHumidityControllerSensorSerial
            | Message::GetHumidityControllerSensorHardwareVersion
    )
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedController {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status word returned by every later OPEN_COMMS.
    pub fn set_open_status(&self, status: ConnectionStatus) {
        self.state.lock().open_status = status;
    }

    /// Make every call fail as if the library could not be reached.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    pub fn set_initialise_result(&self, ok: bool) {
        self.state.lock().initialise_ok = ok;
    }

    /// Report `message` as a failed call from now on.
    pub fn refuse(&self, message: Message) {
        if let Some(d) = message::descriptor(message) {
            self.state.lock().refused.insert(d.opcode);
        }
    }

    /// Answer SET_VALUE for `parameter` with `false`.
    pub fn reject_set(&self, parameter: Parameter) {
        if let Ok(d) = parameter::descriptor(parameter) {
            self.state.lock().rejected_sets.insert(d.id);
        }
    }

    pub fn set_value(&self, parameter: Parameter, value: Variant) {
        if let Ok(d) = parameter::descriptor(parameter) {
            self.state.lock().values.insert(d.id, value);
        }
    }

    pub fn value(&self, parameter: Parameter) -> Option<Variant> {
        let d = parameter::descriptor(parameter).ok()?;
        self.state.lock().values.get(&d.id).copied()
    }

    pub fn set_range(&self, parameter: Parameter, min: Variant, max: Variant) {
        if let Ok(d) = parameter::descriptor(parameter) {
            self.state.lock().ranges.insert(d.id, (min, max));
        }
    }

    /// Raw reply bytes for a string message. Removing the entry makes the read fail.
    pub fn set_string(&self, message: Message, bytes: Option<&[u8]>) {
        let mut state = self.state.lock();
        match bytes {
            Some(b) => state.strings.insert(message, b.to_vec()),
            None => state.strings.remove(&message),
        };
    }

    pub fn set_controller_error(&self, code: ControllerErrorCode) {
        self.state.lock().controller_error = code;
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.state.lock().calls.clone()
    }

    pub fn open_handles(&self) -> Vec<CommsHandle> {
        self.state.lock().open_handles.iter().map(|&h| CommsHandle(h)).collect()
    }

    pub fn is_initialised(&self) -> bool {
        self.state.lock().initialised
    }

    pub fn exit_count(&self) -> u32 {
        self.state.lock().exits
    }

    pub fn logging_level(&self) -> Option<u32> {
        self.state.lock().logging_level
    }

    pub fn controller_status(&self) -> ControllerStatus {
        self.state.lock().controller_status
    }
}

impl Transport for SimulatedController {
    fn initialise(&self, _log_path: &Path, _license_path: &Path) -> Result<bool, TransportError> {
        let mut state = self.state.lock();
        if state.unreachable {
            return Err(TransportError::new("simulated library not loaded"));
        }
        state.initialised = state.initialise_ok;
        Ok(state.initialise_ok)
    }

    fn exit(&self) {
        let mut state = self.state.lock();
        state.initialised = false;
        state.exits += 1;
        state.open_handles.clear();
    }

    fn version(&self, buf: &mut [u8]) -> Result<bool, TransportError> {
        let state = self.state.lock();
        if state.unreachable {
            return Err(TransportError::new("simulated library not loaded"));
        }
        let n = SIM_VERSION.len().min(buf.len().saturating_sub(1));
        buf[..n].copy_from_slice(&SIM_VERSION.as_bytes()[..n]);
        if n < buf.len() {
            buf[n] = 0;
        }
        Ok(true)
    }

    fn process_message(
        &self,
        opcode: u32,
        handle: CommsHandle,
        result: &mut RawVariant,
        args: &mut [Slot<'_>; 3],
    ) -> Result<bool, TransportError> {
        let mut state = self.state.lock();
        if state.unreachable {
            return Err(TransportError::new("simulated library not loaded"));
        }
        state.calls.push(CallRecord { opcode, handle });
        if !state.initialised || state.refused.contains(&opcode) {
            return Ok(false);
        }
        let message = match message::by_opcode(opcode) {
            OpcodeLookup::Unique(d) => d.message,
            _ => return Ok(false),
        };
        Ok(state.process(message, handle, result, args))
    }
}
