//! Fixed-layout aggregates written through pointer slots.
//!
//! Layouts are little-endian with C alignment; sizes are checked on decode. The transport
//! writes these into caller-owned buffers sized by [`WireStruct::SIZE`].

use crate::envelope::{decode_string, WireOrder};
use crate::error::WireError;
use crate::status::{ControllerStatus, ProgramStatus, RhStatus};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

/// A struct with a fixed byte layout.
pub trait WireStruct: Sized {
    const NAME: &'static str;
    const SIZE: usize;

    fn read_from(r: &mut Cursor<&[u8]>) -> std::io::Result<Self>;

    fn write_to(&self, w: &mut Cursor<&mut [u8]>) -> std::io::Result<()>;

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < Self::SIZE {
            return Err(WireError::Size {
                what: Self::NAME,
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let mut cursor = Cursor::new(bytes);
        Ok(Self::read_from(&mut cursor)?)
    }

    fn encode_into(&self, out: &mut [u8]) -> Result<(), WireError> {
        if out.len() < Self::SIZE {
            return Err(WireError::Size {
                what: Self::NAME,
                expected: Self::SIZE,
                actual: out.len(),
            });
        }
        let mut cursor = Cursor::new(out);
        self.write_to(&mut cursor)?;
        Ok(())
    }

    fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut out = vec![0u8; Self::SIZE];
        self.encode_into(&mut out)?;
        Ok(out)
    }
}

/// Temperature regulator characteristics for one heater channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeaterDetails {
    pub min_limit: f32,
    pub max_limit: f32,
    pub max_rate: f32,
    pub max_v: f32,
    pub max_i: f32,
}

impl WireStruct for HeaterDetails {
    const NAME: &'static str = "HeaterDetails";
    const SIZE: usize = 20;

    fn read_from(r: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        Ok(HeaterDetails {
            min_limit: r.read_f32::<WireOrder>()?,
            max_limit: r.read_f32::<WireOrder>()?,
            max_rate: r.read_f32::<WireOrder>()?,
            max_v: r.read_f32::<WireOrder>()?,
            max_i: r.read_f32::<WireOrder>()?,
        })
    }

    fn write_to(&self, w: &mut Cursor<&mut [u8]>) -> std::io::Result<()> {
        w.write_f32::<WireOrder>(self.min_limit)?;
        w.write_f32::<WireOrder>(self.max_limit)?;
        w.write_f32::<WireOrder>(self.max_rate)?;
        w.write_f32::<WireOrder>(self.max_v)?;
        w.write_f32::<WireOrder>(self.max_i)
    }
}

/// Humidity generator snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RhUnit {
    pub rh: f32,
    pub rh_setpoint: f32,
    pub rh_temp: f32,
    pub dry_time_secs: i32,
    pub set_dry_time_secs: i32,
    pub swap_time_secs: i32,
    pub set_swap_time_secs: i32,
    pub tube_percent: f32,
    pub tube_setpoint: f32,
    pub water_temp: f32,
    pub water_setpoint: f32,
    pub column_dry_mode_count_time_secs: i32,
    pub status: RhStatus,
}

impl WireStruct for RhUnit {
    const NAME: &'static str = "RhUnit";
    const SIZE: usize = 52;

    fn read_from(r: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        Ok(RhUnit {
            rh: r.read_f32::<WireOrder>()?,
            rh_setpoint: r.read_f32::<WireOrder>()?,
            rh_temp: r.read_f32::<WireOrder>()?,
            dry_time_secs: r.read_i32::<WireOrder>()?,
            set_dry_time_secs: r.read_i32::<WireOrder>()?,
            swap_time_secs: r.read_i32::<WireOrder>()?,
            set_swap_time_secs: r.read_i32::<WireOrder>()?,
            tube_percent: r.read_f32::<WireOrder>()?,
            tube_setpoint: r.read_f32::<WireOrder>()?,
            water_temp: r.read_f32::<WireOrder>()?,
            water_setpoint: r.read_f32::<WireOrder>()?,
            column_dry_mode_count_time_secs: r.read_i32::<WireOrder>()?,
            status: RhStatus::from_bits(r.read_u32::<WireOrder>()?),
        })
    }

    fn write_to(&self, w: &mut Cursor<&mut [u8]>) -> std::io::Result<()> {
        w.write_f32::<WireOrder>(self.rh)?;
        w.write_f32::<WireOrder>(self.rh_setpoint)?;
        w.write_f32::<WireOrder>(self.rh_temp)?;
        w.write_i32::<WireOrder>(self.dry_time_secs)?;
        w.write_i32::<WireOrder>(self.set_dry_time_secs)?;
        w.write_i32::<WireOrder>(self.swap_time_secs)?;
        w.write_i32::<WireOrder>(self.set_swap_time_secs)?;
        w.write_f32::<WireOrder>(self.tube_percent)?;
        w.write_f32::<WireOrder>(self.tube_setpoint)?;
        w.write_f32::<WireOrder>(self.water_temp)?;
        w.write_f32::<WireOrder>(self.water_setpoint)?;
        w.write_i32::<WireOrder>(self.column_dry_mode_count_time_secs)?;
        w.write_u32::<WireOrder>(self.status.to_bits())
    }
}

/// Running-program snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Running {
    pub time_left: f32,
    pub lnp_speed: f32,
    pub voltage: f32,
    pub current: f32,
    pub pwm: f32,
    pub status: ProgramStatus,
    pub aux_status: u32,
    pub dll_status: ControllerStatus,
}

impl WireStruct for Running {
    const NAME: &'static str = "Running";
    // 5 floats, status, aux, padding to 8-byte alignment, 64-bit controller status
    const SIZE: usize = 40;

    fn read_from(r: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        let time_left = r.read_f32::<WireOrder>()?;
        let lnp_speed = r.read_f32::<WireOrder>()?;
        let voltage = r.read_f32::<WireOrder>()?;
        let current = r.read_f32::<WireOrder>()?;
        let pwm = r.read_f32::<WireOrder>()?;
        let status = ProgramStatus::from_bits(r.read_u32::<WireOrder>()?);
        let aux_status = r.read_u32::<WireOrder>()?;
        let _padding = r.read_u32::<WireOrder>()?;
        let dll_status = ControllerStatus::from_bits(r.read_u64::<WireOrder>()?);
        Ok(Running {
            time_left,
            lnp_speed,
            voltage,
            current,
            pwm,
            status,
            aux_status,
            dll_status,
        })
    }

    fn write_to(&self, w: &mut Cursor<&mut [u8]>) -> std::io::Result<()> {
        w.write_f32::<WireOrder>(self.time_left)?;
        w.write_f32::<WireOrder>(self.lnp_speed)?;
        w.write_f32::<WireOrder>(self.voltage)?;
        w.write_f32::<WireOrder>(self.current)?;
        w.write_f32::<WireOrder>(self.pwm)?;
        w.write_u32::<WireOrder>(self.status.to_bits())?;
        w.write_u32::<WireOrder>(self.aux_status)?;
        w.write_u32::<WireOrder>(0)?;
        w.write_u64::<WireOrder>(self.dll_status.to_bits())
    }
}

/// Physical link used to reach a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
pub enum CommsType {
    #[default]
    None,
    Serial,
    Usb,
}

impl CommsType {
    pub fn code(self) -> u32 {
        match self {
            CommsType::None => 0,
            CommsType::Serial => 1,
            CommsType::Usb => 2,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(CommsType::None),
            1 => Some(CommsType::Serial),
            2 => Some(CommsType::Usb),
            _ => None,
        }
    }
}

pub const SERIAL_PORT_LEN: usize = 64;
pub const USB_SERIAL_NUMBER_LEN: usize = 17;
pub const LINKAM_USB_VENDOR_ID: u16 = 0x16DA;
pub const LINKAM_USB_PRODUCT_ID: u16 = 0x0002;

/// RS-232 link parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialCommsInfo {
    pub port: String,
    pub baudrate: u32,
    pub bytesize: u32,
    pub parity: u32,
    pub stopbits: u32,
    pub flowcontrol: u32,
    /// Milliseconds.
    pub timeout: u32,
}

impl SerialCommsInfo {
    /// 115200 baud, 8 data bits, no parity, 1 stop bit, no flow control, 1 s timeout.
    pub fn new(port: impl Into<String>) -> Self {
        SerialCommsInfo {
            port: port.into(),
            baudrate: 115_200,
            bytesize: 8,
            parity: 0,
            stopbits: 1,
            flowcontrol: 0,
            timeout: 1000,
        }
    }
}

/// USB filter; `serial_number: None` matches any controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbCommsInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
}

impl UsbCommsInfo {
    pub fn new(serial_number: Option<&str>) -> Self {
        UsbCommsInfo {
            vendor_id: LINKAM_USB_VENDOR_ID,
            product_id: LINKAM_USB_PRODUCT_ID,
            serial_number: serial_number.map(str::to_string),
        }
    }
}

/// Target descriptor consumed by OPEN_COMMS.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommsInfo {
    #[default]
    None,
    Serial(SerialCommsInfo),
    Usb(UsbCommsInfo),
}

impl CommsInfo {
    const UNION_SIZE: usize = 124;

    pub fn comms_type(&self) -> CommsType {
        match self {
            CommsInfo::None => CommsType::None,
            CommsInfo::Serial(_) => CommsType::Serial,
            CommsInfo::Usb(_) => CommsType::Usb,
        }
    }
}

fn write_fixed_str(w: &mut Cursor<&mut [u8]>, s: &str, len: usize) -> std::io::Result<()> {
    // always leave room for the terminator
    let bytes = s.as_bytes();
    let n = bytes.len().min(len - 1);
    w.write_all(&bytes[..n])?;
    w.write_all(&vec![0u8; len - n])
}

fn read_fixed_str(r: &mut Cursor<&[u8]>, len: usize) -> std::io::Result<String> {
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(decode_string(&buf))
}

impl WireStruct for CommsInfo {
    const NAME: &'static str = "CommsInfo";
    const SIZE: usize = 4 + Self::UNION_SIZE;

    fn read_from(r: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        let start = r.position();
        let info = match CommsType::from_code(r.read_u32::<WireOrder>()?) {
            Some(CommsType::Serial) => {
                let port = read_fixed_str(r, SERIAL_PORT_LEN)?;
                CommsInfo::Serial(SerialCommsInfo {
                    port,
                    baudrate: r.read_u32::<WireOrder>()?,
                    bytesize: r.read_u32::<WireOrder>()?,
                    parity: r.read_u32::<WireOrder>()?,
                    stopbits: r.read_u32::<WireOrder>()?,
                    flowcontrol: r.read_u32::<WireOrder>()?,
                    timeout: r.read_u32::<WireOrder>()?,
                })
            }
            Some(CommsType::Usb) => {
                let vendor_id = r.read_u16::<WireOrder>()?;
                let product_id = r.read_u16::<WireOrder>()?;
                let serial = read_fixed_str(r, USB_SERIAL_NUMBER_LEN)?;
                CommsInfo::Usb(UsbCommsInfo {
                    vendor_id,
                    product_id,
                    serial_number: (!serial.is_empty()).then_some(serial),
                })
            }
            _ => CommsInfo::None,
        };
        r.set_position(start + Self::SIZE as u64);
        Ok(info)
    }

    fn write_to(&self, w: &mut Cursor<&mut [u8]>) -> std::io::Result<()> {
        let start = w.position() as usize;
        w.write_u32::<WireOrder>(self.comms_type().code())?;
        match self {
            CommsInfo::Serial(s) => {
                write_fixed_str(w, &s.port, SERIAL_PORT_LEN)?;
                w.write_u32::<WireOrder>(s.baudrate)?;
                w.write_u32::<WireOrder>(s.bytesize)?;
                w.write_u32::<WireOrder>(s.parity)?;
                w.write_u32::<WireOrder>(s.stopbits)?;
                w.write_u32::<WireOrder>(s.flowcontrol)?;
                w.write_u32::<WireOrder>(s.timeout)?;
            }
            CommsInfo::Usb(u) => {
                w.write_u16::<WireOrder>(u.vendor_id)?;
                w.write_u16::<WireOrder>(u.product_id)?;
                write_fixed_str(w, u.serial_number.as_deref().unwrap_or(""), USB_SERIAL_NUMBER_LEN)?;
            }
            CommsInfo::None => {}
        }
        let written = w.position() as usize - start;
        w.write_all(&vec![0u8; Self::SIZE - written])
    }
}

/// Fault reported by GET_CONTROLLER_ERROR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControllerErrorCode {
    #[default]
    None,
    StageCableDisconnected,
    StageCableError,
    StageTempSensorOpenOverrange,
    LoadPowerOutputVoltageWrong,
    T95RelayMissing,
    T95OptionBoardWrongConfig,
    OptionBoardCableDisconnect,
    LoadPowerIncorrectForStage,
    OptionBoardIncorrectCable,
    OptionBoardSensorOpenOverrange,
    T95FanNotWorking,
    Lnp95Error,
    CommsError,
    CoolingWaterTooWarmNotFlowing,
    Css450MotorDriveOverTemp,
    Css450MotorWindingError1,
    Css450MotorWindingError2,
    Cms196ChamberSensorOpen,
    Cms196ChamberSensorOverrange,
    Cms196LN2SwitchSensorOpen,
    Cms196LN2SwitchSensorOverrange,
    Cms196DewarSensorOpen,
    Cms196DewarSensorOverrange,
    Cms196DewarEmpty,
    Cms196BaseSensorOpen,
    Cms196BaseSensorOverrange,
    Cms196MotorPosnError,
    /// Code not in the known table; kept verbatim.
    Unknown(u32),
}

impl ControllerErrorCode {
    const TABLE: [(u32, ControllerErrorCode); 28] = [
        (0, ControllerErrorCode::None),
        (1, ControllerErrorCode::StageCableDisconnected),
        (2, ControllerErrorCode::StageCableError),
        (3, ControllerErrorCode::StageTempSensorOpenOverrange),
        (4, ControllerErrorCode::LoadPowerOutputVoltageWrong),
        (5, ControllerErrorCode::T95RelayMissing),
        (6, ControllerErrorCode::T95OptionBoardWrongConfig),
        (7, ControllerErrorCode::OptionBoardCableDisconnect),
        (8, ControllerErrorCode::LoadPowerIncorrectForStage),
        (9, ControllerErrorCode::OptionBoardIncorrectCable),
        (10, ControllerErrorCode::OptionBoardSensorOpenOverrange),
        (11, ControllerErrorCode::T95FanNotWorking),
        (12, ControllerErrorCode::Lnp95Error),
        (13, ControllerErrorCode::CommsError),
        (14, ControllerErrorCode::CoolingWaterTooWarmNotFlowing),
        (15, ControllerErrorCode::Css450MotorDriveOverTemp),
        (16, ControllerErrorCode::Css450MotorWindingError1),
        (17, ControllerErrorCode::Css450MotorWindingError2),
        (21, ControllerErrorCode::Cms196ChamberSensorOpen),
        (22, ControllerErrorCode::Cms196ChamberSensorOverrange),
        (23, ControllerErrorCode::Cms196LN2SwitchSensorOpen),
        (24, ControllerErrorCode::Cms196LN2SwitchSensorOverrange),
        (25, ControllerErrorCode::Cms196DewarSensorOpen),
        (26, ControllerErrorCode::Cms196DewarSensorOverrange),
        (27, ControllerErrorCode::Cms196DewarEmpty),
        (28, ControllerErrorCode::Cms196BaseSensorOpen),
        (29, ControllerErrorCode::Cms196BaseSensorOverrange),
        (30, ControllerErrorCode::Cms196MotorPosnError),
    ];

    pub fn from_code(code: u32) -> Self {
        Self::TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, e)| *e)
            .unwrap_or(ControllerErrorCode::Unknown(code))
    }

    pub fn code(self) -> u32 {
        match self {
            ControllerErrorCode::Unknown(c) => c,
            known => Self::TABLE
                .iter()
                .find(|(_, e)| *e == known)
                .map(|(c, _)| *c)
                .unwrap_or_default(),
        }
    }

    pub fn is_error(self) -> bool {
        self != ControllerErrorCode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_layout() {
        let running = Running {
            time_left: 12.5,
            pwm: 0.25,
            status: ProgramStatus::from_bits(1 << 6),
            aux_status: 7,
            dll_status: ControllerStatus::from_bits(1 << 43),
            ..Default::default()
        };
        let bytes = running.encode().expect("encode");
        assert_eq!(bytes.len(), Running::SIZE);
        // padding word stays zero, controller status starts at byte 32
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
        assert_eq!(bytes[32 + 5], 1 << 3);
        let back = Running::decode(&bytes).expect("decode");
        assert!(back.status.started());
        assert!(back.dll_status.motor_stopped_x());
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = HeaterDetails::decode(&[0u8; 19]).unwrap_err();
        assert!(matches!(err, WireError::Size { expected: 20, actual: 19, .. }));
    }

    #[test]
    fn serial_comms_info_layout() {
        let info = CommsInfo::Serial(SerialCommsInfo::new("/dev/ttyUSB0"));
        let bytes = info.encode().expect("encode");
        assert_eq!(bytes.len(), 128);
        assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
        assert_eq!(&bytes[4..16], b"/dev/ttyUSB0");
        assert_eq!(bytes[16], 0);
        assert_eq!(&bytes[68..72], &115_200u32.to_le_bytes());
        assert_eq!(CommsInfo::decode(&bytes).expect("decode"), info);
    }

    #[test]
    fn usb_serial_number_is_truncated_to_field() {
        let info = CommsInfo::Usb(UsbCommsInfo::new(Some("0123456789ABCDEFGHIJ")));
        let bytes = info.encode().expect("encode");
        match CommsInfo::decode(&bytes).expect("decode") {
            CommsInfo::Usb(u) => {
                assert_eq!(u.serial_number.as_deref(), Some("0123456789ABCDEF"));
                assert_eq!(u.vendor_id, LINKAM_USB_VENDOR_ID);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn controller_error_codes() {
        assert_eq!(ControllerErrorCode::from_code(27), ControllerErrorCode::Cms196DewarEmpty);
        assert_eq!(ControllerErrorCode::from_code(19), ControllerErrorCode::Unknown(19));
        assert_eq!(ControllerErrorCode::Cms196DewarEmpty.code(), 27);
        assert!(!ControllerErrorCode::None.is_error());
    }
}
