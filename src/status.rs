//! Read-only views over the controller's status and configuration words.
//!
//! Every word is a plain integer snapshot returned by the device. Fields are described by a
//! [`BitField`] (offset + width, least-significant bit first) and read with an explicit
//! mask and shift, so decoding never depends on how a compiler would lay out bit-fields.
//!
//! | Word | Width | Returned by |
//! |------|-------|-------------|
//! | [`ConnectionStatus`] | 32 | OPEN_COMMS |
//! | [`ControllerConfig`] | 64 | GET_CONTROLLER_CONFIG |
//! | [`ControllerStatus`] | 64 | GET_STATUS, embedded in [`Running`](crate::structs::Running) |
//! | [`StageConfig`] | 64 | GET_STAGE_CONFIG |
//! | [`ProgramStatus`] | 32 | embedded in [`Running`](crate::structs::Running) |
//! | [`RhStatus`] | 32 | embedded in [`RhUnit`](crate::structs::RhUnit) |

use std::fmt;

/// One named field of a status word: `width` bits starting at bit `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub name: &'static str,
    pub offset: u32,
    pub width: u32,
}

impl BitField {
    /// Single-bit (boolean) field.
    pub const fn flag(name: &'static str, offset: u32) -> Self {
        BitField { name, offset, width: 1 }
    }

    /// Multi-bit unsigned sub-field.
    pub const fn span(name: &'static str, offset: u32, width: u32) -> Self {
        BitField { name, offset, width }
    }

    pub const fn mask(&self) -> u64 {
        let low = if self.width >= 64 { u64::MAX } else { (1u64 << self.width) - 1 };
        low << self.offset
    }

    pub const fn extract(&self, raw: u64) -> u64 {
        (raw & self.mask()) >> self.offset
    }

    pub const fn is_flag(&self) -> bool {
        self.width == 1
    }
}

/// Common view over every status word so tooling can enumerate fields generically.
pub trait StatusWord: Copy {
    /// All named fields, flags first, in bit order.
    const FIELDS: &'static [BitField];

    /// Raw value widened to 64 bits.
    fn bits(self) -> u64;

    /// Look a field up by name.
    fn field(self, name: &str) -> Option<u64> {
        Self::FIELDS
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.extract(self.bits()))
    }

    /// Every named field with its current value.
    fn decode(self) -> Vec<(&'static str, u64)> {
        let raw = self.bits();
        Self::FIELDS.iter().map(|f| (f.name, f.extract(raw))).collect()
    }

    /// Names of the fields that are non-zero.
    fn active(self) -> Vec<&'static str> {
        let raw = self.bits();
        Self::FIELDS
            .iter()
            .filter(|f| f.extract(raw) != 0)
            .map(|f| f.name)
            .collect()
    }
}

macro_rules! status_word {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($raw:ty) {
            flags {
                $( $(#[$fmeta:meta])* $flag:ident: $fconst:ident = $fbit:literal, )*
            }
            $( fields {
                $( $(#[$mmeta:meta])* $multi:ident: $mconst:ident = $moff:literal, $mwidth:literal; )*
            } )?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name($raw);

        impl $name {
            $( pub const $fconst: BitField = BitField::flag(stringify!($flag), $fbit); )*
            $($( pub const $mconst: BitField = BitField::span(stringify!($multi), $moff, $mwidth); )*)?

            pub const fn from_bits(raw: $raw) -> Self {
                $name(raw)
            }

            pub const fn to_bits(self) -> $raw {
                self.0
            }

            $(
                $(#[$fmeta])*
                pub const fn $flag(self) -> bool {
                    Self::$fconst.extract(self.0 as u64) != 0
                }
            )*

            $($(
                $(#[$mmeta])*
                pub const fn $multi(self) -> u32 {
                    Self::$mconst.extract(self.0 as u64) as u32
                }
            )*)?
        }

        impl StatusWord for $name {
            const FIELDS: &'static [BitField] = &[
                $( $name::$fconst, )*
                $($( $name::$mconst, )*)?
            ];

            fn bits(self) -> u64 {
                self.0 as u64
            }
        }

        impl From<$raw> for $name {
            fn from(raw: $raw) -> Self {
                $name(raw)
            }
        }

        impl From<$name> for $raw {
            fn from(word: $name) -> Self {
                word.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#x} {:?})", stringify!($name), self.0, self.active())
            }
        }
    };
}

status_word! {
    /// Result of OPEN_COMMS. Either `connected` is set or one or more error bits explain why not.
    pub struct ConnectionStatus(u32) {
        flags {
            connected: CONNECTED = 0,
            error_no_device_found: ERROR_NO_DEVICE_FOUND = 1,
            error_multiple_devices_found: ERROR_MULTIPLE_DEVICES_FOUND = 2,
            error_timeout: ERROR_TIMEOUT = 3,
            error_handle_registration_failed: ERROR_HANDLE_REGISTRATION_FAILED = 4,
            error_allocation_failed: ERROR_ALLOCATION_FAILED = 5,
            error_serial_number_required: ERROR_SERIAL_NUMBER_REQUIRED = 6,
            error_already_open: ERROR_ALREADY_OPEN = 7,
            error_properties_incorrect: ERROR_PROPERTIES_INCORRECT = 8,
            error_port_config: ERROR_PORT_CONFIG = 9,
            error_comms_streams: ERROR_COMMS_STREAMS = 10,
            error_unhandled: ERROR_UNHANDLED = 11,
        }
    }
}

status_word! {
    /// Controller capabilities and which option cards have reported ready.
    pub struct ControllerConfig(u64) {
        flags {
            supports_heater: SUPPORTS_HEATER = 0,
            supports_dual_heater: SUPPORTS_DUAL_HEATER = 1,
            supports_dual_heater_independent_limits: SUPPORTS_DUAL_HEATER_INDEPENDENT_LIMITS = 2,
            supports_dual_heater_independent_rates: SUPPORTS_DUAL_HEATER_INDEPENDENT_RATES = 3,
            vacuum_option: VACUUM_OPTION = 10,
            tensile_force_card_ready: TENSILE_FORCE_CARD_READY = 12,
            dsc_card_ready: DSC_CARD_READY = 13,
            x_motor_card_ready: X_MOTOR_CARD_READY = 14,
            y_motor_card_ready: Y_MOTOR_CARD_READY = 15,
            z_motor_card_ready: Z_MOTOR_CARD_READY = 16,
            motor_valve_card_ready: MOTOR_VALVE_CARD_READY = 17,
            tensile_motor_card_ready: TENSILE_MOTOR_CARD_READY = 18,
            graded_motor_card_ready: GRADED_MOTOR_CARD_READY = 19,
            dtc_card_ready: DTC_CARD_READY = 20,
            css_motor_card_ready: CSS_MOTOR_CARD_READY = 21,
            lnp_ready: LNP_READY = 36,
            lnp_dual_ready: LNP_DUAL_READY = 37,
            humidity_ready: HUMIDITY_READY = 46,
        }
    }
}

status_word! {
    /// State of the temperature program, embedded in [`Running`](crate::structs::Running).
    pub struct ProgramStatus(u32) {
        flags {
            dirn: DIRN = 0,
            hold: HOLD = 1,
            heat: HEAT = 2,
            cool: COOL = 3,
            in_limit_time: IN_LIMIT_TIME = 4,
            time_hold: TIME_HOLD = 5,
            started: STARTED = 6,
            new_rate: NEW_RATE = 7,
            ramp_done: RAMP_DONE = 8,
            over_range: OVER_RANGE = 9,
            linksys32_mode: LINKSYS32_MODE = 10,
            net_dll_mode: NET_DLL_MODE = 11,
            cool_to_300: COOL_TO_300 = 12,
            rate_slow_down: RATE_SLOW_DOWN = 13,
            link_mode: LINK_MODE = 14,
            err_ptr: ERR_PTR = 24,
        }
    }
}

status_word! {
    /// Live controller state.
    pub struct ControllerStatus(u64) {
        flags {
            controller_error: CONTROLLER_ERROR = 0,
            heater1_ramp_set_point: HEATER1_RAMP_SET_POINT = 1,
            heater1_started: HEATER1_STARTED = 2,
            heater2_ramp_set_point: HEATER2_RAMP_SET_POINT = 3,
            heater2_started: HEATER2_STARTED = 4,
            vacuum_ramp_set_point: VACUUM_RAMP_SET_POINT = 5,
            vacuum_ctrl_started: VACUUM_CTRL_STARTED = 6,
            vacuum_valve_closed: VACUUM_VALVE_CLOSED = 7,
            vacuum_valve_open: VACUUM_VALVE_OPEN = 8,
            humidity_ramp_set_point: HUMIDITY_RAMP_SET_POINT = 9,
            humidity_ctrl_started: HUMIDITY_CTRL_STARTED = 10,
            lnp_cooling_pump_on: LNP_COOLING_PUMP_ON = 11,
            lnp_cooling_pump_auto: LNP_COOLING_PUMP_AUTO = 12,
            humidity_desiccant_conditioning: HUMIDITY_DESICCANT_CONDITIONING = 14,
            motor_travel_min_x: MOTOR_TRAVEL_MIN_X = 41,
            motor_travel_max_x: MOTOR_TRAVEL_MAX_X = 42,
            motor_stopped_x: MOTOR_STOPPED_X = 43,
            motor_travel_min_y: MOTOR_TRAVEL_MIN_Y = 44,
            motor_travel_max_y: MOTOR_TRAVEL_MAX_Y = 45,
            motor_stopped_y: MOTOR_STOPPED_Y = 46,
            motor_travel_min_z: MOTOR_TRAVEL_MIN_Z = 47,
            motor_travel_max_z: MOTOR_TRAVEL_MAX_Z = 48,
            motor_stopped_z: MOTOR_STOPPED_Z = 49,
            sample_cal: SAMPLE_CAL = 50,
            motor_distance_cal_tst: MOTOR_DISTANCE_CAL_TST = 51,
            css_rot_motor_stopped: CSS_ROT_MOTOR_STOPPED = 52,
            css_gap_motor_stopped: CSS_GAP_MOTOR_STOPPED = 53,
            css_lid_on: CSS_LID_ON = 54,
            css_ref_limit: CSS_REF_LIMIT = 55,
            css_zero_limit: CSS_ZERO_LIMIT = 56,
        }
    }
}

status_word! {
    /// Stage type and fitted options.
    pub struct StageConfig(u64) {
        flags {
            standard_stage: STANDARD_STAGE = 0,
            high_temp_stage: HIGH_TEMP_STAGE = 1,
            peltier_stage: PELTIER_STAGE = 2,
            graded_stage: GRADED_STAGE = 3,
            tensile_stage: TENSILE_STAGE = 4,
            dsc_stage: DSC_STAGE = 5,
            warm_stage: WARM_STAGE = 6,
            ito_stage: ITO_STAGE = 7,
            css450_stage: CSS450_STAGE = 8,
            correlative_stage: CORRELATIVE_STAGE = 9,
            cooling_manual: COOLING_MANUAL = 21,
            cooling_automatic: COOLING_AUTOMATIC = 22,
            cooling_dual: COOLING_DUAL = 23,
            cooling_dual_speed_independent: COOLING_DUAL_SPEED_INDEPENDENT = 24,
            heater1: HEATER1 = 26,
            heater1_temp_ctrl: HEATER1_TEMP_CTRL = 27,
            heater1_temp_ctrl_probe: HEATER1_TEMP_CTRL_PROBE = 28,
            heater2: HEATER2 = 36,
            heater12_independent_limits: HEATER12_INDEPENDENT_LIMITS = 37,
            water_cooling_sensor_fitted: WATER_COOLING_SENSOR_FITTED = 46,
            home: HOME = 47,
            supports_vacuum: SUPPORTS_VACUUM = 48,
            motor_x: MOTOR_X = 49,
            motor_y: MOTOR_Y = 50,
            motor_z: MOTOR_Z = 51,
            supports_humidity: SUPPORTS_HUMIDITY = 52,
        }
    }
}

status_word! {
    /// Humidity generator status, embedded in [`RhUnit`](crate::structs::RhUnit).
    pub struct RhStatus(u32) {
        flags {
            present: PRESENT = 4,
            reset: RESET = 5,
            started: STARTED = 6,
            desiccant_dry_mode: DESICCANT_DRY_MODE = 10,
            ramp_limit_reached: RAMP_LIMIT_REACHED = 11,
        }
        fields {
            /// Active desiccant column.
            col_sel: COL_SEL = 0, 4;
            unit_type: UNIT_TYPE = 7, 3;
        }
    }
}
