//! Integration tests: session lifecycle, dispatch, connections and parameter access against the
//! simulated controller.

use linkam::parameter::PARAMETERS;
use linkam::sim::{SimulatedController, SIM_CONTROLLER_SERIAL, SIM_VERSION};
use linkam::status::ConnectionStatus;
use linkam::structs::ControllerErrorCode;
use linkam::units::{Quantity, Unit};
use linkam::{
    ConnectError, ConnectTarget, Connection, ConnectionState, Error, LoggingLevel, Message, Parameter,
    Reading, Session, SessionConfig, Variant, VariantTag,
};

fn open() -> (SimulatedController, Session<SimulatedController>) {
    let sim = SimulatedController::new();
    let session = Session::open(sim.clone(), SessionConfig::default()).expect("open session");
    (sim, session)
}

fn close_enough(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-4 * b.abs().max(1.0)
}

#[test]
fn test_session_open_configures_library() {
    let sim = SimulatedController::new();
    let config = SessionConfig {
        logging_level: LoggingLevel::Verbose,
        ..SessionConfig::default()
    };
    let session = Session::open(sim.clone(), config).expect("open session");
    assert!(sim.is_initialised());
    assert_eq!(sim.logging_level(), Some(2));
    assert_eq!(session.version().expect("version"), SIM_VERSION);

    session.close();
    session.close();
    assert_eq!(sim.exit_count(), 1);
    drop(session);
    assert_eq!(sim.exit_count(), 1);
}

#[test]
fn test_session_drop_releases_library() {
    let (sim, session) = open();
    drop(session);
    assert_eq!(sim.exit_count(), 1);
    assert!(!sim.is_initialised());
}

#[test]
fn test_session_open_refused() {
    let sim = SimulatedController::new();
    sim.set_initialise_result(false);
    let err = Session::open(sim.clone(), SessionConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Protocol { message: "INITIALISE" }));
    assert_eq!(sim.exit_count(), 0);
}

#[test]
fn test_logging_level_refused_releases_library() {
    let sim = SimulatedController::new();
    sim.refuse(Message::EnableLogging);
    let err = Session::open(sim.clone(), SessionConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Protocol { message: "ENABLE_LOGGING" }));
    assert_eq!(sim.exit_count(), 1);
}

#[test]
fn test_unreachable_transport() {
    let sim = SimulatedController::new();
    sim.set_unreachable(true);
    let err = Session::open(sim.clone(), SessionConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Transport(_)));

    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    sim.set_unreachable(true);
    assert!(matches!(stage.get(Parameter::Heater1Temp), Err(Error::Transport(_))));
    sim.set_unreachable(false);
}

#[test]
fn test_get_set_round_trip_every_parameter() {
    let (_sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    for d in PARAMETERS.iter().filter(|d| d.value_tag != VariantTag::Ptr) {
        let first = stage.get(d.parameter).expect(d.name());
        assert!(stage.set(d.parameter, first).expect(d.name()), "{} refused", d.name());
        let second = stage.get(d.parameter).expect(d.name());
        match (first.as_f64(), second.as_f64()) {
            (Some(a), Some(b)) => assert!(close_enough(a, b), "{}: {} != {}", d.name(), a, b),
            _ => assert_eq!(first, second, "{}", d.name()),
        }
    }
}

#[test]
fn test_get_tags_declared_unit() {
    let (_sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    let temp = stage.get(Parameter::Heater1Temp).expect("get");
    assert_eq!(temp, Reading::Quantity(Quantity::new(25.0, Unit::DegC)));
    let flag = stage.get(Parameter::TriggerSignalsEnabled).expect("get");
    assert_eq!(flag, Reading::Value(Variant::Boolean(false)));
}

#[test]
fn test_connect_error_precedence() {
    let expected = [
        ConnectError::NoDeviceFound,
        ConnectError::MultipleDevicesFound,
        ConnectError::Timeout,
        ConnectError::HandleRegistrationFailed,
        ConnectError::AllocationFailed,
        ConnectError::SerialNumberRequired,
        ConnectError::AlreadyOpen,
        ConnectError::PropertiesIncorrect,
        ConnectError::PortConfig,
        ConnectError::CommsStreams,
        ConnectError::Unhandled,
    ];
    let (sim, session) = open();
    for (i, want) in expected.iter().enumerate() {
        sim.set_open_status(ConnectionStatus::from_bits(1 << (i + 1)));
        match session.connect_usb(None) {
            Err(Error::Connection(got)) => assert_eq!(got, *want),
            other => panic!("bit {}: expected {:?}, got {:?}", i + 1, want, other.map(|c| c.state())),
        }
    }

    let both = ConnectionStatus::ERROR_NO_DEVICE_FOUND.mask() | ConnectionStatus::ERROR_TIMEOUT.mask();
    sim.set_open_status(ConnectionStatus::from_bits(both as u32));
    assert!(matches!(
        session.connect_usb(None),
        Err(Error::Connection(ConnectError::NoDeviceFound))
    ));

    sim.set_open_status(ConnectionStatus::from_bits(0));
    assert!(matches!(
        session.connect_usb(None),
        Err(Error::Connection(ConnectError::Unspecified(0)))
    ));
    assert!(sim.open_handles().is_empty());
}

#[test]
fn test_failed_open_can_be_retried() {
    let (sim, session) = open();
    sim.set_open_status(ConnectionStatus::from_bits(ConnectionStatus::ERROR_TIMEOUT.mask() as u32));
    let mut stage = Connection::new(&session, ConnectTarget::Usb { serial_number: None });
    assert!(matches!(stage.open(), Err(Error::Connection(ConnectError::Timeout))));
    assert_eq!(stage.state(), ConnectionState::Closed);

    sim.set_open_status(ConnectionStatus::from_bits(ConnectionStatus::CONNECTED.mask() as u32));
    stage.open().expect("second open");
    assert_eq!(stage.state(), ConnectionState::Open);
    assert!(matches!(
        stage.open(),
        Err(Error::InvalidState { state: ConnectionState::Open })
    ));
}

#[test]
fn test_usb_serial_filter_and_serial_port() {
    let (_sim, session) = open();
    assert!(matches!(
        session.connect_usb(Some("NOPE")),
        Err(Error::Connection(ConnectError::NoDeviceFound))
    ));
    let usb = session.connect_usb(Some(SIM_CONTROLLER_SERIAL)).expect("usb by serial");
    assert_eq!(usb.controller_serial().expect("serial"), SIM_CONTROLLER_SERIAL);
    let serial = session.connect_serial("/dev/ttyUSB0").expect("serial port");
    assert_eq!(serial.state(), ConnectionState::Open);
}

#[test]
fn test_string_retrieval() {
    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");

    sim.set_string(Message::GetControllerName, Some(b"ABC\0\0\0"));
    assert_eq!(stage.controller_name().expect("name"), "ABC");

    sim.set_string(Message::GetControllerName, Some(b"T96  "));
    assert_eq!(stage.controller_name().expect("name"), "T96");

    // longer than the 26 bytes requested: the device stops at the size argument
    sim.set_string(Message::GetControllerName, Some(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123"));
    assert_eq!(stage.controller_name().expect("name"), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");

    assert_eq!(stage.humidity_sensor_hardware_version().expect("hw"), "1.2");
    assert_eq!(stage.stage_name().expect("stage"), "LTS420");
}

#[test]
fn test_string_failure_is_protocol_error() {
    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");

    // boolean-flagged message answering false
    sim.set_string(Message::GetHumidityControllerSensorName, None);
    assert!(matches!(
        stage.humidity_sensor_name(),
        Err(Error::Protocol { message: "GET_HUMIDITY_CONTROLLER_SENSOR_NAME" })
    ));

    // untagged message whose call fails
    sim.set_string(Message::GetControllerName, None);
    assert!(matches!(
        stage.controller_name(),
        Err(Error::Protocol { message: "GET_CONTROLLER_NAME" })
    ));
}

#[test]
fn test_get_range_passes_bounds_through() {
    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    sim.set_range(Parameter::HeaterSetpoint, Variant::Float32(100.0), Variant::Float32(-50.0));
    let before = sim.calls().len();

    let (min, max) = stage.get_range(Parameter::HeaterSetpoint).expect("range");
    assert_eq!(min.quantity(), Some(Quantity::new(100.0, Unit::DegC)));
    assert_eq!(max.quantity(), Some(Quantity::new(-50.0, Unit::DegC)));

    let order: Vec<_> = sim.calls()[before..].iter().filter_map(|c| c.message()).collect();
    assert_eq!(order, [Message::GetMinValue, Message::GetMaxValue]);
}

#[test]
fn test_close_is_idempotent() {
    let (sim, session) = open();
    let mut stage = session.connect_usb(None).expect("connect");
    let handle = stage.handle().expect("handle");
    assert_eq!(sim.open_handles(), [handle]);

    stage.close().expect("first close");
    stage.close().expect("second close");
    assert_eq!(stage.state(), ConnectionState::Finished);
    assert!(sim.open_handles().is_empty());
    assert!(matches!(stage.get(Parameter::Heater1Temp), Err(Error::NotConnected)));
    assert!(matches!(stage.get_range(Parameter::Heater1Temp), Err(Error::NotConnected)));
    assert!(matches!(stage.set(Parameter::HeaterSetpoint, 20.0), Err(Error::NotConnected)));
    assert!(matches!(stage.controller_name(), Err(Error::NotConnected)));
    assert!(matches!(
        stage.open(),
        Err(Error::InvalidState { state: ConnectionState::Finished })
    ));
}

#[test]
fn test_never_opened_connection() {
    let (sim, session) = open();
    let calls = sim.calls().len();
    let mut stage = Connection::new(&session, ConnectTarget::Usb { serial_number: None });
    stage.close().expect("close");
    assert_eq!(stage.state(), ConnectionState::Closed);
    assert!(matches!(stage.get(Parameter::Heater1Temp), Err(Error::NotConnected)));
    assert!(matches!(stage.program_state(), Err(Error::NotConnected)));
    drop(stage);
    assert_eq!(sim.calls().len(), calls);
}

#[test]
fn test_drop_closes_connection() {
    let (sim, session) = open();
    {
        let _stage = session.connect_usb(None).expect("connect");
        assert_eq!(sim.open_handles().len(), 1);
    }
    assert!(sim.open_handles().is_empty());
    let last = sim.calls().last().copied().expect("calls");
    assert_eq!(last.message(), Some(Message::CloseComms));
}

#[test]
fn test_multiplexed_connections() {
    let (sim, session) = open();
    let mut a = session.connect_usb(None).expect("a");
    let b = session.connect_serial("COM3").expect("b");
    assert_ne!(a.handle().expect("a"), b.handle().expect("b"));

    a.close().expect("close a");
    assert_eq!(sim.open_handles(), [b.handle().expect("b")]);
    assert!(b.get(Parameter::Heater1Temp).is_ok());
}

#[test]
fn test_connections_across_threads() {
    let (sim, session) = open();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let stage = session.connect_usb(None).expect("connect");
                for _ in 0..25 {
                    stage.get(Parameter::Heater1Temp).expect("get");
                }
            });
        }
    });
    assert!(sim.open_handles().is_empty());
}

#[test]
fn test_session_close_invalidates_connections() {
    let (_sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    session.close();
    assert!(matches!(stage.get(Parameter::Heater1Temp), Err(Error::NotConnected)));
    assert!(matches!(session.version(), Err(Error::NotConnected)));
}

#[test]
fn test_set_converts_and_validates() {
    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");

    assert!(stage
        .set(Parameter::HeaterSetpoint, Quantity::new(310.15, Unit::Kelvin))
        .expect("kelvin"));
    match sim.value(Parameter::HeaterSetpoint) {
        Some(Variant::Float32(v)) => assert!(close_enough(v as f64, 37.0)),
        other => panic!("unexpected {:?}", other),
    }

    assert!(matches!(
        stage.set(Parameter::HeaterSetpoint, Quantity::new(1.0, Unit::Newton)),
        Err(Error::Unit(_))
    ));
    assert!(matches!(
        stage.set(Parameter::TriggerSignalsEnabled, 2.0),
        Err(Error::InvalidValue { tag: VariantTag::Boolean, .. })
    ));
    assert!(matches!(
        stage.set(Parameter::HeaterSetpoint, Variant::Uint32(3)),
        Err(Error::TagMismatch { expected: VariantTag::Float32, found: VariantTag::Uint32 })
    ));
    assert!(stage.set(Parameter::TriggerSignalsEnabled, true).expect("bool"));

    // unitless parameter: the quantity's unit is dropped
    assert!(stage
        .set(Parameter::VacuumSetpoint, Quantity::new(5.0, Unit::Millibar))
        .expect("vacuum"));
    assert_eq!(sim.value(Parameter::VacuumSetpoint), Some(Variant::Float32(5.0)));
}

#[test]
fn test_set_refusal_is_not_an_error() {
    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    assert!(!stage.set(Parameter::HeaterSetpoint, 9000.0).expect("out of range"));
    sim.reject_set(Parameter::HeaterRate);
    assert!(!stage.set(Parameter::HeaterRate, 20.0).expect("rejected"));
    assert_eq!(sim.value(Parameter::HeaterRate), Some(Variant::Float32(10.0)));
}

#[test]
fn test_pointer_parameter_is_catalog_fault() {
    let (_sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    assert!(matches!(stage.get(Parameter::StageHumidityUnitData), Err(Error::CatalogFault(_))));
}

#[test]
fn test_refused_call_names_message() {
    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    sim.refuse(Message::GetStatus);
    assert!(matches!(
        stage.controller_status(),
        Err(Error::Protocol { message: "GET_STATUS" })
    ));
}

#[test]
fn test_controller_and_stage_words() {
    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");
    assert!(stage.controller_config().expect("config").supports_heater());
    assert!(stage.controller_config().expect("config").humidity_ready());
    let stage_config = stage.stage_config().expect("stage config");
    assert!(stage_config.standard_stage() && stage_config.heater1());
    assert_eq!(stage.controller_error().expect("error"), ControllerErrorCode::from_code(0));

    sim.set_controller_error(ControllerErrorCode::from_code(99));
    assert_eq!(stage.controller_error().expect("error"), ControllerErrorCode::Unknown(99));
}

#[test]
fn test_enable_and_telemetry() {
    let (sim, session) = open();
    let stage = session.connect_usb(None).expect("connect");

    assert!(stage.enable_heater(true).expect("heater on"));
    assert!(stage.controller_status().expect("status").heater1_started());
    assert!(stage.program_state().expect("running").dll_status.heater1_started());
    assert!(stage.enable_humidity(true).expect("rh on"));
    assert!(stage.enable_vacuum(true).expect("vacuum on"));
    assert!(sim.controller_status().vacuum_ctrl_started());
    assert!(stage.enable_heater(false).expect("heater off"));
    assert!(!sim.controller_status().heater1_started());

    let heater = stage.heater_details(0).expect("heater 0");
    assert_eq!(heater.max_limit, 600.0);
    assert!(matches!(
        stage.heater_details(3),
        Err(Error::Protocol { message: "GET_CONTROLLER_HEATER_DETAILS" })
    ));

    let rh = stage.humidity_details().expect("rh");
    assert_eq!(rh.rh, 40.0);
    assert!(rh.status.present());

    let running = stage.program_state().expect("running");
    assert!(running.status.hold());
}
