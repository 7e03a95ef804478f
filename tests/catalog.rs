//! Catalog consistency: messages, parameters and their declared kinds and units.

use linkam::message::{self, MESSAGES};
use linkam::parameter::{self, PARAMETERS};
use linkam::units::{Dimension, Unit};
use linkam::{Message, OpcodeLookup, Parameter, VariantTag};
use std::collections::HashSet;
use strum::IntoEnumIterator;

#[test]
fn test_every_message_has_one_entry() {
    for m in Message::iter() {
        let hits = MESSAGES.iter().filter(|d| d.message == m).count();
        assert_eq!(hits, 1, "{}", m);
    }
    assert_eq!(MESSAGES.len(), Message::iter().count());
}

#[test]
fn test_only_0x58_is_shared() {
    let mut seen = HashSet::new();
    let shared: Vec<u32> = MESSAGES
        .iter()
        .filter(|d| !seen.insert(d.opcode))
        .map(|d| d.opcode)
        .collect();
    assert_eq!(shared, [0x58]);
    match message::by_opcode(0x58) {
        OpcodeLookup::Ambiguous(all) => {
            let names: HashSet<_> = all.iter().map(|d| d.message).collect();
            assert!(names.contains(&Message::TstSetCalibrateForceProgramMode));
            assert!(names.contains(&Message::TstSetCalibrationForce));
        }
        other => panic!("0x58 should be ambiguous, got {:?}", other),
    }
}

#[test]
fn test_lifecycle_messages() {
    let open = message::descriptor(Message::OpenComms).expect("open");
    assert_eq!((open.opcode, open.result_tag), (0x01, Some(VariantTag::ConnectionStatus)));
    let close = message::descriptor(Message::CloseComms).expect("close");
    assert_eq!(close.opcode, 0x02);
    // struct-returning reads leave the reply raw
    assert_eq!(message::descriptor(Message::GetValue).expect("get").result_tag, None);
    assert_eq!(message::descriptor(Message::GetMinValue).expect("min").result_tag, None);
    assert_eq!(message::descriptor(Message::GetMaxValue).expect("max").result_tag, None);
}

#[test]
fn test_every_parameter_has_one_entry_and_unique_id() {
    for p in Parameter::iter() {
        let d = parameter::descriptor(p).expect(p.name());
        assert_eq!(parameter::by_id(d.id).expect(p.name()).parameter, p);
    }
    let ids: HashSet<u32> = PARAMETERS.iter().map(|d| d.id).collect();
    assert_eq!(ids.len(), PARAMETERS.len());
    assert_eq!(PARAMETERS.len(), Parameter::iter().count());
}

#[test]
fn test_units_only_on_numeric_parameters() {
    for d in PARAMETERS.iter().filter(|d| d.unit.is_some()) {
        assert!(d.value_tag.is_numeric(), "{} has a unit but kind {}", d.name(), d.value_tag);
        assert_ne!(d.value_tag, VariantTag::Boolean, "{}", d.name());
    }
}

#[test]
fn test_declared_units() {
    let unit = |p: Parameter| parameter::descriptor(p).expect(p.name()).unit;
    assert_eq!(unit(Parameter::Heater1Temp), Some(Unit::DegC));
    assert_eq!(unit(Parameter::HeaterRate), Some(Unit::DegCPerMin));
    assert_eq!(unit(Parameter::Humidity), Some(Unit::Percent));
    assert_eq!(unit(Parameter::Pressure), Some(Unit::Millibar));
    assert_eq!(unit(Parameter::HumidityDryingTimeSetpoint), Some(Unit::Second));
    assert_eq!(unit(Parameter::VacuumSetpoint), None);
    assert_eq!(Unit::Millibar.dimension(), Dimension::Pressure);
}

#[test]
fn test_non_scalar_parameters() {
    let humidity = parameter::descriptor(Parameter::StageHumidityUnitData).expect("rh data");
    assert_eq!((humidity.id, humidity.value_tag), (133, VariantTag::Ptr));
    let kinds: HashSet<VariantTag> = PARAMETERS.iter().map(|d| d.value_tag).collect();
    assert!(kinds.contains(&VariantTag::Float32));
    assert!(kinds.contains(&VariantTag::Boolean));
    assert!(kinds.contains(&VariantTag::CommsType));
}
