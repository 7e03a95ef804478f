//! Status word decoding: every single-bit word lights exactly the field that owns that bit.

use linkam::status::{
    BitField, ConnectionStatus, ControllerConfig, ControllerStatus, ProgramStatus, RhStatus, StageConfig,
};
use linkam::StatusWord;

fn owner(fields: &[BitField], bit: u32) -> Option<&'static str> {
    fields.iter().find(|f| f.mask() & (1u64 << bit) != 0).map(|f| f.name)
}

fn check_single_bits<W: StatusWord>(width: u32, make: impl Fn(u64) -> W) {
    for k in 0..width {
        let word = make(1u64 << k);
        let expected = owner(W::FIELDS, k);
        for (name, value) in word.decode() {
            if Some(name) == expected {
                assert_ne!(value, 0, "bit {}: {} should be set", k, name);
            } else {
                assert_eq!(value, 0, "bit {}: {} should be clear", k, name);
            }
        }
        assert_eq!(word.active(), expected.into_iter().collect::<Vec<_>>(), "bit {}", k);
    }
}

fn check_disjoint(fields: &[BitField]) {
    let mut seen = 0u64;
    for f in fields {
        assert_eq!(seen & f.mask(), 0, "{} overlaps an earlier field", f.name);
        seen |= f.mask();
    }
}

#[test]
fn test_connection_status_single_bits() {
    check_disjoint(ConnectionStatus::FIELDS);
    check_single_bits(32, |b| ConnectionStatus::from_bits(b as u32));
}

#[test]
fn test_controller_config_single_bits() {
    check_disjoint(ControllerConfig::FIELDS);
    check_single_bits(64, ControllerConfig::from_bits);
}

#[test]
fn test_program_status_single_bits() {
    check_disjoint(ProgramStatus::FIELDS);
    check_single_bits(32, |b| ProgramStatus::from_bits(b as u32));
}

#[test]
fn test_controller_status_single_bits() {
    check_disjoint(ControllerStatus::FIELDS);
    check_single_bits(64, ControllerStatus::from_bits);
}

#[test]
fn test_stage_config_single_bits() {
    check_disjoint(StageConfig::FIELDS);
    check_single_bits(64, StageConfig::from_bits);
}

#[test]
fn test_rh_status_single_bits() {
    check_disjoint(RhStatus::FIELDS);
    check_single_bits(32, |b| RhStatus::from_bits(b as u32));
    // bit 2 lands inside col_sel
    assert_eq!(RhStatus::from_bits(1 << 2).col_sel(), 4);
    assert_eq!(RhStatus::from_bits(1 << 9).unit_type(), 4);
}

#[test]
fn test_accessors_agree_with_field_table() {
    let s = ControllerStatus::from_bits((1 << 2) | (1 << 43));
    assert!(s.heater1_started());
    assert!(s.motor_stopped_x());
    assert_eq!(s.field("heater1_started"), Some(1));
    assert_eq!(s.field("motor_stopped_x"), Some(1));
    assert_eq!(s.active(), ["heater1_started", "motor_stopped_x"]);
}
