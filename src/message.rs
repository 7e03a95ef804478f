//! Message catalog: which opcode each message uses and which slot member carries its answer.
//!
//! The table is data; dispatch looks messages up here rather than asking the enum. Messages
//! without a result tag hand back the raw output slot and the caller decodes it from context
//! (the parameter catalog for GET_VALUE, a pointer argument for string and struct reads).
//!
//! Opcode `0x58` is used by both TST_SET_CALIBRATE_FORCE_PROGRAM_MODE and
//! TST_SET_CALIBRATION_FORCE. Reverse lookup reports that as [`OpcodeLookup::Ambiguous`]
//! instead of picking one.

use crate::variant::VariantTag;

/// Every message the host can issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    OpenComms,
    CloseComms,
    GetControllerConfig,
    GetControllerError,
    GetControllerName,
    GetControllerSerial,
    GetStatus,
    GetStageConfig,
    GetStageSerial,
    GetStageName,
    GetMaxValue,
    GetMinValue,
    GetResolution,
    ApplySampleCals,
    SaveSampleCals,
    StartHeating,
    StartVacuum,
    StartHumidity,
    StartHumidityDesiccantConditioning,
    StartMotors,
    GetValue,
    SetValue,
    TstCalibrateDistance,
    TstSetMode,
    TstZeroForce,
    TstZeroPosition,
    LnpSetMode,
    LnpSetSpeed,
    CssApplyValues,
    CssCheckValues,
    CssGotoReference,
    CssSensorCal,
    CssStartJogGap,
    CssStartJogRot,
    EnableLogging,
    DisableLogging,
    GetControllerFirmwareVersion,
    GetControllerHardwareVersion,
    GetStageFirmwareVersion,
    GetStageHardwareVersion,
    GetDataRate,
    SetDataRate,
    SendDscGainValues,
    SendDscPowerValue,
    SendDscBaselinePowerValues,
    SendDscTuaConstants,
    SetDscModulationData,
    GetOptionCardName,
    GetOptionCardSerial,
    GetOptionCardHardwareVersion,
    DoesOptionCardSupportSensors,
    GetOptionCardSensorName,
    GetOptionCardSensorSerial,
    GetOptionCardSensorHardwareVersion,
    HaveInstrumentBusDeviceType,
    GetInstrumentBusDeviceName,
    GetInstrumentBusDeviceSerial,
    GetInstrumentBusDeviceFirmwareVersion,
    GetInstrumentBusDeviceHardwareVersion,
    GetHumidityControllerSensorName,
    GetHumidityControllerSensorSerial,
    GetHumidityControllerSensorHardwareVersion,
    IsControllerType,
    GetControllerPsuDetails,
    SetControllerTriggerSignalEnable,
    SetControllerTriggerSignalDisable,
    SetControllerMainsFrequency,
    InitialiseTriggerSignalPulse,
    SetTriggerSignalPulse,
    SetTriggerSignalPulseWidth,
    GetProgramState,
    GetControllerHeaterDetails,
    CssSendGapVelocity,
    CssSendGapOverride,
    CssSendGap,
    CssSendVelocity,
    CssSendRate,
    CssSendFrequency,
    CssSendStrain,
    CssSendDirection,
    CssSendForceStop,
    CssSendTorque,
    /// Shares opcode 0x58 with [`Message::TstSetCalibrationForce`].
    TstSetCalibrateForceProgramMode,
    TstSetCalibrationForce,
    ForceHeating,
    ForceCooling,
    ForceHold,
    GetConnectionInformation,
}

impl Message {
    /// Catalog name, e.g. `"GET_VALUE"`.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub message: Message,
    pub opcode: u32,
    /// Slot member holding the answer, if the message declares one.
    pub result_tag: Option<VariantTag>,
}

impl MessageDescriptor {
    pub fn name(&self) -> &'static str {
        self.message.name()
    }
}

const fn entry(message: Message, opcode: u32, result_tag: Option<VariantTag>) -> MessageDescriptor {
    MessageDescriptor { message, opcode, result_tag }
}

pub static MESSAGES: &[MessageDescriptor] = &[
    entry(Message::OpenComms, 0x01, Some(VariantTag::ConnectionStatus)),
    entry(Message::CloseComms, 0x02, Some(VariantTag::Boolean)),
    entry(Message::GetControllerConfig, 0x03, Some(VariantTag::ControllerConfig)),
    entry(Message::GetControllerError, 0x04, Some(VariantTag::ControllerError)),
    entry(Message::GetControllerName, 0x05, None),
    entry(Message::GetControllerSerial, 0x06, None),
    entry(Message::GetStatus, 0x07, Some(VariantTag::ControllerStatus)),
    entry(Message::GetStageConfig, 0x08, Some(VariantTag::StageConfig)),
    entry(Message::GetStageSerial, 0x09, None),
    entry(Message::GetStageName, 0x0A, None),
    entry(Message::GetMaxValue, 0x0B, None),
    entry(Message::GetMinValue, 0x0C, None),
    entry(Message::GetResolution, 0x0D, None),
    entry(Message::ApplySampleCals, 0x0E, None),
    entry(Message::SaveSampleCals, 0x0F, None),
    entry(Message::StartHeating, 0x10, Some(VariantTag::Boolean)),
    entry(Message::StartVacuum, 0x11, Some(VariantTag::Boolean)),
    entry(Message::StartHumidity, 0x12, Some(VariantTag::Boolean)),
    entry(Message::StartHumidityDesiccantConditioning, 0x13, Some(VariantTag::Boolean)),
    entry(Message::StartMotors, 0x14, Some(VariantTag::Boolean)),
    entry(Message::GetValue, 0x15, None),
    entry(Message::SetValue, 0x16, Some(VariantTag::Boolean)),
    entry(Message::TstCalibrateDistance, 0x17, Some(VariantTag::Boolean)),
    entry(Message::TstSetMode, 0x18, Some(VariantTag::Boolean)),
    entry(Message::TstZeroForce, 0x19, Some(VariantTag::Boolean)),
    entry(Message::TstZeroPosition, 0x1A, Some(VariantTag::Boolean)),
    entry(Message::LnpSetMode, 0x1B, Some(VariantTag::Boolean)),
    entry(Message::LnpSetSpeed, 0x1C, Some(VariantTag::Boolean)),
    entry(Message::CssApplyValues, 0x1D, Some(VariantTag::Boolean)),
    entry(Message::CssCheckValues, 0x1E, Some(VariantTag::Uint8)),
    entry(Message::CssGotoReference, 0x1F, Some(VariantTag::Boolean)),
    entry(Message::CssSensorCal, 0x20, Some(VariantTag::Boolean)),
    entry(Message::CssStartJogGap, 0x21, Some(VariantTag::Boolean)),
    entry(Message::CssStartJogRot, 0x22, Some(VariantTag::Boolean)),
    entry(Message::EnableLogging, 0x23, Some(VariantTag::Boolean)),
    entry(Message::DisableLogging, 0x24, Some(VariantTag::Boolean)),
    entry(Message::GetControllerFirmwareVersion, 0x25, None),
    entry(Message::GetControllerHardwareVersion, 0x26, None),
    entry(Message::GetStageFirmwareVersion, 0x27, None),
    entry(Message::GetStageHardwareVersion, 0x28, None),
    entry(Message::GetDataRate, 0x29, None),
    entry(Message::SetDataRate, 0x2A, None),
    entry(Message::SendDscGainValues, 0x2C, Some(VariantTag::Boolean)),
    entry(Message::SendDscPowerValue, 0x2D, Some(VariantTag::Boolean)),
    entry(Message::SendDscBaselinePowerValues, 0x2E, Some(VariantTag::Boolean)),
    entry(Message::SendDscTuaConstants, 0x2F, Some(VariantTag::Boolean)),
    entry(Message::SetDscModulationData, 0x30, Some(VariantTag::Boolean)),
    entry(Message::GetOptionCardName, 0x33, Some(VariantTag::Boolean)),
    entry(Message::GetOptionCardSerial, 0x34, Some(VariantTag::Boolean)),
    entry(Message::GetOptionCardHardwareVersion, 0x35, Some(VariantTag::Boolean)),
    entry(Message::DoesOptionCardSupportSensors, 0x36, Some(VariantTag::Uint32)),
    entry(Message::GetOptionCardSensorName, 0x37, Some(VariantTag::Boolean)),
    entry(Message::GetOptionCardSensorSerial, 0x38, Some(VariantTag::Boolean)),
    entry(Message::GetOptionCardSensorHardwareVersion, 0x39, Some(VariantTag::Boolean)),
    entry(Message::HaveInstrumentBusDeviceType, 0x3B, Some(VariantTag::Boolean)),
    entry(Message::GetInstrumentBusDeviceName, 0x3C, Some(VariantTag::Boolean)),
    entry(Message::GetInstrumentBusDeviceSerial, 0x3D, Some(VariantTag::Boolean)),
    entry(Message::GetInstrumentBusDeviceFirmwareVersion, 0x3E, Some(VariantTag::Boolean)),
    entry(Message::GetInstrumentBusDeviceHardwareVersion, 0x3F, Some(VariantTag::Boolean)),
    entry(Message::GetHumidityControllerSensorName, 0x40, Some(VariantTag::Boolean)),
    entry(Message::GetHumidityControllerSensorSerial, 0x41, Some(VariantTag::Boolean)),
    entry(Message::GetHumidityControllerSensorHardwareVersion, 0x42, Some(VariantTag::Boolean)),
    entry(Message::IsControllerType, 0x43, Some(VariantTag::Boolean)),
    entry(Message::GetControllerPsuDetails, 0x44, Some(VariantTag::Boolean)),
    entry(Message::SetControllerTriggerSignalEnable, 0x45, Some(VariantTag::Boolean)),
    entry(Message::SetControllerTriggerSignalDisable, 0x46, Some(VariantTag::Boolean)),
    entry(Message::SetControllerMainsFrequency, 0x47, Some(VariantTag::Boolean)),
    entry(Message::InitialiseTriggerSignalPulse, 0x48, Some(VariantTag::Boolean)),
    entry(Message::SetTriggerSignalPulse, 0x49, Some(VariantTag::Boolean)),
    entry(Message::SetTriggerSignalPulseWidth, 0x4A, Some(VariantTag::Boolean)),
    entry(Message::GetProgramState, 0x4B, Some(VariantTag::Boolean)),
    entry(Message::GetControllerHeaterDetails, 0x4D, Some(VariantTag::Boolean)),
    entry(Message::CssSendGapVelocity, 0x4E, Some(VariantTag::Boolean)),
    entry(Message::CssSendGapOverride, 0x4F, Some(VariantTag::Boolean)),
    entry(Message::CssSendGap, 0x50, Some(VariantTag::Boolean)),
    entry(Message::CssSendVelocity, 0x51, Some(VariantTag::Boolean)),
    entry(Message::CssSendRate, 0x52, Some(VariantTag::Boolean)),
    entry(Message::CssSendFrequency, 0x53, Some(VariantTag::Boolean)),
    entry(Message::CssSendStrain, 0x54, Some(VariantTag::Boolean)),
    entry(Message::CssSendDirection, 0x55, Some(VariantTag::Boolean)),
    entry(Message::CssSendForceStop, 0x56, Some(VariantTag::Boolean)),
    entry(Message::CssSendTorque, 0x57, Some(VariantTag::Boolean)),
    entry(Message::TstSetCalibrateForceProgramMode, 0x58, Some(VariantTag::Boolean)),
    entry(Message::TstSetCalibrationForce, 0x58, Some(VariantTag::Boolean)),
    entry(Message::ForceHeating, 0x59, Some(VariantTag::Boolean)),
    entry(Message::ForceCooling, 0x5A, Some(VariantTag::Boolean)),
    entry(Message::ForceHold, 0x5B, Some(VariantTag::Boolean)),
    entry(Message::GetConnectionInformation, 0x60, Some(VariantTag::Boolean)),
];

/// Catalog entry for `message`.
pub fn descriptor(message: Message) -> Option<&'static MessageDescriptor> {
    MESSAGES.iter().find(|d| d.message == message)
}

/// Result of looking a message up by opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpcodeLookup {
    Unknown,
    Unique(&'static MessageDescriptor),
    /// More than one message carries this opcode.
    Ambiguous(Vec<&'static MessageDescriptor>),
}

pub fn by_opcode(opcode: u32) -> OpcodeLookup {
    let mut hits: Vec<_> = MESSAGES.iter().filter(|d| d.opcode == opcode).collect();
    match hits.len() {
        0 => OpcodeLookup::Unknown,
        1 => OpcodeLookup::Unique(hits.remove(0)),
        _ => OpcodeLookup::Ambiguous(hits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_catalog_spelling() {
        assert_eq!(Message::OpenComms.name(), "OPEN_COMMS");
        assert_eq!(Message::GetControllerFirmwareVersion.name(), "GET_CONTROLLER_FIRMWARE_VERSION");
        assert_eq!(Message::SetTriggerSignalPulseWidth.to_string(), "SET_TRIGGER_SIGNAL_PULSE_WIDTH");
    }

    #[test]
    fn result_tags() {
        assert_eq!(descriptor(Message::OpenComms).unwrap().result_tag, Some(VariantTag::ConnectionStatus));
        assert_eq!(descriptor(Message::GetValue).unwrap().result_tag, None);
        assert_eq!(descriptor(Message::SetValue).unwrap().result_tag, Some(VariantTag::Boolean));
    }

    #[test]
    fn opcode_lookup() {
        assert!(matches!(by_opcode(0x15), OpcodeLookup::Unique(d) if d.message == Message::GetValue));
        assert_eq!(by_opcode(0x5C), OpcodeLookup::Unknown);
        match by_opcode(0x58) {
            OpcodeLookup::Ambiguous(all) => {
                let names: Vec<_> = all.iter().map(|d| d.name()).collect();
                assert_eq!(names, ["TST_SET_CALIBRATE_FORCE_PROGRAM_MODE", "TST_SET_CALIBRATION_FORCE"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }
}
