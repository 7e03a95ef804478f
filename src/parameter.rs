//! Parameter catalog: stage value types addressed by GET_VALUE / SET_VALUE and the min/max
//! queries, with the slot member each one uses and its physical unit.
//!
//! Ids that are reserved, vendor-only, or whose value does not fit a scalar slot are left out.

use crate::error::{Error, Result};
use crate::units::Unit;
use crate::variant::VariantTag;

/// Parameters the host can read or write.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Parameter {
    Heater1Temp,
    HeaterRate,
    HeaterSetpoint,
    Heater1Power,
    Heater1LnpSpeed,
    Heater2Temp,
    Heater2Power,
    Heater2LnpSpeed,
    WaterCoolingTemp,
    HumidityTemp,
    Vacuum,
    VacuumSetpoint,
    Humidity,
    HumiditySetpoint,
    MotorPosX,
    MotorVelX,
    MotorSetpointX,
    MotorPosY,
    MotorVelY,
    MotorSetpointY,
    MotorPosZ,
    MotorVelZ,
    MotorSetpointZ,
    VacuumBoardUnitOfMeasure,
    VacMotorValvePos,
    VacMotorValveVel,
    VacMotorValveSetpoint,
    GradedMotorPos,
    GradedMotorVel,
    GradedMotorDistanceSetpoint,
    SampleRef1,
    SampleAct1,
    SampleRef2,
    SampleAct2,
    SampleRef3,
    SampleAct3,
    SampleRef4,
    SampleAct4,
    SampleRef5,
    SampleAct5,
    Heater3Temp,
    Dsc,
    TriggerSignalBlue,
    TriggerSignalGreen,
    TriggerSignalPink,
    TriggerSignalsEnabled,
    TemperatureResolution,
    Heater4Temp,
    CmsLight,
    CmsWarmingHeater,
    CmsSolenoidRefill,
    CmsSampleDewarFillSig,
    RampHoldTime,
    RampHoldRemaining,
    CmsMainDewarFillSig,
    CmsCondenserLedLevel,
    TstMotorPos,
    TstMotorVel,
    TstMotorDistanceSetpoint,
    TstForce,
    TstForceSetpoint,
    TstPidKp,
    TstPidKi,
    TstPidKd,
    TstForceGauge,
    CssGapSetpoint,
    CssGapPos,
    CssStrainSetpoint,
    CssRateSetpoint,
    CssOcsFreq,
    CssDirn,
    CssJogRotVel,
    CssJogGapDis,
    CssDefaultGapRefVel,
    CssDefaultRotRefVel,
    CssStepDone,
    CssStepSuccess,
    CssForce,
    CssShareTime,
    CssRotMotorVelocitySetpoint,
    CssGapMotorVelocitySetpoint,
    Rs232OptionBoardSensorEnabled,
    VacuumOptionBoardSensor1Enabled,
    VacuumOptionBoardSensor2Enabled,
    VtoOptionBoardEnabled,
    CmsDewarTopTemperature,
    CmsAutoDewarFill,
    DscPower,
    DscGain1,
    DscGain2,
    DscGain3,
    DscConstantTerm,
    DscPowerTerm1,
    DscPowerTerm2,
    DscPowerTerm3,
    DscPowerTerm4,
    DscPowerTerm5,
    DscPowerTerm6,
    DscBaselineConstTerm,
    DscBaselinePowerTerm1,
    DscBaselinePowerTerm2,
    DscBaselinePowerTerm3,
    DscBaselinePowerTerm4,
    DscTuaConst1,
    DscTuaConst2,
    DscOptionBoardSensorEnabled,
    TstJawToJawSize,
    TstTableDirection,
    TstStrainEngineeringUnits,
    TstStrainPercentage,
    TstShowAsForceDistance,
    TstCalForceValue,
    TstOptionBoardSensorEnabled,
    TstShowCalbData,
    TstJawPosition,
    TstStrain,
    TstStress,
    /// Read through a pointer slot; see `Connection::humidity_details`.
    StageHumidityUnitData,
    Pressure,
    MotorXOptionBoardSensorEnabled,
    MotorYOptionBoardSensorEnabled,
    MotorZOptionBoardSensorEnabled,
    MotorVacuumOptionBoardSensorEnabled,
    #[strum(serialize = "MOTOR_F_D_VACUUM_OPTION_BOARD_SENSOR_ENABLED")]
    MotorFDVacuumOptionBoardSensorEnabled,
    MotorTstOptionBoardSensorEnabled,
    MotorGradientOptionBoardSensorEnabled,
    TtcOptionBoardEnabled,
    TtcOptionBoardSensor1Enabled,
    TtcOptionBoardSensor2Enabled,
    TtcOptionBoardSensor3Enabled,
    DtcOptionBoardSensor1Enabled,
    DtcOptionBoardSensor2Enabled,
    MotorXDefaultSpeed,
    MotorYDefaultSpeed,
    MotorZDefaultSpeed,
    MotorTstDefaultSpeed,
    MotorGsDefaultSpeed,
    MotorVacDefaultSpeed,
    MotorFdVacDefaultSpeed,
    HumidityDryingTimeSetpoint,
    HumiditySwapTimeSetpoint,
    HumidityPipeTempSetpoint,
    HumidityWaterTempSetpoint,
    HumidityDryingTimeLeft,
    HumiditySwapTimeLeft,
    HumidityWaterTemp,
    VtoVideoStandard,
    TriggerSignalPulseWidth,
    ConnectionType,
    LnpSingle,
    LnpDual,
    Lnp95,
    Lnp96,
    ManualHumiditySetpoint,
    FdvsColdTrapPumpSpeed,
    ImagingStationBrightness,
    FdvsMotorVel,
    FdvsMotorDistanceSetpoint,
    CssDefaultGapChangeVel,
    TstGaugeCompliancy,
}

impl Parameter {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub parameter: Parameter,
    pub id: u32,
    pub value_tag: VariantTag,
    pub unit: Option<Unit>,
}

impl ParameterDescriptor {
    pub fn name(&self) -> &'static str {
        self.parameter.name()
    }
}

const fn entry(parameter: Parameter, id: u32, value_tag: VariantTag, unit: Option<Unit>) -> ParameterDescriptor {
    ParameterDescriptor { parameter, id, value_tag, unit }
}

pub static PARAMETERS: &[ParameterDescriptor] = &[
    entry(Parameter::Heater1Temp, 0, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::HeaterRate, 1, VariantTag::Float32, Some(Unit::DegCPerMin)),
    entry(Parameter::HeaterSetpoint, 2, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::Heater1Power, 3, VariantTag::Float32, Some(Unit::Percent)),
    entry(Parameter::Heater1LnpSpeed, 4, VariantTag::Float32, Some(Unit::Percent)),
    entry(Parameter::Heater2Temp, 5, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::Heater2Power, 8, VariantTag::Float32, Some(Unit::Percent)),
    entry(Parameter::Heater2LnpSpeed, 9, VariantTag::Float32, Some(Unit::Percent)),
    entry(Parameter::WaterCoolingTemp, 10, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::HumidityTemp, 11, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::Vacuum, 12, VariantTag::Float32, None),
    entry(Parameter::VacuumSetpoint, 13, VariantTag::Float32, None),
    entry(Parameter::Humidity, 14, VariantTag::Float32, Some(Unit::Percent)),
    entry(Parameter::HumiditySetpoint, 15, VariantTag::Float32, Some(Unit::Percent)),
    entry(Parameter::MotorPosX, 16, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::MotorVelX, 17, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::MotorSetpointX, 18, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::MotorPosY, 19, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::MotorVelY, 20, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::MotorSetpointY, 21, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::MotorPosZ, 22, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::MotorVelZ, 23, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::MotorSetpointZ, 24, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::VacuumBoardUnitOfMeasure, 26, VariantTag::Uint32, None),
    entry(Parameter::VacMotorValvePos, 28, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::VacMotorValveVel, 29, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::VacMotorValveSetpoint, 30, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::GradedMotorPos, 31, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::GradedMotorVel, 32, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::GradedMotorDistanceSetpoint, 33, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::SampleRef1, 34, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleAct1, 35, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleRef2, 36, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleAct2, 37, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleRef3, 38, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleAct3, 39, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleRef4, 40, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleAct4, 41, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleRef5, 42, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::SampleAct5, 43, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::Heater3Temp, 44, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::Dsc, 45, VariantTag::Uint32, None),
    entry(Parameter::TriggerSignalBlue, 46, VariantTag::Float32, None),
    entry(Parameter::TriggerSignalGreen, 47, VariantTag::Float32, None),
    entry(Parameter::TriggerSignalPink, 48, VariantTag::Float32, None),
    entry(Parameter::TriggerSignalsEnabled, 49, VariantTag::Boolean, None),
    entry(Parameter::TemperatureResolution, 50, VariantTag::Uint32, None),
    entry(Parameter::Heater4Temp, 51, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::CmsLight, 52, VariantTag::Boolean, None),
    entry(Parameter::CmsWarmingHeater, 53, VariantTag::Boolean, None),
    entry(Parameter::CmsSolenoidRefill, 54, VariantTag::Boolean, None),
    entry(Parameter::CmsSampleDewarFillSig, 55, VariantTag::Boolean, None),
    entry(Parameter::RampHoldTime, 58, VariantTag::Float32, Some(Unit::Second)),
    entry(Parameter::RampHoldRemaining, 59, VariantTag::Float32, Some(Unit::Second)),
    entry(Parameter::CmsMainDewarFillSig, 60, VariantTag::Boolean, None),
    entry(Parameter::CmsCondenserLedLevel, 61, VariantTag::Uint16, None),
    entry(Parameter::TstMotorPos, 64, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::TstMotorVel, 65, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::TstMotorDistanceSetpoint, 66, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::TstForce, 67, VariantTag::Float32, Some(Unit::Newton)),
    entry(Parameter::TstForceSetpoint, 68, VariantTag::Float32, Some(Unit::Newton)),
    entry(Parameter::TstPidKp, 69, VariantTag::Float32, None),
    entry(Parameter::TstPidKi, 70, VariantTag::Float32, None),
    entry(Parameter::TstPidKd, 71, VariantTag::Float32, None),
    entry(Parameter::TstForceGauge, 72, VariantTag::Float32, Some(Unit::Newton)),
    entry(Parameter::CssGapSetpoint, 74, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::CssGapPos, 75, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::CssStrainSetpoint, 76, VariantTag::Float32, None),
    entry(Parameter::CssRateSetpoint, 77, VariantTag::Float32, None),
    entry(Parameter::CssOcsFreq, 78, VariantTag::Float32, Some(Unit::Hertz)),
    entry(Parameter::CssDirn, 79, VariantTag::Boolean, None),
    entry(Parameter::CssJogRotVel, 80, VariantTag::Float32, None),
    entry(Parameter::CssJogGapDis, 81, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::CssDefaultGapRefVel, 82, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::CssDefaultRotRefVel, 83, VariantTag::Float32, None),
    entry(Parameter::CssStepDone, 84, VariantTag::Boolean, None),
    entry(Parameter::CssStepSuccess, 85, VariantTag::Boolean, None),
    entry(Parameter::CssForce, 87, VariantTag::Float32, None),
    entry(Parameter::CssShareTime, 88, VariantTag::Float32, Some(Unit::Second)),
    entry(Parameter::CssRotMotorVelocitySetpoint, 89, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::CssGapMotorVelocitySetpoint, 90, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::Rs232OptionBoardSensorEnabled, 92, VariantTag::Boolean, None),
    entry(Parameter::VacuumOptionBoardSensor1Enabled, 94, VariantTag::Boolean, None),
    entry(Parameter::VacuumOptionBoardSensor2Enabled, 96, VariantTag::Boolean, None),
    entry(Parameter::VtoOptionBoardEnabled, 97, VariantTag::Boolean, None),
    entry(Parameter::CmsDewarTopTemperature, 98, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::CmsAutoDewarFill, 99, VariantTag::Boolean, None),
    entry(Parameter::DscPower, 100, VariantTag::Float32, None),
    entry(Parameter::DscGain1, 101, VariantTag::Float32, None),
    entry(Parameter::DscGain2, 102, VariantTag::Float32, None),
    entry(Parameter::DscGain3, 103, VariantTag::Float32, None),
    entry(Parameter::DscConstantTerm, 104, VariantTag::Float32, None),
    entry(Parameter::DscPowerTerm1, 105, VariantTag::Float32, None),
    entry(Parameter::DscPowerTerm2, 106, VariantTag::Float32, None),
    entry(Parameter::DscPowerTerm3, 107, VariantTag::Float32, None),
    entry(Parameter::DscPowerTerm4, 108, VariantTag::Float32, None),
    entry(Parameter::DscPowerTerm5, 109, VariantTag::Float32, None),
    entry(Parameter::DscPowerTerm6, 110, VariantTag::Float32, None),
    entry(Parameter::DscBaselineConstTerm, 111, VariantTag::Float32, None),
    entry(Parameter::DscBaselinePowerTerm1, 112, VariantTag::Float32, None),
    entry(Parameter::DscBaselinePowerTerm2, 113, VariantTag::Float32, None),
    entry(Parameter::DscBaselinePowerTerm3, 114, VariantTag::Float32, None),
    entry(Parameter::DscBaselinePowerTerm4, 115, VariantTag::Float32, None),
    entry(Parameter::DscTuaConst1, 116, VariantTag::Float32, None),
    entry(Parameter::DscTuaConst2, 117, VariantTag::Float32, None),
    entry(Parameter::DscOptionBoardSensorEnabled, 118, VariantTag::Boolean, None),
    entry(Parameter::TstJawToJawSize, 119, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::TstTableDirection, 120, VariantTag::Boolean, None),
    entry(Parameter::TstStrainEngineeringUnits, 122, VariantTag::Boolean, None),
    entry(Parameter::TstStrainPercentage, 123, VariantTag::Boolean, None),
    entry(Parameter::TstShowAsForceDistance, 124, VariantTag::Boolean, None),
    entry(Parameter::TstCalForceValue, 125, VariantTag::Float32, Some(Unit::Newton)),
    entry(Parameter::TstOptionBoardSensorEnabled, 126, VariantTag::Boolean, None),
    entry(Parameter::TstShowCalbData, 127, VariantTag::Boolean, None),
    entry(Parameter::TstJawPosition, 129, VariantTag::Float32, None),
    entry(Parameter::TstStrain, 130, VariantTag::Float32, None),
    entry(Parameter::TstStress, 131, VariantTag::Float32, None),
    entry(Parameter::StageHumidityUnitData, 133, VariantTag::Ptr, None),
    entry(Parameter::Pressure, 134, VariantTag::Float32, Some(Unit::Millibar)),
    entry(Parameter::MotorXOptionBoardSensorEnabled, 135, VariantTag::Boolean, None),
    entry(Parameter::MotorYOptionBoardSensorEnabled, 136, VariantTag::Boolean, None),
    entry(Parameter::MotorZOptionBoardSensorEnabled, 137, VariantTag::Boolean, None),
    entry(Parameter::MotorVacuumOptionBoardSensorEnabled, 138, VariantTag::Boolean, None),
    entry(Parameter::MotorFDVacuumOptionBoardSensorEnabled, 139, VariantTag::Boolean, None),
    entry(Parameter::MotorTstOptionBoardSensorEnabled, 140, VariantTag::Boolean, None),
    entry(Parameter::MotorGradientOptionBoardSensorEnabled, 141, VariantTag::Boolean, None),
    entry(Parameter::TtcOptionBoardEnabled, 149, VariantTag::Boolean, None),
    entry(Parameter::TtcOptionBoardSensor1Enabled, 150, VariantTag::Boolean, None),
    entry(Parameter::TtcOptionBoardSensor2Enabled, 151, VariantTag::Boolean, None),
    entry(Parameter::TtcOptionBoardSensor3Enabled, 152, VariantTag::Boolean, None),
    entry(Parameter::DtcOptionBoardSensor1Enabled, 153, VariantTag::Boolean, None),
    entry(Parameter::DtcOptionBoardSensor2Enabled, 154, VariantTag::Boolean, None),
    entry(Parameter::MotorXDefaultSpeed, 155, VariantTag::Float32, None),
    entry(Parameter::MotorYDefaultSpeed, 156, VariantTag::Float32, None),
    entry(Parameter::MotorZDefaultSpeed, 157, VariantTag::Float32, None),
    entry(Parameter::MotorTstDefaultSpeed, 158, VariantTag::Float32, None),
    entry(Parameter::MotorGsDefaultSpeed, 159, VariantTag::Float32, None),
    entry(Parameter::MotorVacDefaultSpeed, 160, VariantTag::Float32, None),
    entry(Parameter::MotorFdVacDefaultSpeed, 161, VariantTag::Float32, None),
    entry(Parameter::HumidityDryingTimeSetpoint, 162, VariantTag::Int32, Some(Unit::Second)),
    entry(Parameter::HumiditySwapTimeSetpoint, 163, VariantTag::Int32, Some(Unit::Second)),
    entry(Parameter::HumidityPipeTempSetpoint, 164, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::HumidityWaterTempSetpoint, 165, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::HumidityDryingTimeLeft, 166, VariantTag::Int32, Some(Unit::Second)),
    entry(Parameter::HumiditySwapTimeLeft, 167, VariantTag::Int32, Some(Unit::Second)),
    entry(Parameter::HumidityWaterTemp, 168, VariantTag::Float32, Some(Unit::DegC)),
    entry(Parameter::VtoVideoStandard, 169, VariantTag::Uint32, None),
    entry(Parameter::TriggerSignalPulseWidth, 170, VariantTag::Int32, Some(Unit::Second)),
    entry(Parameter::ConnectionType, 171, VariantTag::CommsType, None),
    entry(Parameter::LnpSingle, 174, VariantTag::Boolean, None),
    entry(Parameter::LnpDual, 175, VariantTag::Boolean, None),
    entry(Parameter::Lnp95, 176, VariantTag::Boolean, None),
    entry(Parameter::Lnp96, 177, VariantTag::Boolean, None),
    entry(Parameter::ManualHumiditySetpoint, 194, VariantTag::Float32, Some(Unit::Percent)),
    entry(Parameter::FdvsColdTrapPumpSpeed, 195, VariantTag::Float32, None),
    entry(Parameter::ImagingStationBrightness, 197, VariantTag::Float32, None),
    entry(Parameter::FdvsMotorVel, 202, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::FdvsMotorDistanceSetpoint, 203, VariantTag::Float32, Some(Unit::Micrometre)),
    entry(Parameter::CssDefaultGapChangeVel, 204, VariantTag::Float32, Some(Unit::MicrometrePerSec)),
    entry(Parameter::TstGaugeCompliancy, 205, VariantTag::Float32, Some(Unit::Millimetre)),
];

/// Catalog entry for `parameter`. A parameter missing from the table is a catalog bug.
pub fn descriptor(parameter: Parameter) -> Result<&'static ParameterDescriptor> {
    PARAMETERS
        .iter()
        .find(|d| d.parameter == parameter)
        .ok_or_else(|| Error::CatalogFault(format!("parameter {} has no catalog entry", parameter.name())))
}

/// Catalog entry for a raw parameter id.
pub fn by_id(id: u32) -> Result<&'static ParameterDescriptor> {
    PARAMETERS
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| Error::CatalogFault(format!("unknown parameter id {}", id)))
}

impl TryFrom<u32> for Parameter {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        by_id(id).map(|d| d.parameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heater_entries() {
        let d = descriptor(Parameter::Heater1Temp).unwrap();
        assert_eq!(d.id, 0);
        assert_eq!(d.value_tag, VariantTag::Float32);
        assert_eq!(d.unit, Some(Unit::DegC));
        assert_eq!(descriptor(Parameter::HeaterRate).unwrap().unit, Some(Unit::DegCPerMin));
    }

    #[test]
    fn names() {
        assert_eq!(Parameter::Heater1Temp.name(), "HEATER1_TEMP");
        assert_eq!(Parameter::MotorXOptionBoardSensorEnabled.name(), "MOTOR_X_OPTION_BOARD_SENSOR_ENABLED");
        assert_eq!(Parameter::MotorFDVacuumOptionBoardSensorEnabled.name(), "MOTOR_F_D_VACUUM_OPTION_BOARD_SENSOR_ENABLED");
    }

    #[test]
    fn unknown_ids_are_catalog_faults() {
        assert!(matches!(by_id(6), Err(Error::CatalogFault(_))));
        assert_eq!(Parameter::try_from(134).unwrap(), Parameter::Pressure);
    }
}
