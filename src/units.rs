//! Physical units at the parameter boundary.
//!
//! Readings of parameters that declare a unit come back as a [`Quantity`]; a quantity passed to
//! a set is converted into the parameter's declared unit first. Only linear (scale + offset)
//! conversions inside one dimension are supported.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Temperature,
    TemperatureRate,
    Ratio,
    Length,
    Velocity,
    Time,
    Force,
    Frequency,
    Pressure,
}

/// Unit symbols as the controller catalog spells them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum Unit {
    #[strum(serialize = "degC")]
    DegC,
    #[strum(serialize = "K")]
    Kelvin,
    #[strum(serialize = "degF")]
    DegF,
    #[strum(serialize = "degC/min")]
    DegCPerMin,
    #[strum(serialize = "K/min")]
    KelvinPerMin,
    #[strum(serialize = "degC/s")]
    DegCPerSec,
    #[strum(serialize = "percent")]
    Percent,
    #[strum(serialize = "fraction")]
    Fraction,
    #[strum(serialize = "nm")]
    Nanometre,
    #[strum(serialize = "um")]
    Micrometre,
    #[strum(serialize = "mm")]
    Millimetre,
    #[strum(serialize = "m")]
    Metre,
    #[strum(serialize = "um/s")]
    MicrometrePerSec,
    #[strum(serialize = "mm/s")]
    MillimetrePerSec,
    #[strum(serialize = "ms")]
    Millisecond,
    #[strum(serialize = "s")]
    Second,
    #[strum(serialize = "min")]
    Minute,
    #[strum(serialize = "mN")]
    Millinewton,
    #[strum(serialize = "N")]
    Newton,
    #[strum(serialize = "kN")]
    Kilonewton,
    #[strum(serialize = "Hz")]
    Hertz,
    #[strum(serialize = "kHz")]
    Kilohertz,
    #[strum(serialize = "Pa")]
    Pascal,
    #[strum(serialize = "mbar")]
    Millibar,
    #[strum(serialize = "bar")]
    Bar,
}

impl Unit {
    pub fn dimension(self) -> Dimension {
        use Unit::*;
        match self {
            DegC | Kelvin | DegF => Dimension::Temperature,
            DegCPerMin | KelvinPerMin | DegCPerSec => Dimension::TemperatureRate,
            Percent | Fraction => Dimension::Ratio,
            Nanometre | Micrometre | Millimetre | Metre => Dimension::Length,
            MicrometrePerSec | MillimetrePerSec => Dimension::Velocity,
            Millisecond | Second | Minute => Dimension::Time,
            Millinewton | Newton | Kilonewton => Dimension::Force,
            Hertz | Kilohertz => Dimension::Frequency,
            Pascal | Millibar | Bar => Dimension::Pressure,
        }
    }

    /// `(scale, offset)` such that `base = value * scale + offset`, where base is the first
    /// unit of the dimension (kelvin for temperature).
    fn to_base(self) -> (f64, f64) {
        use Unit::*;
        match self {
            DegC => (1.0, 273.15),
            Kelvin => (1.0, 0.0),
            DegF => (5.0 / 9.0, 273.15 - 32.0 * 5.0 / 9.0),
            DegCPerMin | KelvinPerMin => (1.0, 0.0),
            DegCPerSec => (60.0, 0.0),
            Percent => (0.01, 0.0),
            Fraction => (1.0, 0.0),
            Nanometre => (1e-9, 0.0),
            Micrometre => (1e-6, 0.0),
            Millimetre => (1e-3, 0.0),
            Metre => (1.0, 0.0),
            MicrometrePerSec => (1e-6, 0.0),
            MillimetrePerSec => (1e-3, 0.0),
            Millisecond => (1e-3, 0.0),
            Second => (1.0, 0.0),
            Minute => (60.0, 0.0),
            Millinewton => (1e-3, 0.0),
            Newton => (1.0, 0.0),
            Kilonewton => (1e3, 0.0),
            Hertz => (1.0, 0.0),
            Kilohertz => (1e3, 0.0),
            Pascal => (1.0, 0.0),
            Millibar => (100.0, 0.0),
            Bar => (1e5, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("Cannot convert {from} to {to}")]
    Incompatible { from: Unit, to: Unit },
    #[error("Unknown unit symbol: {0}")]
    UnknownSymbol(String),
}

/// A magnitude tagged with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Quantity { magnitude, unit }
    }

    /// Magnitude expressed in `unit`.
    pub fn magnitude_in(&self, unit: Unit) -> Result<f64, UnitError> {
        if self.unit == unit {
            return Ok(self.magnitude);
        }
        if self.unit.dimension() != unit.dimension() {
            return Err(UnitError::Incompatible { from: self.unit, to: unit });
        }
        let (s_from, o_from) = self.unit.to_base();
        let (s_to, o_to) = unit.to_base();
        Ok((self.magnitude * s_from + o_from - o_to) / s_to)
    }

    pub fn to(&self, unit: Unit) -> Result<Quantity, UnitError> {
        Ok(Quantity::new(self.magnitude_in(unit)?, unit))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

impl FromStr for Quantity {
    type Err = UnitError;

    /// Parse `"<magnitude> <symbol>"`, e.g. `"25 degC"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (num, sym) = s
            .split_once(char::is_whitespace)
            .ok_or_else(|| UnitError::UnknownSymbol(s.to_string()))?;
        let magnitude: f64 = num
            .parse()
            .map_err(|_| UnitError::UnknownSymbol(s.to_string()))?;
        let unit = Unit::from_str(sym.trim()).map_err(|_| UnitError::UnknownSymbol(sym.trim().to_string()))?;
        Ok(Quantity::new(magnitude, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn temperature_offsets() {
        let q = Quantity::new(300.0, Unit::Kelvin);
        assert!(close(q.magnitude_in(Unit::DegC).unwrap(), 26.85));
        let f = Quantity::new(212.0, Unit::DegF);
        assert!(close(f.magnitude_in(Unit::DegC).unwrap(), 100.0));
    }

    #[test]
    fn scaled_units() {
        assert!(close(Quantity::new(1.5, Unit::Millimetre).magnitude_in(Unit::Micrometre).unwrap(), 1500.0));
        assert!(close(Quantity::new(0.25, Unit::Fraction).magnitude_in(Unit::Percent).unwrap(), 25.0));
        assert!(close(Quantity::new(1.0, Unit::DegCPerSec).magnitude_in(Unit::DegCPerMin).unwrap(), 60.0));
        assert!(close(Quantity::new(1.0, Unit::Bar).magnitude_in(Unit::Millibar).unwrap(), 1000.0));
    }

    #[test]
    fn incompatible_dimensions() {
        let err = Quantity::new(1.0, Unit::Newton).magnitude_in(Unit::DegC).unwrap_err();
        assert_eq!(err, UnitError::Incompatible { from: Unit::Newton, to: Unit::DegC });
    }

    #[test]
    fn symbols_round_trip_through_strum() {
        for unit in Unit::iter() {
            assert_eq!(Unit::from_str(&unit.to_string()).unwrap(), unit);
        }
        assert_eq!("25 degC".parse::<Quantity>().unwrap(), Quantity::new(25.0, Unit::DegC));
        assert!("25 furlongs".parse::<Quantity>().is_err());
    }
}
