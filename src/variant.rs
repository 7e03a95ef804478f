//! Typed values exchanged in call slots.
//!
//! On the wire a slot is an untagged 8-byte union; which member is live is known only from the
//! catalog entry driving the call. Inside the crate that knowledge is kept explicit: a
//! [`VariantTag`] names the member and a [`Variant`] carries a value together with its kind.
//! The untagged form lives only in [`envelope`](crate::envelope).

use crate::status::{ConnectionStatus, ControllerConfig, ControllerStatus, StageConfig};
use crate::structs::{CommsType, ControllerErrorCode};

/// Which union member a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum VariantTag {
    Char,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Address of caller-owned storage the transport writes through.
    Ptr,
    Boolean,
    ControllerConfig,
    ControllerError,
    ControllerStatus,
    ConnectionStatus,
    StageValueType,
    StageConfig,
    CommsType,
}

impl VariantTag {
    /// Kinds that [`Variant::from_f64`] can build.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            VariantTag::Char
                | VariantTag::Uint8
                | VariantTag::Uint16
                | VariantTag::Uint32
                | VariantTag::Uint64
                | VariantTag::Int8
                | VariantTag::Int16
                | VariantTag::Int32
                | VariantTag::Int64
                | VariantTag::Float32
                | VariantTag::Float64
                | VariantTag::Boolean
        )
    }
}

/// A slot value with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variant {
    Char(u8),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    ControllerConfig(ControllerConfig),
    ControllerError(ControllerErrorCode),
    ControllerStatus(ControllerStatus),
    ConnectionStatus(ConnectionStatus),
    StageValueType(u32),
    StageConfig(StageConfig),
    CommsType(CommsType),
}

impl Variant {
    pub fn tag(&self) -> VariantTag {
        match self {
            Variant::Char(_) => VariantTag::Char,
            Variant::Uint8(_) => VariantTag::Uint8,
            Variant::Uint16(_) => VariantTag::Uint16,
            Variant::Uint32(_) => VariantTag::Uint32,
            Variant::Uint64(_) => VariantTag::Uint64,
            Variant::Int8(_) => VariantTag::Int8,
            Variant::Int16(_) => VariantTag::Int16,
            Variant::Int32(_) => VariantTag::Int32,
            Variant::Int64(_) => VariantTag::Int64,
            Variant::Float32(_) => VariantTag::Float32,
            Variant::Float64(_) => VariantTag::Float64,
            Variant::Boolean(_) => VariantTag::Boolean,
            Variant::ControllerConfig(_) => VariantTag::ControllerConfig,
            Variant::ControllerError(_) => VariantTag::ControllerError,
            Variant::ControllerStatus(_) => VariantTag::ControllerStatus,
            Variant::ConnectionStatus(_) => VariantTag::ConnectionStatus,
            Variant::StageValueType(_) => VariantTag::StageValueType,
            Variant::StageConfig(_) => VariantTag::StageConfig,
            Variant::CommsType(_) => VariantTag::CommsType,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Variant::Char(x) | Variant::Uint8(x) => Some(*x as u64),
            Variant::Uint16(x) => Some(*x as u64),
            Variant::Uint32(x) | Variant::StageValueType(x) => Some(*x as u64),
            Variant::Uint64(x) => Some(*x),
            Variant::Boolean(b) => Some(*b as u64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Variant::Int8(x) => Some(*x as i64),
            Variant::Int16(x) => Some(*x as i64),
            Variant::Int32(x) => Some(*x as i64),
            Variant::Int64(x) => Some(*x),
            _ => self.as_u64().and_then(|x| i64::try_from(x).ok()),
        }
    }

    /// Any numeric kind widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Variant::Float32(x) => Some(*x as f64),
            Variant::Float64(x) => Some(*x),
            Variant::Int8(_) | Variant::Int16(_) | Variant::Int32(_) | Variant::Int64(_) => {
                self.as_i64().map(|x| x as f64)
            }
            _ => self.as_u64().map(|x| x as f64),
        }
    }

    /// Build a value of kind `tag` from a plain number.
    ///
    /// Integer kinds accept only whole numbers inside their range; `Boolean` accepts 0 and 1.
    /// Returns `None` for struct and pointer kinds, or when the number does not fit.
    pub fn from_f64(tag: VariantTag, v: f64) -> Option<Variant> {
        if !v.is_finite() {
            return match tag {
                VariantTag::Float32 => Some(Variant::Float32(v as f32)),
                VariantTag::Float64 => Some(Variant::Float64(v)),
                _ => None,
            };
        }
        let whole = v.fract() == 0.0;
        macro_rules! int {
            ($t:ty, $variant:ident) => {
                if whole && v >= <$t>::MIN as f64 && v <= <$t>::MAX as f64 {
                    Some(Variant::$variant(v as $t))
                } else {
                    None
                }
            };
        }
        match tag {
            VariantTag::Float32 => Some(Variant::Float32(v as f32)),
            VariantTag::Float64 => Some(Variant::Float64(v)),
            VariantTag::Char => int!(u8, Char),
            VariantTag::Uint8 => int!(u8, Uint8),
            VariantTag::Uint16 => int!(u16, Uint16),
            VariantTag::Uint32 => int!(u32, Uint32),
            VariantTag::Uint64 => int!(u64, Uint64),
            VariantTag::Int8 => int!(i8, Int8),
            VariantTag::Int16 => int!(i16, Int16),
            VariantTag::Int32 => int!(i32, Int32),
            VariantTag::Int64 => int!(i64, Int64),
            VariantTag::Boolean if v == 0.0 => Some(Variant::Boolean(false)),
            VariantTag::Boolean if v == 1.0 => Some(Variant::Boolean(true)),
            _ => None,
        }
    }
}

impl From<bool> for Variant {
    fn from(b: bool) -> Self {
        Variant::Boolean(b)
    }
}

impl From<f32> for Variant {
    fn from(x: f32) -> Self {
        Variant::Float32(x)
    }
}

impl From<u32> for Variant {
    fn from(x: u32) -> Self {
        Variant::Uint32(x)
    }
}

impl From<i32> for Variant {
    fn from(x: i32) -> Self {
        Variant::Int32(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn from_f64_respects_integer_ranges() {
        assert_eq!(Variant::from_f64(VariantTag::Uint16, 65535.0), Some(Variant::Uint16(65535)));
        assert_eq!(Variant::from_f64(VariantTag::Uint16, 65536.0), None);
        assert_eq!(Variant::from_f64(VariantTag::Int32, -5.0), Some(Variant::Int32(-5)));
        assert_eq!(Variant::from_f64(VariantTag::Int32, 1.5), None);
        assert_eq!(Variant::from_f64(VariantTag::Uint32, -1.0), None);
    }

    #[test]
    fn from_f64_booleans_and_structs() {
        assert_eq!(Variant::from_f64(VariantTag::Boolean, 1.0), Some(Variant::Boolean(true)));
        assert_eq!(Variant::from_f64(VariantTag::Boolean, 2.0), None);
        assert_eq!(Variant::from_f64(VariantTag::ControllerStatus, 1.0), None);
        assert_eq!(Variant::from_f64(VariantTag::Ptr, 0.0), None);
    }

    #[test]
    fn numeric_tags_build_their_own_kind() {
        for tag in VariantTag::iter().filter(|t| t.is_numeric()) {
            let v = Variant::from_f64(tag, 1.0).expect("numeric");
            assert_eq!(v.tag(), tag);
            assert_eq!(v.as_f64(), Some(1.0));
        }
    }

    #[test]
    fn widening_accessors() {
        assert_eq!(Variant::Int16(-3).as_i64(), Some(-3));
        assert_eq!(Variant::Int16(-3).as_u64(), None);
        assert_eq!(Variant::Uint64(u64::MAX).as_i64(), None);
        assert_eq!(Variant::Float32(2.5).as_f64(), Some(2.5));
        assert_eq!(Variant::Boolean(true).as_bool(), Some(true));
    }
}
