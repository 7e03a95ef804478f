//! The call envelope: three input slots and one output slot.
//!
//! This is the only place the untagged union exists. A [`RawVariant`] is the 8-byte image of
//! one slot; [`RawVariant::encode`] writes a typed [`Variant`] into it and
//! [`RawVariant::decode`] reads it back as the member named by a [`VariantTag`].
//!
//! Pointer-kind arguments are carried as borrowed byte buffers ([`Slot::Buffer`]). The borrow
//! keeps the caller's storage alive for the whole call, and the transport writes through it.
//! Unused input slots are zero-filled values.

use crate::error::WireError;
use crate::status::{ConnectionStatus, ControllerConfig, ControllerStatus, StageConfig};
use crate::structs::{CommsType, ControllerErrorCode};
use crate::variant::{Variant, VariantTag};
use byteorder::{ByteOrder, LittleEndian};

/// Byte order of every multi-byte field crossing the transport.
pub type WireOrder = LittleEndian;

pub const VARIANT_SIZE: usize = 8;
pub const ENVELOPE_SLOTS: usize = 3;

/// Untagged image of one slot.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct RawVariant([u8; VARIANT_SIZE]);

impl std::fmt::Debug for RawVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawVariant({:#018x})", WireOrder::read_u64(&self.0))
    }
}

impl RawVariant {
    pub const fn zeroed() -> Self {
        RawVariant([0u8; VARIANT_SIZE])
    }

    pub const fn from_bytes(bytes: [u8; VARIANT_SIZE]) -> Self {
        RawVariant(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; VARIANT_SIZE] {
        &self.0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; VARIANT_SIZE] {
        &mut self.0
    }

    /// Write `value` into the member its kind names; the remaining bytes stay zero.
    pub fn encode(value: &Variant) -> Self {
        let mut raw = RawVariant::zeroed();
        let b = &mut raw.0;
        match *value {
            Variant::Char(x) | Variant::Uint8(x) => b[0] = x,
            Variant::Int8(x) => b[0] = x as u8,
            Variant::Boolean(x) => b[0] = x as u8,
            Variant::Uint16(x) => WireOrder::write_u16(&mut b[..2], x),
            Variant::Int16(x) => WireOrder::write_i16(&mut b[..2], x),
            Variant::Uint32(x) | Variant::StageValueType(x) => WireOrder::write_u32(&mut b[..4], x),
            Variant::Int32(x) => WireOrder::write_i32(&mut b[..4], x),
            Variant::Uint64(x) => WireOrder::write_u64(b, x),
            Variant::Int64(x) => WireOrder::write_i64(b, x),
            Variant::Float32(x) => WireOrder::write_f32(&mut b[..4], x),
            Variant::Float64(x) => WireOrder::write_f64(b, x),
            Variant::ControllerConfig(x) => WireOrder::write_u64(b, x.to_bits()),
            Variant::ControllerStatus(x) => WireOrder::write_u64(b, x.to_bits()),
            Variant::StageConfig(x) => WireOrder::write_u64(b, x.to_bits()),
            Variant::ConnectionStatus(x) => WireOrder::write_u32(&mut b[..4], x.to_bits()),
            Variant::ControllerError(x) => WireOrder::write_u32(&mut b[..4], x.code()),
            Variant::CommsType(x) => WireOrder::write_u32(&mut b[..4], x.code()),
        }
        raw
    }

    /// Read the member named by `tag`.
    pub fn decode(&self, tag: VariantTag) -> Result<Variant, WireError> {
        let b = &self.0;
        Ok(match tag {
            VariantTag::Char => Variant::Char(b[0]),
            VariantTag::Uint8 => Variant::Uint8(b[0]),
            VariantTag::Int8 => Variant::Int8(b[0] as i8),
            VariantTag::Boolean => Variant::Boolean(b[0] != 0),
            VariantTag::Uint16 => Variant::Uint16(WireOrder::read_u16(&b[..2])),
            VariantTag::Int16 => Variant::Int16(WireOrder::read_i16(&b[..2])),
            VariantTag::Uint32 => Variant::Uint32(WireOrder::read_u32(&b[..4])),
            VariantTag::Int32 => Variant::Int32(WireOrder::read_i32(&b[..4])),
            VariantTag::Uint64 => Variant::Uint64(WireOrder::read_u64(b)),
            VariantTag::Int64 => Variant::Int64(WireOrder::read_i64(b)),
            VariantTag::Float32 => Variant::Float32(WireOrder::read_f32(&b[..4])),
            VariantTag::Float64 => Variant::Float64(WireOrder::read_f64(b)),
            VariantTag::StageValueType => Variant::StageValueType(WireOrder::read_u32(&b[..4])),
            VariantTag::ControllerConfig => {
                Variant::ControllerConfig(ControllerConfig::from_bits(WireOrder::read_u64(b)))
            }
            VariantTag::ControllerStatus => {
                Variant::ControllerStatus(ControllerStatus::from_bits(WireOrder::read_u64(b)))
            }
            VariantTag::StageConfig => {
                Variant::StageConfig(StageConfig::from_bits(WireOrder::read_u64(b)))
            }
            VariantTag::ConnectionStatus => {
                Variant::ConnectionStatus(ConnectionStatus::from_bits(WireOrder::read_u32(&b[..4])))
            }
            VariantTag::ControllerError => {
                Variant::ControllerError(ControllerErrorCode::from_code(WireOrder::read_u32(&b[..4])))
            }
            VariantTag::CommsType => {
                let code = WireOrder::read_u32(&b[..4]);
                Variant::CommsType(CommsType::from_code(code).unwrap_or_default())
            }
            VariantTag::Ptr => return Err(WireError::PointerTag(tag)),
        })
    }
}

/// One input argument before encoding.
#[derive(Debug)]
pub enum Arg<'a> {
    Value(Variant),
    /// Caller-owned storage the transport may write through.
    Ptr(&'a mut [u8]),
}

impl From<Variant> for Arg<'_> {
    fn from(v: Variant) -> Self {
        Arg::Value(v)
    }
}

impl<'a> From<&'a mut [u8]> for Arg<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        Arg::Ptr(buf)
    }
}

/// One encoded input slot as seen by the transport.
#[derive(Debug)]
pub enum Slot<'a> {
    Value(RawVariant),
    Buffer(&'a mut [u8]),
}

impl<'a> Slot<'a> {
    pub fn empty() -> Self {
        Slot::Value(RawVariant::zeroed())
    }

    pub fn value(&self) -> Option<&RawVariant> {
        match self {
            Slot::Value(v) => Some(v),
            Slot::Buffer(_) => None,
        }
    }

    pub fn buffer(&mut self) -> Option<&mut [u8]> {
        match self {
            Slot::Buffer(b) => Some(&mut **b),
            Slot::Value(_) => None,
        }
    }
}

/// The three input slots of one call.
#[derive(Debug)]
pub struct Envelope<'a> {
    pub slots: [Slot<'a>; ENVELOPE_SLOTS],
}

impl<'a> Envelope<'a> {
    /// Encode up to three arguments; missing ones become zero-filled slots.
    pub fn encode<I>(args: I) -> Result<Self, WireError>
    where
        I: IntoIterator<Item = Arg<'a>>,
    {
        let mut slots = [Slot::empty(), Slot::empty(), Slot::empty()];
        let mut count = 0usize;
        for arg in args {
            if count < ENVELOPE_SLOTS {
                slots[count] = match arg {
                    Arg::Value(v) => Slot::Value(RawVariant::encode(&v)),
                    Arg::Ptr(buf) => Slot::Buffer(buf),
                };
            }
            count += 1;
        }
        if count > ENVELOPE_SLOTS {
            return Err(WireError::TooManyArguments(count));
        }
        Ok(Envelope { slots })
    }
}

/// Decoded output slot.
///
/// `Typed` when the message declares a result tag; otherwise the raw slot is handed back and
/// the caller picks the member from context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    Typed(Variant),
    Raw(RawVariant),
}

impl Reply {
    pub fn decode(raw: RawVariant, tag: Option<VariantTag>) -> Result<Self, WireError> {
        match tag {
            Some(tag) => Ok(Reply::Typed(raw.decode(tag)?)),
            None => Ok(Reply::Raw(raw)),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Reply::Typed(v) => v.as_bool(),
            Reply::Raw(_) => None,
        }
    }

    pub fn typed(&self) -> Option<Variant> {
        match self {
            Reply::Typed(v) => Some(*v),
            Reply::Raw(_) => None,
        }
    }

    /// Read the reply as member `tag`, reinterpreting the slot if it was left raw.
    pub fn field(&self, tag: VariantTag) -> Result<Variant, WireError> {
        match self {
            Reply::Typed(v) if v.tag() == tag => Ok(*v),
            Reply::Typed(v) => RawVariant::encode(v).decode(tag),
            Reply::Raw(raw) => raw.decode(tag),
        }
    }
}

/// Decode a NUL-terminated buffer: bytes up to the first NUL (or all of them), trailing
/// whitespace removed.
pub fn decode_string(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn scalar_members_share_low_bytes() {
        let raw = RawVariant::encode(&Variant::Uint32(0x0102_0304));
        assert_eq!(raw.as_bytes(), &[4, 3, 2, 1, 0, 0, 0, 0]);
        assert_eq!(raw.decode(VariantTag::Uint16).unwrap(), Variant::Uint16(0x0304));
        assert_eq!(raw.decode(VariantTag::Uint8).unwrap(), Variant::Uint8(4));
    }

    #[test]
    fn float_member() {
        let raw = RawVariant::encode(&Variant::Float32(25.0));
        assert_eq!(&raw.as_bytes()[..4], &25.0f32.to_le_bytes());
        assert_eq!(raw.decode(VariantTag::Float32).unwrap(), Variant::Float32(25.0));
    }

    #[test]
    fn every_value_tag_reads_back_its_own_encoding() {
        for tag in VariantTag::iter().filter(|t| t.is_numeric()) {
            let v = Variant::from_f64(tag, 1.0).unwrap();
            assert_eq!(RawVariant::encode(&v).decode(tag).unwrap(), v, "{tag}");
        }
    }

    #[test]
    fn pointer_tag_has_no_scalar_member() {
        let err = RawVariant::zeroed().decode(VariantTag::Ptr).unwrap_err();
        assert!(matches!(err, WireError::PointerTag(VariantTag::Ptr)));
    }

    #[test]
    fn envelope_pads_and_limits() {
        let mut buf = [0u8; 4];
        let env = Envelope::encode([Arg::Ptr(&mut buf), Arg::Value(Variant::Uint32(3))]).unwrap();
        assert!(matches!(env.slots[0], Slot::Buffer(_)));
        assert_eq!(env.slots[1].value(), Some(&RawVariant::encode(&Variant::Uint32(3))));
        assert_eq!(env.slots[2].value(), Some(&RawVariant::zeroed()));

        let four = (0..4).map(|i| Arg::Value(Variant::Uint32(i)));
        assert!(matches!(Envelope::encode(four), Err(WireError::TooManyArguments(4))));
    }

    #[test]
    fn reply_field_reinterprets_raw() {
        let raw = RawVariant::encode(&Variant::Float32(-40.0));
        let reply = Reply::decode(raw, None).unwrap();
        assert_eq!(reply.as_bool(), None);
        assert_eq!(reply.field(VariantTag::Float32).unwrap(), Variant::Float32(-40.0));
        let typed = Reply::decode(RawVariant::encode(&Variant::Boolean(true)), Some(VariantTag::Boolean)).unwrap();
        assert_eq!(typed.as_bool(), Some(true));
    }

    #[test]
    fn strings_stop_at_terminator() {
        assert_eq!(decode_string(b"ABC\0\0\0\0\0"), "ABC");
        assert_eq!(decode_string(b"ABCDEF  "), "ABCDEF");
        assert_eq!(decode_string(b"AB\0CD\0"), "AB");
        assert_eq!(decode_string(b""), "");
    }
}
