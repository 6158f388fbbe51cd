//! Custom-attribute blob codec.
//!
//! A blob is laid out as:
//!
//! ```text
//! 01 00                      prolog
//! tag value                  per positional argument
//! 1D tag count:u32 values    per array argument; count FFFFFFFF is null
//! 00 00                      named-argument count
//! ```
//!
//! Integers and floats are little-endian. Strings and type names are an
//! ECMA-335 compressed length followed by UTF-8 bytes, or the single byte
//! `FF` for null. Array elements are written without their tag.

use classbind_core::ConstValue;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use ordered_float::OrderedFloat;
use thiserror::Error;

/// First two bytes of every blob.
pub const PROLOG: u16 = 0x0001;

const NULL_STRING: u8 = 0xFF;
const NULL_ARRAY: u32 = 0xFFFF_FFFF;

/// ECMA-335 element type tags used in attribute blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ElementType {
    Boolean = 0x02,
    Char = 0x03,
    I1 = 0x04,
    U1 = 0x05,
    I2 = 0x06,
    U2 = 0x07,
    I4 = 0x08,
    U4 = 0x09,
    I8 = 0x0A,
    U8 = 0x0B,
    R4 = 0x0C,
    R8 = 0x0D,
    String = 0x0E,
    SzArray = 0x1D,
    Type = 0x50,
}

/// How one positional argument is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar(ElementType),
    /// Single-dimension array of scalars.
    Array(ElementType),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    #[error("value {value} cannot be written as {tag:?}")]
    Mismatch { tag: ElementType, value: String },

    #[error("arrays of arrays cannot be encoded")]
    NestedArray,

    #[error("string of {0} bytes is too long to encode")]
    TooLong(usize),

    #[error("blob ends early at offset {0}")]
    UnexpectedEnd(usize),

    #[error("bad prolog {0:#06x}")]
    BadProlog(u16),

    #[error("unknown element tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("string at offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    #[error("{0} named arguments are not supported")]
    NamedArguments(u16),
}

/// The blob for an attribute constructed without arguments.
pub fn empty() -> Vec<u8> {
    let mut out = PROLOG.to_le_bytes().to_vec();
    out.extend(0u16.to_le_bytes());
    out
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode positional arguments, each with the shape of the constructor
/// parameter it binds to.
pub fn encode(args: &[(Shape, ConstValue)]) -> Result<Vec<u8>, BlobError> {
    let mut out = PROLOG.to_le_bytes().to_vec();
    for (shape, value) in args {
        match *shape {
            Shape::Scalar(ElementType::SzArray) | Shape::Array(ElementType::SzArray) => {
                return Err(BlobError::NestedArray);
            }
            Shape::Scalar(tag) => {
                out.push(tag.into());
                write_value(&mut out, tag, value)?;
            }
            Shape::Array(element) => {
                out.push(ElementType::SzArray.into());
                out.push(element.into());
                write_array(&mut out, element, value)?;
            }
        }
    }
    out.extend(0u16.to_le_bytes());
    Ok(out)
}

fn write_array(out: &mut Vec<u8>, element: ElementType, value: &ConstValue) -> Result<(), BlobError> {
    match value {
        ConstValue::Null => out.extend(NULL_ARRAY.to_le_bytes()),
        ConstValue::Array(items) => {
            let count = u32::try_from(items.len()).map_err(|_| BlobError::TooLong(items.len()))?;
            out.extend(count.to_le_bytes());
            for item in items {
                write_value(out, element, item)?;
            }
        }
        other => {
            return Err(BlobError::Mismatch {
                tag: ElementType::SzArray,
                value: other.to_string(),
            });
        }
    }
    Ok(())
}

fn write_value(out: &mut Vec<u8>, tag: ElementType, value: &ConstValue) -> Result<(), BlobError> {
    match (tag, value) {
        (ElementType::Boolean, ConstValue::Bool(v)) => out.push(u8::from(*v)),
        (ElementType::Char, ConstValue::Char(v)) => out.extend(v.to_le_bytes()),
        (ElementType::I1, ConstValue::Int8(v)) => out.extend(v.to_le_bytes()),
        (ElementType::U1, ConstValue::UInt8(v)) => out.push(*v),
        (ElementType::I2, ConstValue::Int16(v)) => out.extend(v.to_le_bytes()),
        (ElementType::U2, ConstValue::UInt16(v)) => out.extend(v.to_le_bytes()),
        (ElementType::I4, ConstValue::Int32(v)) => out.extend(v.to_le_bytes()),
        (ElementType::U4, ConstValue::UInt32(v)) => out.extend(v.to_le_bytes()),
        (ElementType::I8, ConstValue::Int64(v)) => out.extend(v.to_le_bytes()),
        (ElementType::U8, ConstValue::UInt64(v)) => out.extend(v.to_le_bytes()),
        (ElementType::R4, ConstValue::Float32(v)) => out.extend(v.0.to_le_bytes()),
        (ElementType::R8, ConstValue::Float64(v)) => out.extend(v.0.to_le_bytes()),
        (ElementType::String, ConstValue::String(s)) | (ElementType::Type, ConstValue::Type(s)) => {
            write_compressed(out, s.len())?;
            out.extend(s.as_bytes());
        }
        (ElementType::String | ElementType::Type, ConstValue::Null) => out.push(NULL_STRING),
        (tag, value) => {
            return Err(BlobError::Mismatch {
                tag,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// ECMA-335 II.23.2 compressed unsigned integer, big-endian.
fn write_compressed(out: &mut Vec<u8>, len: usize) -> Result<(), BlobError> {
    match len {
        0..=0x7F => out.push(len as u8),
        0x80..=0x3FFF => out.extend((len as u16 | 0x8000).to_be_bytes()),
        0x4000..=0x1FFF_FFFF => out.extend((len as u32 | 0xC000_0000).to_be_bytes()),
        _ => return Err(BlobError::TooLong(len)),
    }
    Ok(())
}

// ============================================================================
// Decoding
// ============================================================================

/// Read the positional arguments back out of a blob.
pub fn decode(bytes: &[u8]) -> Result<Vec<ConstValue>, BlobError> {
    let mut reader = Reader { bytes, pos: 0 };
    let prolog = reader.u16()?;
    if prolog != PROLOG {
        return Err(BlobError::BadProlog(prolog));
    }

    let mut values = Vec::new();
    while reader.remaining() > 2 {
        let tag = reader.tag()?;
        let value = if tag == ElementType::SzArray {
            let element = reader.tag()?;
            if element == ElementType::SzArray {
                return Err(BlobError::NestedArray);
            }
            match reader.u32()? {
                NULL_ARRAY => ConstValue::Null,
                count => {
                    let items = (0..count)
                        .map(|_| reader.value(element))
                        .collect::<Result<Vec<_>, _>>()?;
                    ConstValue::Array(items)
                }
            }
        } else {
            reader.value(tag)?
        };
        values.push(value);
    }

    match reader.u16()? {
        0 => Ok(values),
        named => Err(BlobError::NamedArguments(named)),
    }
}

struct Reader<'b> {
    bytes: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], BlobError> {
        let end = self.pos + N;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(BlobError::UnexpectedEnd(self.pos))?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, BlobError> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, BlobError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn u32(&mut self) -> Result<u32, BlobError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn tag(&mut self) -> Result<ElementType, BlobError> {
        let offset = self.pos;
        let tag = self.u8()?;
        ElementType::try_from(tag).map_err(|_| BlobError::UnknownTag { tag, offset })
    }

    fn value(&mut self, tag: ElementType) -> Result<ConstValue, BlobError> {
        Ok(match tag {
            ElementType::Boolean => ConstValue::Bool(self.u8()? != 0),
            ElementType::Char => ConstValue::Char(u16::from_le_bytes(self.take()?)),
            ElementType::I1 => ConstValue::Int8(i8::from_le_bytes(self.take()?)),
            ElementType::U1 => ConstValue::UInt8(self.u8()?),
            ElementType::I2 => ConstValue::Int16(i16::from_le_bytes(self.take()?)),
            ElementType::U2 => ConstValue::UInt16(u16::from_le_bytes(self.take()?)),
            ElementType::I4 => ConstValue::Int32(i32::from_le_bytes(self.take()?)),
            ElementType::U4 => ConstValue::UInt32(u32::from_le_bytes(self.take()?)),
            ElementType::I8 => ConstValue::Int64(i64::from_le_bytes(self.take()?)),
            ElementType::U8 => ConstValue::UInt64(u64::from_le_bytes(self.take()?)),
            ElementType::R4 => ConstValue::Float32(OrderedFloat(f32::from_le_bytes(self.take()?))),
            ElementType::R8 => ConstValue::Float64(OrderedFloat(f64::from_le_bytes(self.take()?))),
            ElementType::String => self.string()?.map_or(ConstValue::Null, ConstValue::String),
            ElementType::Type => self.string()?.map_or(ConstValue::Null, ConstValue::Type),
            ElementType::SzArray => return Err(BlobError::NestedArray),
        })
    }

    /// A serialized string; `None` for the null marker.
    fn string(&mut self) -> Result<Option<String>, BlobError> {
        let offset = self.pos;
        let first = self.u8()?;
        if first == NULL_STRING {
            return Ok(None);
        }
        let len = if first & 0x80 == 0 {
            first as usize
        } else if first & 0xC0 == 0x80 {
            ((first as usize & 0x3F) << 8) | self.u8()? as usize
        } else {
            let [b1, b2, b3] = self.take::<3>()?;
            ((first as usize & 0x1F) << 24) | (b1 as usize) << 16 | (b2 as usize) << 8 | b3 as usize
        };

        let end = self.pos + len;
        let bytes = self
            .bytes
            .get(self.pos..end)
            .ok_or(BlobError::UnexpectedEnd(self.pos))?;
        let s = std::str::from_utf8(bytes).map_err(|_| BlobError::InvalidUtf8(offset))?;
        self.pos = end;
        Ok(Some(s.to_string()))
    }
}
