use std::io::{Read, Write};

use super::real::{write_real, Real};
use super::strings::{read_astring, read_bstring, read_nstring, write_astring, write_bstring, write_nstring};
use super::strings::{AString, NString};
use super::varint::{read_sint, read_uint, write_sint, write_uint};
use crate::error::{Error, Result};

/// A single value inside a `Property` record's value list.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Real(Real),
    UnsignedInteger(u64),
    SignedInteger(i64),
    AStringLiteral(AString),
    BString(Vec<u8>),
    NStringLiteral(NString),
    PropNameRef(u64),
    PropStringRef(u64),
}

/// Tags 0-7 are the real number's own tag scheme (see [`Real`]); a property
/// value's non-real tags pick up right after it.
pub fn read_property_value<R: Read>(r: &mut R) -> Result<PropertyValue> {
    let tag = read_uint(r)?;
    Ok(match tag {
        0 => PropertyValue::Real(Real::PositiveWhole(read_uint(r)?)),
        1 => PropertyValue::Real(Real::NegativeWhole(read_uint(r)?)),
        2 => PropertyValue::Real(Real::PositiveReciprocal(read_uint(r)?)),
        3 => PropertyValue::Real(Real::NegativeReciprocal(read_uint(r)?)),
        4 => PropertyValue::Real(Real::PositiveRatio(read_uint(r)?, read_uint(r)?)),
        5 => PropertyValue::Real(Real::NegativeRatio(read_uint(r)?, read_uint(r)?)),
        6 => {
            let mut bytes = [0u8; 4];
            r.read_exact(&mut bytes)?;
            PropertyValue::Real(Real::Float32(f32::from_le_bytes(bytes)))
        }
        7 => {
            let mut bytes = [0u8; 8];
            r.read_exact(&mut bytes)?;
            PropertyValue::Real(Real::Float64(f64::from_le_bytes(bytes)))
        }
        8 => PropertyValue::UnsignedInteger(read_uint(r)?),
        9 => PropertyValue::SignedInteger(read_sint(r)?),
        10 => PropertyValue::AStringLiteral(read_astring(r)?),
        11 => PropertyValue::BString(read_bstring(r)?),
        12 => PropertyValue::NStringLiteral(read_nstring(r)?),
        13 => PropertyValue::PropNameRef(read_uint(r)?),
        14 => PropertyValue::PropStringRef(read_uint(r)?),
        _ => return Err(Error::InvalidData("unassigned property value tag")),
    })
}

pub fn write_property_value<W: Write>(w: &mut W, value: &PropertyValue) -> Result<()> {
    match value {
        PropertyValue::Real(real) => write_real(w, *real)?,
        PropertyValue::UnsignedInteger(v) => {
            write_uint(w, 8)?;
            write_uint(w, *v)?;
        }
        PropertyValue::SignedInteger(v) => {
            write_uint(w, 9)?;
            write_sint(w, *v)?;
        }
        PropertyValue::AStringLiteral(s) => {
            write_uint(w, 10)?;
            write_astring(w, s)?;
        }
        PropertyValue::BString(bytes) => {
            write_uint(w, 11)?;
            write_bstring(w, bytes)?;
        }
        PropertyValue::NStringLiteral(s) => {
            write_uint(w, 12)?;
            write_nstring(w, s)?;
        }
        PropertyValue::PropNameRef(refnum) => {
            write_uint(w, 13)?;
            write_uint(w, *refnum)?;
        }
        PropertyValue::PropStringRef(refnum) => {
            write_uint(w, 14)?;
            write_uint(w, *refnum)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(value: PropertyValue) -> PropertyValue {
        let mut buf = Vec::new();
        write_property_value(&mut buf, &value).unwrap();
        let mut cursor = Cursor::new(buf);
        read_property_value(&mut cursor).unwrap()
    }

    #[test]
    fn test_unsigned_integer_roundtrip() {
        assert_eq!(
            roundtrip(PropertyValue::UnsignedInteger(42)),
            PropertyValue::UnsignedInteger(42)
        );
    }

    #[test]
    fn test_real_roundtrip() {
        let value = PropertyValue::Real(Real::PositiveWhole(9));
        assert_eq!(roundtrip(value.clone()), value);
    }

    #[test]
    fn test_string_ref_roundtrip() {
        assert_eq!(
            roundtrip(PropertyValue::PropNameRef(3)),
            PropertyValue::PropNameRef(3)
        );
    }
}
