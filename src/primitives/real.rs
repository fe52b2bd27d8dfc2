use std::io::{Read, Write};

use super::varint::{read_uint, write_uint};
use crate::error::{Error, Result};

/// The format's tagged real number.
///
/// A leading uint selects one of eight representations: a whole number, its
/// negation, the reciprocal of a whole number (and its negation), a ratio of
/// two whole numbers (and its negation), or an IEEE float carried verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Real {
    PositiveWhole(u64),
    NegativeWhole(u64),
    PositiveReciprocal(u64),
    NegativeReciprocal(u64),
    PositiveRatio(u64, u64),
    NegativeRatio(u64, u64),
    Float32(f32),
    Float64(f64),
}

impl Real {
    /// Converts to `f64` for arithmetic use (e.g. validating `Start.unit`).
    #[must_use]
    pub fn to_f64(self) -> f64 {
        match self {
            Self::PositiveWhole(v) => v as f64,
            Self::NegativeWhole(v) => -(v as f64),
            Self::PositiveReciprocal(v) => 1.0 / v as f64,
            Self::NegativeReciprocal(v) => -1.0 / v as f64,
            Self::PositiveRatio(num, den) => num as f64 / den as f64,
            Self::NegativeRatio(num, den) => -(num as f64) / den as f64,
            Self::Float32(v) => f64::from(v),
            Self::Float64(v) => v,
        }
    }

    /// True if this value, interpreted as `f64`, is finite and strictly positive.
    #[must_use]
    pub fn is_finite_positive(self) -> bool {
        let v = self.to_f64();
        v.is_finite() && v > 0.0
    }
}

pub fn read_real<R: Read>(r: &mut R) -> Result<Real> {
    let tag = read_uint(r)?;
    Ok(match tag {
        0 => Real::PositiveWhole(read_uint(r)?),
        1 => Real::NegativeWhole(read_uint(r)?),
        2 => Real::PositiveReciprocal(read_uint(r)?),
        3 => Real::NegativeReciprocal(read_uint(r)?),
        4 => Real::PositiveRatio(read_uint(r)?, read_uint(r)?),
        5 => Real::NegativeRatio(read_uint(r)?, read_uint(r)?),
        6 => {
            let mut bytes = [0u8; 4];
            r.read_exact(&mut bytes)?;
            Real::Float32(f32::from_le_bytes(bytes))
        }
        7 => {
            let mut bytes = [0u8; 8];
            r.read_exact(&mut bytes)?;
            Real::Float64(f64::from_le_bytes(bytes))
        }
        other => return Err(Error::InvalidData(real_tag_message(other))),
    })
}

fn real_tag_message(_tag: u64) -> &'static str {
    "unassigned real tag"
}

pub fn write_real<W: Write>(w: &mut W, value: Real) -> Result<()> {
    match value {
        Real::PositiveWhole(v) => {
            write_uint(w, 0)?;
            write_uint(w, v)?;
        }
        Real::NegativeWhole(v) => {
            write_uint(w, 1)?;
            write_uint(w, v)?;
        }
        Real::PositiveReciprocal(v) => {
            write_uint(w, 2)?;
            write_uint(w, v)?;
        }
        Real::NegativeReciprocal(v) => {
            write_uint(w, 3)?;
            write_uint(w, v)?;
        }
        Real::PositiveRatio(num, den) => {
            write_uint(w, 4)?;
            write_uint(w, num)?;
            write_uint(w, den)?;
        }
        Real::NegativeRatio(num, den) => {
            write_uint(w, 5)?;
            write_uint(w, num)?;
            write_uint(w, den)?;
        }
        Real::Float32(v) => {
            write_uint(w, 6)?;
            w.write_all(&v.to_le_bytes())?;
        }
        Real::Float64(v) => {
            write_uint(w, 7)?;
            w.write_all(&v.to_le_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(value: Real) -> Real {
        let mut buf = Vec::new();
        write_real(&mut buf, value).unwrap();
        let mut cursor = Cursor::new(buf);
        read_real(&mut cursor).unwrap()
    }

    #[test]
    fn test_real_roundtrip() {
        assert_eq!(roundtrip(Real::PositiveWhole(42)), Real::PositiveWhole(42));
        assert_eq!(roundtrip(Real::NegativeWhole(7)), Real::NegativeWhole(7));
        assert_eq!(
            roundtrip(Real::PositiveRatio(3, 4)),
            Real::PositiveRatio(3, 4)
        );
        assert_eq!(roundtrip(Real::Float32(1.5)), Real::Float32(1.5));
        assert_eq!(roundtrip(Real::Float64(2.25)), Real::Float64(2.25));
    }

    #[test]
    fn test_real_unassigned_tag_rejected() {
        let mut buf = Vec::new();
        write_uint(&mut buf, 8).unwrap();
        let mut cursor = Cursor::new(buf);
        assert!(read_real(&mut cursor).is_err());
    }

    #[test]
    fn test_real_reciprocal_roundtrip() {
        assert_eq!(
            roundtrip(Real::PositiveReciprocal(4)),
            Real::PositiveReciprocal(4)
        );
        assert_eq!(
            roundtrip(Real::NegativeReciprocal(4)),
            Real::NegativeReciprocal(4)
        );
        assert!((Real::PositiveReciprocal(4).to_f64() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unit_must_be_finite_positive() {
        assert!(Real::PositiveWhole(1).is_finite_positive());
        assert!(!Real::NegativeWhole(1).is_finite_positive());
        assert!(!Real::Float64(f64::NAN).is_finite_positive());
        assert!(!Real::Float64(f64::INFINITY).is_finite_positive());
    }
}
