use std::io::{Read, Write};

use super::varint::{read_uint, write_uint};
use crate::error::{Error, Result};

/// A closed interval of non-negative integers, used by `LayerName` to
/// describe which layer/datatype numbers a name applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// Matches every value.
    AllUnbounded,
    /// `0 ..= upper`.
    LowerBoundedAtZero { upper: u64 },
    /// `lower ..` (no upper bound).
    UnboundedAbove { lower: u64 },
    /// `lower ..= upper`.
    TwoSided { lower: u64, upper: u64 },
    /// A single value.
    Point { value: u64 },
}

pub fn read_interval<R: Read>(r: &mut R) -> Result<Interval> {
    let tag = read_uint(r)?;
    Ok(match tag {
        0 => Interval::AllUnbounded,
        1 => Interval::LowerBoundedAtZero { upper: read_uint(r)? },
        2 => Interval::UnboundedAbove { lower: read_uint(r)? },
        3 => Interval::TwoSided {
            lower: read_uint(r)?,
            upper: read_uint(r)?,
        },
        4 => Interval::Point { value: read_uint(r)? },
        _ => return Err(Error::InvalidData("unassigned interval tag")),
    })
}

pub fn write_interval<W: Write>(w: &mut W, value: Interval) -> Result<()> {
    match value {
        Interval::AllUnbounded => write_uint(w, 0)?,
        Interval::LowerBoundedAtZero { upper } => {
            write_uint(w, 1)?;
            write_uint(w, upper)?;
        }
        Interval::UnboundedAbove { lower } => {
            write_uint(w, 2)?;
            write_uint(w, lower)?;
        }
        Interval::TwoSided { lower, upper } => {
            write_uint(w, 3)?;
            write_uint(w, lower)?;
            write_uint(w, upper)?;
        }
        Interval::Point { value } => {
            write_uint(w, 4)?;
            write_uint(w, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_interval_roundtrip() {
        for interval in [
            Interval::AllUnbounded,
            Interval::LowerBoundedAtZero { upper: 5 },
            Interval::UnboundedAbove { lower: 3 },
            Interval::TwoSided { lower: 2, upper: 9 },
            Interval::Point { value: 7 },
        ] {
            let mut buf = Vec::new();
            write_interval(&mut buf, interval).unwrap();
            let mut cursor = Cursor::new(buf);
            assert_eq!(read_interval(&mut cursor).unwrap(), interval);
        }
    }
}
