use std::io::{Read, Write};

use super::varint::{read_sint, read_uint, write_sint, write_uint};
use crate::error::{Error, Result};

/// A vertex list, reconstructed into absolute `(x, y)` offsets from an
/// implicit origin at `(0, 0)` — the record's own `x`/`y` field is the
/// actual origin in world space and is added by the caller, not here.
pub type PointList = Vec<(i64, i64)>;

/// Which of the eight on-wire vertex-delta encodings produced a `PointList`.
///
/// Manhattan variants alternate or fix the axis of each step; general
/// variants carry full `(dx, dy)` deltas; octangular variants restrict each
/// step to one of the eight compass directions via a 3-bit direction code
/// plus a magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointListKind {
    ManhattanHorizontalFirst,
    ManhattanVerticalFirst,
    ManhattanAlternating,
    General,
    GeneralExplicitClosure,
    OctangularHorizontalFirst,
    OctangularVerticalFirst,
    OctangularAlternating,
}

impl PointListKind {
    fn tag(self) -> u64 {
        match self {
            Self::ManhattanHorizontalFirst => 0,
            Self::ManhattanVerticalFirst => 1,
            Self::ManhattanAlternating => 2,
            Self::General => 3,
            Self::GeneralExplicitClosure => 4,
            Self::OctangularHorizontalFirst => 5,
            Self::OctangularVerticalFirst => 6,
            Self::OctangularAlternating => 7,
        }
    }

    fn from_tag(tag: u64) -> Result<Self> {
        Ok(match tag {
            0 => Self::ManhattanHorizontalFirst,
            1 => Self::ManhattanVerticalFirst,
            2 => Self::ManhattanAlternating,
            3 => Self::General,
            4 => Self::GeneralExplicitClosure,
            5 => Self::OctangularHorizontalFirst,
            6 => Self::OctangularVerticalFirst,
            7 => Self::OctangularAlternating,
            _ => return Err(Error::InvalidData("unassigned point-list tag")),
        })
    }

    fn is_manhattan(self) -> bool {
        matches!(
            self,
            Self::ManhattanHorizontalFirst | Self::ManhattanVerticalFirst | Self::ManhattanAlternating
        )
    }

    fn is_octangular(self) -> bool {
        matches!(
            self,
            Self::OctangularHorizontalFirst | Self::OctangularVerticalFirst | Self::OctangularAlternating
        )
    }
}

/// direction codes 0..=7 for octangular point lists, compass order starting East, CCW
const OCTANT_DIRS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

pub fn read_point_list<R: Read>(r: &mut R) -> Result<(PointListKind, PointList)> {
    let kind = PointListKind::from_tag(read_uint(r)?)?;
    let count = read_uint(r)? as usize;
    let mut points = Vec::with_capacity(count);
    let mut pos = (0i64, 0i64);
    let mut horizontal_next = matches!(kind, PointListKind::ManhattanHorizontalFirst);

    for i in 0..count {
        if kind.is_manhattan() {
            let go_horizontal = match kind {
                PointListKind::ManhattanHorizontalFirst | PointListKind::ManhattanVerticalFirst => {
                    let h = horizontal_next;
                    horizontal_next = !horizontal_next;
                    h
                }
                PointListKind::ManhattanAlternating => i % 2 == 0,
                _ => unreachable!(),
            };
            let delta = read_sint(r)?;
            pos = if go_horizontal {
                (pos.0 + delta, pos.1)
            } else {
                (pos.0, pos.1 + delta)
            };
        } else if kind.is_octangular() {
            let packed = read_uint(r)?;
            let direction = (packed & 0x7) as usize;
            let magnitude = (packed >> 3) as i64;
            let (dx, dy) = OCTANT_DIRS[direction];
            pos = (pos.0 + dx * magnitude, pos.1 + dy * magnitude);
        } else {
            let dx = read_sint(r)?;
            let dy = read_sint(r)?;
            pos = (pos.0 + dx, pos.1 + dy);
        }
        points.push(pos);
    }
    Ok((kind, points))
}

pub fn write_point_list<W: Write>(w: &mut W, kind: PointListKind, points: &[(i64, i64)]) -> Result<()> {
    write_uint(w, kind.tag())?;
    write_uint(w, points.len() as u64)?;
    let mut pos = (0i64, 0i64);
    let mut horizontal_next = matches!(kind, PointListKind::ManhattanHorizontalFirst);

    for (i, &(px, py)) in points.iter().enumerate() {
        let (dx, dy) = (px - pos.0, py - pos.1);
        if kind.is_manhattan() {
            let go_horizontal = match kind {
                PointListKind::ManhattanHorizontalFirst | PointListKind::ManhattanVerticalFirst => {
                    let h = horizontal_next;
                    horizontal_next = !horizontal_next;
                    h
                }
                PointListKind::ManhattanAlternating => i % 2 == 0,
                _ => unreachable!(),
            };
            if go_horizontal {
                if dy != 0 {
                    return Err(Error::MalformedRecord("manhattan point list has a non-axis-aligned step"));
                }
                write_sint(w, dx)?;
            } else {
                if dx != 0 {
                    return Err(Error::MalformedRecord("manhattan point list has a non-axis-aligned step"));
                }
                write_sint(w, dy)?;
            }
        } else if kind.is_octangular() {
            let direction = OCTANT_DIRS
                .iter()
                .position(|&(ux, uy)| {
                    (dx == 0 && dy == 0) || (dx.signum() == ux && dy.signum() == uy && (dx * uy - dy * ux == 0))
                })
                .ok_or(Error::MalformedRecord("octangular point list has a non-octant step"))?;
            let magnitude = dx.abs().max(dy.abs());
            write_uint(w, (magnitude as u64) << 3 | direction as u64)?;
        } else {
            write_sint(w, dx)?;
            write_sint(w, dy)?;
        }
        pos = (px, py);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_general_point_list_roundtrip() {
        let points: PointList = vec![(10, 0), (10, 10), (0, 10)];
        let mut buf = Vec::new();
        write_point_list(&mut buf, PointListKind::General, &points).unwrap();
        let mut cursor = Cursor::new(buf);
        let (kind, decoded) = read_point_list(&mut cursor).unwrap();
        assert_eq!(kind, PointListKind::General);
        assert_eq!(decoded, points);
    }

    #[test]
    fn test_manhattan_horizontal_first_roundtrip() {
        let points: PointList = vec![(5, 0), (5, 5), (0, 5), (0, 0)];
        let mut buf = Vec::new();
        write_point_list(&mut buf, PointListKind::ManhattanHorizontalFirst, &points).unwrap();
        let mut cursor = Cursor::new(buf);
        let (_, decoded) = read_point_list(&mut cursor).unwrap();
        assert_eq!(decoded, points);
    }

    #[test]
    fn test_manhattan_rejects_diagonal_step() {
        let points: PointList = vec![(5, 5)];
        let mut buf = Vec::new();
        assert!(write_point_list(&mut buf, PointListKind::ManhattanHorizontalFirst, &points).is_err());
    }
}
