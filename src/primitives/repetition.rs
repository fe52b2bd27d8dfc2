use std::io::{Read, Write};

use super::point_list::{read_point_list, write_point_list, PointList, PointListKind};
use super::varint::{read_sint, read_uint, write_sint, write_uint};
use crate::error::{Error, Result};

/// A repetition pattern: how many copies of the enclosing geometry/placement
/// element exist, and at what offsets from the element's own origin.
///
/// `Reuse` is a sentinel meaning "substitute the modal repetition"; it is
/// handled by the merge/dedup engine (see [`crate::modal`]) rather than by
/// this module, which only encodes/decodes the wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Repetition {
    /// Substitute the modal repetition at merge time.
    Reuse,
    /// A two-vector grid: `x_count` steps of `x_vector`, `y_count` steps of `y_vector`.
    Grid {
        x_vector: (i64, i64),
        x_count: u64,
        y_vector: (i64, i64),
        y_count: u64,
    },
    /// An axis-aligned grid with a single pitch per axis.
    OrthogonalGrid {
        x_pitch: i64,
        x_count: u64,
        y_pitch: i64,
        y_count: u64,
    },
    /// Irregular spacing along the x axis only, each step an unsigned distance.
    VaryingDistanceX { distances: Vec<u64> },
    /// Irregular spacing along both axes independently.
    VaryingDistanceXY {
        x_distances: Vec<u64>,
        y_distances: Vec<u64>,
    },
    /// Irregular signed steps along the x axis only.
    VaryingVectorX { deltas: Vec<i64> },
    /// Irregular signed steps along the y axis only.
    VaryingVectorY { deltas: Vec<i64> },
    /// Irregular signed steps, one axis after the other.
    VaryingVectorGrid { x_deltas: Vec<i64>, y_deltas: Vec<i64> },
    /// Irregular signed `(dx, dy)` steps, one full vector per repeated copy.
    VaryingVectorGridAlternating { deltas: Vec<(i64, i64)> },
    /// An arbitrary explicit list of offsets.
    Explicit(PointList),
}

fn tag(value: &Repetition) -> u64 {
    match value {
        Repetition::Reuse => 0,
        Repetition::Grid { .. } => 1,
        Repetition::OrthogonalGrid { .. } => 2,
        Repetition::VaryingDistanceX { .. } => 3,
        Repetition::VaryingDistanceXY { .. } => 4,
        Repetition::VaryingVectorX { .. } => 5,
        Repetition::VaryingVectorY { .. } => 6,
        Repetition::VaryingVectorGrid { .. } => 7,
        Repetition::VaryingVectorGridAlternating { .. } => 8,
        Repetition::Explicit(_) => 9,
    }
}

fn read_distances<R: Read>(r: &mut R) -> Result<Vec<u64>> {
    let count = read_uint(r)? as usize;
    (0..count).map(|_| read_uint(r)).collect()
}

fn write_distances<W: Write>(w: &mut W, values: &[u64]) -> Result<()> {
    write_uint(w, values.len() as u64)?;
    for &v in values {
        write_uint(w, v)?;
    }
    Ok(())
}

fn read_vector_deltas<R: Read>(r: &mut R) -> Result<Vec<i64>> {
    let count = read_uint(r)? as usize;
    (0..count).map(|_| read_sint(r)).collect()
}

fn write_vector_deltas<W: Write>(w: &mut W, values: &[i64]) -> Result<()> {
    write_uint(w, values.len() as u64)?;
    for &v in values {
        write_sint(w, v)?;
    }
    Ok(())
}

pub fn read_repetition<R: Read>(r: &mut R) -> Result<Repetition> {
    Ok(match read_uint(r)? {
        0 => Repetition::Reuse,
        1 => Repetition::Grid {
            x_vector: (read_sint(r)?, read_sint(r)?),
            x_count: read_uint(r)?,
            y_vector: (read_sint(r)?, read_sint(r)?),
            y_count: read_uint(r)?,
        },
        2 => Repetition::OrthogonalGrid {
            x_pitch: read_sint(r)?,
            x_count: read_uint(r)?,
            y_pitch: read_sint(r)?,
            y_count: read_uint(r)?,
        },
        3 => Repetition::VaryingDistanceX {
            distances: read_distances(r)?,
        },
        4 => Repetition::VaryingDistanceXY {
            x_distances: read_distances(r)?,
            y_distances: read_distances(r)?,
        },
        5 => Repetition::VaryingVectorX {
            deltas: read_vector_deltas(r)?,
        },
        6 => Repetition::VaryingVectorY {
            deltas: read_vector_deltas(r)?,
        },
        7 => Repetition::VaryingVectorGrid {
            x_deltas: read_vector_deltas(r)?,
            y_deltas: read_vector_deltas(r)?,
        },
        8 => {
            let count = read_uint(r)? as usize;
            let mut deltas = Vec::with_capacity(count);
            for _ in 0..count {
                deltas.push((read_sint(r)?, read_sint(r)?));
            }
            Repetition::VaryingVectorGridAlternating { deltas }
        }
        9 => {
            let (_, points) = read_point_list(r)?;
            Repetition::Explicit(points)
        }
        _ => return Err(Error::InvalidData("unassigned repetition tag")),
    })
}

pub fn write_repetition<W: Write>(w: &mut W, value: &Repetition) -> Result<()> {
    write_uint(w, tag(value))?;
    match value {
        Repetition::Reuse => {}
        Repetition::Grid {
            x_vector,
            x_count,
            y_vector,
            y_count,
        } => {
            write_sint(w, x_vector.0)?;
            write_sint(w, x_vector.1)?;
            write_uint(w, *x_count)?;
            write_sint(w, y_vector.0)?;
            write_sint(w, y_vector.1)?;
            write_uint(w, *y_count)?;
        }
        Repetition::OrthogonalGrid {
            x_pitch,
            x_count,
            y_pitch,
            y_count,
        } => {
            write_sint(w, *x_pitch)?;
            write_uint(w, *x_count)?;
            write_sint(w, *y_pitch)?;
            write_uint(w, *y_count)?;
        }
        Repetition::VaryingDistanceX { distances } => write_distances(w, distances)?,
        Repetition::VaryingDistanceXY {
            x_distances,
            y_distances,
        } => {
            write_distances(w, x_distances)?;
            write_distances(w, y_distances)?;
        }
        Repetition::VaryingVectorX { deltas } => write_vector_deltas(w, deltas)?,
        Repetition::VaryingVectorY { deltas } => write_vector_deltas(w, deltas)?,
        Repetition::VaryingVectorGrid { x_deltas, y_deltas } => {
            write_vector_deltas(w, x_deltas)?;
            write_vector_deltas(w, y_deltas)?;
        }
        Repetition::VaryingVectorGridAlternating { deltas } => {
            write_uint(w, deltas.len() as u64)?;
            for &(dx, dy) in deltas {
                write_sint(w, dx)?;
                write_sint(w, dy)?;
            }
        }
        Repetition::Explicit(points) => write_point_list(w, PointListKind::General, points)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(value: Repetition) -> Repetition {
        let mut buf = Vec::new();
        write_repetition(&mut buf, &value).unwrap();
        let mut cursor = Cursor::new(buf);
        read_repetition(&mut cursor).unwrap()
    }

    #[test]
    fn test_reuse_roundtrip() {
        assert_eq!(roundtrip(Repetition::Reuse), Repetition::Reuse);
    }

    #[test]
    fn test_grid_roundtrip() {
        let value = Repetition::Grid {
            x_vector: (10, 0),
            x_count: 3,
            y_vector: (0, 10),
            y_count: 3,
        };
        assert_eq!(roundtrip(value.clone()), value);
    }

    #[test]
    fn test_explicit_roundtrip() {
        let value = Repetition::Explicit(vec![(0, 0), (5, 0), (5, 5)]);
        assert_eq!(roundtrip(value.clone()), value);
    }
}
