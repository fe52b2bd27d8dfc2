use std::io::{Read, Write};

use super::varint::read_uint;
use crate::error::{Error, Result};

/// The trailing checksum sub-record in `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    None,
    Crc32(u32),
    Checksum32(u32),
}

pub fn read_validation<R: Read>(r: &mut R) -> Result<Validation> {
    match read_uint(r)? {
        0 => Ok(Validation::None),
        1 => Ok(Validation::Crc32(read_u32_le(r)?)),
        2 => Ok(Validation::Checksum32(read_u32_le(r)?)),
        _ => Err(Error::InvalidData("unassigned validation scheme")),
    }
}

fn read_u32_le<R: Read>(r: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    r.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

pub fn write_validation<W: Write>(w: &mut W, value: Validation) -> Result<()> {
    use super::varint::write_uint;
    match value {
        Validation::None => write_uint(w, 0)?,
        Validation::Crc32(v) => {
            write_uint(w, 1)?;
            w.write_all(&v.to_le_bytes())?;
        }
        Validation::Checksum32(v) => {
            write_uint(w, 2)?;
            w.write_all(&v.to_le_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_validation_roundtrip() {
        for value in [
            Validation::None,
            Validation::Crc32(0xdead_beef),
            Validation::Checksum32(42),
        ] {
            let mut buf = Vec::new();
            write_validation(&mut buf, value).unwrap();
            let mut cursor = Cursor::new(buf);
            assert_eq!(read_validation(&mut cursor).unwrap(), value);
        }
    }
}
