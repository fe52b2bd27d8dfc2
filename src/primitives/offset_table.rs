use std::io::{Read, Write};

use super::varint::{read_uint, write_uint};
use crate::error::Result;

/// A `(byte offset, record count)` pair for one name-table kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableEntry {
    pub start: u64,
    pub count: u64,
}

/// Byte offsets to the first occurrence of each name-table kind, carried
/// by `Start` (strict mode) or `End` (table-at-end mode).
///
/// All twelve fields are always present once an offset table exists at
/// all; there are no per-field presence bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetTable {
    pub cell_name: TableEntry,
    pub text_string: TableEntry,
    pub prop_name: TableEntry,
    pub prop_string: TableEntry,
    pub layer_name: TableEntry,
    pub cell: TableEntry,
}

pub fn read_offset_table<R: Read>(r: &mut R) -> Result<OffsetTable> {
    let mut entry = || -> Result<TableEntry> {
        Ok(TableEntry {
            start: read_uint(r)?,
            count: read_uint(r)?,
        })
    };
    Ok(OffsetTable {
        cell_name: entry()?,
        text_string: entry()?,
        prop_name: entry()?,
        prop_string: entry()?,
        layer_name: entry()?,
        cell: entry()?,
    })
}

pub fn write_offset_table<W: Write>(w: &mut W, table: &OffsetTable) -> Result<()> {
    for entry in [
        table.cell_name,
        table.text_string,
        table.prop_name,
        table.prop_string,
        table.layer_name,
        table.cell,
    ] {
        write_uint(w, entry.start)?;
        write_uint(w, entry.count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_offset_table_roundtrip() {
        let table = OffsetTable {
            cell_name: TableEntry { start: 10, count: 2 },
            text_string: TableEntry { start: 20, count: 1 },
            prop_name: TableEntry { start: 30, count: 0 },
            prop_string: TableEntry { start: 40, count: 0 },
            layer_name: TableEntry { start: 50, count: 3 },
            cell: TableEntry { start: 60, count: 1 },
        };
        let mut buf = Vec::new();
        write_offset_table(&mut buf, &table).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_offset_table(&mut cursor).unwrap(), table);
    }
}
