//! Stream-level traversal: ties a byte source to a single [`Modals`] bank
//! and makes `CBlock` transparent — a `CBlock`'s own record is never handed
//! to a visitor, its decompressed contents are spliced into the record
//! sequence in its place, sharing the same modal bank as everything around
//! it.

use std::io::{Cursor, Read, Write};

use crate::error::{Error, Result};
use crate::modal::Modals;
use crate::record::{self, CBlock, Record};

/// Receives callbacks while reading a record stream.
///
/// Mirrors the block-visitor pattern used for nested containers elsewhere:
/// a single `visit` callback, with `CBlock` boundaries already resolved away
/// by the reader before records ever reach the visitor.
pub trait RecordVisitor {
    fn visit(&mut self, record: &Record);
}

/// A visitor that collects every record it sees, in order.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    records: Vec<Record>,
}

impl CollectingVisitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl RecordVisitor for CollectingVisitor {
    fn visit(&mut self, record: &Record) {
        self.records.push(record.clone());
    }
}

/// Reads records from a byte stream, transparently descending into
/// `CBlock`s and maintaining one modal bank across the whole traversal.
pub struct RecordReader {
    stack: Vec<Box<dyn Read>>,
    modals: Modals,
    end_offset_table_present: bool,
}

impl RecordReader {
    pub fn new<R: Read + 'static>(inner: R) -> Self {
        Self {
            stack: vec![Box::new(inner)],
            modals: Modals::new(),
            end_offset_table_present: false,
        }
    }

    /// Reads the next record, descending into and out of `CBlock`s as
    /// needed. Returns `Ok(None)` once the outermost stream is exhausted.
    pub fn read_next(&mut self) -> Result<Option<Record>> {
        loop {
            let Some(top) = self.stack.last_mut() else {
                return Ok(None);
            };

            match record::read_record(top.as_mut(), &mut self.modals, self.end_offset_table_present) {
                Ok(Record::Start(start)) => {
                    self.end_offset_table_present = start.offset_table.is_some();
                    return Ok(Some(Record::Start(start)));
                }
                Ok(Record::CBlock(cblock)) => {
                    let bytes = cblock.decompress()?;
                    log::debug!("descending into cblock, {} decompressed bytes", bytes.len());
                    self.stack.push(Box::new(Cursor::new(bytes)));
                }
                Ok(record) => {
                    if record.resets_modals() {
                        log::trace!("record resets modal bank");
                    }
                    return Ok(Some(record));
                }
                Err(Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::UnexpectedEof => {
                    if self.stack.len() > 1 {
                        log::debug!("cblock contents exhausted, returning to enclosing stream");
                        self.stack.pop();
                    } else {
                        return Ok(None);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Drains the stream, handing every record to `visitor` in order.
    pub fn visit_all<V: RecordVisitor>(&mut self, visitor: &mut V) -> Result<()> {
        while let Some(record) = self.read_next()? {
            visitor.visit(&record);
        }
        Ok(())
    }
}

/// Writes records to a byte stream, deduping modal-tracked fields against a
/// single bank shared across the whole traversal.
pub struct RecordWriter<W: Write> {
    inner: W,
    modals: Modals,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            modals: Modals::new(),
        }
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        record::write_record(&mut self.inner, record, &mut self.modals)
    }

    /// Encodes `records` into an in-memory buffer against this writer's
    /// *current* modal bank (so the `CBlock`'s contents continue the same
    /// modal sequence as its surroundings), then compresses the result into
    /// a `CBlock` record ready to hand to [`Self::write_record`].
    ///
    /// The modal bank is left exactly as it would be had these records been
    /// written uncompressed in place.
    pub fn encode_cblock(&mut self, records: &[Record]) -> Result<Record> {
        let mut buf = Vec::new();
        for record in records {
            record::write_record(&mut buf, record, &mut self.modals)?;
        }
        log::debug!("encoding cblock, {} records, {} bytes before compression", records.len(), buf.len());
        Ok(Record::CBlock(CBlock::from_decompressed(&buf)?))
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, Start};
    use crate::primitives::Real;

    #[test]
    fn test_reader_descends_into_cblock_transparently() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(&Record::Pad).unwrap();
        let inner_records = vec![Record::Pad, Record::Pad];
        let cblock_record = writer.encode_cblock(&inner_records).unwrap();
        writer.write_record(&cblock_record).unwrap();
        writer.write_record(&Record::Pad).unwrap();
        let bytes = writer.into_inner();

        let mut reader = RecordReader::new(Cursor::new(bytes));
        let mut visitor = CollectingVisitor::new();
        reader.visit_all(&mut visitor).unwrap();
        let records = visitor.into_records();
        assert_eq!(records, vec![Record::Pad, Record::Pad, Record::Pad, Record::Pad]);
    }

    #[test]
    fn test_start_tracks_offset_table_presence_for_end() {
        let start = Start {
            version: crate::primitives::AString::new("1.0").unwrap(),
            unit: Real::PositiveWhole(1000),
            offset_table: None,
        };
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(&Record::Start(start)).unwrap();
        let bytes = writer.into_inner();

        let mut reader = RecordReader::new(Cursor::new(bytes));
        let record = reader.read_next().unwrap().unwrap();
        assert!(matches!(record, Record::Start(_)));
        assert!(!reader.end_offset_table_present);
    }
}
