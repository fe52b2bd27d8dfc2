use std::{error, fmt, io};

/// Errors raised by the record layer.
///
/// All variants are fatal to the record currently being decoded or encoded:
/// callers that want to skip a malformed record must do so by abandoning
/// the whole stream, since the cursor position after an error is not
/// guaranteed to land on a record boundary.
#[derive(Debug)]
pub enum Error {
    /// A record parser was invoked with an id outside the set its variant accepts.
    UnexpectedId(u64),
    /// A reserved header bit was nonzero, or the header encodes an illegal
    /// combination of bits.
    MalformedHeader(&'static str),
    /// A field or combination of fields violates a record invariant.
    MalformedRecord(&'static str),
    /// `merge_field` needed a modal value that was unset.
    UnfillableField(&'static str),
    /// A `Reuse` repetition marker was read with no modal repetition set.
    UnfillableRepetition,
    /// Unknown CBlock compression type, or a decompressed length mismatch.
    CompressionError(&'static str),
    /// Any other primitive-codec violation (bad varint, bad string charset, ...).
    InvalidData(&'static str),
    /// Propagated I/O failure from the underlying stream.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedId(id) => write!(f, "unexpected record id `{id}`"),
            Self::MalformedHeader(msg) => write!(f, "malformed record header: {msg}"),
            Self::MalformedRecord(msg) => write!(f, "malformed record: {msg}"),
            Self::UnfillableField(field) => {
                write!(f, "field `{field}` is unset and has no modal value to fill from")
            }
            Self::UnfillableRepetition => {
                write!(f, "reuse repetition requested but no modal repetition is set")
            }
            Self::CompressionError(msg) => write!(f, "compressed block error: {msg}"),
            Self::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Self::Io(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
