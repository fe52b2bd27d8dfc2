//! Compression for the `CBlock` record: a DEFLATE-compressed (raw, no zlib
//! framing) sub-stream of records that shares the enclosing stream's modal
//! bank.

use flate2::{Compression, Decompress, FlushDecompress};

use crate::error::{Error, Result};
use crate::record::CBlock;

/// Compression scheme 0 is the only one this crate writes or accepts: raw
/// DEFLATE with no zlib header/trailer.
const DEFLATE_SCHEME: u64 = 0;

impl CBlock {
    /// Compresses `decompressed` eagerly, producing a `CBlock` ready to be
    /// written as a record.
    pub fn from_decompressed(decompressed: &[u8]) -> Result<Self> {
        let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), Compression::default());
        std::io::Write::write_all(&mut encoder, decompressed)?;
        let compressed_bytes = encoder.finish()?;
        Ok(Self {
            compression_type: DEFLATE_SCHEME,
            decompressed_byte_count: decompressed.len() as u64,
            compressed_bytes,
        })
    }

    /// Inflates `compressed_bytes`, checking the result against
    /// `decompressed_byte_count`.
    pub fn decompress(&self) -> Result<Vec<u8>> {
        if self.compression_type != DEFLATE_SCHEME {
            return Err(Error::CompressionError("unsupported cblock compression scheme"));
        }
        let mut decompressor = Decompress::new(false);
        let mut out = vec![0u8; self.decompressed_byte_count as usize];
        let status = decompressor
            .decompress(&self.compressed_bytes, &mut out, FlushDecompress::Finish)
            .map_err(|_| Error::CompressionError("deflate stream is corrupt"))?;
        let produced = decompressor.total_out() as usize;
        if produced != out.len() || matches!(status, flate2::Status::BufError) {
            return Err(Error::CompressionError(
                "decompressed length does not match decompressed_byte_count",
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cblock_roundtrip() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let cblock = CBlock::from_decompressed(&original).unwrap();
        assert_eq!(cblock.decompress().unwrap(), original);
    }

    #[test]
    fn test_cblock_rejects_mismatched_length() {
        let original = b"hello world";
        let mut cblock = CBlock::from_decompressed(original).unwrap();
        cblock.decompressed_byte_count += 1;
        assert!(cblock.decompress().is_err());
    }

    #[test]
    fn test_cblock_rejects_unknown_scheme() {
        let mut cblock = CBlock::from_decompressed(b"data").unwrap();
        cblock.compression_type = 7;
        assert!(cblock.decompress().is_err());
    }
}
