//! Compression support for UEF captures
//!
//! Most UEF files in the wild are stored gzip-compressed (the format was
//! designed with zlib in mind), while some tools write them raw. This module
//! unwraps the gzip envelope using the `flate2` crate.
//!
//! The loader sniffs the gzip magic with [`is_gzip_compressed`] and inflates
//! with [`gunzip`]. Output size is capped to guard against decompression bombs.

use crate::{Result, UefError};
use flate2::read::GzDecoder;
use std::io::Read;

/// gzip member header magic (RFC 1952)
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Maximum decompressed size: 64MB
///
/// A UEF for a full 100-minute cassette is a few megabytes at most.
const MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

/// Unconditionally decode a gzip stream
///
/// Fails with [`UefError::Decompression`] when the data is not a valid gzip
/// stream or inflates beyond the size limit.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();

    // take() enforces the hard limit
    let mut limited = decoder.take(MAX_DECOMPRESSED_SIZE as u64);
    limited
        .read_to_end(&mut decompressed)
        .map_err(|e| UefError::Decompression(format!("gzip decompression failed: {}", e)))?;

    if decompressed.len() >= MAX_DECOMPRESSED_SIZE {
        return Err(UefError::Decompression(
            "Decompressed data exceeded maximum safe size (64MB). \
             The file may be corrupted or an attempted decompression bomb."
                .into(),
        ));
    }

    Ok(decompressed)
}

/// Check whether data starts with the gzip magic bytes
#[inline]
pub fn is_gzip_compressed(data: &[u8]) -> bool {
    data.len() >= GZIP_MAGIC.len() && data[..2] == GZIP_MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_gzip_roundtrip() {
        let payload = b"UEF File!\0\x0a\x00\x00\x01\x01\x00\x00\x00\x41";
        let packed = gzip(payload);
        assert!(is_gzip_compressed(&packed));
        assert_eq!(gunzip(&packed).unwrap(), payload.to_vec());
    }

    #[test]
    fn test_gunzip_rejects_garbage() {
        let result = gunzip(b"definitely not gzip");
        assert!(matches!(result, Err(UefError::Decompression(_))));
    }

    #[test]
    fn test_truncated_gzip_fails() {
        let packed = gzip(&[0x55u8; 4096]);
        let cut = &packed[..packed.len() / 2];
        assert!(is_gzip_compressed(cut));
        assert!(gunzip(cut).is_err());
    }

    #[test]
    fn test_short_input_is_not_gzip() {
        assert!(!is_gzip_compressed(&[]));
        assert!(!is_gzip_compressed(&[0x1F]));
        assert!(!is_gzip_compressed(b"UEF File!\0\x0a\x00"));
    }
}
