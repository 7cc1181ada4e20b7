//! UEF File Loader
//!
//! Loads UEF captures from bytes or from disk. Raw containers are parsed
//! directly; anything else gets exactly one gzip decompression attempt
//! before the magic is checked again.

use crate::uef_parser::{self, UefFile};
use crate::{compression, Result, UefError};
use log::debug;
use std::fs;
use std::path::Path;

/// Loads UEF files from disk
pub struct UefFileLoader;

impl UefFileLoader {
    /// Load a UEF file from disk, handling gzip compression
    pub fn load<P: AsRef<Path>>(path: P) -> Result<UefFile> {
        let path = path.as_ref();
        let file_data = fs::read(path).map_err(|e| {
            UefError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read file '{}': {}", path.display(), e),
            ))
        })?;

        load_uef(&file_data)
    }
}

/// Decode a UEF container from raw or gzip-wrapped bytes
///
/// # Errors
/// [`UefError::Format`] when neither the bytes nor their gzip-decoded form
/// start with the UEF magic.
pub fn load_uef(data: &[u8]) -> Result<UefFile> {
    if uef_parser::has_uef_magic(data) {
        return uef_parser::parse_uef(data);
    }

    if !compression::is_gzip_compressed(data) {
        return Err(UefError::Format("Not a valid UEF file".into()));
    }

    let unwrapped = compression::gunzip(data).map_err(|e| {
        debug!("gzip unwrap failed: {}", e);
        UefError::Format("Not a valid UEF file".into())
    })?;

    if !uef_parser::has_uef_magic(&unwrapped) {
        return Err(UefError::Format(
            "Not a valid UEF file (decompressed data lacks UEF magic)".into(),
        ));
    }

    debug!(
        "Unwrapped gzip envelope: {} -> {} bytes",
        data.len(),
        unwrapped.len()
    );
    uef_parser::parse_uef(&unwrapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn minimal_uef() -> Vec<u8> {
        let mut data = b"UEF File!\0\x0a\x00".to_vec();
        data.extend_from_slice(&0x0100u16.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[0x2A, 0x00]);
        data
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_load_raw() {
        let uef = load_uef(&minimal_uef()).unwrap();
        assert_eq!(uef.chunks.len(), 1);
    }

    #[test]
    fn test_load_gzipped() {
        let uef = load_uef(&gzip(&minimal_uef())).unwrap();
        assert_eq!(uef.chunks.len(), 1);
        assert_eq!(uef.chunks[0].payload(), &[0x2A, 0x00]);
    }

    #[test]
    fn test_gzipped_non_uef_is_format_error() {
        let result = load_uef(&gzip(b"just some text, not a tape"));
        assert!(matches!(result, Err(UefError::Format(_))));
    }

    #[test]
    fn test_garbage_is_format_error() {
        let result = load_uef(b"RIFF....WAVEfmt ");
        assert!(matches!(result, Err(UefError::Format(_))));
    }

    #[test]
    fn test_corrupt_gzip_is_format_error() {
        let packed = gzip(&minimal_uef());
        let result = load_uef(&packed[..packed.len() / 2]);
        assert!(matches!(result, Err(UefError::Format(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = UefFileLoader::load("/nonexistent/path/to/tape.uef");
        assert!(matches!(result, Err(UefError::Io(_))));
    }
}
