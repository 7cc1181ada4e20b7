//! UEF Container Parsing
//!
//! A UEF file is a 12 byte header followed by a flat list of chunks:
//! - Header: `"UEF File!\0"`, minor version, major version
//! - Chunk: u16 LE identifier, u32 LE length, `length` payload bytes
//!
//! Parsing is lenient towards imperfect captures: a trailing partial chunk
//! header ends the stream, and a chunk declaring more payload than remains is
//! truncated to the available bytes.

pub mod chunk;

pub use chunk::{Chunk, ChunkKind};

use crate::constants::{UEF_HEADER_LEN, UEF_MAGIC};
use crate::{Result, UefError};
use log::debug;
use nom::bytes::complete::tag;
use nom::number::complete::{le_u16, le_u32, le_u8};
use nom::sequence::tuple;
use nom::IResult;

/// UEF file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UefHeader {
    /// Minor format version
    pub minor_version: u8,
    /// Major format version
    pub major_version: u8,
}

/// A decoded UEF container
#[derive(Debug, Clone)]
pub struct UefFile {
    /// File header
    pub header: UefHeader,
    /// Chunks in container order
    pub chunks: Vec<Chunk>,
}

impl UefFile {
    /// Number of chunks that are logical data blocks
    pub fn data_block_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_data_block()).count()
    }
}

/// Check whether data begins with the UEF magic
pub fn has_uef_magic(data: &[u8]) -> bool {
    data.starts_with(UEF_MAGIC)
}

/// Parse an uncompressed UEF container
///
/// # Errors
/// [`UefError::Format`] if the data does not start with a complete UEF header.
pub fn parse_uef(data: &[u8]) -> Result<UefFile> {
    let (body, header) = header(data).map_err(|_| {
        UefError::Format(format!(
            "missing UEF header (expected {} bytes starting with \"UEF File!\")",
            UEF_HEADER_LEN
        ))
    })?;

    let chunks = parse_chunks(body);
    debug!(
        "Parsed UEF v{}.{} with {} chunks",
        header.major_version,
        header.minor_version,
        chunks.len()
    );

    Ok(UefFile { header, chunks })
}

fn header(input: &[u8]) -> IResult<&[u8], UefHeader> {
    let (input, _) = tag(&UEF_MAGIC[..])(input)?;
    let (input, (minor_version, major_version)) = tuple((le_u8, le_u8))(input)?;
    Ok((
        input,
        UefHeader {
            minor_version,
            major_version,
        },
    ))
}

fn chunk_header(input: &[u8]) -> IResult<&[u8], (u16, u32)> {
    tuple((le_u16, le_u32))(input)
}

/// Split the container body into chunks
fn parse_chunks(body: &[u8]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut rest = body;

    while let Ok((after_header, (id, length))) = chunk_header(rest) {
        let declared = usize::try_from(length).unwrap_or(usize::MAX);
        let available = declared.min(after_header.len());
        if available < declared {
            debug!(
                "Chunk 0x{:04x} at index {} declares {} bytes, only {} remain; truncating",
                id,
                chunks.len(),
                declared,
                available
            );
        }

        let (payload, remaining) = after_header.split_at(available);
        chunks.push(Chunk::new(id, payload.to_vec()));
        rest = remaining;
    }

    if !rest.is_empty() {
        debug!("Ignoring {} trailing bytes after last chunk", rest.len());
    }

    chunks
}
