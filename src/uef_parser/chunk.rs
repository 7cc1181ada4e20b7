//! UEF chunk records and their decoded kinds
//!
//! A [`Chunk`] is the raw `{id, payload}` record as stored in the container.
//! [`ChunkKind`] is the closed set of chunk types the player understands,
//! decoded on demand from a chunk's id and payload. Anything else lands in
//! [`ChunkKind::Unsupported`], which contributes no audio.

/// Implicit start/stop bit tape data block
pub const IMPLICIT_DATA_BLOCK: u16 = 0x0100;
/// Defined tape format data block
pub const DEFINED_DATA_BLOCK: u16 = 0x0104;
/// High tone (carrier) of a given number of cycles
pub const CARRIER_TONE: u16 = 0x0110;
/// Carrier tone with a dummy byte in the middle
pub const CARRIER_TONE_WITH_DUMMY_BYTE: u16 = 0x0111;
/// Integer gap in milliseconds
pub const INTEGER_GAP: u16 = 0x0112;
/// Security cycles
pub const SECURITY_CYCLES: u16 = 0x0114;
/// Floating point gap in seconds
pub const FLOAT_GAP: u16 = 0x0116;

/// One typed, length-prefixed record of a UEF container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    id: u16,
    payload: Vec<u8>,
}

impl Chunk {
    /// Create a chunk from its identifier and payload
    pub fn new(id: u16, payload: Vec<u8>) -> Self {
        Chunk { id, payload }
    }

    /// Chunk identifier
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Raw payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether this chunk counts as a logical data block for seeking
    pub fn is_data_block(&self) -> bool {
        matches!(self.id, IMPLICIT_DATA_BLOCK | DEFINED_DATA_BLOCK)
    }

    /// Decode the chunk into its typed form
    pub fn kind(&self) -> ChunkKind<'_> {
        ChunkKind::decode(self.id, &self.payload)
    }
}

/// Decoded chunk type
///
/// Numeric fields are read little-endian. A payload shorter than its fields
/// reads the missing bytes as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChunkKind<'a> {
    /// `0x0100`: bytes sent with one start and one stop bit each
    ImplicitDataBlock(&'a [u8]),
    /// `0x0104`: data block with a custom bit layout (no audio rendered)
    DefinedDataBlock,
    /// `0x0110`: carrier tone
    CarrierTone {
        /// Number of carrier cycles
        cycles: u16,
    },
    /// `0x0111`: carrier, dummy `0xAA` byte, carrier
    CarrierToneWithDummyByte {
        /// Carrier cycles before the dummy byte
        pre_cycles: u16,
        /// Carrier cycles after the dummy byte
        post_cycles: u16,
    },
    /// `0x0112`: silence given in milliseconds
    IntegerGap {
        /// Gap length in milliseconds
        millis: u16,
    },
    /// `0x0114`: security cycles, rendered as plain carrier
    SecurityCycles {
        /// Number of cycles (24-bit)
        cycles: u32,
    },
    /// `0x0116`: silence given in seconds
    FloatGap {
        /// Gap length in seconds
        seconds: f32,
    },
    /// Any chunk id without a synthesis rule
    Unsupported {
        /// The unrecognised identifier
        id: u16,
    },
}

impl<'a> ChunkKind<'a> {
    /// Decode a chunk kind from its identifier and payload
    pub fn decode(id: u16, payload: &'a [u8]) -> Self {
        match id {
            IMPLICIT_DATA_BLOCK => ChunkKind::ImplicitDataBlock(payload),
            DEFINED_DATA_BLOCK => ChunkKind::DefinedDataBlock,
            CARRIER_TONE => ChunkKind::CarrierTone {
                cycles: le_field(payload, 0, 2) as u16,
            },
            CARRIER_TONE_WITH_DUMMY_BYTE => ChunkKind::CarrierToneWithDummyByte {
                pre_cycles: le_field(payload, 0, 2) as u16,
                post_cycles: le_field(payload, 2, 2) as u16,
            },
            INTEGER_GAP => ChunkKind::IntegerGap {
                millis: le_field(payload, 0, 2) as u16,
            },
            SECURITY_CYCLES => ChunkKind::SecurityCycles {
                cycles: le_field(payload, 0, 3),
            },
            FLOAT_GAP => ChunkKind::FloatGap {
                seconds: f32::from_bits(le_field(payload, 0, 4)),
            },
            other => ChunkKind::Unsupported { id: other },
        }
    }

    /// Human-readable chunk type name
    pub fn description(&self) -> &'static str {
        match self {
            ChunkKind::ImplicitDataBlock(_) => "Implicit start/stop bit tape data block",
            ChunkKind::DefinedDataBlock => "Defined tape format data block",
            ChunkKind::CarrierTone { .. } => "Carrier tone",
            ChunkKind::CarrierToneWithDummyByte { .. } => "Carrier tone with dummy byte",
            ChunkKind::IntegerGap { .. } => "Integer gap",
            ChunkKind::SecurityCycles { .. } => "Security cycles (approximate)",
            ChunkKind::FloatGap { .. } => "Floating point gap (approximate)",
            ChunkKind::Unsupported { .. } => "Unsupported chunk",
        }
    }
}

/// Read a little-endian unsigned field of `width` bytes (at most 4) at `offset`
fn le_field(payload: &[u8], offset: usize, width: usize) -> u32 {
    (0..width).fold(0u32, |acc, i| {
        let byte = payload.get(offset + i).copied().unwrap_or(0);
        acc | (u32::from(byte) << (8 * i))
    })
}
