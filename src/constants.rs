//! Tape Signal Constants
//!
//! Shared constants describing the Acorn cassette signal and the UEF container.

/// Acorn cassette filing system symbol rate
pub const BAUD_RATE: u32 = 1200;

/// Output sample rate in Hz
pub const SAMPLE_RATE: u32 = 44_100;

/// Carrier tone frequency (a "1" bit and the lead-in tone)
///
/// Twice the baud rate, so one bit period holds two carrier cycles.
pub const CARRIER_FREQUENCY: u32 = BAUD_RATE * 2;

/// Peak level of the generated square wave
pub const AMPLITUDE: f32 = 0.5;

/// Samples handed to the sink per write
pub const BURST_SIZE: usize = 1024;

/// Interval between command polls while paused, in milliseconds
pub const PAUSE_POLL_MS: u64 = 100;

/// UEF magic string including its NUL terminator
pub const UEF_MAGIC: &[u8; 10] = b"UEF File!\0";

/// Length of the UEF header (magic + minor + major version)
pub const UEF_HEADER_LEN: usize = 12;

/// Byte written by a "carrier tone with dummy byte" chunk
pub const DUMMY_BYTE: u8 = 0xAA;

/// Framed bits per byte: start bit, 8 data bits, stop bit
pub const BITS_PER_FRAMED_BYTE: usize = 10;

/// Samples in one bit period, rounded to the nearest sample
#[inline]
pub fn samples_per_bit(sample_rate: u32, baud: u32) -> usize {
    rounded_ratio(sample_rate, baud)
}

/// Samples in one carrier cycle, rounded to the nearest sample
#[inline]
pub fn samples_per_carrier_cycle(sample_rate: u32, baud: u32) -> usize {
    rounded_ratio(sample_rate, baud * 2)
}

/// `round(num / den)` in integers, halves rounding up
#[inline]
fn rounded_ratio(num: u32, den: u32) -> usize {
    if den == 0 {
        return 0;
    }
    ((u64::from(num) * 2 + u64::from(den)) / (u64::from(den) * 2)) as usize
}
