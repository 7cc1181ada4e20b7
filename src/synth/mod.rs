//! FSK Waveform Synthesis
//!
//! Turns UEF chunks into mono `f32` samples in `[-0.5, 0.5]`, following the
//! Acorn cassette encoding at 1200 baud:
//! - a `0` bit is one cycle of 1200 Hz, a `1` bit two cycles of 2400 Hz
//! - each byte is framed as start bit (`0`), 8 data bits LSB-first, stop bit (`1`)
//! - the carrier (lead-in) tone is a run of 2400 Hz cycles
//! - gaps are silence
//!
//! Chunk kinds without a synthesis rule contribute no samples.

pub mod tone;

pub use tone::{push_silence, push_square_wave, square_sample};

use crate::constants::{self, BAUD_RATE, BITS_PER_FRAMED_BYTE, DUMMY_BYTE, SAMPLE_RATE};
use crate::uef_parser::{Chunk, ChunkKind};
use log::debug;
use tone::{millis_to_samples, seconds_to_samples};

/// Fixed signal parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthParams {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Symbol rate
    pub baud: u32,
}

impl SynthParams {
    /// Carrier tone frequency (twice the baud rate)
    pub fn carrier_frequency(&self) -> u32 {
        self.baud * 2
    }

    /// Samples in one bit period
    pub fn samples_per_bit(&self) -> usize {
        constants::samples_per_bit(self.sample_rate, self.baud)
    }

    /// Samples in one carrier cycle
    pub fn samples_per_carrier_cycle(&self) -> usize {
        constants::samples_per_carrier_cycle(self.sample_rate, self.baud)
    }
}

impl Default for SynthParams {
    fn default() -> Self {
        SynthParams {
            sample_rate: SAMPLE_RATE,
            baud: BAUD_RATE,
        }
    }
}

/// Renders chunks to audio samples
#[derive(Debug, Clone)]
pub struct WaveformSynth {
    params: SynthParams,
    samples_per_bit: usize,
    samples_per_cycle: usize,
}

impl WaveformSynth {
    /// Create a synthesizer for the given parameters
    pub fn new(params: SynthParams) -> Self {
        WaveformSynth {
            params,
            samples_per_bit: params.samples_per_bit(),
            samples_per_cycle: params.samples_per_carrier_cycle(),
        }
    }

    /// Signal parameters in use
    pub fn params(&self) -> SynthParams {
        self.params
    }

    /// Samples in one bit period
    pub fn samples_per_bit(&self) -> usize {
        self.samples_per_bit
    }

    /// Samples in one carrier cycle
    pub fn samples_per_carrier_cycle(&self) -> usize {
        self.samples_per_cycle
    }

    /// Render one chunk's full contribution to the tape signal
    pub fn synthesize(&self, chunk: &Chunk) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.sample_count(chunk));

        match chunk.kind() {
            ChunkKind::CarrierTone { cycles } => self.push_carrier(&mut out, u32::from(cycles)),
            ChunkKind::ImplicitDataBlock(bytes) => {
                for &byte in bytes {
                    self.push_byte(&mut out, byte);
                }
            }
            ChunkKind::IntegerGap { millis } => {
                push_silence(&mut out, millis_to_samples(millis, self.params.sample_rate))
            }
            ChunkKind::CarrierToneWithDummyByte {
                pre_cycles,
                post_cycles,
            } => {
                self.push_carrier(&mut out, u32::from(pre_cycles));
                self.push_byte(&mut out, DUMMY_BYTE);
                self.push_carrier(&mut out, u32::from(post_cycles));
            }
            ChunkKind::SecurityCycles { cycles } => self.push_carrier(&mut out, cycles),
            ChunkKind::FloatGap { seconds } => push_silence(
                &mut out,
                seconds_to_samples(f64::from(seconds), self.params.sample_rate),
            ),
            ChunkKind::DefinedDataBlock => {
                debug!("Chunk 0x0104 has no synthesis rule, contributing no samples");
            }
            ChunkKind::Unsupported { id } => {
                debug!("Skipping unsupported chunk 0x{:04x}", id);
            }
        }

        out
    }

    /// Number of samples `synthesize` produces for a chunk, without rendering
    pub fn sample_count(&self, chunk: &Chunk) -> usize {
        let byte_len = self.samples_per_bit * BITS_PER_FRAMED_BYTE;
        match chunk.kind() {
            ChunkKind::CarrierTone { cycles } => usize::from(cycles) * self.samples_per_cycle,
            ChunkKind::ImplicitDataBlock(bytes) => bytes.len() * byte_len,
            ChunkKind::IntegerGap { millis } => millis_to_samples(millis, self.params.sample_rate),
            ChunkKind::CarrierToneWithDummyByte {
                pre_cycles,
                post_cycles,
            } => {
                (usize::from(pre_cycles) + usize::from(post_cycles)) * self.samples_per_cycle
                    + byte_len
            }
            ChunkKind::SecurityCycles { cycles } => cycles as usize * self.samples_per_cycle,
            ChunkKind::FloatGap { seconds } => {
                seconds_to_samples(f64::from(seconds), self.params.sample_rate)
            }
            ChunkKind::DefinedDataBlock | ChunkKind::Unsupported { .. } => 0,
        }
    }

    /// Duration of a chunk in seconds
    pub fn duration_seconds(&self, chunk: &Chunk) -> f64 {
        self.sample_count(chunk) as f64 / f64::from(self.params.sample_rate)
    }

    /// Render one framed byte: start bit, 8 data bits LSB-first, stop bit
    pub fn encode_byte(&self, byte: u8) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.samples_per_bit * BITS_PER_FRAMED_BYTE);
        self.push_byte(&mut out, byte);
        out
    }

    fn push_byte(&self, out: &mut Vec<f32>, byte: u8) {
        self.push_bit(out, false);
        for bit in 0..8 {
            self.push_bit(out, (byte >> bit) & 1 == 1);
        }
        self.push_bit(out, true);
    }

    fn push_bit(&self, out: &mut Vec<f32>, one: bool) {
        let frequency = if one {
            self.params.carrier_frequency()
        } else {
            self.params.baud
        };
        push_square_wave(out, frequency, self.params.sample_rate, self.samples_per_bit);
    }

    /// Carrier runs are one continuous wave, not concatenated single cycles
    fn push_carrier(&self, out: &mut Vec<f32>, cycles: u32) {
        push_square_wave(
            out,
            self.params.carrier_frequency(),
            self.params.sample_rate,
            cycles as usize * self.samples_per_cycle,
        );
    }
}

impl Default for WaveformSynth {
    fn default() -> Self {
        Self::new(SynthParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AMPLITUDE;
    use crate::uef_parser::chunk::{
        CARRIER_TONE, CARRIER_TONE_WITH_DUMMY_BYTE, DEFINED_DATA_BLOCK, FLOAT_GAP,
        IMPLICIT_DATA_BLOCK, INTEGER_GAP, SECURITY_CYCLES,
    };

    fn synth() -> WaveformSynth {
        WaveformSynth::default()
    }

    #[test]
    fn test_default_timings() {
        let s = synth();
        assert_eq!(s.samples_per_bit(), 37);
        assert_eq!(s.samples_per_carrier_cycle(), 18);
        assert_eq!(s.params().carrier_frequency(), 2400);
    }

    #[test]
    fn test_carrier_length() {
        let chunk = Chunk::new(CARRIER_TONE, 10u16.to_le_bytes().to_vec());
        let samples = synth().synthesize(&chunk);
        assert_eq!(samples.len(), 10 * 18);
        assert_eq!(samples.len(), synth().sample_count(&chunk));
    }

    #[test]
    fn test_data_block_length() {
        let chunk = Chunk::new(IMPLICIT_DATA_BLOCK, vec![0x00, 0xFF, 0x41, 0x7E]);
        let samples = synth().synthesize(&chunk);
        assert_eq!(samples.len(), 4 * 10 * 37);
    }

    #[test]
    fn test_samples_stay_in_range() {
        let chunk = Chunk::new(IMPLICIT_DATA_BLOCK, (0..=255u8).collect());
        assert!(synth()
            .synthesize(&chunk)
            .iter()
            .all(|&s| (-0.5..=0.5).contains(&s)));
    }

    #[test]
    fn test_byte_framing() {
        let s = synth();
        let bits = s.samples_per_bit();
        let low = {
            let mut v = Vec::new();
            push_square_wave(&mut v, 1200, 44_100, bits);
            v
        };
        let high = {
            let mut v = Vec::new();
            push_square_wave(&mut v, 2400, 44_100, bits);
            v
        };

        // 0x41 = 0b0100_0001, LSB first: 1,0,0,0,0,0,1,0
        let encoded = s.encode_byte(0x41);
        let expected_bits = [false, true, false, false, false, false, false, true, false, true];
        for (n, &one) in expected_bits.iter().enumerate() {
            let slice = &encoded[n * bits..(n + 1) * bits];
            let reference = if one { &high } else { &low };
            assert_eq!(slice, reference.as_slice(), "bit {}", n);
        }
    }

    #[test]
    fn test_each_bit_restarts_phase() {
        let encoded = synth().encode_byte(0xFF);
        for bit in 0..10 {
            assert_eq!(encoded[bit * 37], AMPLITUDE);
        }
    }

    #[test]
    fn test_integer_gap_is_silence() {
        let chunk = Chunk::new(INTEGER_GAP, 50u16.to_le_bytes().to_vec());
        let samples = synth().synthesize(&chunk);
        assert_eq!(samples.len(), 2205);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_float_gap() {
        let chunk = Chunk::new(FLOAT_GAP, 0.5f32.to_le_bytes().to_vec());
        let samples = synth().synthesize(&chunk);
        assert_eq!(samples.len(), 22_050);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_hour_long_float_gap_full_length() {
        let chunk = Chunk::new(FLOAT_GAP, 4000.0f32.to_le_bytes().to_vec());
        assert_eq!(synth().sample_count(&chunk), 176_400_000);
    }

    #[test]
    fn test_carrier_with_dummy_byte() {
        let s = synth();
        let mut payload = 4u16.to_le_bytes().to_vec();
        payload.extend_from_slice(&2u16.to_le_bytes());
        let chunk = Chunk::new(CARRIER_TONE_WITH_DUMMY_BYTE, payload);
        let samples = s.synthesize(&chunk);

        assert_eq!(samples.len(), 6 * 18 + 370);
        let dummy = s.encode_byte(0xAA);
        assert_eq!(&samples[4 * 18..4 * 18 + 370], dummy.as_slice());
    }

    #[test]
    fn test_security_cycles_render_as_carrier() {
        let s = synth();
        let security = Chunk::new(SECURITY_CYCLES, vec![7, 0, 0]);
        let carrier = Chunk::new(CARRIER_TONE, vec![7, 0]);
        assert_eq!(s.synthesize(&security), s.synthesize(&carrier));
    }

    #[test]
    fn test_zero_length_kinds() {
        let s = synth();
        assert!(s.synthesize(&Chunk::new(DEFINED_DATA_BLOCK, vec![1, 2, 3])).is_empty());
        assert!(s.synthesize(&Chunk::new(0x0000, b"origin".to_vec())).is_empty());
        assert!(s.synthesize(&Chunk::new(0x0120, vec![])).is_empty());
        assert_eq!(s.sample_count(&Chunk::new(0x0130, vec![0; 8])), 0);
    }

    #[test]
    fn test_duration() {
        let chunk = Chunk::new(FLOAT_GAP, 2.0f32.to_le_bytes().to_vec());
        approx::assert_relative_eq!(synth().duration_seconds(&chunk), 2.0);
    }

    #[test]
    fn test_custom_rate() {
        let s = WaveformSynth::new(SynthParams {
            sample_rate: 48_000,
            baud: 1200,
        });
        assert_eq!(s.samples_per_bit(), 40);
        assert_eq!(s.samples_per_carrier_cycle(), 20);
        assert_eq!(s.encode_byte(0x00).len(), 400);
    }
}
