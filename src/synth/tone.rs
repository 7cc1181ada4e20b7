//! Square wave and silence primitives
//!
//! The reference waveform is `0.5 * sign(sin(2π f i / r))`. Evaluating the
//! sine in floating point makes the sign at zero crossings depend on rounding,
//! so the phase is tracked exactly in integers instead:
//!
//! `p = (f * i) mod r`, output `+AMPLITUDE` while `2p < r`, `-AMPLITUDE` otherwise.
//!
//! A crossing at the start of a cycle (`p == 0`) yields the positive level and
//! a crossing exactly at mid-cycle yields the negative level.

use crate::constants::AMPLITUDE;

/// Value of sample `index` of a square wave with phase 0 at index 0
#[inline]
pub fn square_sample(frequency: u32, sample_rate: u32, index: usize) -> f32 {
    let rate = u64::from(sample_rate);
    if rate == 0 {
        return 0.0;
    }
    let phase = (u64::from(frequency) * index as u64) % rate;
    if phase * 2 < rate {
        AMPLITUDE
    } else {
        -AMPLITUDE
    }
}

/// Append `count` samples of a square wave, phase restarting at 0
pub fn push_square_wave(out: &mut Vec<f32>, frequency: u32, sample_rate: u32, count: usize) {
    out.reserve(count);
    out.extend((0..count).map(|i| square_sample(frequency, sample_rate, i)));
}

/// Append `count` zero samples
pub fn push_silence(out: &mut Vec<f32>, count: usize) {
    out.resize(out.len() + count, 0.0);
}

/// Samples in a gap of whole milliseconds, rounded to nearest
#[inline]
pub fn millis_to_samples(millis: u16, sample_rate: u32) -> usize {
    ((u64::from(millis) * u64::from(sample_rate) * 2 + 1000) / 2000) as usize
}

/// Samples in a gap of fractional seconds, rounded to nearest
///
/// Negative, NaN or infinite durations give no samples.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> usize {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * f64::from(sample_rate)).round() as usize
}
