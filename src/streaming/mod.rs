//! Audio Sinks & Streaming
//!
//! The playback controller hands fixed-size bursts of samples to an
//! [`AudioSink`]. Sinks decide how the samples leave the process:
//! - [`DeviceSink`] (feature `streaming`): ring buffer drained by a rodio output
//! - [`crate::export::WavSink`]: 16-bit mono WAV file
//!
//! A write may block until the sink has room; that backpressure is what keeps
//! the controller from running ahead of real time.

pub mod realtime;
pub mod ring_buffer;

#[cfg(feature = "streaming")]
pub mod audio_device;
#[cfg(feature = "streaming")]
pub mod device_sink;

#[cfg(feature = "streaming")]
pub use audio_device::AudioDevice;
#[cfg(feature = "streaming")]
pub use device_sink::DeviceSink;
pub use realtime::{PlaybackStats, RealtimePlayer};
pub use ring_buffer::RingBuffer;

use crate::config::PlayerConfig;
use crate::constants::{BURST_SIZE, SAMPLE_RATE};
use crate::Result;

/// Buffer backoff time in microseconds
pub const BUFFER_BACKOFF_MICROS: u64 = 100;

/// Destination for synthesized tape audio
///
/// Sinks are opened by their constructors (sample rate, mono, burst size) and
/// released by [`AudioSink::close`]. The controller calls `close` exactly once
/// on every exit path.
pub trait AudioSink {
    /// Hand one burst to the sink, blocking until it has been accepted
    fn write(&mut self, samples: &[f32]) -> Result<()>;

    /// Release the sink
    fn close(&mut self) -> Result<()>;

    /// Playback was paused or resumed; real-time sinks may stop their clock
    fn set_paused(&mut self, _paused: bool) {}

    /// A seek happened; drop audio queued but not yet heard
    fn discard_pending(&mut self) {}
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        (**self).write(samples)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn set_paused(&mut self, paused: bool) {
        (**self).set_paused(paused)
    }

    fn discard_pending(&mut self) {
        (**self).discard_pending()
    }
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        (**self).write(samples)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn set_paused(&mut self, paused: bool) {
        (**self).set_paused(paused)
    }

    fn discard_pending(&mut self) {
        (**self).discard_pending()
    }
}

/// Configuration for streaming playback
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Size of the ring buffer (in samples)
    /// Larger buffers = more latency but less chance of underrun
    pub ring_buffer_size: usize,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of audio channels (tape audio is mono)
    pub channels: u16,

    /// Samples per controller write
    pub burst_size: usize,
}

impl StreamConfig {
    /// Buffer = 16384 samples ≈ 372ms @ 44.1kHz
    pub fn stable(sample_rate: u32) -> Self {
        StreamConfig {
            ring_buffer_size: 16384,
            sample_rate,
            channels: 1,
            burst_size: BURST_SIZE,
        }
    }

    /// Get latency in milliseconds
    pub fn latency_ms(&self) -> f32 {
        ((self.ring_buffer_size as f32) / (self.sample_rate as f32)) * 1000.0
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::stable(SAMPLE_RATE)
    }
}

impl From<&PlayerConfig> for StreamConfig {
    fn from(config: &PlayerConfig) -> Self {
        StreamConfig {
            ring_buffer_size: config.ring_buffer_size,
            sample_rate: config.sample_rate,
            channels: 1,
            burst_size: config.burst_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_latency() {
        let config = StreamConfig::stable(44100);
        let latency = config.latency_ms();
        assert!(latency > 370.0 && latency < 375.0);
    }

    #[test]
    fn test_stream_config_from_player_config() {
        let player = PlayerConfig {
            ring_buffer_size: 8192,
            burst_size: 512,
            ..PlayerConfig::default()
        };
        let stream = StreamConfig::from(&player);
        assert_eq!(stream.ring_buffer_size, 8192);
        assert_eq!(stream.burst_size, 512);
        assert_eq!(stream.channels, 1);
        assert_eq!(stream.sample_rate, 44_100);
    }

    #[test]
    fn test_boxed_sink_forwards() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct Counting(Rc<Cell<usize>>);
        impl AudioSink for Counting {
            fn write(&mut self, samples: &[f32]) -> Result<()> {
                self.0.set(self.0.get() + samples.len());
                Ok(())
            }
            fn close(&mut self) -> Result<()> {
                Ok(())
            }
        }

        let written = Rc::new(Cell::new(0));
        let mut boxed: Box<dyn AudioSink> = Box::new(Counting(Rc::clone(&written)));
        boxed.write(&[0.0; 10]).unwrap();
        boxed.set_paused(true);
        boxed.discard_pending();
        boxed.close().unwrap();
        assert_eq!(written.get(), 10);
    }
}
