//! Real-time sample streaming with backpressure
//!
//! [`RealtimePlayer`] is the producer side of the ring buffer. Writes block
//! while the buffer is full, so the controller advances no faster than the
//! audio device consumes. A device that stops consuming for longer than the
//! stall timeout makes the write come up short, which the caller treats as a
//! sink failure.

use super::{RingBuffer, StreamConfig, BUFFER_BACKOFF_MICROS};
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Real-time audio streamer feeding a ring buffer
pub struct RealtimePlayer {
    buffer: Arc<RingBuffer>,
    config: StreamConfig,
    stats: Arc<Mutex<PlaybackStats>>,
}

/// Playback statistics for monitoring stalls and buffer health
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackStats {
    /// Number of writes that had to wait for space
    pub overrun_count: usize,
    /// Number of samples accepted
    pub samples_written: usize,
    /// Number of samples dropped by seeks before being heard
    pub samples_discarded: usize,
    /// Current buffer fill percentage
    pub fill_percentage: f32,
}

impl RealtimePlayer {
    /// Create a streamer with its own ring buffer
    pub fn new(config: StreamConfig) -> Result<Self> {
        let buffer = Arc::new(RingBuffer::new(config.ring_buffer_size)?);
        Ok(RealtimePlayer {
            buffer,
            config,
            stats: Arc::new(Mutex::new(PlaybackStats::default())),
        })
    }

    /// Write samples, blocking while the buffer is full
    ///
    /// Gives up once no progress was made for `stall_timeout` and returns the
    /// number of samples actually written.
    pub fn write_blocking(&self, samples: &[f32], stall_timeout: Duration) -> usize {
        let mut total_written = 0;
        let mut remaining = samples;
        let mut last_progress = Instant::now();
        let mut waited = false;

        while !remaining.is_empty() {
            let written = self.buffer.write(remaining);
            total_written += written;

            if written == 0 {
                if last_progress.elapsed() >= stall_timeout {
                    break;
                }
                waited = true;
                std::thread::sleep(Duration::from_micros(BUFFER_BACKOFF_MICROS));
            } else {
                remaining = &remaining[written..];
                last_progress = Instant::now();
            }
        }

        let mut stats = self.stats.lock();
        stats.samples_written += total_written;
        stats.fill_percentage = self.buffer.fill_percentage();
        if waited {
            stats.overrun_count += 1;
        }

        total_written
    }

    /// Block until the device has consumed everything queued, or `timeout` elapses
    ///
    /// Returns `true` if the buffer drained.
    pub fn wait_until_drained(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.buffer.is_empty() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Drop queued samples so a seek is heard immediately
    pub fn flush(&self) {
        let pending = self.buffer.available_read();
        self.buffer.flush();
        let mut stats = self.stats.lock();
        stats.samples_discarded += pending;
        stats.fill_percentage = 0.0;
    }

    /// Get current playback statistics
    pub fn get_stats(&self) -> PlaybackStats {
        *self.stats.lock()
    }

    /// Get buffer fill percentage (0.0 to 1.0)
    pub fn fill_percentage(&self) -> f32 {
        self.buffer.fill_percentage()
    }

    /// Get the stream configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Shared handle to the ring buffer for the audio device
    pub fn get_buffer(&self) -> Arc<RingBuffer> {
        Arc::clone(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> StreamConfig {
        StreamConfig {
            ring_buffer_size: 64,
            ..StreamConfig::stable(44_100)
        }
    }

    #[test]
    fn test_stream_config() {
        let config = StreamConfig::stable(44100);
        assert!(config.latency_ms() > 300.0);
    }

    #[test]
    fn test_write_within_capacity() {
        let player = RealtimePlayer::new(small_config()).unwrap();
        assert_eq!(player.write_blocking(&[0.5; 32], Duration::from_millis(10)), 32);
        let stats = player.get_stats();
        assert_eq!(stats.samples_written, 32);
        assert_eq!(stats.overrun_count, 0);
    }

    #[test]
    fn test_stalled_consumer_times_out() {
        let player = RealtimePlayer::new(small_config()).unwrap();
        let written = player.write_blocking(&[0.5; 100], Duration::from_millis(5));
        assert_eq!(written, 63);
        assert_eq!(player.get_stats().overrun_count, 1);
    }

    #[test]
    fn test_consumer_thread_unblocks_writer() {
        let player = RealtimePlayer::new(small_config()).unwrap();
        let buffer = player.get_buffer();
        let consumer = std::thread::spawn(move || {
            let mut scratch = [0.0f32; 16];
            let mut total = 0;
            while total < 200 {
                total += buffer.read(&mut scratch);
                std::thread::sleep(Duration::from_micros(50));
            }
            total
        });

        assert_eq!(player.write_blocking(&[0.5; 200], Duration::from_secs(5)), 200);
        assert_eq!(consumer.join().unwrap(), 200);
        assert!(player.wait_until_drained(Duration::from_secs(1)));
    }

    #[test]
    fn test_flush_counts_discarded() {
        let player = RealtimePlayer::new(small_config()).unwrap();
        player.write_blocking(&[0.5; 40], Duration::from_millis(10));
        player.flush();
        assert_eq!(player.get_stats().samples_discarded, 40);
        assert!(player.wait_until_drained(Duration::from_millis(1)));
    }
}
