//! Audio device integration using rodio
//!
//! Plays samples from the ring buffer on the default output device. The rodio
//! thread pulls samples in batches; an empty buffer plays silence so the
//! stream stays open while the controller is paused.

use super::RingBuffer;
use crate::{Result, UefError};
use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SOURCE_BATCH: usize = 1024;

/// rodio source reading from the ring buffer
struct RingBufferSource {
    ring_buffer: Arc<RingBuffer>,
    sample_rate: u32,
    channels: u16,
    finished: Arc<AtomicBool>,
    /// Batch read from the ring buffer to limit lock traffic
    batch: Vec<f32>,
    batch_pos: usize,
}

impl RingBufferSource {
    fn new(
        ring_buffer: Arc<RingBuffer>,
        sample_rate: u32,
        channels: u16,
        finished: Arc<AtomicBool>,
    ) -> Self {
        RingBufferSource {
            ring_buffer,
            sample_rate,
            channels,
            finished,
            batch: vec![0.0; SOURCE_BATCH],
            batch_pos: SOURCE_BATCH,
        }
    }
}

impl Source for RingBufferSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(SOURCE_BATCH)
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for RingBufferSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.batch_pos >= self.batch.len() {
            let read = self.ring_buffer.read(&mut self.batch);
            if read == 0 && self.finished.load(Ordering::Relaxed) {
                return None;
            }
            // Underrun: pad with silence to keep the stream alive
            self.batch[read..].fill(0.0);
            self.batch_pos = 0;
        }

        let sample = self.batch[self.batch_pos];
        self.batch_pos += 1;
        Some(sample)
    }
}

/// Audio playback device using rodio
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioDevice {
    /// Open the default output device and start pulling from `ring_buffer`
    pub fn new(sample_rate: u32, channels: u16, ring_buffer: Arc<RingBuffer>) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| UefError::AudioDevice(format!("Failed to create audio stream: {}", e)))?;

        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| UefError::AudioDevice(format!("Failed to create audio sink: {}", e)))?;

        let finished = Arc::new(AtomicBool::new(false));
        sink.append(RingBufferSource::new(
            ring_buffer,
            sample_rate,
            channels,
            Arc::clone(&finished),
        ));

        Ok(AudioDevice {
            _stream: stream,
            sink,
            finished,
        })
    }

    /// Pause playback
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume playback
    pub fn play(&self) {
        self.sink.play();
    }

    /// Signal that no more samples will be produced
    ///
    /// The source ends once the ring buffer is empty instead of playing
    /// silence forever.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.finish();
        self.sink.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(ring: &Arc<RingBuffer>, finished: &Arc<AtomicBool>) -> RingBufferSource {
        RingBufferSource::new(Arc::clone(ring), 44_100, 1, Arc::clone(finished))
    }

    #[test]
    fn test_source_reports_format() {
        let ring = Arc::new(RingBuffer::new(4096).unwrap());
        let finished = Arc::new(AtomicBool::new(false));
        let src = source(&ring, &finished);
        assert_eq!(src.sample_rate(), 44_100);
        assert_eq!(src.channels(), 1);
        assert!(src.total_duration().is_none());
    }

    #[test]
    fn test_source_plays_buffered_then_silence() {
        let ring = Arc::new(RingBuffer::new(4096).unwrap());
        let finished = Arc::new(AtomicBool::new(false));
        ring.write(&[0.5, -0.5]);

        let mut src = source(&ring, &finished);
        assert_eq!(src.next(), Some(0.5));
        assert_eq!(src.next(), Some(-0.5));
        assert_eq!(src.next(), Some(0.0));
    }

    #[test]
    fn test_source_ends_after_finish() {
        let ring = Arc::new(RingBuffer::new(4096).unwrap());
        let finished = Arc::new(AtomicBool::new(true));
        let mut src = source(&ring, &finished);
        assert_eq!(src.next(), None);
    }

    #[test]
    fn test_device_open_when_available() {
        let ring = Arc::new(RingBuffer::new(4096).unwrap());
        match AudioDevice::new(44_100, 1, ring) {
            Ok(device) => {
                device.pause();
                device.play();
                device.finish();
            }
            Err(err) => eprintln!("Skipping audio device test (backend unavailable): {}", err),
        }
    }
}
