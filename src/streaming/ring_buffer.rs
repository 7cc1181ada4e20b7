//! Ring buffer between the playback controller and the audio device
//!
//! The controller thread writes bursts; the rodio output thread reads them.
//! Memory is fixed at `capacity * sizeof(f32)` regardless of tape length.
//! Positions are monotonically increasing counters; indices are taken modulo
//! the power-of-two capacity.

use crate::{Result, UefError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 512 MB worth of f32 samples
const MAX_CAPACITY: usize = 512 * 1024 * 1024 / std::mem::size_of::<f32>();

/// Single-producer single-consumer sample buffer
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Mutex<Vec<f32>>,
    /// Total samples ever written (producer)
    write_pos: AtomicUsize,
    /// Total samples ever read or discarded (consumer)
    read_pos: AtomicUsize,
    capacity: usize,
    /// `pos & mask == pos % capacity`
    mask: usize,
}

impl RingBuffer {
    /// Create a new ring buffer; capacity is rounded up to a power of two
    ///
    /// # Errors
    /// [`UefError::Config`] for a zero capacity or one above 512 MB.
    pub fn new(requested_capacity: usize) -> Result<Self> {
        if requested_capacity == 0 {
            return Err(UefError::Config(
                "Ring buffer capacity must be greater than 0".into(),
            ));
        }

        let capacity = requested_capacity
            .checked_next_power_of_two()
            .filter(|&c| c <= MAX_CAPACITY)
            .ok_or_else(|| {
                UefError::Config(format!(
                    "Ring buffer capacity {requested_capacity} exceeds maximum safe size {MAX_CAPACITY}"
                ))
            })?;

        Ok(RingBuffer {
            buffer: Mutex::new(vec![0.0; capacity]),
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
            capacity,
            mask: capacity - 1,
        })
    }

    /// Buffer capacity in samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples waiting to be read
    pub fn available_read(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Samples that can be written without overwriting unread data
    ///
    /// One slot stays free so a full buffer is distinguishable from an empty one.
    pub fn available_write(&self) -> usize {
        self.capacity - self.available_read() - 1
    }

    /// Write samples (producer); returns how many fit
    pub fn write(&self, samples: &[f32]) -> usize {
        let mut buf = self.buffer.lock();

        // Space is computed under the lock so a concurrent flush cannot race it
        let write_pos = self.write_pos.load(Ordering::Acquire);
        let to_write = samples.len().min(self.available_write());
        if to_write == 0 {
            return 0;
        }

        let start = write_pos & self.mask;
        let first = to_write.min(self.capacity - start);
        buf[start..start + first].copy_from_slice(&samples[..first]);
        buf[..to_write - first].copy_from_slice(&samples[first..to_write]);

        // Published under the lock so a flush never sees a half-finished write
        self.write_pos
            .store(write_pos.wrapping_add(to_write), Ordering::Release);
        drop(buf);
        to_write
    }

    /// Read samples (consumer); returns how many were copied into `dest`
    pub fn read(&self, dest: &mut [f32]) -> usize {
        let buf = self.buffer.lock();

        let read_pos = self.read_pos.load(Ordering::Acquire);
        let to_read = dest.len().min(self.available_read());
        if to_read == 0 {
            return 0;
        }

        let start = read_pos & self.mask;
        let first = to_read.min(self.capacity - start);
        dest[..first].copy_from_slice(&buf[start..start + first]);
        dest[first..to_read].copy_from_slice(&buf[..to_read - first]);

        // A flush between copy and store would be undone by a stale position
        self.read_pos
            .store(read_pos.wrapping_add(to_read), Ordering::Release);
        drop(buf);
        to_read
    }

    /// Discard every unread sample
    pub fn flush(&self) {
        let _guard = self.buffer.lock();
        let write_pos = self.write_pos.load(Ordering::Acquire);
        self.read_pos.store(write_pos, Ordering::Release);
    }

    /// True when nothing is waiting to be read
    pub fn is_empty(&self) -> bool {
        self.available_read() == 0
    }

    /// Get fill percentage (0.0 to 1.0)
    pub fn fill_percentage(&self) -> f32 {
        (self.available_read() as f32) / (self.capacity as f32)
    }
}
