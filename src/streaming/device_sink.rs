//! [`AudioSink`] backed by the system audio device

use super::{AudioDevice, AudioSink, RealtimePlayer, StreamConfig};
use crate::{Result, UefError};
use log::{debug, warn};
use std::time::Duration;

/// Streams bursts to the default output device through a ring buffer
pub struct DeviceSink {
    streamer: RealtimePlayer,
    device: Option<AudioDevice>,
    stall_timeout: Duration,
}

impl DeviceSink {
    /// Open the default output device
    ///
    /// A write that makes no progress for `stall_timeout` fails the session.
    pub fn open(config: StreamConfig, stall_timeout: Duration) -> Result<Self> {
        let streamer = RealtimePlayer::new(config)?;
        let device = AudioDevice::new(config.sample_rate, config.channels, streamer.get_buffer())?;
        debug!(
            "Audio device opened: {} Hz, {} ch, {:.1}ms buffer",
            config.sample_rate,
            config.channels,
            config.latency_ms()
        );

        Ok(DeviceSink {
            streamer,
            device: Some(device),
            stall_timeout,
        })
    }
}

impl AudioSink for DeviceSink {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        if self.device.is_none() {
            return Err(UefError::AudioDevice("audio device already closed".into()));
        }
        let written = self.streamer.write_blocking(samples, self.stall_timeout);
        if written < samples.len() {
            return Err(UefError::AudioDevice(format!(
                "audio device stopped consuming samples ({} of {} written)",
                written,
                samples.len()
            )));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(device) = self.device.take() else {
            return Ok(());
        };

        // Let the tail of the tape play out before tearing the stream down
        let drain_budget =
            Duration::from_secs_f32(self.streamer.config().latency_ms() / 1000.0) + self.stall_timeout;
        if !self.streamer.wait_until_drained(drain_budget) {
            warn!("Audio buffer did not drain before close; dropping remaining samples");
        }
        device.finish();

        let stats = self.streamer.get_stats();
        debug!(
            "Audio device closed: {} samples written, {} discarded, {} stalls",
            stats.samples_written, stats.samples_discarded, stats.overrun_count
        );
        Ok(())
    }

    fn set_paused(&mut self, paused: bool) {
        if let Some(device) = &self.device {
            if paused {
                device.pause();
            } else {
                device.play();
            }
        }
    }

    fn discard_pending(&mut self) {
        self.streamer.flush();
    }
}
