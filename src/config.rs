//! Player Configuration
//!
//! Tunables for synthesis, burst streaming and command polling. Defaults are
//! the reference values; a JSON file may override any subset of them.

use crate::constants::{BAUD_RATE, BURST_SIZE, PAUSE_POLL_MS, SAMPLE_RATE};
use crate::synth::SynthParams;
use crate::{Result, UefError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Playback session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Tape symbol rate
    pub baud: u32,
    /// Samples per sink write; commands are polled between writes
    pub burst_size: usize,
    /// Command poll interval while paused, in milliseconds
    pub pause_poll_ms: u64,
    /// Device ring buffer size in samples
    pub ring_buffer_size: usize,
    /// How long a device write may make no progress before failing, in milliseconds
    pub stall_timeout_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            sample_rate: SAMPLE_RATE,
            baud: BAUD_RATE,
            burst_size: BURST_SIZE,
            pause_poll_ms: PAUSE_POLL_MS,
            ring_buffer_size: 16384,
            stall_timeout_ms: 2000,
        }
    }
}

impl PlayerConfig {
    /// Load a configuration from a JSON file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(text)
            .map_err(|e| UefError::Config(format!("invalid player configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the player cannot run with
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, bool); 6] = [
            ("sample_rate", self.sample_rate == 0),
            ("baud", self.baud == 0),
            ("burst_size", self.burst_size == 0),
            ("pause_poll_ms", self.pause_poll_ms == 0),
            ("ring_buffer_size", self.ring_buffer_size == 0),
            ("stall_timeout_ms", self.stall_timeout_ms == 0),
        ];
        if let Some((name, _)) = checks.iter().find(|(_, bad)| *bad) {
            return Err(UefError::Config(format!("{} must be greater than 0", name)));
        }
        if u64::from(self.baud) * 4 > u64::from(self.sample_rate) {
            return Err(UefError::Config(format!(
                "sample rate {} Hz cannot represent a {} Hz carrier",
                self.sample_rate,
                u64::from(self.baud) * 2
            )));
        }
        Ok(())
    }

    /// Signal parameters for the synthesizer
    pub fn synth_params(&self) -> SynthParams {
        SynthParams {
            sample_rate: self.sample_rate,
            baud: self.baud,
        }
    }

    /// Poll interval while paused
    pub fn pause_poll_interval(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms)
    }

    /// Device stall timeout
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_millis(self.stall_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_reference_values() {
        let config = PlayerConfig::default();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.baud, 1200);
        assert_eq!(config.burst_size, 1024);
        assert_eq!(config.pause_poll_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlayerConfig::from_json_str(r#"{ "burst_size": 256 }"#).unwrap();
        assert_eq!(config.burst_size, 256);
        assert_eq!(config.sample_rate, 44_100);
    }

    #[test]
    fn test_zero_values_rejected() {
        let result = PlayerConfig::from_json_str(r#"{ "burst_size": 0 }"#);
        assert!(matches!(result, Err(UefError::Config(msg)) if msg.contains("burst_size")));
    }

    #[test]
    fn test_carrier_above_nyquist_rejected() {
        let config = PlayerConfig {
            sample_rate: 8000,
            baud: 2400,
            ..PlayerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PlayerConfig::from_json_str("{ not json"),
            Err(UefError::Config(_))
        ));
    }

    #[test]
    fn test_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{ "pause_poll_ms": 20 }"#).unwrap();
        let config = PlayerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.pause_poll_ms, 20);
    }
}
