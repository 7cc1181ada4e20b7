//! UEF Cassette Tape Player for Acorn 8-bit machines
//!
//! Rebuilds the audio signal of a BBC Micro / Electron cassette from a UEF
//! capture and streams it to an audio sink, while an operator pauses,
//! resumes and seeks between the data blocks recorded on the tape.
//!
//! # Features
//! - UEF container decoding with transparent gzip unwrapping
//! - 1200 baud FSK synthesis (start/stop framing, carrier tones, gaps)
//! - Dense 0-based data block numbering for seeking
//! - Burst-based playback controller with pause/resume/stop/rewind/fastforward/jump
//! - Position publication to an external observer
//! - WAV export and optional real-time device output
//!
//! # Crate feature flags
//! - `streaming` (default): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ## Render a tape to samples
//! ```no_run
//! use uef_player::{load_uef, WaveformSynth};
//! let data = std::fs::read("game.uef").unwrap();
//! let tape = load_uef(&data).unwrap();
//! let synth = WaveformSynth::default();
//! let audio: Vec<f32> = tape.chunks.iter().flat_map(|c| synth.synthesize(c)).collect();
//! ```
//!
//! ## Controlled playback
//! ```no_run
//! use uef_player::{load_uef, CommandChannel, PlayerConfig, SharedPosition, TapePlayer, WavSink};
//! let data = std::fs::read("game.uef").unwrap();
//! let tape = load_uef(&data).unwrap();
//! let config = PlayerConfig::default();
//! let commands = CommandChannel::new();
//! let position = SharedPosition::new();
//! let sink = WavSink::create("game.wav", config.sample_rate).unwrap();
//! let mut player = TapePlayer::new(&tape.chunks, config, commands.clone(), position.clone());
//! commands.send("jump:2");
//! player.run(sink).unwrap();
//! ```

#![warn(missing_docs)]

pub mod block_index; // Data Block Numbering
pub mod compression; // Data Decompression (gzip)
pub mod config; // Player Configuration
pub mod constants; // Tape Signal Constants
pub mod export; // WAV Rendering
pub mod player; // Playback Controller
pub mod streaming; // Audio Sinks & Streaming
pub mod synth; // FSK Waveform Synthesis
pub mod transport; // File-based Command/Status Transport
pub mod uef_loader; // UEF File I/O
pub mod uef_parser; // UEF Container Parsing

/// Error types for UEF tape playback
#[derive(thiserror::Error, Debug)]
pub enum UefError {
    /// The data is not a UEF container, even after one decompression attempt
    #[error("Format error: {0}")]
    Format(String),

    /// Decompression error
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFile(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for tape player operations
pub type Result<T> = std::result::Result<T, UefError>;

// Public API exports
pub use block_index::BlockIndex;
pub use config::PlayerConfig;
pub use export::{export_to_wav, WavSink};
pub use player::{
    BlockPosition, Command, CommandChannel, PlaybackPosition, PlaybackState, PositionObserver,
    SharedPosition, TapePlayer,
};
pub use streaming::{AudioSink, RealtimePlayer, RingBuffer, StreamConfig};
#[cfg(feature = "streaming")]
pub use streaming::{AudioDevice, DeviceSink};
pub use synth::{SynthParams, WaveformSynth};
pub use uef_loader::{load_uef, UefFileLoader};
pub use uef_parser::{parse_uef, Chunk, ChunkKind, UefFile, UefHeader};
