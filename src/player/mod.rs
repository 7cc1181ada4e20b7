//! Playback Controller
//!
//! Streams a tape to an [`crate::AudioSink`] burst by burst and reacts to
//! operator commands between bursts.
//!
//! - [`CommandChannel`]: single-slot command mailbox, the latest command wins
//! - [`PositionObserver`]: receives the block position after seeks and blocks
//! - [`TapePlayer`]: the session state machine

pub mod command;
pub mod controller;
pub mod position;

pub use command::{Command, CommandChannel};
pub use controller::{PlaybackPosition, TapePlayer};
pub use position::{BlockPosition, PositionObserver, SharedPosition};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Streaming samples
    #[default]
    Playing,
    /// Holding position, waiting for commands
    Paused,
    /// Session over; terminal
    Stopped,
}
