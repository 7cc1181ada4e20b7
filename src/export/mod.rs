//! WAV Rendering
//!
//! Renders tapes to 16-bit mono WAV files with `hound`, either in one go
//! ([`export_to_wav`]) or burst by burst through the playback controller
//! ([`WavSink`]).

pub mod wav;

pub use wav::{export_to_wav, WavSink};
