//! Tape playback session
//!
//! The player walks the chunk list once, synthesizing each chunk and writing
//! it to the sink in bursts. Before every burst it polls the command channel;
//! while paused it blocks on the channel with a timeout instead of writing.
//! Seeks land on the first sample of a data block and are published to the
//! position observer straight away.

use super::command::{Command, CommandChannel};
use super::position::{BlockPosition, PositionObserver};
use super::PlaybackState;
use crate::block_index::BlockIndex;
use crate::config::PlayerConfig;
use crate::streaming::AudioSink;
use crate::synth::WaveformSynth;
use crate::uef_parser::Chunk;
use crate::Result;
use log::{debug, info, warn};

/// Snapshot of the controller's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackPosition {
    /// Chunk being streamed
    pub chunk_index: usize,
    /// Samples of that chunk already written
    pub sample_offset: usize,
    /// Current logical data block
    pub block_index: usize,
    /// Playback state
    pub state: PlaybackState,
}

/// What a poll decided for the burst about to be written
enum Flow {
    Continue,
    Seeked,
    Stop,
}

/// Plays one tape to one sink
pub struct TapePlayer<'a, O: PositionObserver> {
    chunks: &'a [Chunk],
    index: BlockIndex,
    synth: WaveformSynth,
    config: PlayerConfig,
    commands: CommandChannel,
    observer: O,
    state: PlaybackState,
    chunk_index: usize,
    sample_offset: usize,
    block_index: usize,
}

impl<'a, O: PositionObserver> TapePlayer<'a, O> {
    /// Prepare a session at the start of the tape
    pub fn new(
        chunks: &'a [Chunk],
        config: PlayerConfig,
        commands: CommandChannel,
        observer: O,
    ) -> Self {
        TapePlayer {
            chunks,
            index: BlockIndex::build(chunks),
            synth: WaveformSynth::new(config.synth_params()),
            config,
            commands,
            observer,
            state: PlaybackState::Playing,
            chunk_index: 0,
            sample_offset: 0,
            block_index: 0,
        }
    }

    /// Stream the tape until it ends or a `stop` arrives
    ///
    /// The sink is closed on every exit path. A failed write is returned
    /// after the sink has been closed; the player is stopped either way.
    pub fn run<S: AudioSink>(&mut self, mut sink: S) -> Result<()> {
        info!(
            "Playing {} chunks ({} data blocks)",
            self.chunks.len(),
            self.index.len()
        );

        let outcome = self.stream(&mut sink);
        let stopped_early = self.state == PlaybackState::Stopped;
        self.state = PlaybackState::Stopped;

        match outcome {
            Ok(()) => {
                if stopped_early {
                    sink.discard_pending();
                }
                sink.close()
            }
            Err(e) => {
                if let Err(close_err) = sink.close() {
                    warn!("Failed to close sink after write error: {}", close_err);
                }
                Err(e)
            }
        }
    }

    fn stream<S: AudioSink>(&mut self, sink: &mut S) -> Result<()> {
        let chunks = self.chunks;
        let burst_size = self.config.burst_size.max(1);
        self.publish();

        'chunks: while self.state != PlaybackState::Stopped && self.chunk_index < chunks.len() {
            let current = self.chunk_index;
            let chunk = &chunks[current];
            let block = self.index.block_for_chunk(current);
            if let Some(block) = block {
                self.block_index = block;
            }

            let samples = self.synth.synthesize(chunk);
            while self.sample_offset < samples.len() {
                match self.poll(sink) {
                    Flow::Continue => {}
                    Flow::Seeked => continue 'chunks,
                    Flow::Stop => break 'chunks,
                }

                let end = (self.sample_offset + burst_size).min(samples.len());
                sink.write(&samples[self.sample_offset..end])?;
                self.sample_offset = end;
            }

            if block.is_some() {
                self.publish();
            }
            self.chunk_index += 1;
            self.sample_offset = 0;
        }

        Ok(())
    }

    /// Drain commands before a burst, holding here while paused
    fn poll<S: AudioSink>(&mut self, sink: &mut S) -> Flow {
        let mut seeked = false;

        if let Some(command) = self.commands.try_recv() {
            seeked |= self.apply(command, sink);
        }
        while self.state == PlaybackState::Paused {
            if let Some(command) = self.commands.recv_timeout(self.config.pause_poll_interval()) {
                seeked |= self.apply(command, sink);
            }
        }

        if self.state == PlaybackState::Stopped {
            Flow::Stop
        } else if seeked {
            Flow::Seeked
        } else {
            Flow::Continue
        }
    }

    fn apply<S: AudioSink>(&mut self, command: Command, sink: &mut S) -> bool {
        let before = self.state;
        let seeked = self.handle_command(command);

        match (before, self.state) {
            (PlaybackState::Playing, PlaybackState::Paused) => sink.set_paused(true),
            (PlaybackState::Paused, PlaybackState::Playing) => sink.set_paused(false),
            _ => {}
        }
        if seeked {
            sink.discard_pending();
        }
        seeked
    }

    /// Apply one command to the session state
    ///
    /// Returns `true` if the command moved the playback position.
    pub fn handle_command(&mut self, command: Command) -> bool {
        if self.state == PlaybackState::Stopped {
            return false;
        }
        debug!("Command {:?} at block {}", command, self.block_index);

        match command {
            Command::Pause => {
                if self.state == PlaybackState::Playing {
                    self.state = PlaybackState::Paused;
                }
                false
            }
            Command::Resume => {
                if self.state == PlaybackState::Paused {
                    self.state = PlaybackState::Playing;
                }
                false
            }
            Command::Stop => {
                self.state = PlaybackState::Stopped;
                false
            }
            Command::Rewind => match self.block_index.checked_sub(1) {
                Some(block) => self.seek(block),
                None => false,
            },
            Command::FastForward => {
                let block = self.block_index + 1;
                block < self.index.len() && self.seek(block)
            }
            Command::Jump(block) => {
                if block < self.index.len() {
                    self.seek(block)
                } else {
                    debug!(
                        "Ignoring jump to block {} ({} blocks on tape)",
                        block,
                        self.index.len()
                    );
                    false
                }
            }
        }
    }

    fn seek(&mut self, block: usize) -> bool {
        let Some(chunk_index) = self.index.chunk_index(block) else {
            return false;
        };
        self.block_index = block;
        self.chunk_index = chunk_index;
        self.sample_offset = 0;
        self.publish();
        true
    }

    fn publish(&self) {
        self.observer
            .publish(BlockPosition::new(self.block_index, self.index.len()));
    }

    /// Current position and state
    pub fn position(&self) -> PlaybackPosition {
        PlaybackPosition {
            chunk_index: self.chunk_index,
            sample_offset: self.sample_offset,
            block_index: self.block_index,
            state: self.state,
        }
    }

    /// Data block positions of the tape being played
    pub fn block_index(&self) -> &BlockIndex {
        &self.index
    }
}
