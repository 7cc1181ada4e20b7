//! File-based Command/Status Transport
//!
//! Lets a front-end that only speaks files drive the player:
//! - [`ControlFilePoller`] watches a control file, forwards its token to a
//!   [`CommandChannel`] and deletes it
//! - [`StatusFiles`] mirrors every published [`BlockPosition`] into
//!   `current_block.txt`, `total_blocks.txt` and `next_block.txt`

use crate::player::{BlockPosition, CommandChannel, PositionObserver};
use crate::Result;
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Control file poll period
pub const CONTROL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default control file name inside the temp directory
pub const CONTROL_FILE_NAME: &str = "uef_control.txt";

/// Status file holding the current block number
pub const CURRENT_BLOCK_FILE: &str = "current_block.txt";
/// Status file holding the number of data blocks
pub const TOTAL_BLOCKS_FILE: &str = "total_blocks.txt";
/// Status file holding the fast-forward target
pub const NEXT_BLOCK_FILE: &str = "next_block.txt";

/// Consume the control file if present
///
/// Returns the trimmed, lowercased token. An empty file is consumed and
/// yields `None`.
pub fn take_control_token(path: &Path) -> Option<String> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Failed to read control file {}: {}", path.display(), e);
            return None;
        }
    };
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Failed to remove control file {}: {}", path.display(), e);
    }

    let token = text.trim().to_lowercase();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Background thread feeding a control file into a command channel
pub struct ControlFilePoller {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ControlFilePoller {
    /// Start polling `path` every [`CONTROL_POLL_INTERVAL`]
    pub fn spawn(path: impl Into<PathBuf>, commands: CommandChannel) -> Result<Self> {
        Self::with_interval(path, commands, CONTROL_POLL_INTERVAL)
    }

    /// Start polling `path` at a custom interval
    pub fn with_interval(
        path: impl Into<PathBuf>,
        commands: CommandChannel,
        interval: Duration,
    ) -> Result<Self> {
        let path = path.into();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = std::thread::Builder::new()
            .name("uef-control".into())
            .spawn(move || {
                debug!("Watching control file {}", path.display());
                while flag.load(Ordering::Relaxed) {
                    if let Some(token) = take_control_token(&path) {
                        debug!("Control file command '{}'", token);
                        commands.send(&token);
                    }
                    std::thread::sleep(interval);
                }
            })?;

        Ok(ControlFilePoller {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Control file poller panicked");
            }
        }
    }
}

impl Drop for ControlFilePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Observer writing the block position to three text files
#[derive(Debug, Clone)]
pub struct StatusFiles {
    dir: PathBuf,
}

impl StatusFiles {
    /// Status files live directly in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StatusFiles { dir: dir.into() }
    }

    /// Directory holding the files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, value: usize) {
        let path = self.dir.join(name);
        if let Err(e) = std::fs::write(&path, value.to_string()) {
            warn!("Failed to write status file {}: {}", path.display(), e);
        }
    }
}

impl PositionObserver for StatusFiles {
    fn publish(&self, position: BlockPosition) {
        self.write(CURRENT_BLOCK_FILE, position.current_block);
        self.write(TOTAL_BLOCKS_FILE, position.total_blocks);
        self.write(NEXT_BLOCK_FILE, position.next_block);
    }
}
