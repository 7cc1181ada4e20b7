//! Operator commands and the channel delivering them

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

/// Operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop streaming, keep position
    Pause,
    /// Continue after a pause
    Resume,
    /// End the session
    Stop,
    /// Seek to the previous data block
    Rewind,
    /// Seek to the next data block
    FastForward,
    /// Seek to a data block by number
    Jump(usize),
}

impl Command {
    /// Parse a textual command token
    ///
    /// Tokens are case-insensitive and surrounding whitespace is ignored.
    /// `jump:N` needs a non-negative integer; anything else yields `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        match token.as_str() {
            "pause" => Some(Command::Pause),
            "resume" => Some(Command::Resume),
            "stop" => Some(Command::Stop),
            "rewind" => Some(Command::Rewind),
            "fastforward" => Some(Command::FastForward),
            other => other
                .strip_prefix("jump:")
                .and_then(|n| n.trim().parse::<usize>().ok())
                .map(Command::Jump),
        }
    }
}

#[derive(Default)]
struct Slot {
    pending: Mutex<Option<String>>,
    ready: Condvar,
}

/// Single-slot command mailbox shared between producers and the player
///
/// Sending replaces any token not yet consumed, so only the latest command
/// is delivered. Tokens are parsed on receipt; a malformed token is consumed
/// and dropped.
#[derive(Clone, Default)]
pub struct CommandChannel {
    slot: Arc<Slot>,
}

impl CommandChannel {
    /// Create an empty channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a command token, overwriting any pending one
    pub fn send(&self, token: &str) {
        let mut pending = self.slot.pending.lock();
        if let Some(dropped) = pending.replace(token.to_string()) {
            log::debug!("Command '{}' superseded by '{}'", dropped, token.trim());
        }
        self.slot.ready.notify_one();
    }

    /// Take the pending command without waiting
    pub fn try_recv(&self) -> Option<Command> {
        let token = self.slot.pending.lock().take()?;
        parse_received(&token)
    }

    /// Take the pending command, waiting up to `timeout` for one to arrive
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Command> {
        let mut pending = self.slot.pending.lock();
        if pending.is_none() {
            self.slot.ready.wait_for(&mut pending, timeout);
        }
        let token = pending.take()?;
        drop(pending);
        parse_received(&token)
    }
}

fn parse_received(token: &str) -> Option<Command> {
    let command = Command::parse(token);
    if command.is_none() {
        log::debug!("Ignoring unrecognised command '{}'", token.trim());
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_parse_tokens() {
        assert_eq!(Command::parse("pause"), Some(Command::Pause));
        assert_eq!(Command::parse("  RESUME\n"), Some(Command::Resume));
        assert_eq!(Command::parse("Stop"), Some(Command::Stop));
        assert_eq!(Command::parse("rewind"), Some(Command::Rewind));
        assert_eq!(Command::parse("FastForward"), Some(Command::FastForward));
        assert_eq!(Command::parse("jump:12"), Some(Command::Jump(12)));
        assert_eq!(Command::parse("JUMP:0"), Some(Command::Jump(0)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("play"), None);
        assert_eq!(Command::parse("jump:"), None);
        assert_eq!(Command::parse("jump:-1"), None);
        assert_eq!(Command::parse("jump:abc"), None);
        assert_eq!(Command::parse("jump 3"), None);
    }

    #[test]
    fn test_latest_wins() {
        let channel = CommandChannel::new();
        channel.send("pause");
        channel.send("jump:4");
        assert_eq!(channel.try_recv(), Some(Command::Jump(4)));
        assert_eq!(channel.try_recv(), None);
    }

    #[test]
    fn test_malformed_latest_displaces_pending() {
        let channel = CommandChannel::new();
        channel.send("stop");
        channel.send("jump:x");
        assert_eq!(channel.try_recv(), None);
        assert_eq!(channel.recv_timeout(Duration::from_millis(1)), None);
    }

    #[test]
    fn test_recv_timeout_expires() {
        let channel = CommandChannel::new();
        let start = Instant::now();
        assert_eq!(channel.recv_timeout(Duration::from_millis(20)), None);
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_recv_timeout_wakes_on_send() {
        let channel = CommandChannel::new();
        let sender = channel.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            sender.send("resume");
        });

        let start = Instant::now();
        let mut received = None;
        while received.is_none() && start.elapsed() < Duration::from_secs(5) {
            received = channel.recv_timeout(Duration::from_secs(1));
        }
        handle.join().unwrap();
        assert_eq!(received, Some(Command::Resume));
    }
}
