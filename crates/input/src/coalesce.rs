//! Burst coalescing and idle release detection.
//!
//! Terminals deliver held keys as a stream of repeats. The game loop reads one
//! discrete key per tick, so every tick drains whatever queued up and keeps
//! only the distinct keys, in arrival order. A held arrow therefore arrives
//! once per tick for as long as it stays the newest input, instead of piling
//! up as lag.
//!
//! Terminals rarely report key release, so "released" is synthesised after a
//! period with no input.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::KeyCode;

use crate::map::{decode, InputEvent};
use crate::types::KEY_RELEASE_MS;

/// Events produced by one tick: at most the raw press and its translation,
/// or a single release.
pub type TickEvents = ArrayVec<InputEvent, 2>;

#[derive(Debug, Clone)]
pub struct KeyCoalescer {
    pending: VecDeque<KeyCode>,
    last_key_time: Option<Instant>,
    release_after: Duration,
}

impl KeyCoalescer {
    pub fn new() -> Self {
        Self::with_release_after(Duration::from_millis(KEY_RELEASE_MS))
    }

    pub fn with_release_after(release_after: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            last_key_time: None,
            release_after,
        }
    }

    pub fn release_after(&self) -> Duration {
        self.release_after
    }

    /// Drain every queued key from `next_key` and return this tick's events.
    pub fn poll(
        &mut self,
        mut next_key: impl FnMut() -> Option<KeyCode>,
        now: Instant,
    ) -> TickEvents {
        while let Some(key) = next_key() {
            if !self.pending.contains(&key) {
                self.pending.push_back(key);
            }
        }

        let mut events = TickEvents::new();
        match self.pending.pop_front() {
            Some(key) => {
                self.last_key_time = Some(now);
                events.push(InputEvent::Pressed(key));
                if let Some(event) = decode(key) {
                    events.push(event);
                }
            }
            None => {
                let idle = self
                    .last_key_time
                    .map(|t| now.saturating_duration_since(t) > self.release_after)
                    .unwrap_or(false);
                if idle {
                    events.push(InputEvent::Released);
                }
            }
        }
        events
    }

    /// Drop queued keys, e.g. on scene change.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for KeyCoalescer {
    fn default() -> Self {
        Self::new()
    }
}
