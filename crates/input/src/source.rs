//! Non-blocking raw key sources.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::map::is_interrupt;

/// Yields the next queued raw key, or `None` immediately when nothing waits.
pub trait InputSource {
    fn next_key(&mut self) -> Option<KeyCode>;

    /// Set once the user asked to interrupt the process (Ctrl+C).
    fn interrupted(&self) -> bool {
        false
    }
}

/// Reads the terminal through crossterm without blocking.
#[derive(Debug, Default)]
pub struct TerminalInput {
    interrupted: bool,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for TerminalInput {
    fn next_key(&mut self) -> Option<KeyCode> {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => {
                    log::warn!("input poll failed: {err}");
                    return None;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    if is_interrupt(key) {
                        self.interrupted = true;
                        return None;
                    }
                    return Some(key.code);
                }
                // Resize and mouse events are picked up elsewhere.
                Ok(_) => continue,
                Err(err) => {
                    log::warn!("input read failed: {err}");
                    return None;
                }
            }
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupted
    }
}

/// Scripted key queue for headless runs.
///
/// Clones share the queue, so a test can keep pushing keys after handing a
/// clone to a screen.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: Rc<RefCell<VecDeque<KeyCode>>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, key: KeyCode) {
        self.queue.borrow_mut().push_back(key);
    }

    pub fn extend(&self, keys: impl IntoIterator<Item = KeyCode>) {
        self.queue.borrow_mut().extend(keys);
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn next_key(&mut self) -> Option<KeyCode> {
        self.queue.borrow_mut().pop_front()
    }
}
