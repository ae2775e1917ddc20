//! Render targets: where a [`ScreenBuffer`](crate::fb::ScreenBuffer) flushes to.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::fb::Glyph;

/// A position-addressed glyph sink.
pub trait RenderTarget {
    /// Current size of the drawable area.
    fn size(&self) -> io::Result<(u16, u16)>;

    fn put(&mut self, x: u16, y: u16, glyph: Glyph) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Wipe whatever the target currently shows.
    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded {
    pub x: u16,
    pub y: u16,
    pub glyph: Glyph,
}

#[derive(Debug, Default)]
struct Recording {
    size: (u16, u16),
    writes: Vec<Recorded>,
    flushes: usize,
    clears: usize,
    fail_next_flush: bool,
    fail_next_size: bool,
}

/// Headless target that records every write.
///
/// Clones share the same recording, so a test can keep a clone after handing
/// the target to a screen.
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingTarget {
    pub fn new(width: u16, height: u16) -> Self {
        let target = Self::default();
        target.inner.borrow_mut().size = (width, height);
        target
    }

    /// Change the reported size, as if the terminal was resized.
    pub fn set_size(&self, width: u16, height: u16) {
        self.inner.borrow_mut().size = (width, height);
    }

    pub fn writes(&self) -> Vec<Recorded> {
        self.inner.borrow().writes.clone()
    }

    pub fn take_writes(&self) -> Vec<Recorded> {
        std::mem::take(&mut self.inner.borrow_mut().writes)
    }

    pub fn flushes(&self) -> usize {
        self.inner.borrow().flushes
    }

    pub fn clears(&self) -> usize {
        self.inner.borrow().clears
    }

    /// Make the next size query fail with an I/O error.
    pub fn fail_next_size(&self) {
        self.inner.borrow_mut().fail_next_size = true;
    }

    /// Make the next flush fail with an I/O error.
    pub fn fail_next_flush(&self) {
        self.inner.borrow_mut().fail_next_flush = true;
    }
}

impl RenderTarget for RecordingTarget {
    fn size(&self) -> io::Result<(u16, u16)> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_next_size {
            inner.fail_next_size = false;
            return Err(io::Error::new(io::ErrorKind::Other, "size unavailable"));
        }
        Ok(inner.size)
    }

    fn put(&mut self, x: u16, y: u16, glyph: Glyph) -> io::Result<()> {
        self.inner.borrow_mut().writes.push(Recorded { x, y, glyph });
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_next_flush {
            inner.fail_next_flush = false;
            return Err(io::Error::new(io::ErrorKind::Other, "target went away"));
        }
        inner.flushes += 1;
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.inner.borrow_mut().clears += 1;
        Ok(())
    }
}
