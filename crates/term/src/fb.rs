//! Double-buffered character grid.
//!
//! `ScreenBuffer` keeps the frame last committed to the terminal ("screen") and
//! the frame being composed ("buffer"). [`ScreenBuffer::render`] writes only the
//! cells that differ between the two.

use std::io;

use crate::target::RenderTarget;
use crate::types::Color;

/// Placeholder written into a cell before it is blanked.
///
/// Some terminals leave stale glyphs behind when a cell is only overwritten
/// with a space, so blanking is a two step write.
pub const BLANK_PLACEHOLDER: char = '.';

/// A drawn glyph. `color: None` means the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub color: Option<Color>,
}

impl Glyph {
    pub const fn new(ch: char, color: Option<Color>) -> Self {
        Self { ch, color }
    }
}

/// A grid slot: `None` is blank.
pub type Slot = Option<Glyph>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenBuffer {
    width: u16,
    height: u16,
    screen: Vec<Slot>,
    buffer: Vec<Slot>,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            screen: vec![None; len],
            buffer: vec![None; len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline(always)]
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Write into the pending frame at the truncated position.
    ///
    /// Out-of-range writes are dropped.
    pub fn draw(&mut self, x: f64, y: f64, ch: char, color: Option<Color>) {
        self.put(x.trunc() as i32, y.trunc() as i32, ch, color);
    }

    pub fn put(&mut self, x: i32, y: i32, ch: char, color: Option<Color>) {
        if let Some(i) = self.idx(x, y) {
            self.buffer[i] = Some(Glyph::new(ch, color));
        }
    }

    /// Pending (not yet rendered) content of a cell.
    pub fn pending(&self, x: i32, y: i32) -> Slot {
        self.idx(x, y).and_then(|i| self.buffer[i])
    }

    /// Content of a cell as last committed to the target.
    pub fn committed(&self, x: i32, y: i32) -> Slot {
        self.idx(x, y).and_then(|i| self.screen[i])
    }

    /// Non-blank committed cells in row-major order.
    pub fn committed_cells(&self) -> Vec<((i32, i32), Glyph)> {
        self.screen
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.map(|g| {
                    let x = (i % self.width as usize) as i32;
                    let y = (i / self.width as usize) as i32;
                    ((x, y), g)
                })
            })
            .collect()
    }

    /// Reset the pending frame to all blank.
    pub fn clear(&mut self) {
        self.buffer.fill(None);
    }

    /// Flush changed cells to `target` and commit the pending frame.
    ///
    /// Returns the number of cells that changed.
    pub fn render(&mut self, target: &mut dyn RenderTarget) -> io::Result<usize> {
        let mut blanks = Vec::new();
        let mut changed = 0;

        for_each_changed_run(&self.screen, &self.buffer, self.width, |x, y, len| {
            for dx in 0..len {
                let i = (y as usize) * (self.width as usize) + (x + dx) as usize;
                let slot = self.buffer[i];
                match slot {
                    Some(glyph) => target.put(x + dx, y, glyph)?,
                    None => {
                        target.put(x + dx, y, Glyph::new(BLANK_PLACEHOLDER, None))?;
                        blanks.push((x + dx, y));
                    }
                }
                changed += 1;
            }
            Ok(())
        })?;

        self.screen.copy_from_slice(&self.buffer);
        target.flush()?;

        if !blanks.is_empty() {
            for (x, y) in blanks {
                target.put(x, y, Glyph::new(' ', None))?;
            }
            target.flush()?;
        }

        Ok(changed)
    }
}

fn for_each_changed_run(
    prev: &[Slot],
    next: &[Slot],
    width: u16,
    mut f: impl FnMut(u16, u16, u16) -> io::Result<()>,
) -> io::Result<()> {
    if width == 0 {
        return Ok(());
    }
    let w = width as usize;
    let h = next.len() / w;

    for y in 0..h {
        let row = y * w;
        let mut x = 0;
        while x < w {
            if prev[row + x] == next[row + x] {
                x += 1;
                continue;
            }

            let start = x;
            x += 1;
            while x < w && prev[row + x] != next[row + x] {
                x += 1;
            }
            f(start as u16, y as u16, (x - start) as u16)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::RecordingTarget;

    #[test]
    fn out_of_range_draws_are_dropped() {
        let mut fb = ScreenBuffer::new(4, 3);
        fb.draw(-1.0, 0.0, 'x', None);
        fb.draw(4.0, 0.0, 'x', None);
        fb.draw(0.0, 3.0, 'x', None);
        fb.draw(1.9, 2.2, 'y', None);
        assert_eq!(fb.pending(1, 2), Some(Glyph::new('y', None)));
        assert_eq!(
            fb.buffer.iter().filter(|s| s.is_some()).count(),
            1,
            "only the in-range write lands"
        );
    }

    #[test]
    fn same_frame_twice_writes_nothing_the_second_time() {
        let mut fb = ScreenBuffer::new(10, 2);
        let mut target = RecordingTarget::new(10, 2);

        fb.put(1, 1, 'A', Some(Color::Red));
        fb.put(2, 1, 'B', None);
        assert_eq!(fb.render(&mut target).unwrap(), 2);
        assert_eq!(target.writes().len(), 2);

        target.take_writes();
        fb.clear();
        fb.put(1, 1, 'A', Some(Color::Red));
        fb.put(2, 1, 'B', None);
        assert_eq!(fb.render(&mut target).unwrap(), 0);
        assert!(target.writes().is_empty());
    }

    #[test]
    fn cleared_cells_are_blanked_with_placeholder_first() {
        let mut fb = ScreenBuffer::new(3, 1);
        let mut target = RecordingTarget::new(3, 1);

        fb.put(0, 0, 'Z', None);
        fb.render(&mut target).unwrap();
        target.take_writes();

        fb.clear();
        assert_eq!(fb.render(&mut target).unwrap(), 1);
        let chars: Vec<char> = target.writes().iter().map(|w| w.glyph.ch).collect();
        assert_eq!(chars, vec![BLANK_PLACEHOLDER, ' ']);
        assert_eq!(fb.committed(0, 0), None);
    }

    #[test]
    fn changed_run_iterator_coalesces_adjacent_cells() {
        let a = vec![None; 5];
        let mut b = vec![None; 5];
        for slot in b.iter_mut().take(4).skip(1) {
            *slot = Some(Glyph::new('X', None));
        }

        let mut runs = Vec::new();
        for_each_changed_run(&a, &b, 5, |x, y, len| {
            runs.push((x, y, len));
            Ok(())
        })
        .unwrap();
        assert_eq!(runs, vec![(1, 0, 3)]);
    }
}
