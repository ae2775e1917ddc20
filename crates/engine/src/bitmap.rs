//! Multi-line glyph art, optionally animated and mirrored.

use std::collections::{HashMap, HashSet};

use crate::object::{Body, Entity};
use crate::screen::Screen;
use crate::types::Cell;
use crate::{body_builders, entity_body};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Position is the middle of the art.
    #[default]
    Center,
    /// Position is the first cell of the first row.
    TopLeft,
}

type Grid = Vec<Vec<char>>;

/// Mirror counterpart of a direction-sensitive glyph.
pub fn mirror(ch: char) -> char {
    match ch {
        '/' => '\\',
        '\\' => '/',
        '(' => ')',
        ')' => '(',
        '<' => '>',
        '>' => '<',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '←' => '→',
        '→' => '←',
        other => other,
    }
}

fn parse(art: &str) -> Grid {
    let mut rows: Vec<&str> = art.lines().collect();
    while rows.first().is_some_and(|r| r.trim().is_empty()) {
        rows.remove(0);
    }
    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    rows.into_iter()
        .map(|r| r.trim_end().chars().collect())
        .collect()
}

fn dims(grid: &Grid) -> (i32, i32) {
    let w = grid.iter().map(Vec::len).max().unwrap_or(0) as i32;
    (w, grid.len() as i32)
}

#[derive(Debug, Clone)]
pub struct Bitmap {
    body: Body,
    variants: Vec<Grid>,
    /// Renders each variant stays on screen.
    pub rate: u32,
    pub flipped: bool,
    pub anchor: Anchor,
    /// Expire after the last variant instead of looping.
    pub once: bool,
    /// Replaces [`mirror`] when set; glyphs missing from it are kept as is.
    mirror_map: Option<HashMap<char, char>>,
    variant: usize,
    ticks: u32,
}

impl Bitmap {
    pub fn new(x: f64, y: f64, art: &str) -> Self {
        Self::animated(x, y, &[art], 1)
    }

    pub fn animated(x: f64, y: f64, variants: &[&str], rate: u32) -> Self {
        let mut variants: Vec<Grid> = variants.iter().map(|v| parse(v)).collect();
        if variants.is_empty() {
            variants.push(Grid::new());
        }
        let mut bitmap = Self {
            body: Body::new(x, y),
            variants,
            rate: rate.max(1),
            flipped: false,
            anchor: Anchor::Center,
            once: false,
            mirror_map: None,
            variant: 0,
            ticks: 0,
        };
        bitmap.body.size = bitmap.extent_size();
        bitmap
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    /// Substitute glyphs with `map` when flipped, instead of the default pairs.
    pub fn with_mirror_map(mut self, map: HashMap<char, char>) -> Self {
        self.mirror_map = Some(map);
        self
    }

    fn mirrored(&self, ch: char) -> char {
        match &self.mirror_map {
            Some(map) => map.get(&ch).copied().unwrap_or(ch),
            None => mirror(ch),
        }
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    body_builders!();

    pub fn variant(&self) -> usize {
        self.variant
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Width and height of the current variant.
    pub fn dims(&self) -> (i32, i32) {
        dims(&self.variants[self.variant])
    }

    fn extent_size(&self) -> f64 {
        let (w, h) = self
            .variants
            .iter()
            .map(dims)
            .fold((0, 0), |(w, h), (vw, vh)| (w.max(vw), h.max(vh)));
        (w.max(h) as f64 / 2.0).ceil().max(1.0)
    }

    /// Occupied cells and their glyphs for the current variant.
    pub fn glyphs(&self) -> Vec<(Cell, char)> {
        let grid = &self.variants[self.variant];
        let (w, h) = dims(grid);
        let (x, y) = self.body.cell();
        let (x0, y0) = match self.anchor {
            Anchor::Center => (x - w / 2, y - h / 2),
            Anchor::TopLeft => (x, y),
        };

        let mut out = Vec::new();
        for (r, row) in grid.iter().enumerate() {
            for (c, &ch) in row.iter().enumerate() {
                if ch == ' ' {
                    continue;
                }
                let (col, ch) = if self.flipped {
                    (w - 1 - c as i32, self.mirrored(ch))
                } else {
                    (c as i32, ch)
                };
                out.push(((x0 + col, y0 + r as i32), ch));
            }
        }
        out
    }

    fn step_animation(&mut self) {
        self.ticks += 1;
        if self.ticks < self.rate {
            return;
        }
        self.ticks = 0;
        if self.variant + 1 < self.variants.len() {
            self.variant += 1;
        } else if self.once {
            self.body.expired = true;
        } else {
            self.variant = 0;
        }
    }
}

impl Entity for Bitmap {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        let glyphs = self.glyphs();
        let mut coords = HashSet::with_capacity(glyphs.len());
        for (cell, ch) in glyphs {
            screen.put(cell, ch, self.body.color);
            coords.insert(cell);
        }
        self.body.coords = coords;
        self.step_animation();
    }
}
