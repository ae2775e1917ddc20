//! Drawable primitives.
//!
//! Each shape computes its occupied cells from scratch on every render,
//! centered on its truncated position, draws them and stores them as `coords`.

use std::collections::HashSet;
use std::f64::consts::TAU;

use crate::object::{Body, Entity};
use crate::screen::Screen;
use crate::types::{cell_of, Cell};
use crate::{body_builders, entity_body};

/// Draw `cells` with the body's color and make them the body's coords.
pub fn stamp(screen: &mut Screen, body: &mut Body, cells: HashSet<Cell>, ch: char) {
    for &cell in &cells {
        screen.put(cell, ch, body.color);
    }
    body.coords = cells;
}

/// Ellipse outline, twice as wide as tall to offset terminal cell aspect.
pub fn circle_cells(center: Cell, radius: f64) -> HashSet<Cell> {
    let (cx, cy) = center;
    if radius < 0.5 {
        return HashSet::from([center]);
    }
    let steps = ((8.0 * radius).ceil() as usize).max(8);
    (0..steps)
        .map(|k| {
            let angle = TAU * k as f64 / steps as f64;
            let dx = (radius * angle.cos()).round() as i32;
            let dy = (radius / 2.0 * angle.sin()).round() as i32;
            (cx + dx, cy + dy)
        })
        .collect()
}

pub fn square_cells(center: Cell, size: f64, solid: bool) -> HashSet<Cell> {
    let (cx, cy) = center;
    let hw = size.round() as i32;
    let hh = (size / 2.0).round() as i32;
    let mut cells = HashSet::new();
    for dy in -hh..=hh {
        for dx in -hw..=hw {
            if solid || dy.abs() == hh || dx.abs() == hw {
                cells.insert((cx + dx, cy + dy));
            }
        }
    }
    cells
}

pub fn diamond_cells(center: Cell, size: f64, solid: bool) -> HashSet<Cell> {
    let (cx, cy) = center;
    let hh = ((size / 2.0).round() as i32).max(1);
    let mut cells = HashSet::new();
    for dy in -hh..=hh {
        let w = (hh - dy.abs()) * 2;
        if solid {
            cells.extend((-w..=w).map(|dx| (cx + dx, cy + dy)));
        } else {
            cells.insert((cx - w, cy + dy));
            cells.insert((cx + w, cy + dy));
        }
    }
    cells
}

/// Apex up, flat base.
pub fn triangle_cells(center: Cell, size: f64, solid: bool) -> HashSet<Cell> {
    let (cx, cy) = center;
    let h = ((size / 2.0).round() as i32).max(1);
    let mut cells = HashSet::new();
    for dy in -h..=h {
        let w = dy + h;
        if solid || dy == h {
            cells.extend((-w..=w).map(|dx| (cx + dx, cy + dy)));
        } else {
            cells.insert((cx - w, cy + dy));
            cells.insert((cx + w, cy + dy));
        }
    }
    cells
}

pub fn bar_cells(center: Cell, size: f64) -> HashSet<Cell> {
    let (cx, cy) = center;
    let hw = size.round() as i32;
    (-hw..=hw).map(|dx| (cx + dx, cy)).collect()
}

macro_rules! shape {
    ($(#[$meta:meta])* $name:ident, $glyph:expr, $cells:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            body: Body,
            pub ch: char,
            pub solid: bool,
        }

        impl $name {
            pub fn new(x: f64, y: f64) -> Self {
                Self {
                    body: Body::new(x, y),
                    ch: $glyph,
                    solid: false,
                }
            }

            pub fn with_char(mut self, ch: char) -> Self {
                self.ch = ch;
                self
            }

            pub fn solid(mut self) -> Self {
                self.solid = true;
                self
            }

            pub fn cells(&self) -> HashSet<Cell> {
                let f: fn(Cell, f64, bool) -> HashSet<Cell> = $cells;
                f(self.body.cell(), self.body.size, self.solid)
            }

            body_builders!();
        }

        impl Entity for $name {
            entity_body!();

            fn render(&mut self, screen: &mut Screen) {
                self.advance(screen);
                let cells = self.cells();
                stamp(screen, &mut self.body, cells, self.ch);
            }
        }
    };
}

shape!(
    /// Ellipse ring; `size` is the horizontal radius.
    Circle,
    'O',
    |c, size, _| circle_cells(c, size)
);
shape!(Square, '#', square_cells);
shape!(Diamond, '#', diamond_cells);
shape!(Triangle, '^', triangle_cells);
shape!(
    /// Horizontal line, e.g. a paddle.
    Bar,
    '=',
    |c, size, _| bar_cells(c, size)
);

/// One cell. A `None` glyph occupies its cell without drawing.
#[derive(Debug, Clone)]
pub struct Char {
    body: Body,
    pub ch: Option<char>,
}

impl Char {
    pub fn new(x: f64, y: f64, ch: Option<char>) -> Self {
        Self {
            body: Body::new(x, y),
            ch,
        }
    }

    body_builders!();
}

impl Entity for Char {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        let cell = self.body.cell();
        if let Some(ch) = self.ch {
            screen.put(cell, ch, self.body.color);
        }
        self.body.coords = HashSet::from([cell]);
    }
}

/// A line of text starting at its position. Spaces stay transparent.
#[derive(Debug, Clone)]
pub struct Text {
    body: Body,
    pub text: String,
}

impl Text {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            body: Body::new(x, y),
            text: text.into(),
        }
    }

    /// Text whose middle sits at `x`.
    pub fn centered(x: f64, y: f64, text: impl Into<String>) -> Self {
        let text = text.into();
        let half = text.chars().count() as f64 / 2.0;
        Self::new(x - half, y, text)
    }

    body_builders!();

    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn cells_and_glyphs(&self) -> Vec<(Cell, char)> {
        let (x, y) = cell_of(self.body.x, self.body.y);
        self.text
            .chars()
            .enumerate()
            .filter(|(_, ch)| *ch != ' ')
            .map(|(i, ch)| ((x + i as i32, y), ch))
            .collect()
    }
}

impl Entity for Text {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        let glyphs = self.cells_and_glyphs();
        for &(cell, ch) in &glyphs {
            screen.put(cell, ch, self.body.color);
        }
        self.body.coords = glyphs.into_iter().map(|(cell, _)| cell).collect();
    }

    fn is_out(&self) -> bool {
        let Some(b) = self.body.bounds() else {
            return false;
        };
        let w = self.width() as f64;
        self.body.x + w < 0.0
            || self.body.x >= b.width as f64
            || self.body.y < 0.0
            || self.body.y >= b.height as f64
    }
}

/// Text that reverses direction whenever it would leave the screen.
#[derive(Debug, Clone)]
pub struct BouncyText {
    text: Text,
}

impl BouncyText {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            text: Text::new(x, y, text),
        }
    }

    pub fn with_color(mut self, color: crate::types::Color) -> Self {
        self.text = self.text.with_color(color);
        self
    }

    pub fn with_velocity(mut self, x_delta: f64, y_delta: f64) -> Self {
        self.text = self.text.with_velocity(x_delta, y_delta);
        self
    }

    fn bounce(&mut self, screen: &Screen) {
        let w = self.text.width() as f64;
        let body = &mut self.text.body;
        let next_x = body.x + body.x_delta;
        // Keep clear of the border.
        if next_x < 1.0 || next_x + w > screen.width() as f64 - 1.0 {
            body.x_delta = -body.x_delta;
        }
        let next_y = body.y + body.y_delta;
        if next_y < 1.0 || next_y >= screen.height() as f64 - 1.0 {
            body.y_delta = -body.y_delta;
        }
    }
}

impl Entity for BouncyText {
    fn body(&self) -> &Body {
        &self.text.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.text.body
    }

    fn render(&mut self, screen: &mut Screen) {
        self.bounce(screen);
        self.text.render(screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::object::handle;
    use crate::types::Color;

    #[test]
    fn radius_two_circle_is_an_eight_cell_ring() {
        let expected: HashSet<Cell> = [
            (12, 10),
            (11, 11),
            (10, 11),
            (9, 11),
            (8, 10),
            (9, 9),
            (10, 9),
            (11, 9),
        ]
        .into_iter()
        .collect();
        assert_eq!(circle_cells((10, 10), 2.0), expected);
    }

    #[test]
    fn tiny_circle_is_its_center() {
        assert_eq!(circle_cells((3, 4), 0.2), HashSet::from([(3, 4)]));
    }

    #[test]
    fn square_outline_and_fill() {
        let outline = square_cells((5, 5), 2.0, false);
        let solid = square_cells((5, 5), 2.0, true);
        // 5 wide, 3 tall
        assert_eq!(solid.len(), 15);
        assert_eq!(outline.len(), 12);
        assert!(!outline.contains(&(5, 5)));
        assert!(solid.contains(&(5, 5)));
    }

    #[test]
    fn bar_spans_both_sides() {
        let bar = bar_cells((5, 2), 2.0);
        assert_eq!(bar.len(), 5);
        assert!(bar.contains(&(3, 2)) && bar.contains(&(7, 2)));
    }

    #[test]
    fn triangle_has_flat_base() {
        let t = triangle_cells((10, 10), 2.0, false);
        // h = 1: apex row w=0, middle w=1, base w=2 all filled
        assert!(t.contains(&(10, 9)));
        assert!(t.contains(&(9, 10)) && t.contains(&(11, 10)));
        assert_eq!((8..=12).filter(|x| t.contains(&(*x, 11))).count(), 5);
    }

    #[test]
    fn rendered_circle_fills_exactly_its_coords() {
        let (mut screen, _, _) = Screen::headless(30, 20, &EngineConfig::default());
        let circle = handle(Circle::new(10.0, 10.0).with_size(2.0).with_color(Color::Red));
        screen.add(circle.clone());
        screen.render().unwrap();

        let coords = circle.borrow().body().coords.clone();
        assert_eq!(coords, circle_cells((10, 10), 2.0));
        let drawn: HashSet<Cell> = screen
            .buffer()
            .committed_cells()
            .into_iter()
            .filter(|(_, g)| g.ch != ' ')
            .map(|(cell, g)| {
                assert_eq!(g.color, Some(Color::Red));
                cell
            })
            .collect();
        assert_eq!(drawn, coords);
    }

    #[test]
    fn text_skips_spaces() {
        let (mut screen, _, _) = Screen::headless(30, 5, &EngineConfig::default());
        let text = handle(Text::new(2.0, 1.0, "a b"));
        screen.add(text.clone());
        screen.render().unwrap();
        let coords = text.borrow().body().coords.clone();
        assert_eq!(coords, HashSet::from([(2, 1), (4, 1)]));
    }

    #[test]
    fn bouncy_text_turns_at_the_edge() {
        let (mut screen, _, _) = Screen::headless(10, 5, &EngineConfig::default());
        let text = handle(BouncyText::new(6.0, 2.0, "ab").with_velocity(1.0, 0.0));
        screen.add(text.clone());
        screen.render().unwrap();
        screen.render().unwrap();
        assert!(text.borrow().body().x_delta < 0.0);
        assert!(screen.contains(&(text.clone() as crate::object::Handle)));
    }
}
