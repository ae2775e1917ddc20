//! The screen-object model.
//!
//! Every entity carries a [`Body`]: real-valued position and velocity, a size,
//! a color, a visibility flag, the set of cells it occupied in the most recent
//! render, and its place in the ownership tree (parent and kids).
//!
//! Entities are shared as [`Handle`]s (`Rc<RefCell<dyn Entity>>`). The
//! [`Screen`] owns the flat live list; a parent's `kids` is a logical grouping
//! used for cascade removal and "me and everything I spawned" collision
//! queries.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::listener::KeyListener;
use crate::screen::Screen;
use crate::types::{cell_of, Cell, Color, Extent};

pub type Handle = Rc<RefCell<dyn Entity>>;
pub type WeakHandle = Weak<RefCell<dyn Entity>>;

/// Wrap an entity into a typed handle. It coerces into a [`Handle`] wherever
/// one is expected, while the caller keeps typed access.
pub fn handle<E: Entity>(entity: E) -> Rc<RefCell<E>> {
    Rc::new(RefCell::new(entity))
}

/// Identity comparison of two handles.
pub fn same(a: &Handle, b: &Handle) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

#[derive(Clone)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub x_delta: f64,
    pub y_delta: f64,
    pub size: f64,
    pub color: Option<Color>,
    pub visible: bool,
    /// Cells occupied in the most recent render. Empty before the first one.
    pub coords: HashSet<Cell>,
    pub kids: Vec<Handle>,
    pub parent: Option<WeakHandle>,
    /// Remove from the screen at the end of this frame.
    pub expired: bool,
    /// Exempt from out-of-bounds culling.
    pub protected: bool,
    bounds: Option<Extent>,
    me: Option<WeakHandle>,
}

impl Body {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            x_delta: 0.0,
            y_delta: 0.0,
            size: 1.0,
            color: None,
            visible: true,
            coords: HashSet::new(),
            kids: Vec::new(),
            parent: None,
            expired: false,
            protected: false,
            bounds: None,
            me: None,
        }
    }

    /// Screen extent seen on the last render, `None` before the first one.
    pub fn bounds(&self) -> Option<Extent> {
        self.bounds
    }

    /// The handle this body lives in, once it has been added to a screen.
    pub fn me(&self) -> Option<WeakHandle> {
        self.me.clone()
    }

    pub(crate) fn set_me(&mut self, me: WeakHandle) {
        self.me = Some(me);
    }

    /// Apply velocity and record the screen extent.
    pub fn advance(&mut self, bounds: Extent, move_x: bool, move_y: bool) {
        if move_x {
            self.x += self.x_delta;
        }
        if move_y {
            self.y += self.y_delta;
        }
        self.bounds = Some(bounds);
    }

    pub fn cell(&self) -> Cell {
        cell_of(self.x, self.y)
    }

    /// True when position ± size lies entirely outside the last seen extent.
    pub fn is_out(&self) -> bool {
        let Some(b) = self.bounds else {
            return false;
        };
        self.x + self.size < 0.0
            || self.x - self.size >= b.width as f64
            || self.y + self.size < 0.0
            || self.y - self.size >= b.height as f64
    }

    /// Hide and stop occupying cells in the same frame.
    pub fn hide(&mut self) {
        self.visible = false;
        self.coords.clear();
    }

    /// Copy position, and unless `location_only`, velocity, size, color,
    /// visibility and coords.
    pub fn sync(&mut self, other: &Body, location_only: bool) {
        self.x = other.x;
        self.y = other.y;
        if location_only {
            return;
        }
        self.x_delta = other.x_delta;
        self.y_delta = other.y_delta;
        self.size = other.size;
        self.color = other.color;
        self.visible = other.visible;
        self.coords = other.coords.clone();
    }

    pub fn has_kid(&self, kid: &Handle) -> bool {
        self.kids.iter().any(|k| same(k, kid))
    }

    pub fn add_kid(&mut self, kid: Handle) {
        if !self.has_kid(&kid) {
            self.kids.push(kid);
        }
    }

    pub fn remove_kid(&mut self, kid: &Handle) -> bool {
        let before = self.kids.len();
        self.kids.retain(|k| !same(k, kid));
        self.kids.len() != before
    }

    pub fn replace_kid(&mut self, old: &Handle, new: Handle) {
        match self.kids.iter().position(|k| same(k, old)) {
            Some(i) => self.kids[i] = new,
            None => self.add_kid(new),
        }
    }

    /// Every descendant, depth first.
    pub fn all_kids(&self) -> Vec<Handle> {
        let mut out = Vec::new();
        collect_kids(&self.kids, &mut out);
        out
    }

    /// Cells occupied by this body and all of its descendants.
    pub fn all_coords(&self) -> HashSet<Cell> {
        let mut coords = self.coords.clone();
        for kid in self.all_kids() {
            if let Ok(k) = kid.try_borrow() {
                coords.extend(k.body().coords.iter().copied());
            }
        }
        coords
    }
}

fn collect_kids(kids: &[Handle], out: &mut Vec<Handle>) {
    for kid in kids {
        out.push(kid.clone());
        // A kid that is mid-render cannot be walked; its subtree is skipped.
        if let Ok(k) = kid.try_borrow() {
            collect_kids(&k.body().kids, out);
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("x_delta", &self.x_delta)
            .field("y_delta", &self.y_delta)
            .field("size", &self.size)
            .field("color", &self.color)
            .field("visible", &self.visible)
            .field("coords", &self.coords.len())
            .field("kids", &self.kids.len())
            .field("expired", &self.expired)
            .finish()
    }
}

/// A drawable, collidable thing on the screen.
///
/// `render` is called once per frame for every live, visible object and both
/// advances motion and redraws. Implementations call [`Entity::advance`] first
/// and then recompute `coords` from scratch.
pub trait Entity: 'static {
    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
    }

    fn can_move_x(&self, _screen: &Screen) -> bool {
        true
    }

    fn can_move_y(&self, _screen: &Screen) -> bool {
        true
    }

    /// Apply velocity subject to the `can_move_*` guards.
    fn advance(&mut self, screen: &Screen) {
        let move_x = self.can_move_x(screen);
        let move_y = self.can_move_y(screen);
        self.body_mut().advance(screen.extent(), move_x, move_y);
    }

    fn is_out(&self) -> bool {
        self.body().is_out()
    }

    /// Input capability, for entities that react to keys.
    fn listener(&mut self) -> Option<&mut dyn KeyListener> {
        None
    }

    /// Drop every kid and take them off the screen.
    fn reset(&mut self, screen: &mut Screen) {
        let kids = std::mem::take(&mut self.body_mut().kids);
        for kid in &kids {
            screen.remove(kid);
        }
    }

    fn sync(&mut self, other: &dyn Entity, location_only: bool) {
        self.body_mut().sync(other.body(), location_only);
    }

    /// Shallow clone: kids are shared handles, not deep copies.
    fn copy(&self) -> Self
    where
        Self: Sized + Clone,
    {
        self.clone()
    }
}

/// `with_*` builders for types that hold their [`Body`] in a `body` field.
#[macro_export]
macro_rules! body_builders {
    () => {
        pub fn with_size(mut self, size: f64) -> Self {
            self.body.size = size;
            self
        }

        pub fn with_color(mut self, color: $crate::types::Color) -> Self {
            self.body.color = Some(color);
            self
        }

        pub fn with_velocity(mut self, x_delta: f64, y_delta: f64) -> Self {
            self.body.x_delta = x_delta;
            self.body.y_delta = y_delta;
            self
        }

        pub fn with_parent(mut self, parent: Option<$crate::object::WeakHandle>) -> Self {
            self.body.parent = parent;
            self
        }
    };
}

/// `body`/`body_mut` for an [`Entity`] impl whose body is the `body` field.
#[macro_export]
macro_rules! entity_body {
    () => {
        fn body(&self) -> &$crate::object::Body {
            &self.body
        }

        fn body_mut(&mut self) -> &mut $crate::object::Body {
            &mut self.body
        }
    };
}

/// Plain positioned object with no shape of its own.
#[derive(Debug, Clone)]
pub struct Marker {
    body: Body,
}

impl Marker {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            body: Body::new(x, y),
        }
    }

    body_builders!();
}

impl Entity for Marker {
    entity_body!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sync_copies_everything_but_ownership() {
        let mut a = Body::new(0.0, 0.0);
        let mut b = Body::new(4.0, 5.0);
        b.x_delta = 1.0;
        b.size = 3.0;
        b.color = Some(Color::Red);
        b.visible = false;
        b.coords.insert((4, 5));

        a.sync(&b, false);
        assert_eq!((a.x, a.y, a.x_delta, a.size), (4.0, 5.0, 1.0, 3.0));
        assert_eq!(a.color, Some(Color::Red));
        assert!(!a.visible);
        assert_eq!(a.coords, b.coords);
    }

    #[test]
    fn location_sync_only_moves() {
        let mut a = Body::new(0.0, 0.0);
        a.size = 2.0;
        a.color = Some(Color::Blue);
        a.y_delta = -1.0;
        let mut b = Body::new(7.0, 8.0);
        b.size = 9.0;
        b.color = Some(Color::Green);
        b.y_delta = 3.0;

        a.sync(&b, true);
        assert_eq!((a.x, a.y), (7.0, 8.0));
        assert_eq!(a.size, 2.0);
        assert_eq!(a.color, Some(Color::Blue));
        assert_eq!(a.y_delta, -1.0);
    }

    #[test]
    fn not_out_before_first_render() {
        let body = Body::new(-100.0, -100.0);
        assert!(!body.is_out());
    }

    #[test]
    fn out_once_entire_extent_leaves_the_screen() {
        let mut body = Body::new(0.0, 5.0);
        body.size = 2.0;
        body.x_delta = -1.0;
        let extent = Extent::new(10, 10);

        let mut became_out_at = None;
        for frame in 0..10 {
            body.advance(extent, true, true);
            if body.is_out() {
                became_out_at.get_or_insert(frame);
            } else {
                assert!(became_out_at.is_none(), "out must stay out");
            }
        }
        // x = -3 is the first position with x + size < 0
        assert_eq!(became_out_at, Some(2));
    }

    #[test]
    fn kids_are_unique_and_removable() {
        let mut parent = Body::new(0.0, 0.0);
        let kid: Handle = handle(Marker::new(1.0, 1.0));

        parent.add_kid(kid.clone());
        parent.add_kid(kid.clone());
        assert_eq!(parent.kids.len(), 1);

        assert!(parent.remove_kid(&kid));
        assert!(!parent.remove_kid(&kid));
        assert!(parent.kids.is_empty());
    }

    #[test]
    fn replace_kid_swaps_in_place() {
        let mut parent = Body::new(0.0, 0.0);
        let a: Handle = handle(Marker::new(0.0, 0.0));
        let b: Handle = handle(Marker::new(0.0, 0.0));
        let c: Handle = handle(Marker::new(0.0, 0.0));
        parent.add_kid(a.clone());
        parent.add_kid(b.clone());

        parent.replace_kid(&a, c.clone());
        assert!(same(&parent.kids[0], &c));
        assert!(same(&parent.kids[1], &b));
    }

    #[test]
    fn all_kids_and_all_coords_walk_the_tree() {
        let grandkid = handle(Marker::new(0.0, 0.0));
        grandkid.borrow_mut().body.coords.insert((3, 3));
        let kid = handle(Marker::new(0.0, 0.0));
        kid.borrow_mut().body.coords.insert((2, 2));
        kid.borrow_mut().body.add_kid(grandkid.clone());

        let mut root = Body::new(0.0, 0.0);
        root.coords.insert((1, 1));
        root.add_kid(kid.clone());

        assert_eq!(root.all_kids().len(), 2);
        let expected: HashSet<Cell> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
        assert_eq!(root.all_coords(), expected);
    }

    #[test]
    fn copy_shares_kid_handles() {
        let kid: Handle = handle(Marker::new(0.0, 0.0));
        let mut original = Marker::new(1.0, 2.0);
        original.body.add_kid(kid.clone());

        let copied = original.copy();
        assert!(same(&copied.body.kids[0], &kid));
        assert_eq!((copied.body.x, copied.body.y), (1.0, 2.0));
    }
}
