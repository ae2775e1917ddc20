use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::actors::Player;
use crate::object::{Body, Entity, Handle};
use crate::screen::Screen;
use crate::entity_body;

/// A large enemy that follows the player across the screen.
///
/// It tracks the player horizontally, drifts vertically and wraps back to the
/// top once it falls off the bottom. It is protected from out-of-bounds
/// culling so it can re-enter.
pub struct Boss {
    body: Body,
    shape: Handle,
    pub hp: u32,
    pub max_hp: u32,
    /// Horizontal chase speed per render.
    pub speed: f64,
    target: Weak<RefCell<Player>>,
}

impl Boss {
    pub fn new(x: f64, y: f64, hp: u32, shape: Handle, target: &Rc<RefCell<Player>>) -> Self {
        let mut body = Body::new(x, y);
        body.protected = true;
        if let Ok(s) = shape.try_borrow() {
            body.size = s.body().size;
            body.color = s.body().color;
        }
        Self {
            body,
            shape,
            hp,
            max_hp: hp,
            speed: 0.5,
            target: Rc::downgrade(target),
        }
    }

    pub fn with_drift(mut self, y_delta: f64) -> Self {
        self.body.y_delta = y_delta;
        self
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    pub fn hit(&mut self) {
        self.hp = self.hp.saturating_sub(1);
    }

    fn chase(&mut self) {
        let Some(target) = self.target.upgrade() else {
            self.body.x_delta = 0.0;
            return;
        };
        let Ok(player) = target.try_borrow() else {
            return;
        };
        let dx = player.body().x - self.body.x;
        self.body.x_delta = if dx.abs() < self.speed {
            dx
        } else {
            self.speed * dx.signum()
        };
    }
}

impl Entity for Boss {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.chase();
        self.advance(screen);
        let height = screen.height() as f64;
        if self.body.protected && self.body.y - self.body.size > height {
            self.body.y = -self.body.size;
        }
        if let Ok(mut shape) = self.shape.try_borrow_mut() {
            shape.body_mut().sync(&self.body, true);
            shape.render(screen);
            self.body.coords = shape.body().coords.clone();
        }
        screen.set_status("Boss", format!("{}/{}", self.hp, self.max_hp));
    }
}
