//! Short-lived effects: expanding explosions and fused projectiles.

use std::collections::HashSet;

use crate::object::{handle, Body, Entity};
use crate::screen::{Screen, Signal};
use crate::shapes::{circle_cells, stamp};
use crate::types::Color;
use crate::{body_builders, entity_body};

/// A ring that grows each frame and expires past its maximum radius.
#[derive(Debug, Clone)]
pub struct Explosion {
    body: Body,
    pub ch: char,
    pub radius: f64,
    pub max_radius: f64,
    pub growth: f64,
    /// Raised once, when the explosion runs out.
    pub on_finish: Option<Signal>,
}

impl Explosion {
    pub fn new(x: f64, y: f64, max_radius: f64) -> Self {
        let mut body = Body::new(x, y);
        body.color = Some(Color::Rainbow);
        body.size = max_radius;
        Self {
            body,
            ch: '*',
            radius: 0.0,
            max_radius,
            growth: 0.5,
            on_finish: None,
        }
    }

    pub fn on_finish(mut self, signal: Signal) -> Self {
        self.on_finish = Some(signal);
        self
    }

    pub fn with_growth(mut self, growth: f64) -> Self {
        self.growth = growth;
        self
    }

    body_builders!();
}

impl Entity for Explosion {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        self.radius += self.growth;
        if self.radius > self.max_radius {
            self.body.expired = true;
            self.body.coords.clear();
            if let Some(signal) = self.on_finish.take() {
                screen.signal(signal);
            }
            return;
        }
        let cells = circle_cells(self.body.cell(), self.radius);
        stamp(screen, &mut self.body, cells, self.ch);
    }
}

/// A moving glyph. With a fuse it detonates into a copy of its explosion
/// template once the fuse runs down.
#[derive(Debug, Clone)]
pub struct Projectile {
    body: Body,
    pub ch: char,
    /// Renders left before detonation.
    pub fuse: Option<u32>,
    pub explosion: Option<Explosion>,
    explosions: u32,
}

impl Projectile {
    pub fn new(x: f64, y: f64, ch: char) -> Self {
        Self {
            body: Body::new(x, y),
            ch,
            fuse: None,
            explosion: None,
            explosions: 0,
        }
    }

    pub fn with_fuse(mut self, fuse: u32) -> Self {
        self.fuse = Some(fuse);
        self
    }

    pub fn with_explosion(mut self, explosion: Explosion) -> Self {
        self.explosion = Some(explosion);
        self
    }

    body_builders!();

    /// Explosions spawned so far.
    pub fn explosions(&self) -> u32 {
        self.explosions
    }

    /// Expire now, spawning the explosion template (if any) where the
    /// projectile is. The explosion joins the projectile's parent.
    pub fn detonate(&mut self, screen: &mut Screen) {
        self.body.expired = true;
        self.body.coords.clear();
        let Some(template) = &self.explosion else {
            return;
        };

        let mut blast = template.copy();
        blast.body_mut().sync(&self.body, true);
        let blast = handle(blast);
        match self.body.parent.as_ref().and_then(|p| p.upgrade()) {
            Some(parent) => match parent.try_borrow_mut() {
                Ok(mut parent) => screen.spawn(parent.body_mut(), blast),
                Err(_) => screen.add(blast),
            },
            None => screen.add(blast),
        }
        self.explosions += 1;
    }
}

impl Entity for Projectile {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        if let Some(fuse) = self.fuse {
            if fuse == 0 {
                self.detonate(screen);
                return;
            }
            self.fuse = Some(fuse - 1);
        }
        let cell = self.body.cell();
        screen.put(cell, self.ch, self.body.color);
        self.body.coords = HashSet::from([cell]);
    }
}
