use crate::effects::{Explosion, Projectile};
use crate::entity_body;
use crate::listener::KeyListener;
use crate::object::{handle, Body, Entity, Handle};
use crate::screen::{Screen, Signal};
use crate::shapes::Text;

/// Score with the session high and running total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u32,
    pub high: u32,
    pub total: u32,
}

impl Scoreboard {
    /// Fresh score, keeping high and total.
    pub fn resume(previous: Scoreboard) -> Self {
        Self {
            score: 0,
            ..previous
        }
    }

    pub fn add(&mut self, points: u32) {
        self.score += points;
        self.total += points;
        self.high = self.high.max(self.score);
    }

    /// `3` while nothing else is worth showing, otherwise
    /// `1 | High: 3 | Total: 4`.
    pub fn text(&self) -> String {
        let mut text = self.score.to_string();
        if self.score < self.high {
            text.push_str(&format!(" | High: {}", self.high));
        }
        if self.score < self.total {
            text.push_str(&format!(" | Total: {}", self.total));
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Movement {
    /// Left and right steps only.
    #[default]
    Horizontal,
    /// Steps in all four directions.
    Free,
    /// Stays put; left and right turn the aim through eight directions.
    Turret,
}

/// Clockwise from straight up.
pub const AIM_DIRECTIONS: [(f64, f64); 8] = [
    (0.0, -1.0),
    (1.0, -1.0),
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
    (-1.0, -1.0),
];

/// Presses in a row before a step doubles.
const STREAK_BOOST: u32 = 5;

/// The player's avatar.
///
/// The player owns its simulation state and draws through a shape delegate
/// kept in lockstep with [`Body::sync`]; swapping the shape keeps position and
/// score. Projectiles it fires become its kids, so collision checks against
/// "the player and everything it shot" are one `all_coords` away.
pub struct Player {
    body: Body,
    pub name: String,
    shape: Handle,
    pub scores: Scoreboard,
    pub score_title: String,
    /// Cells per step.
    pub speed: f64,
    pub movement: Movement,
    pub weapon: Option<Projectile>,
    /// Rounds left, `None` for unlimited.
    pub ammo: Option<u32>,
    /// Fire the main weapon every that many frames while active.
    pub auto_fire: Option<u32>,
    /// Space launches this instead of the main weapon.
    pub secondary: Option<Projectile>,
    pub secondary_ammo: u32,
    pub secondary_title: String,
    /// Fire along the facing direction instead of the weapon's own velocity.
    pub aim: bool,
    aim_index: usize,
    facing: (f64, f64),
    streak: u32,
    active: bool,
    pub death_message: String,
    pub death_blast: f64,
}

impl Player {
    pub fn new(name: impl Into<String>, x: f64, y: f64, shape: Handle) -> Self {
        let mut body = Body::new(x, y);
        if let Ok(s) = shape.try_borrow() {
            body.size = s.body().size;
        }
        Self {
            body,
            name: name.into(),
            shape,
            scores: Scoreboard::default(),
            score_title: "Score".into(),
            speed: 1.0,
            movement: Movement::default(),
            weapon: None,
            ammo: None,
            auto_fire: None,
            secondary: None,
            secondary_ammo: 0,
            secondary_title: "Special".into(),
            aim: false,
            aim_index: 0,
            facing: AIM_DIRECTIONS[0],
            streak: 0,
            active: true,
            death_message: "Game over".into(),
            death_blast: 6.0,
        }
    }

    pub fn with_scores(mut self, scores: Scoreboard) -> Self {
        self.scores = scores;
        self
    }

    pub fn with_weapon(mut self, weapon: Projectile) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_movement(mut self, movement: Movement, speed: f64) -> Self {
        self.movement = movement;
        self.speed = speed;
        self
    }

    pub fn shape(&self) -> &Handle {
        &self.shape
    }

    /// Draw through a different delegate from the next frame on.
    pub fn set_shape(&mut self, shape: Handle) {
        self.shape = shape;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// An inactive player is drawn but ignores input and never fires.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn facing(&self) -> (f64, f64) {
        self.facing
    }

    pub fn add_score(&mut self, points: u32) {
        self.scores.add(points);
    }

    fn shoot(&mut self, screen: &mut Screen, template: &Projectile) {
        let mut shot = template.copy();
        shot.body_mut().sync(&self.body, true);
        if self.aim {
            let b = template.body();
            let speed = b.x_delta.hypot(b.y_delta);
            let (fx, fy) = self.facing;
            shot.body_mut().x_delta = fx * speed;
            // Cells are about twice as tall as wide.
            shot.body_mut().y_delta = fy * speed / 2.0;
        }
        screen.spawn(&mut self.body, handle(shot));
    }

    /// Put a round of the main weapon in flight from the player's position.
    pub fn fire(&mut self, screen: &mut Screen) {
        if !self.active || self.ammo == Some(0) {
            return;
        }
        let Some(template) = self.weapon.clone() else {
            return;
        };
        self.shoot(screen, &template);
        if let Some(ammo) = self.ammo.as_mut() {
            *ammo -= 1;
        }
    }

    /// Launch the secondary weapon, if any is left.
    pub fn launch(&mut self, screen: &mut Screen) {
        if !self.active || self.secondary_ammo == 0 {
            return;
        }
        let Some(template) = self.secondary.clone() else {
            return;
        };
        self.shoot(screen, &template);
        self.secondary_ammo -= 1;
    }

    /// Blow up: hide, stop taking input, show the death message and raise a
    /// scene reset once the explosion has run out.
    pub fn destruct(&mut self, screen: &mut Screen) {
        if !self.active {
            return;
        }
        log::info!("{} destroyed at score {}", self.name, self.scores.score);
        self.active = false;
        self.body.hide();

        let blast = Explosion::new(self.body.x, self.body.y, self.death_blast)
            .on_finish(Signal::ResetScene);
        screen.add(handle(blast));
        let center = screen.width() as f64 / 2.0;
        let middle = screen.height() as f64 / 2.0;
        screen.add(handle(Text::centered(center, middle, self.death_message.clone())));
    }

    /// Back to life with a fresh score; high and total are kept.
    pub fn revive(&mut self, screen: &mut Screen) {
        self.reset(screen);
        self.scores = Scoreboard::resume(self.scores);
        self.active = true;
        self.body.visible = true;
        self.streak = 0;
    }

    fn in_x(&self, screen: &Screen, x: f64) -> bool {
        x - self.body.size >= 1.0 && x + self.body.size <= screen.width() as f64 - 2.0
    }

    fn in_y(&self, screen: &Screen, y: f64) -> bool {
        let half = self.body.size / 2.0;
        y - half >= 1.0 && y + half <= screen.height() as f64 - 2.0
    }

    fn turn(&mut self, clockwise: bool) {
        let n = AIM_DIRECTIONS.len();
        self.aim_index = if clockwise {
            (self.aim_index + 1) % n
        } else {
            (self.aim_index + n - 1) % n
        };
        self.facing = AIM_DIRECTIONS[self.aim_index];
    }

    fn steer(&mut self, screen: &Screen, dx: f64, dy: f64) {
        if !self.active {
            return;
        }
        match self.movement {
            Movement::Turret => {
                if dx != 0.0 {
                    self.turn(dx > 0.0);
                }
                return;
            }
            Movement::Horizontal if dx == 0.0 => return,
            Movement::Free => self.facing = (dx, dy),
            Movement::Horizontal => {}
        }

        let step = if self.streak >= STREAK_BOOST {
            self.speed * 2.0
        } else {
            self.speed
        };
        let x = self.body.x + dx * step;
        if self.in_x(screen, x) {
            self.body.x = x;
        } else if self.in_x(screen, self.body.x + dx) {
            self.body.x += dx;
        }
        let y = self.body.y + dy;
        if self.in_y(screen, y) {
            self.body.y = y;
        }
        self.streak += 1;
    }
}

impl Entity for Player {
    entity_body!();

    fn can_move_x(&self, screen: &Screen) -> bool {
        self.in_x(screen, self.body.x + self.body.x_delta)
    }

    fn can_move_y(&self, screen: &Screen) -> bool {
        self.in_y(screen, self.body.y + self.body.y_delta)
    }

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        if let Ok(mut shape) = self.shape.try_borrow_mut() {
            shape.body_mut().sync(&self.body, true);
            shape.render(screen);
            self.body.coords = shape.body().coords.clone();
        }

        if self.active {
            if let Some(every) = self.auto_fire {
                if screen.renders() % every.max(1) as u64 == 0 {
                    self.fire(screen);
                }
            }
        }

        screen.set_status(&self.score_title, self.scores.text());
        if let Some(ammo) = self.ammo {
            screen.set_status("Ammo", ammo);
        }
        if self.secondary.is_some() {
            screen.set_status(&self.secondary_title, self.secondary_ammo);
        }
    }

    fn is_out(&self) -> bool {
        false
    }

    fn listener(&mut self) -> Option<&mut dyn KeyListener> {
        Some(self)
    }
}

impl KeyListener for Player {
    fn left_pressed(&mut self, screen: &mut Screen) {
        self.steer(screen, -1.0, 0.0);
    }

    fn right_pressed(&mut self, screen: &mut Screen) {
        self.steer(screen, 1.0, 0.0);
    }

    fn up_pressed(&mut self, screen: &mut Screen) {
        self.steer(screen, 0.0, -1.0);
    }

    fn down_pressed(&mut self, screen: &mut Screen) {
        self.steer(screen, 0.0, 1.0);
    }

    fn space_pressed(&mut self, screen: &mut Screen) {
        if self.secondary.is_some() {
            self.launch(screen);
        } else {
            self.fire(screen);
        }
    }

    fn key_released(&mut self, _screen: &mut Screen) {
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::input::InputEvent;
    use crate::listener::dispatch;
    use crate::shapes::Circle;

    fn player() -> Player {
        Player::new("p", 20.0, 10.0, handle(Circle::new(0.0, 0.0).with_size(1.0)))
            .with_weapon(Projectile::new(0.0, 0.0, '|').with_velocity(0.0, -1.0))
    }

    #[test]
    fn scoreboard_text() {
        let mut s = Scoreboard::default();
        s.add(3);
        assert_eq!(s.text(), "3");
        let mut next = Scoreboard::resume(s);
        next.add(1);
        assert_eq!(next.text(), "1 | High: 3 | Total: 4");
    }

    #[test]
    fn shape_follows_the_player() {
        let (mut screen, _, _) = Screen::headless(40, 20, &EngineConfig::default());
        let p = handle(player().with_movement(Movement::Horizontal, 1.0));
        screen.add(p.clone());
        dispatch(&mut *p.borrow_mut(), InputEvent::Right, &mut screen);
        dispatch(&mut *p.borrow_mut(), InputEvent::Up, &mut screen);
        screen.render().unwrap();

        let p = p.borrow();
        let shape = p.shape().borrow();
        assert_eq!((shape.body().x, shape.body().y), (21.0, 10.0));
        assert_eq!(p.body().coords, shape.body().coords);
    }

    #[test]
    fn sustained_presses_speed_up_until_release() {
        let (mut screen, _, _) = Screen::headless(80, 20, &EngineConfig::default());
        let p = handle(player().with_movement(Movement::Free, 1.0));
        screen.add(p.clone());
        for _ in 0..STREAK_BOOST {
            dispatch(&mut *p.borrow_mut(), InputEvent::Right, &mut screen);
        }
        assert_eq!(p.borrow().body().x, 25.0);
        dispatch(&mut *p.borrow_mut(), InputEvent::Right, &mut screen);
        assert_eq!(p.borrow().body().x, 27.0);

        dispatch(&mut *p.borrow_mut(), InputEvent::Released, &mut screen);
        dispatch(&mut *p.borrow_mut(), InputEvent::Left, &mut screen);
        assert_eq!(p.borrow().body().x, 26.0);
    }

    #[test]
    fn movement_stops_at_the_border() {
        let (mut screen, _, _) = Screen::headless(10, 10, &EngineConfig::default());
        let p = handle(Player::new("p", 7.0, 5.0, handle(Circle::new(0.0, 0.0).with_size(1.0))));
        screen.add(p.clone());
        dispatch(&mut *p.borrow_mut(), InputEvent::Right, &mut screen);
        screen.render().unwrap();
        assert_eq!(p.borrow().body().x, 7.0);
    }

    #[test]
    fn turret_turns_and_fires_along_its_aim() {
        let (mut screen, _, _) = Screen::headless(40, 20, &EngineConfig::default());
        let mut p = player().with_movement(Movement::Turret, 1.0);
        p.aim = true;
        let p = handle(p);
        screen.add(p.clone());

        dispatch(&mut *p.borrow_mut(), InputEvent::Right, &mut screen);
        dispatch(&mut *p.borrow_mut(), InputEvent::Right, &mut screen);
        assert_eq!(p.borrow().facing(), (1.0, 0.0));
        assert_eq!(p.borrow().body().x, 20.0);
        dispatch(&mut *p.borrow_mut(), InputEvent::Left, &mut screen);
        dispatch(&mut *p.borrow_mut(), InputEvent::Left, &mut screen);
        dispatch(&mut *p.borrow_mut(), InputEvent::Left, &mut screen);
        assert_eq!(p.borrow().facing(), (-1.0, -1.0));

        dispatch(&mut *p.borrow_mut(), InputEvent::Space, &mut screen);
        let shot = p.borrow().body().kids[0].clone();
        let shot = shot.borrow();
        assert_eq!((shot.body().x_delta, shot.body().y_delta), (-1.0, -0.5));
    }

    #[test]
    fn firing_spawns_kids_and_spends_ammo() {
        let (mut screen, _, _) = Screen::headless(40, 20, &EngineConfig::default());
        let mut p = player();
        p.ammo = Some(1);
        let p = handle(p);
        screen.add(p.clone());

        dispatch(&mut *p.borrow_mut(), InputEvent::Space, &mut screen);
        dispatch(&mut *p.borrow_mut(), InputEvent::Space, &mut screen);
        assert_eq!(p.borrow().body().kids.len(), 1);
        assert_eq!(p.borrow().ammo, Some(0));
        assert_eq!(screen.len(), 2);
    }

    #[test]
    fn auto_fire_and_secondary() {
        let (mut screen, _, _) = Screen::headless(40, 20, &EngineConfig::default());
        let mut p = player();
        p.auto_fire = Some(2);
        p.secondary = Some(Projectile::new(0.0, 0.0, '@').with_fuse(3));
        p.secondary_ammo = 1;
        let p = handle(p);
        screen.add(p.clone());

        for _ in 0..4 {
            screen.render().unwrap();
        }
        // frames 0 and 2
        assert_eq!(p.borrow().body().kids.len(), 2);

        dispatch(&mut *p.borrow_mut(), InputEvent::Space, &mut screen);
        dispatch(&mut *p.borrow_mut(), InputEvent::Space, &mut screen);
        assert_eq!(p.borrow().secondary_ammo, 0);
        assert_eq!(p.borrow().body().kids.len(), 3);
    }

    #[test]
    fn destruct_raises_reset_once_the_blast_is_over() {
        let (mut screen, _, _) = Screen::headless(40, 20, &EngineConfig::default());
        let p = handle(player());
        screen.add(p.clone());
        p.borrow_mut().destruct(&mut screen);
        assert!(!p.borrow().is_active());
        assert!(!p.borrow().body().visible);

        let mut signals = Vec::new();
        for _ in 0..20 {
            screen.render().unwrap();
            signals.extend(screen.take_signals());
        }
        assert_eq!(signals, vec![Signal::ResetScene]);
    }

    #[test]
    fn revive_keeps_high_and_total() {
        let (mut screen, _, _) = Screen::headless(40, 20, &EngineConfig::default());
        let mut p = player();
        p.add_score(5);
        p.destruct(&mut screen);
        p.revive(&mut screen);
        assert!(p.is_active());
        assert_eq!(p.scores, Scoreboard { score: 0, high: 5, total: 5 });
    }
}
