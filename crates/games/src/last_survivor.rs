//! The Last Survivor: a turret in the middle of the screen, zombies from
//! every edge.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use tui_arcade_engine::actors::{Boss, EnemyRules, Enemies, Movement, Player};
use tui_arcade_engine::bitmap::Bitmap;
use tui_arcade_engine::effects::{Explosion, Projectile};
use tui_arcade_engine::shapes::Char;
use tui_arcade_engine::types::Color;
use tui_arcade_engine::widgets::Monologue;
use tui_arcade_engine::{
    handle, Controller, EngineConfig, Entity, Handle, KeyListener, Play, Result, Scene, SceneFactory, Screen,
    Signal,
};

use crate::Title;

pub const NAME: &str = "THE LAST SURVIVOR!!";

pub const TITLE: Title = Title {
    name: NAME,
    logo,
    launch,
};

const ZOMBIE: [&str; 2] = [" 0__\n/|\n/ \\", " 0__\n/|\n |\\"];
const DYING: [&str; 3] = [" 0__\n/|\n/ \\", " _0\n/|\\", "__0__"];

/// Score that unlocks the machine gun.
const MACHINE_GUN_AT: u32 = 50;
/// Score that unlocks grenades.
const GRENADES_AT: u32 = 100;
const MAX_GRENADES: u32 = 10;

fn zombie(x: f64, y: f64) -> Bitmap {
    Bitmap::animated(x, y, &ZOMBIE, 5)
}

fn logo() -> Bitmap {
    zombie(0.0, 0.0).with_color(Color::Green)
}

fn launch(config: &EngineConfig) -> Result<Box<dyn Play>> {
    let scenes: Vec<SceneFactory<LastSurvivor>> = vec![intro, survive];
    let controller = Controller::new(NAME, scenes, LastSurvivor::default())?;
    Ok(Box::new(controller.with_release_after(config.key_release())))
}

#[derive(Default)]
pub struct LastSurvivor {
    pub player: Option<Rc<RefCell<Player>>>,
}

impl LastSurvivor {
    fn player(&mut self) -> Rc<RefCell<Player>> {
        self.player
            .get_or_insert_with(|| {
                let shape = Char::new(0.0, 0.0, Some('☻'));
                let mut player = Player::new("Jon", 0.0, 0.0, handle(shape))
                    .with_movement(Movement::Turret, 1.0)
                    .with_weapon(Projectile::new(0.0, 0.0, '·').with_velocity(0.0, -1.0));
                player.aim = true;
                player.auto_fire = Some(2);
                player.score_title = "Killed".into();
                player.secondary_title = "Grenades".into();
                player.death_message = "You got ZOMBIFIED!!".into();
                player.death_blast = 15.0;
                handle(player)
            })
            .clone()
    }
}

/// Back in the middle with the starting arsenal.
fn rearm(screen: &mut Screen, player: &mut Player) {
    player.revive(screen);
    let body = player.body_mut();
    body.x = (screen.width() / 2) as f64;
    body.y = (screen.height() / 2) as f64;
    player.auto_fire = Some(2);
    player.weapon = Some(Projectile::new(0.0, 0.0, '·').with_velocity(0.0, -1.0));
    player.secondary = None;
    player.secondary_ammo = 0;
    screen.clear_status(&player.secondary_title);
}

struct Intro {
    monologue: Rc<RefCell<Monologue>>,
    done: bool,
}

fn intro(screen: &Screen, game: &mut LastSurvivor) -> Box<dyn Scene<LastSurvivor>> {
    let name = game.player().borrow().name.clone();
    let lines = [
        format!("Hi, I am {name}, THE LAST SURVIVOR"),
        "of the zombie apocalypse.".into(),
        "It all started with a crazy scientist".into(),
        "experimenting on a rat".into(),
        "with the wrong formula.".into(),
        "It turned into a zombie ...".into(),
        "and it spread to everyone.".into(),
        "Oh no! Here they come. GET READY!!".into(),
        "Turn your weapon with the left/right keys.".into(),
    ];
    let (x, y) = ((screen.width() / 2) as f64, (screen.height() / 2) as f64 - 2.0);
    Box::new(Intro {
        monologue: handle(Monologue::new(x, y, lines).on_finish(Signal::NextScene)),
        done: false,
    })
}

impl KeyListener for Intro {
    fn escape_pressed(&mut self, screen: &mut Screen) {
        screen.signal(Signal::ExitGame);
    }
}

impl Scene<LastSurvivor> for Intro {
    fn start(&mut self, screen: &mut Screen, game: &mut LastSurvivor) {
        let player = game.player();
        {
            let mut p = player.borrow_mut();
            rearm(screen, &mut p);
            p.set_active(false);
        }
        screen.add(self.monologue.clone());
        screen.add(player);
    }

    fn next(&mut self) {
        self.done = true;
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

/// Zombies shamble in from the edges toward where the player stands.
struct Zombies;

impl EnemyRules for Zombies {
    fn create_enemy(&mut self, screen: &mut Screen, player: &Player) -> Handle {
        let (w, h) = (screen.width() as f64, screen.height() as f64);
        let score = player.scores.score as f64;
        let (px, py) = (player.body().x, player.body().y);
        let rng = screen.rng();

        let (x, y) = if rng.gen_bool(0.5) {
            let x = if rng.gen_bool(0.5) { 0.0 } else { w };
            (x, rng.gen_range(0.0..=h).floor())
        } else {
            let y = if rng.gen_bool(0.5) { 0.0 } else { h };
            (rng.gen_range(0.0..=w).floor(), y)
        };
        let speed = rng.gen::<f64>() * score / 10_000.0 + 0.2;
        let toward = |from: f64, to: f64| if from < to { 1.0 } else { -1.0 };
        let x_delta = toward(x, px) * rng.gen::<f64>() * speed;
        let y_delta = toward(y, py) * rng.gen::<f64>() * speed;

        handle(
            zombie(x, y)
                .flipped(x_delta < 0.0)
                .with_velocity(x_delta, y_delta),
        )
    }

    fn on_death(&mut self, enemy: &Handle, player: &mut Player, screen: &mut Screen) {
        player.add_score(1);
        if let Ok(e) = enemy.try_borrow() {
            let b = e.body();
            let dying = Bitmap::animated(b.x, b.y, &DYING, 4)
                .once()
                .with_color(Color::Red);
            screen.add(handle(dying));
        }
    }

    fn additional_enemies(&self, player: &Player) -> usize {
        (player.scores.score / 25) as usize
    }

    fn should_spawn_boss(&self, player: &Player) -> bool {
        let score = player.scores.score;
        score > 0 && score % 50 == 0
    }

    fn create_boss(&mut self, screen: &mut Screen, player: &Rc<RefCell<Player>>) -> Option<Boss> {
        let width = screen.width().max(11) as f64;
        let x = screen.rng().gen_range(5.0..width - 5.0).floor();
        let hp = player
            .try_borrow()
            .map(|p| p.scores.score / 25)
            .unwrap_or(2)
            .max(1);
        let shape = zombie(x, -5.0).with_color(Color::Green);
        Some(Boss::new(x, -5.0, hp, handle(shape), player).with_drift(0.1))
    }
}

struct Survive {
    enemies: Rc<RefCell<Enemies>>,
    player: Rc<RefCell<Player>>,
    was_active: bool,
    done: bool,
}

fn survive(_screen: &Screen, game: &mut LastSurvivor) -> Box<dyn Scene<LastSurvivor>> {
    let player = game.player();
    Box::new(Survive {
        enemies: handle(Enemies::new(player.clone(), Box::new(Zombies), 10)),
        player,
        was_active: true,
        done: false,
    })
}

impl Survive {
    fn announce(screen: &mut Screen, player: &Player, lines: &[&str]) {
        let (x, y) = (player.body().x, player.body().y - 2.0);
        screen.add(handle(Monologue::new(x, y, lines.iter().copied())));
    }

    fn upgrade(&self, screen: &mut Screen) {
        let mut p = self.player.borrow_mut();
        let score = p.scores.score;

        if score >= MACHINE_GUN_AT && p.auto_fire == Some(2) {
            p.auto_fire = Some(1);
            p.weapon = Some(
                Projectile::new(0.0, 0.0, '•')
                    .with_color(Color::Yellow)
                    .with_velocity(0.0, -2.0),
            );
            Self::announce(
                screen,
                &p,
                &["New weapon unlocked: MACHINE GUN!!", "It shoots twice as fast."],
            );
        }

        if score >= GRENADES_AT && p.secondary.is_none() {
            let blast = Explosion::new(0.0, 0.0, 8.0);
            p.secondary = Some(
                Projectile::new(0.0, 0.0, '❍')
                    .with_velocity(0.0, -1.0)
                    .with_fuse(10)
                    .with_explosion(blast),
            );
            p.secondary_ammo = MAX_GRENADES;
            Self::announce(
                screen,
                &p,
                &[
                    "New weapon unlocked: GRENADES!!",
                    "They EXPLODE after a short flight.",
                    "Press Space to launch a grenade.",
                ],
            );
        } else if p.secondary.is_some()
            && p.secondary_ammo < MAX_GRENADES
            && screen.renders() % 30 == 0
        {
            p.secondary_ammo += 1;
        }
    }
}

impl KeyListener for Survive {
    fn escape_pressed(&mut self, screen: &mut Screen) {
        screen.signal(Signal::ExitGame);
    }
}

impl Scene<LastSurvivor> for Survive {
    fn start(&mut self, screen: &mut Screen, _game: &mut LastSurvivor) {
        rearm(screen, &mut self.player.borrow_mut());
        screen.add(self.player.clone());
        screen.add(self.enemies.clone());
    }

    fn update(&mut self, screen: &mut Screen, _game: &mut LastSurvivor) {
        let active = self.player.borrow().is_active();
        if active {
            self.upgrade(screen);
        } else if self.was_active {
            // The survivor rises again, as one of them.
            let p = self.player.borrow();
            let risen = zombie(p.body().x, p.body().y)
                .with_color(Color::Green)
                .with_velocity(0.0, -0.1);
            screen.add(handle(risen));
        }
        self.was_active = active;
    }

    fn next(&mut self) {
        self.done = true;
    }

    fn is_done(&self) -> bool {
        self.done
    }
}
