//! Geometry Bash: pick a shape, then shoot the squares raining down.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use tui_arcade_engine::actors::{Boss, EnemyRules, Enemies, Movement, Player};
use tui_arcade_engine::bitmap::Bitmap;
use tui_arcade_engine::effects::{Explosion, Projectile};
use tui_arcade_engine::shapes::{Circle, Diamond, Square, Triangle};
use tui_arcade_engine::types::Color;
use tui_arcade_engine::widgets::{Choice, Monologue};
use tui_arcade_engine::{
    handle, Controller, EngineConfig, Entity, Handle, KeyListener, Play, Result, Scene, SceneFactory, Screen,
    Signal,
};

use crate::Title;

pub const NAME: &str = "Geometry Bash";

pub const TITLE: Title = Title {
    name: NAME,
    logo,
    launch,
};

fn logo() -> Bitmap {
    Bitmap::new(0.0, 0.0, "  /\\   ##\n /  \\  ##\n/____\\ <>").with_color(Color::Blue)
}

fn launch(config: &EngineConfig) -> Result<Box<dyn Play>> {
    let scenes: Vec<SceneFactory<GeoBash>> = vec![choose_player, intro, bash];
    let controller = Controller::new(NAME, scenes, GeoBash::default())?;
    Ok(Box::new(controller.with_release_after(config.key_release())))
}

/// State shared by the scenes.
#[derive(Default)]
pub struct GeoBash {
    pub player: Option<Rc<RefCell<Player>>>,
    /// Shape picked last time, highlighted first on the next visit.
    pub last_choice: usize,
}

fn avatar(name: &str, shape: Handle, ch: char, color: Color) -> Player {
    let mut player = Player::new(name, 0.0, 0.0, shape)
        .with_movement(Movement::Free, 1.0)
        .with_weapon(
            Projectile::new(0.0, 0.0, ch)
                .with_color(color)
                .with_velocity(0.0, -1.0),
        );
    player.score_title = "Bashed".into();
    player.death_message = "You got BASHED!!".into();
    player.auto_fire = Some(2);
    player.set_active(false);
    player
}

fn roster() -> Vec<(String, Rc<RefCell<Player>>)> {
    let kate = Triangle::new(0.0, 0.0).with_size(3.0).with_color(Color::Blue);
    let nina = Circle::new(0.0, 0.0).with_size(3.0).with_color(Color::Red);
    let jon = Diamond::new(0.0, 0.0).with_size(3.0).with_color(Color::Yellow);
    vec![
        ("Kate".into(), handle(avatar("Kate", handle(kate), '^', Color::Blue))),
        ("Nina".into(), handle(avatar("Nina", handle(nina), 'O', Color::Red))),
        ("Jon".into(), handle(avatar("Jon", handle(jon), '#', Color::Yellow))),
    ]
}

fn tagline(name: &str) -> &'static str {
    match name {
        "Jon" => "the fastest shape",
        "Kate" => "the stealthiest shape",
        _ => "the most powerful shape",
    }
}

/// Bottom middle of the screen, clear of the border.
fn home(screen: &Screen, player: &mut Player) {
    let size = player.body().size;
    let body = player.body_mut();
    body.x = (screen.width() / 2) as f64;
    body.y = screen.height() as f64 - size - 1.0;
}

struct ChoosePlayer {
    choice: Rc<RefCell<Choice<Player>>>,
    done: bool,
}

fn choose_player(screen: &Screen, game: &mut GeoBash) -> Box<dyn Scene<GeoBash>> {
    let mut choice = Choice::new(
        screen.width() as f64 / 2.0,
        screen.height() as f64 / 2.0 - 2.0,
        roster(),
    )
    .starting_at(game.last_choice);
    choice.on_choose = None;
    Box::new(ChoosePlayer {
        choice: handle(choice),
        done: false,
    })
}

impl KeyListener for ChoosePlayer {
    fn escape_pressed(&mut self, screen: &mut Screen) {
        screen.signal(Signal::ExitGame);
    }
}

impl Scene<GeoBash> for ChoosePlayer {
    fn start(&mut self, screen: &mut Screen, _game: &mut GeoBash) {
        screen.add(self.choice.clone());
    }

    fn update(&mut self, screen: &mut Screen, game: &mut GeoBash) {
        let choice = self.choice.borrow();
        let (Some(index), Some(player)) = (choice.chosen(), choice.selected()) else {
            return;
        };
        home(screen, &mut player.borrow_mut());
        game.last_choice = index;
        game.player = Some(player);
        self.done = true;
    }

    fn next(&mut self) {
        self.done = true;
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

struct Intro {
    monologue: Rc<RefCell<Monologue>>,
    done: bool,
}

fn intro(screen: &Screen, game: &mut GeoBash) -> Box<dyn Scene<GeoBash>> {
    let (name, x, y) = match &game.player {
        Some(p) => {
            let p = p.borrow();
            (p.name.clone(), p.body().x, p.body().y)
        }
        None => (String::new(), screen.width() as f64 / 2.0, screen.height() as f64 - 4.0),
    };
    let lines = [
        format!("Hi, I am {name} -- {}!", tagline(&name)),
        "Most people don't like geometry, but not me.".into(),
        "I LOVE to bash them!! :D".into(),
        "Move me using arrow keys.".into(),
        "Ready? Let's BASH!!".into(),
    ];
    let monologue = Monologue::new(x, y - 4.0, lines).on_finish(Signal::NextScene);
    Box::new(Intro {
        monologue: handle(monologue),
        done: false,
    })
}

impl KeyListener for Intro {
    fn escape_pressed(&mut self, _screen: &mut Screen) {
        self.done = true;
    }
}

impl Scene<GeoBash> for Intro {
    fn start(&mut self, screen: &mut Screen, game: &mut GeoBash) {
        let Some(player) = game.player.clone() else {
            self.done = true;
            return;
        };
        {
            let mut p = player.borrow_mut();
            p.revive(screen);
            p.set_active(false);
            home(screen, &mut p);
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

/// Squares fall from above; every fiftieth point brings a boss.
struct Squares;

impl EnemyRules for Squares {
    fn create_enemy(&mut self, screen: &mut Screen, player: &Player) -> Handle {
        let width = screen.width().max(7) as f64;
        let score = player.scores.score as f64;
        let rng = screen.rng();
        let size = rng.gen_range(2..=4) as f64;
        let x = rng.gen_range(3.0..width - 3.0).floor();
        let fall = rng.gen::<f64>() * score / 200.0 + 0.2;
        handle(
            Square::new(x, -size)
                .with_size(size)
                .with_velocity(0.0, fall),
        )
    }

    fn on_death(&mut self, enemy: &Handle, player: &mut Player, screen: &mut Screen) {
        player.add_score(1);
        if let Ok(e) = enemy.try_borrow() {
            let b = e.body();
            screen.add(handle(Explosion::new(b.x, b.y, b.size * 3.0)));
        }
    }

    fn additional_enemies(&self, player: &Player) -> usize {
        (player.scores.score / 100) as usize
    }

    fn should_spawn_boss(&self, player: &Player) -> bool {
        let score = player.scores.score;
        score > 0 && score % 50 == 0
    }

    fn create_boss(&mut self, screen: &mut Screen, player: &Rc<RefCell<Player>>) -> Option<Boss> {
        let width = screen.width().max(11) as f64;
        let x = screen.rng().gen_range(5.0..width - 5.0).floor();
        let hp = player.try_borrow().map(|p| p.scores.score).unwrap_or(50);
        let shape = Square::new(x, -5.0)
            .with_size(5.0)
            .with_char('$')
            .solid()
            .with_color(Color::Green);
        Some(Boss::new(x, -5.0, hp, handle(shape), player).with_drift(0.1))
    }

    fn on_boss_defeated(&mut self, player: &mut Player, screen: &mut Screen) {
        player.add_score(10);
        let (x, y) = (player.body().x, screen.height() as f64 / 3.0);
        screen.add(handle(Explosion::new(x, y, 25.0)));
    }
}

struct Bash {
    enemies: Option<Rc<RefCell<Enemies>>>,
    done: bool,
}

fn bash(_screen: &Screen, game: &mut GeoBash) -> Box<dyn Scene<GeoBash>> {
    let enemies = game
        .player
        .clone()
        .map(|p| handle(Enemies::new(p, Box::new(Squares), 5)));
    Box::new(Bash {
        enemies,
        done: false,
    })
}

impl KeyListener for Bash {
    fn escape_pressed(&mut self, _screen: &mut Screen) {
        self.done = true;
    }
}

impl Scene<GeoBash> for Bash {
    fn start(&mut self, screen: &mut Screen, game: &mut GeoBash) {
        let (Some(player), Some(enemies)) = (game.player.clone(), self.enemies.clone()) else {
            self.done = true;
            return;
        };
        {
            let mut p = player.borrow_mut();
            p.revive(screen);
            home(screen, &mut p);
        }
        screen.add(player);
        screen.add(enemies);
    }

    fn next(&mut self) {
        self.done = true;
    }

    fn is_done(&self) -> bool {
        self.done
    }
}
