//! Number Crush: formulas fall toward the player, who types the answers.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use tui_arcade_engine::actors::{Movement, Player};
use tui_arcade_engine::bitmap::{Anchor, Bitmap};
use tui_arcade_engine::effects::Explosion;
use tui_arcade_engine::shapes::{Diamond, Text};
use tui_arcade_engine::types::Color;
use tui_arcade_engine::widgets::{Group, Monologue};
use tui_arcade_engine::{
    entity_body, handle, Body, Controller, EngineConfig, Entity, Handle, KeyListener, Play, Result, Scene,
    SceneFactory, Screen, Signal,
};

use crate::Title;

pub const NAME: &str = "Number Crush";

pub const TITLE: Title = Title {
    name: NAME,
    logo,
    launch,
};

fn logo() -> Bitmap {
    Bitmap::new(0.0, 0.0, &formula_art("1 + 2")).with_color(Color::Yellow)
}

fn launch(config: &EngineConfig) -> Result<Box<dyn Play>> {
    let scenes: Vec<SceneFactory<NumberCrush>> = vec![intro, crush];
    let controller = Controller::new(NAME, scenes, NumberCrush::default())?;
    Ok(Box::new(controller.with_release_after(config.key_release())))
}

#[derive(Default)]
pub struct NumberCrush {
    pub player: Option<Rc<RefCell<Player>>>,
}

impl NumberCrush {
    fn player(&mut self, screen: &Screen) -> Rc<RefCell<Player>> {
        self.player
            .get_or_insert_with(|| {
                let shape = Diamond::new(0.0, 0.0).with_size(3.0).with_color(Color::Yellow);
                let mut player =
                    Player::new("Jon", 0.0, 0.0, handle(shape)).with_movement(Movement::Horizontal, 1.0);
                player.score_title = "Crushed".into();
                player.death_message = "You got CRUSHED!!".into();
                player.death_blast = 20.0;
                let player = handle(player);
                home(screen, &mut player.borrow_mut());
                player
            })
            .clone()
    }
}

fn home(screen: &Screen, player: &mut Player) {
    let size = player.body().size;
    let body = player.body_mut();
    body.x = (screen.width() / 2 + 1) as f64;
    body.y = screen.height() as f64 - size - 1.0;
}

/// Glyph rows for the formula font, three rows each.
fn glyph(ch: char) -> [&'static str; 3] {
    match ch {
        '0' => [" _ ", "| |", "|_|"],
        '1' => ["   ", "  |", "  |"],
        '2' => [" _ ", " _|", "|_ "],
        '3' => [" _ ", " _|", " _|"],
        '4' => ["   ", "|_|", "  |"],
        '5' => [" _ ", "|_ ", " _|"],
        '6' => [" _ ", "|_ ", "|_|"],
        '7' => [" _ ", "  |", "  |"],
        '8' => [" _ ", "|_|", "|_|"],
        '9' => [" _ ", "|_|", " _|"],
        '+' => ["   ", "_|_", " | "],
        '-' => ["   ", "___", "   "],
        '*' => ["   ", "\\ /", "/ \\"],
        '/' => ["   ", "  /", " / "],
        _ => ["   ", "   ", "   "],
    }
}

/// The whole formula as one piece of art, for the logo.
fn formula_art(text: &str) -> String {
    let glyphs: Vec<_> = text.chars().filter(|c| *c != ' ').map(glyph).collect();
    (0..3)
        .map(|row| {
            glyphs
                .iter()
                .map(|g| g[row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A falling formula: one bitmap per character, laid out by a group.
fn formula(x: f64, y: f64, text: &str) -> Group {
    let chars: Vec<char> = text.chars().filter(|c| *c != ' ').collect();
    let width = chars.len() as f64 * 4.0 - 1.0;
    let mut group = Group::new((x - width / 2.0).floor(), y).with_velocity(0.0, 0.1);
    for (i, ch) in chars.into_iter().enumerate() {
        let bitmap = Bitmap::new(0.0, 0.0, &glyph(ch).join("\n")).with_anchor(Anchor::TopLeft);
        // Blank top rows are trimmed; push the art back down.
        let dy = 3 - bitmap.dims().1;
        group.push(i as f64 * 4.0, dy as f64, handle(bitmap));
    }
    group
}

/// Deals formulas and checks the answers the player types.
///
/// Typed digits become rising answer texts owned by the player. An answer
/// that reaches the formula is checked: a right one blows the formula up
/// and scores, a wrong one just disappears. The formula reaching the
/// player ends the round.
pub struct Numbers {
    body: Body,
    player: Rc<RefCell<Player>>,
    formula: Option<Handle>,
    text: String,
    answer: u32,
    pressed: Vec<u8>,
    last_answer: Option<u32>,
    answers: Vec<(Handle, u32)>,
    blasts: Vec<Handle>,
}

impl Numbers {
    pub fn new(x: f64, player: Rc<RefCell<Player>>) -> Self {
        Self {
            body: Body::new(x, 0.0),
            player,
            formula: None,
            text: String::new(),
            answer: 0,
            pressed: Vec::new(),
            last_answer: None,
            answers: Vec::new(),
            blasts: Vec::new(),
        }
    }

    /// Formula currently falling, as text.
    pub fn formula_text(&self) -> Option<&str> {
        self.formula.as_ref().map(|_| self.text.as_str())
    }

    pub fn answer(&self) -> u32 {
        self.answer
    }

    fn deal(&mut self, screen: &mut Screen) {
        let ops = [('+', 0..=99), ('-', 0..=99), ('/', 0..=10), ('*', 0..=10)];
        let rng = screen.rng();
        let Some((op, range)) = ops.choose(rng).cloned() else {
            return;
        };
        let mut a: u32 = rng.gen_range(range.clone());
        let mut b: u32 = rng.gen_range(range);
        let answer = match op {
            '+' => a + b,
            '-' => {
                if a < b {
                    std::mem::swap(&mut a, &mut b);
                }
                a - b
            }
            '*' => a * b,
            _ => {
                b = b.max(1);
                let quotient = a;
                a *= b;
                quotient
            }
        };

        self.text = format!("{a} {op} {b}");
        self.answer = answer;
        self.pressed.clear();
        self.last_answer = None;
        debug!("dealt {} = {}", self.text, answer);

        let group = handle(formula(self.body.x, 5.0, &self.text));
        screen.spawn(&mut self.body, group.clone());
        self.formula = Some(group);
    }

    fn check_answers(&mut self, screen: &mut Screen) {
        let Some(formula) = self.formula.clone() else {
            return;
        };
        let formula_y = formula.borrow().body().y;
        let arrived: Vec<(Handle, u32)> = self
            .answers
            .iter()
            .filter(|(text, _)| text.try_borrow().is_ok_and(|t| t.body().y <= formula_y + 5.0))
            .cloned()
            .collect();

        for (text, value) in arrived {
            self.answers.retain(|(t, _)| !tui_arcade_engine::same(t, &text));
            self.player.borrow_mut().body_mut().remove_kid(&text);
            screen.remove(&text);
            if value == self.answer && self.formula.is_some() {
                self.crush(screen, &formula);
            }
        }
    }

    fn crush(&mut self, screen: &mut Screen, formula: &Handle) {
        let members = formula.borrow().body().kids.clone();
        self.body.remove_kid(formula);
        screen.remove(formula);
        self.formula = None;
        for member in &members {
            let Ok(m) = member.try_borrow() else {
                continue;
            };
            let b = m.body();
            let blast = handle(Explosion::new(b.x + 1.0, b.y + 1.0, b.size * 2.0));
            screen.add(blast.clone());
            self.blasts.push(blast);
        }
        self.player.borrow_mut().add_score(1);
    }
}

impl Entity for Numbers {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        self.blasts.retain(|b| screen.contains(b));
        self.answers.retain(|(t, _)| screen.contains(t));
        if let Some(f) = &self.formula {
            if !screen.contains(f) {
                self.body.remove_kid(f);
                self.formula = None;
            }
        }

        let active = self.player.borrow().is_active();
        if !active {
            return;
        }
        if self.formula.is_none() && self.blasts.is_empty() {
            self.deal(screen);
        }

        let touching = match &self.formula {
            Some(f) => {
                let f = f.borrow();
                let player = self.player.borrow();
                f.body().coords.iter().any(|c| player.body().coords.contains(c))
            }
            None => false,
        };
        if touching {
            self.player.borrow_mut().destruct(screen);
            return;
        }
        self.check_answers(screen);
    }

    fn is_out(&self) -> bool {
        false
    }

    fn listener(&mut self) -> Option<&mut dyn KeyListener> {
        Some(self)
    }
}

impl KeyListener for Numbers {
    fn number_pressed(&mut self, number: u8, screen: &mut Screen) {
        if self.formula.is_none() || !self.player.borrow().is_active() {
            return;
        }
        self.pressed.push(number);
        let len = self.answer.to_string().len();
        let start = self.pressed.len().saturating_sub(len);
        let value = self.pressed[start..]
            .iter()
            .fold(0u32, |acc, d| acc * 10 + *d as u32);
        if value.to_string().len() != len || self.last_answer == Some(value) {
            return;
        }
        self.last_answer = Some(value);

        let mut player = self.player.borrow_mut();
        let (x, y) = (player.body().x, player.body().y);
        let text: Handle =
            handle(Text::new(x - 1.0, y - 2.0, value.to_string()).with_velocity(0.0, -1.0));
        screen.spawn(player.body_mut(), text.clone());
        self.answers.push((text, value));
    }
}

struct Intro {
    monologue: Rc<RefCell<Monologue>>,
    done: bool,
}

fn intro(screen: &Screen, game: &mut NumberCrush) -> Box<dyn Scene<NumberCrush>> {
    let player = game.player(screen);
    let (name, x, y) = {
        let p = player.borrow();
        (p.name.clone(), p.body().x, p.body().y)
    };
    let lines = [
        format!("Hi, I am {name}, and numbers are coming for me."),
        "Formulas fall from the sky.".into(),
        "Type the answer before they land on me!".into(),
        "Ready? Let's CRUSH!!".into(),
    ];
    Box::new(Intro {
        monologue: handle(Monologue::new(x, y - 4.0, lines).on_finish(Signal::NextScene)),
        done: false,
    })
}

impl KeyListener for Intro {
    fn escape_pressed(&mut self, screen: &mut Screen) {
        screen.signal(Signal::ExitGame);
    }
}

impl Scene<NumberCrush> for Intro {
    fn start(&mut self, screen: &mut Screen, game: &mut NumberCrush) {
        let player = game.player(screen);
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

struct Crush {
    done: bool,
}

fn crush(_screen: &Screen, _game: &mut NumberCrush) -> Box<dyn Scene<NumberCrush>> {
    Box::new(Crush { done: false })
}

impl KeyListener for Crush {
    fn escape_pressed(&mut self, screen: &mut Screen) {
        screen.signal(Signal::ExitGame);
    }
}

impl Scene<NumberCrush> for Crush {
    fn start(&mut self, screen: &mut Screen, game: &mut NumberCrush) {
        let player = game.player(screen);
        {
            let mut p = player.borrow_mut();
            p.revive(screen);
            home(screen, &mut p);
        }
        let numbers = Numbers::new(screen.width() as f64 / 2.0, player.clone());
        screen.add(player);
        screen.add(handle(numbers));
    }

    fn next(&mut self) {
        self.done = true;
    }

    fn is_done(&self) -> bool {
        self.done
    }
}
