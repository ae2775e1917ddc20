//! The outer loop: a chooser over the titles, and whichever game it launched.

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info};
use tui_arcade_engine::bitmap::Bitmap;
use tui_arcade_engine::shapes::BouncyText;
use tui_arcade_engine::types::Color;
use tui_arcade_engine::widgets::Choice;
use tui_arcade_engine::{
    handle, Controller, EngineConfig, KeyListener, Play, Result, Scene, SceneFactory, Screen,
    Signal,
};

use crate::Title;

pub const NAME: &str = "Choose a Game";

/// Chooser state kept across visits.
pub struct Lobby {
    titles: Vec<Title>,
    /// Highlighted when the chooser is shown again.
    pub last: usize,
    pending: Option<usize>,
}

struct Choose {
    choice: Rc<RefCell<Choice<Bitmap>>>,
    done: bool,
}

fn choose(screen: &Screen, lobby: &mut Lobby) -> Box<dyn Scene<Lobby>> {
    let logos = lobby
        .titles
        .iter()
        .map(|t| (t.name.to_string(), handle((t.logo)())))
        .collect();
    let spacing = (screen.width() as f64 / lobby.titles.len().max(1) as f64).min(24.0);
    let mut choice = Choice::new(
        screen.width() as f64 / 2.0,
        (screen.height() / 2) as f64 - 2.0,
        logos,
    )
    .starting_at(lobby.last)
    .with_spacing(spacing);
    choice.on_choose = None;

    Box::new(Choose {
        choice: handle(choice),
        done: false,
    })
}

impl KeyListener for Choose {
    fn escape_pressed(&mut self, screen: &mut Screen) {
        screen.signal(Signal::ExitGame);
    }
}

impl Scene<Lobby> for Choose {
    fn start(&mut self, screen: &mut Screen, _lobby: &mut Lobby) {
        screen.reset(true);
        screen.add(self.choice.clone());
        let hint = BouncyText::new(2.0, 2.0, "Esc to leave")
            .with_color(Color::Cyan)
            .with_velocity(0.25, 0.1);
        screen.add(handle(hint));
    }

    fn update(&mut self, _screen: &mut Screen, lobby: &mut Lobby) {
        if let Some(index) = self.choice.borrow().chosen() {
            lobby.last = index;
            lobby.pending = Some(index);
            self.done = true;
        }
    }

    fn next(&mut self) {
        self.done = true;
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

/// Runs the chooser until a title is picked, then that title's controller
/// until it exits, then the chooser again.
pub struct Arcade {
    chooser: Controller<Lobby>,
    config: EngineConfig,
    running: Option<Box<dyn Play>>,
}

impl Arcade {
    pub fn new(titles: Vec<Title>, config: &EngineConfig) -> Result<Self> {
        let scenes: Vec<SceneFactory<Lobby>> = vec![choose];
        let lobby = Lobby {
            titles,
            last: 0,
            pending: None,
        };
        let chooser = Controller::new(NAME, scenes, lobby)?.with_release_after(config.key_release());
        Ok(Self {
            chooser,
            config: config.clone(),
            running: None,
        })
    }

    /// Name of the game being played, if any.
    pub fn playing(&self) -> Option<&str> {
        self.running.as_ref().map(|g| g.name())
    }

    pub fn lobby(&self) -> &Lobby {
        self.chooser.game()
    }

    fn launch(&mut self, screen: &mut Screen, index: usize) {
        let Some(title) = self.chooser.game().titles.get(index).copied() else {
            return;
        };
        match (title.launch)(&self.config) {
            Ok(game) => {
                info!("launching {}", title.name);
                screen.reset(true);
                self.running = Some(game);
            }
            Err(err) => {
                error!("cannot launch {}: {err}", title.name);
                self.chooser.reset_scene(screen);
            }
        }
    }
}

impl Play for Arcade {
    fn name(&self) -> &str {
        self.playing().unwrap_or(NAME)
    }

    fn tick(&mut self, screen: &mut Screen) {
        if let Some(game) = self.running.as_mut() {
            game.tick(screen);
            if game.is_done() {
                info!("{} finished", game.name());
                self.running = None;
                screen.reset(true);
                self.chooser.reset_scene(screen);
            }
            return;
        }

        self.chooser.tick(screen);
        if let Some(index) = self.chooser.game_mut().pending.take() {
            self.launch(screen, index);
        }
    }

    fn is_done(&self) -> bool {
        self.running.is_none() && self.chooser.is_done()
    }

    fn restart(&mut self) {
        self.running = None;
        self.chooser.restart();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_arcade_engine::input::KeyCode;

    fn arcade() -> (Arcade, Screen, tui_arcade_engine::input::ScriptedInput) {
        let (screen, _, keys) = Screen::headless(80, 24, &EngineConfig::default());
        let arcade = Arcade::new(crate::titles(), &EngineConfig::default()).unwrap();
        (arcade, screen, keys)
    }

    #[test]
    fn picks_a_game_and_returns_to_the_chooser() {
        let (mut arcade, mut screen, keys) = arcade();
        arcade.tick(&mut screen);
        assert_eq!(arcade.playing(), None);

        keys.push(KeyCode::Right);
        arcade.tick(&mut screen);
        keys.push(KeyCode::Enter);
        arcade.tick(&mut screen);
        arcade.tick(&mut screen);
        assert_eq!(arcade.playing(), Some(crate::number_crush::NAME));
        assert_eq!(arcade.lobby().last, 1);

        arcade.tick(&mut screen);
        keys.push(KeyCode::Esc);
        arcade.tick(&mut screen);
        arcade.tick(&mut screen);
        assert_eq!(arcade.playing(), None);
        assert!(!arcade.is_done());
    }

    #[test]
    fn escape_in_the_chooser_exits() {
        let (mut arcade, mut screen, keys) = arcade();
        arcade.tick(&mut screen);
        keys.push(KeyCode::Esc);
        arcade.tick(&mut screen);
        arcade.tick(&mut screen);
        assert!(arcade.is_done());
    }
}
