//! Per-game state machine.
//!
//! A [`Controller`] cycles through an ordered list of scene factories. Once
//! per frame [`Controller::tick`]:
//!
//! 1. handles screen signals (`NextScene`, `ResetScene`, `ExitGame`);
//! 2. enters the first scene, or the next one (wrapping) if the current one
//!    is done, building a fresh instance each time;
//! 3. runs the scene's `update`;
//! 4. reads one coalesced key and sends its events to the scene and to every
//!    listener registered on the screen.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::{EngineError, Result};
use crate::input::{InputEvent, KeyCode, KeyCoalescer};
use crate::listener::{broadcast, dispatch};
use crate::scene::{Scene, SceneFactory};
use crate::screen::{Screen, Signal};

/// Object-safe view of a controller, whatever its game state.
pub trait Play {
    fn name(&self) -> &str;

    fn tick(&mut self, screen: &mut Screen);

    /// The game asked to exit back to whoever launched it.
    fn is_done(&self) -> bool;

    /// Start over from the first scene.
    fn restart(&mut self);
}

pub struct Controller<G> {
    name: String,
    scenes: Vec<SceneFactory<G>>,
    index: usize,
    current: Option<Box<dyn Scene<G>>>,
    game: G,
    coalescer: KeyCoalescer,
    last_key: Option<KeyCode>,
    serial: u64,
    done: bool,
}

impl<G: 'static> Controller<G> {
    pub fn new(name: impl Into<String>, scenes: Vec<SceneFactory<G>>, game: G) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::MissingName);
        }
        if scenes.is_empty() {
            return Err(EngineError::NoScenes(name));
        }
        Ok(Self {
            name,
            scenes,
            index: 0,
            current: None,
            game,
            coalescer: KeyCoalescer::new(),
            last_key: None,
            serial: 0,
            done: false,
        })
    }

    pub fn with_release_after(mut self, release_after: Duration) -> Self {
        self.coalescer = KeyCoalescer::with_release_after(release_after);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Index of the current scene.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Increments with every scene instance the controller installs.
    pub fn scene_serial(&self) -> u64 {
        self.serial
    }

    pub fn current(&self) -> Option<&dyn Scene<G>> {
        self.current.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Make `scene` the only active scene: empty the screen, reset input
    /// routing to just the scene, then start it.
    pub fn set_scene(&mut self, screen: &mut Screen, mut scene: Box<dyn Scene<G>>) {
        screen.reset(false);
        self.coalescer.clear();
        self.serial += 1;
        debug!("{}: entering scene {} (#{})", self.name, self.index, self.serial);
        scene.start(screen, &mut self.game);
        self.current = Some(scene);
    }

    /// Rebuild the current scene from scratch without advancing.
    pub fn reset_scene(&mut self, screen: &mut Screen) {
        if self.current.is_some() {
            self.enter(screen, self.index);
        }
    }

    fn enter(&mut self, screen: &mut Screen, index: usize) {
        self.index = index;
        let scene = (self.scenes[index])(screen, &mut self.game);
        self.set_scene(screen, scene);
    }

    pub fn tick(&mut self, screen: &mut Screen) {
        self.tick_at(screen, Instant::now());
    }

    /// [`Controller::tick`] with an explicit clock, for idle-release timing.
    pub fn tick_at(&mut self, screen: &mut Screen, now: Instant) {
        screen.set_title(&self.name);

        let mut reset = false;
        for signal in screen.take_signals() {
            match signal {
                Signal::NextScene => {
                    if let Some(scene) = self.current.as_mut() {
                        scene.next();
                    }
                }
                Signal::ResetScene => reset = true,
                Signal::ExitGame => self.done = true,
            }
        }
        if self.done {
            info!("{}: exit requested", self.name);
            return;
        }
        if reset {
            self.reset_scene(screen);
        }

        match self.current.as_ref().map(|s| s.is_done()) {
            None => self.enter(screen, self.index),
            Some(true) => {
                let next = (self.index + 1) % self.scenes.len();
                self.enter(screen, next);
            }
            Some(false) => {}
        }

        if let Some(scene) = self.current.as_mut() {
            scene.update(screen, &mut self.game);
        }

        let events = self.coalescer.poll(|| screen.key(), now);
        for event in events {
            if let InputEvent::Pressed(key) = event {
                self.watch_debug_toggle(key, screen);
            }
            if let Some(scene) = self.current.as_mut() {
                dispatch(scene.as_mut(), event, screen);
            }
            broadcast(screen, event);
        }
    }

    // `d` twice in a row flips the debug overlay.
    fn watch_debug_toggle(&mut self, key: KeyCode, screen: &mut Screen) {
        let d = KeyCode::Char('d');
        if key == d && self.last_key == Some(d) {
            screen.toggle_debug();
            self.last_key = None;
        } else {
            self.last_key = Some(key);
        }
    }
}

impl<G: 'static> Play for Controller<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, screen: &mut Screen) {
        Controller::tick(self, screen);
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn restart(&mut self) {
        self.done = false;
        self.current = None;
        self.index = 0;
        self.last_key = None;
        self.coalescer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::input::ScriptedInput;
    use crate::listener::KeyListener;
    use crate::object::{handle, Entity};
    use crate::shapes::Text;

    #[derive(Default)]
    struct Log {
        built: u32,
        started: Vec<(&'static str, u32)>,
    }

    struct Step {
        label: &'static str,
        id: u32,
        done: bool,
    }

    impl KeyListener for Step {
        fn enter_pressed(&mut self, _screen: &mut Screen) {
            self.done = true;
        }

        fn escape_pressed(&mut self, screen: &mut Screen) {
            screen.signal(Signal::ExitGame);
        }
    }

    impl Scene<Log> for Step {
        fn start(&mut self, screen: &mut Screen, game: &mut Log) {
            game.started.push((self.label, self.id));
            screen.add(handle(Text::new(1.0, 1.0, self.label)));
        }

        fn next(&mut self) {
            self.done = true;
        }

        fn is_done(&self) -> bool {
            self.done
        }
    }

    fn build(label: &'static str, game: &mut Log) -> Box<dyn Scene<Log>> {
        game.built += 1;
        Box::new(Step {
            label,
            id: game.built,
            done: false,
        })
    }

    fn first(_: &Screen, game: &mut Log) -> Box<dyn Scene<Log>> {
        build("one", game)
    }

    fn second(_: &Screen, game: &mut Log) -> Box<dyn Scene<Log>> {
        build("two", game)
    }

    fn setup() -> (Controller<Log>, Screen, ScriptedInput) {
        let (screen, _, keys) = Screen::headless(40, 10, &EngineConfig::default());
        let scenes: Vec<SceneFactory<Log>> = vec![first, second];
        let controller = Controller::new("Test", scenes, Log::default()).unwrap();
        (controller, screen, keys)
    }

    #[test]
    fn blank_name_is_rejected() {
        let scenes: Vec<SceneFactory<Log>> = vec![first];
        let err = Controller::new("  ", scenes, Log::default()).err();
        assert!(matches!(err, Some(EngineError::MissingName)));
        let err = Controller::<Log>::new("x", vec![], Log::default()).err();
        assert!(matches!(err, Some(EngineError::NoScenes(_))));
    }

    #[test]
    fn scenes_advance_and_wrap_with_fresh_instances() {
        let (mut c, mut screen, keys) = setup();

        c.tick(&mut screen);
        assert_eq!(c.game().started, vec![("one", 1)]);

        keys.push(KeyCode::Enter);
        c.tick(&mut screen);
        assert!(c.current().unwrap().is_done());
        c.tick(&mut screen);
        assert_eq!(c.index(), 1);

        keys.push(KeyCode::Enter);
        c.tick(&mut screen);
        c.tick(&mut screen);
        assert_eq!(c.index(), 0);
        assert_eq!(
            c.game().started,
            vec![("one", 1), ("two", 2), ("one", 3)]
        );
        assert_eq!(c.scene_serial(), 3);
    }

    #[test]
    fn set_scene_clears_the_screen() {
        let (mut c, mut screen, keys) = setup();
        c.tick(&mut screen);
        assert_eq!(screen.len(), 1);
        keys.push(KeyCode::Enter);
        c.tick(&mut screen);
        c.tick(&mut screen);
        // only the second scene's text
        assert_eq!(screen.len(), 1);
    }

    #[test]
    fn reset_signal_rebuilds_the_same_scene() {
        let (mut c, mut screen, _) = setup();
        c.tick(&mut screen);
        screen.signal(Signal::ResetScene);
        c.tick(&mut screen);
        assert_eq!(c.index(), 0);
        assert_eq!(c.game().started, vec![("one", 1), ("one", 2)]);
    }

    #[test]
    fn next_signal_finishes_the_scene() {
        let (mut c, mut screen, _) = setup();
        c.tick(&mut screen);
        screen.signal(Signal::NextScene);
        c.tick(&mut screen);
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn escape_exits_and_restart_starts_over() {
        let (mut c, mut screen, keys) = setup();
        c.tick(&mut screen);
        keys.push(KeyCode::Esc);
        c.tick(&mut screen);
        c.tick(&mut screen);
        assert!(c.is_done());

        Play::restart(&mut c);
        assert!(!c.is_done());
        c.tick(&mut screen);
        assert_eq!(c.index(), 0);
        assert_eq!(c.game().started.len(), 2);
    }

    #[test]
    fn double_d_toggles_debug() {
        let (mut c, mut screen, keys) = setup();
        c.tick(&mut screen);
        keys.push(KeyCode::Char('d'));
        c.tick(&mut screen);
        assert!(!screen.is_debug());
        keys.push(KeyCode::Char('d'));
        c.tick(&mut screen);
        assert!(screen.is_debug());
    }

    #[test]
    fn listeners_added_by_the_scene_receive_input() {
        struct Counter {
            body: crate::object::Body,
            lefts: u32,
        }
        impl Entity for Counter {
            crate::entity_body!();
            fn listener(&mut self) -> Option<&mut dyn KeyListener> {
                Some(self)
            }
        }
        impl KeyListener for Counter {
            fn left_pressed(&mut self, _screen: &mut Screen) {
                self.lefts += 1;
            }
        }

        let (mut c, mut screen, keys) = setup();
        c.tick(&mut screen);
        let counter = handle(Counter {
            body: crate::object::Body::new(0.0, 0.0),
            lefts: 0,
        });
        screen.add(counter.clone());
        keys.extend([KeyCode::Left, KeyCode::Left, KeyCode::Left]);
        c.tick(&mut screen);
        c.tick(&mut screen);
        assert_eq!(counter.borrow().lefts, 1);
    }

    #[test]
    fn idle_release_after_threshold() {
        struct Releases {
            body: crate::object::Body,
            count: u32,
        }
        impl Entity for Releases {
            crate::entity_body!();
            fn listener(&mut self) -> Option<&mut dyn KeyListener> {
                Some(self)
            }
        }
        impl KeyListener for Releases {
            fn key_released(&mut self, _screen: &mut Screen) {
                self.count += 1;
            }
        }

        let (mut c, mut screen, keys) = setup();
        let start = Instant::now();
        c.tick_at(&mut screen, start);
        let r = handle(Releases {
            body: crate::object::Body::new(0.0, 0.0),
            count: 0,
        });
        screen.add(r.clone());
        keys.push(KeyCode::Right);
        c.tick_at(&mut screen, start);
        c.tick_at(&mut screen, start + Duration::from_millis(200));
        assert_eq!(r.borrow().count, 0);
        c.tick_at(&mut screen, start + Duration::from_millis(600));
        assert_eq!(r.borrow().count, 1);
    }
}
