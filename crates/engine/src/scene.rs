//! Scenes: one phase of a game's run (intro, gameplay, menu).

use crate::listener::KeyListener;
use crate::screen::Screen;

/// A phase of a game with game state `G`.
///
/// A scene is built fresh by its [`SceneFactory`] every time the controller
/// enters it; building is where objects are created. `start` puts them on
/// the screen. The scene receives every input event directly, while objects
/// it adds can listen on their own.
pub trait Scene<G>: KeyListener {
    fn start(&mut self, screen: &mut Screen, game: &mut G);

    /// Called once per controller tick, before input is dispatched. Input
    /// handled this tick is only visible to `update` on the next one.
    fn update(&mut self, _screen: &mut Screen, _game: &mut G) {}

    /// Mark the scene finished; the controller moves on next tick.
    fn next(&mut self);

    fn is_done(&self) -> bool;
}

/// Builds a new scene instance.
pub type SceneFactory<G> = fn(&Screen, &mut G) -> Box<dyn Scene<G>>;
