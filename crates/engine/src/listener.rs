//! Key listeners and event dispatch.

use crate::input::{InputEvent, KeyCode};
use crate::screen::Screen;

/// Named input hooks. Every hook defaults to doing nothing, so a listener
/// only overrides what it cares about.
pub trait KeyListener {
    /// Any key, before its semantic hook.
    fn key_pressed(&mut self, _key: KeyCode, _screen: &mut Screen) {}

    /// No key seen for the release threshold.
    fn key_released(&mut self, _screen: &mut Screen) {}

    fn left_pressed(&mut self, _screen: &mut Screen) {}

    fn right_pressed(&mut self, _screen: &mut Screen) {}

    fn up_pressed(&mut self, _screen: &mut Screen) {}

    fn down_pressed(&mut self, _screen: &mut Screen) {}

    fn escape_pressed(&mut self, _screen: &mut Screen) {}

    fn space_pressed(&mut self, _screen: &mut Screen) {}

    fn enter_pressed(&mut self, _screen: &mut Screen) {}

    fn minus_pressed(&mut self, _screen: &mut Screen) {}

    fn number_pressed(&mut self, _number: u8, _screen: &mut Screen) {}
}

/// Route one event to the matching hook.
pub fn dispatch<L: KeyListener + ?Sized>(listener: &mut L, event: InputEvent, screen: &mut Screen) {
    match event {
        InputEvent::Pressed(key) => listener.key_pressed(key, screen),
        InputEvent::Released => listener.key_released(screen),
        InputEvent::Left => listener.left_pressed(screen),
        InputEvent::Right => listener.right_pressed(screen),
        InputEvent::Up => listener.up_pressed(screen),
        InputEvent::Down => listener.down_pressed(screen),
        InputEvent::Escape => listener.escape_pressed(screen),
        InputEvent::Space => listener.space_pressed(screen),
        InputEvent::Enter => listener.enter_pressed(screen),
        InputEvent::Minus => listener.minus_pressed(screen),
        InputEvent::Digit(n) => listener.number_pressed(n, screen),
    }
}

/// Deliver an event to every registered screen listener.
///
/// Iterates a snapshot, so listeners may register or unregister others while
/// handling. A listener that is already borrowed (the one currently handling
/// input further up the stack) is skipped.
pub fn broadcast(screen: &mut Screen, event: InputEvent) {
    for handle in screen.listeners() {
        if !screen.is_listening(&handle) {
            continue;
        }
        let Ok(mut entity) = handle.try_borrow_mut() else {
            continue;
        };
        if let Some(listener) = entity.listener() {
            dispatch(listener, event, screen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl KeyListener for Log {
        fn key_pressed(&mut self, key: KeyCode, _screen: &mut Screen) {
            self.0.push(format!("key {key:?}"));
        }

        fn left_pressed(&mut self, _screen: &mut Screen) {
            self.0.push("left".into());
        }

        fn number_pressed(&mut self, number: u8, _screen: &mut Screen) {
            self.0.push(format!("n{number}"));
        }
    }

    #[test]
    fn dispatch_routes_to_named_hooks() {
        let (mut screen, _, _) = Screen::headless(20, 10, &EngineConfig::default());
        let mut log = Log::default();

        dispatch(&mut log, InputEvent::Pressed(KeyCode::Left), &mut screen);
        dispatch(&mut log, InputEvent::Left, &mut screen);
        dispatch(&mut log, InputEvent::Digit(4), &mut screen);
        // No hook overridden for these.
        dispatch(&mut log, InputEvent::Enter, &mut screen);
        dispatch(&mut log, InputEvent::Released, &mut screen);

        assert_eq!(log.0, vec!["key Left", "left", "n4"]);
    }
}
