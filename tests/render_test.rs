//! Frames as the terminal sees them: only changed cells are written.

use tui_arcade::engine::shapes::{Circle, Text};
use tui_arcade::engine::{handle, EngineConfig, Entity, Screen, Signal};
use tui_arcade::term::BLANK_PLACEHOLDER;
use tui_arcade::types::Color;

#[test]
fn unchanged_frame_writes_nothing() {
    let (mut screen, target, _) = Screen::headless(40, 10, &EngineConfig::default());
    screen.add(handle(Text::new(2.0, 1.0, "hello")));
    screen.add(handle(Circle::new(20.0, 5.0).with_size(2.0)));

    screen.render().unwrap();
    assert!(!target.take_writes().is_empty());

    screen.render().unwrap();
    assert!(target.take_writes().is_empty());
    assert_eq!(screen.renders(), 2);
}

#[test]
fn moving_text_rewrites_only_what_changed() {
    let (mut screen, target, _) = Screen::headless(40, 10, &EngineConfig::default());
    screen.add(handle(Text::new(2.0, 1.0, "ab").with_velocity(1.0, 0.0)));

    screen.render().unwrap();
    let first: Vec<_> = target.take_writes().iter().map(|w| (w.x, w.y, w.glyph.ch)).collect();
    assert_eq!(first, vec![(3, 1, 'a'), (4, 1, 'b')]);

    screen.render().unwrap();
    let second: Vec<_> = target.take_writes().iter().map(|w| (w.x, w.y, w.glyph.ch)).collect();
    assert_eq!(
        second,
        vec![(3, 1, BLANK_PLACEHOLDER), (4, 1, 'a'), (5, 1, 'b'), (3, 1, ' ')]
    );
}

#[test]
fn colors_reach_the_terminal() {
    let (mut screen, target, _) = Screen::headless(40, 10, &EngineConfig::default());
    let circle = handle(Circle::new(10.0, 5.0).with_size(2.0));
    screen.add(circle.clone());
    screen.render().unwrap();
    let plain = target.take_writes();
    assert!(plain.iter().all(|w| w.glyph.ch == 'O' && w.glyph.color.is_none()));
    assert_eq!(plain.len(), circle.borrow().body().coords.len());

    circle.borrow_mut().body_mut().color = Some(Color::Red);
    screen.render().unwrap();
    let red = target.take_writes();
    assert_eq!(red.len(), plain.len());
    assert!(red.iter().all(|w| w.glyph.color == Some(Color::Red)));
}

#[test]
fn resized_terminal_is_wiped_and_asks_for_a_reset() {
    let config = EngineConfig {
        resize_check_frames: Some(1),
        ..EngineConfig::default()
    };
    let (mut screen, target, _) = Screen::headless(40, 10, &config);
    screen.render().unwrap();
    assert!(screen.take_signals().is_empty());

    target.set_size(50, 12);
    screen.render().unwrap();
    assert_eq!((screen.width(), screen.height()), (50, 12));
    assert_eq!(screen.take_signals(), vec![Signal::ResetScene]);
    assert_eq!(target.clears(), 1);
}

#[test]
fn failed_flush_repaints_on_the_next_frame() {
    let (mut screen, target, _) = Screen::headless(40, 10, &EngineConfig::default());
    screen.add(handle(Text::new(0.0, 0.0, "x")));
    target.fail_next_flush();
    screen.render().unwrap();
    assert_eq!(screen.take_signals(), vec![Signal::ResetScene]);

    target.take_writes();
    screen.render().unwrap();
    let writes = target.take_writes();
    assert!(writes.iter().any(|w| (w.x, w.y, w.glyph.ch) == (0, 0, 'x')));
}
