//! Interactive and composite objects: monologues, choice menus, groups.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::input::KeyCode;
use crate::listener::KeyListener;
use crate::object::{Body, Entity, Handle};
use crate::screen::{Screen, Signal};
use crate::shapes::Text;
use crate::types::{cell_of, Color};
use crate::{body_builders, entity_body};

/// Lines of text shown one at a time with a typing effect.
///
/// Any key completes the line being typed, or moves on once it is complete.
/// After the last line the optional finish signal is raised.
#[derive(Debug, Clone)]
pub struct Monologue {
    body: Body,
    lines: Vec<String>,
    line: usize,
    typed: usize,
    /// Characters revealed per render.
    pub speed: usize,
    pub on_finish: Option<Signal>,
    done: bool,
}

impl Monologue {
    pub fn new(x: f64, y: f64, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            body: Body::new(x, y),
            lines: lines.into_iter().map(Into::into).collect(),
            line: 0,
            typed: 0,
            speed: 1,
            on_finish: None,
            done: false,
        }
    }

    pub fn on_finish(mut self, signal: Signal) -> Self {
        self.on_finish = Some(signal);
        self
    }

    body_builders!();

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The visible part of the current line.
    pub fn shown(&self) -> &str {
        let Some(line) = self.lines.get(self.line) else {
            return "";
        };
        match line.char_indices().nth(self.typed) {
            Some((i, _)) => &line[..i],
            None => line,
        }
    }

    fn line_len(&self) -> usize {
        self.lines.get(self.line).map_or(0, |l| l.chars().count())
    }

    fn proceed(&mut self, screen: &mut Screen) {
        if self.done {
            return;
        }
        if self.typed < self.line_len() {
            self.typed = self.line_len();
            return;
        }
        self.line += 1;
        self.typed = 0;
        if self.line >= self.lines.len() {
            self.done = true;
            self.body.hide();
            if let Some(signal) = self.on_finish.take() {
                screen.signal(signal);
            }
        }
    }
}

impl Entity for Monologue {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        if self.done {
            self.body.coords.clear();
            return;
        }
        self.typed = (self.typed + self.speed).min(self.line_len());

        let (x, y) = cell_of(self.body.x, self.body.y);
        let shown = self.shown().to_string();
        // Center on x.
        let x0 = x - shown.chars().count() as i32 / 2;
        let mut coords = HashSet::new();
        for (i, ch) in shown.chars().enumerate() {
            let cell = (x0 + i as i32, y);
            if ch != ' ' {
                screen.put(cell, ch, self.body.color);
                coords.insert(cell);
            }
        }
        self.body.coords = coords;
    }

    fn listener(&mut self) -> Option<&mut dyn KeyListener> {
        Some(self)
    }
}

impl KeyListener for Monologue {
    fn key_pressed(&mut self, _key: KeyCode, screen: &mut Screen) {
        self.proceed(screen);
    }
}

/// Horizontal menu over a list of entities.
///
/// Left/right move the highlight, enter or space confirms it. Choices are
/// rendered by the menu itself, laid out around its position with their
/// label underneath.
pub struct Choice<T: Entity> {
    body: Body,
    choices: Vec<(String, Rc<RefCell<T>>)>,
    index: usize,
    chosen: Option<usize>,
    pub spacing: f64,
    pub highlight: Color,
    /// Raised when a choice is confirmed.
    pub on_choose: Option<Signal>,
}

impl<T: Entity> Choice<T> {
    pub fn new(x: f64, y: f64, choices: Vec<(String, Rc<RefCell<T>>)>) -> Self {
        Self {
            body: Body::new(x, y),
            choices,
            index: 0,
            chosen: None,
            spacing: 12.0,
            highlight: Color::Yellow,
            on_choose: Some(Signal::NextScene),
        }
    }

    /// Start with `index` highlighted, clamped to the available choices.
    pub fn starting_at(mut self, index: usize) -> Self {
        self.index = index.min(self.choices.len().saturating_sub(1));
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Index confirmed with enter/space, if any.
    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }

    pub fn selected(&self) -> Option<Rc<RefCell<T>>> {
        self.choices.get(self.index).map(|(_, c)| c.clone())
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    fn step(&mut self, forward: bool) {
        let n = self.choices.len();
        if n == 0 || self.chosen.is_some() {
            return;
        }
        self.index = if forward {
            (self.index + 1) % n
        } else {
            (self.index + n - 1) % n
        };
    }

    fn confirm(&mut self, screen: &mut Screen) {
        if self.choices.is_empty() || self.chosen.is_some() {
            return;
        }
        self.chosen = Some(self.index);
        if let Some(signal) = self.on_choose {
            screen.signal(signal);
        }
    }
}

impl<T: Entity> Entity for Choice<T> {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        let n = self.choices.len();
        let left = self.body.x - self.spacing * (n.saturating_sub(1)) as f64 / 2.0;
        let mut coords = HashSet::new();

        for (i, (label, choice)) in self.choices.iter().enumerate() {
            let x = left + self.spacing * i as f64;
            if let Ok(mut c) = choice.try_borrow_mut() {
                c.body_mut().x = x;
                c.body_mut().y = self.body.y;
                c.render(screen);
                coords.extend(c.body().coords.iter().copied());
            }

            let text = if i == self.index {
                format!("[{label}]")
            } else {
                label.clone()
            };
            let mut caption = Text::centered(x, self.body.y + 4.0, text);
            if i == self.index {
                caption = caption.with_color(self.highlight);
            }
            caption.render(screen);
            coords.extend(caption.body().coords.iter().copied());
        }
        self.body.coords = coords;
    }

    fn listener(&mut self) -> Option<&mut dyn KeyListener> {
        Some(self)
    }
}

impl<T: Entity> KeyListener for Choice<T> {
    fn left_pressed(&mut self, _screen: &mut Screen) {
        self.step(false);
    }

    fn right_pressed(&mut self, _screen: &mut Screen) {
        self.step(true);
    }

    fn enter_pressed(&mut self, screen: &mut Screen) {
        self.confirm(screen);
    }

    fn space_pressed(&mut self, screen: &mut Screen) {
        self.confirm(screen);
    }
}

/// Members laid out at fixed offsets from the group's position and rendered
/// through it. Members are also the group's kids.
pub struct Group {
    body: Body,
    offsets: Vec<(f64, f64)>,
}

impl Group {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            body: Body::new(x, y),
            offsets: Vec::new(),
        }
    }

    body_builders!();

    pub fn push(&mut self, dx: f64, dy: f64, member: Handle) {
        self.offsets.push((dx, dy));
        self.body.kids.push(member);
    }

    pub fn members(&self) -> &[Handle] {
        &self.body.kids
    }

    pub fn clear(&mut self) {
        self.offsets.clear();
        self.body.kids.clear();
    }
}

impl Entity for Group {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        let mut coords = HashSet::new();
        for (member, &(dx, dy)) in self.body.kids.iter().zip(&self.offsets) {
            if let Ok(mut m) = member.try_borrow_mut() {
                m.body_mut().x = self.body.x + dx;
                m.body_mut().y = self.body.y + dy;
                if m.body().visible {
                    m.render(screen);
                    coords.extend(m.body().coords.iter().copied());
                } else {
                    m.body_mut().coords.clear();
                }
            }
        }
        self.body.coords = coords;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::listener::dispatch;
    use crate::object::handle;
    use crate::input::InputEvent;
    use crate::shapes::{Circle, Square};

    fn headless() -> Screen {
        Screen::headless(60, 20, &EngineConfig::default()).0
    }

    #[test]
    fn monologue_types_skips_and_finishes() {
        let mut screen = headless();
        let talk = handle(Monologue::new(30.0, 5.0, ["hello", "bye"]).on_finish(Signal::NextScene));
        screen.add(talk.clone());

        screen.render().unwrap();
        screen.render().unwrap();
        assert_eq!(talk.borrow().shown(), "he");

        let event = InputEvent::Pressed(KeyCode::Char('x'));
        dispatch(&mut *talk.borrow_mut(), event, &mut screen);
        assert_eq!(talk.borrow().shown(), "hello");

        dispatch(&mut *talk.borrow_mut(), event, &mut screen);
        assert_eq!(talk.borrow().shown(), "");
        screen.render().unwrap();
        assert_eq!(talk.borrow().shown(), "b");

        dispatch(&mut *talk.borrow_mut(), event, &mut screen);
        dispatch(&mut *talk.borrow_mut(), event, &mut screen);
        assert!(talk.borrow().is_done());
        assert_eq!(screen.take_signals(), vec![Signal::NextScene]);
    }

    #[test]
    fn monologue_registers_as_listener() {
        let mut screen = headless();
        let talk: Handle = handle(Monologue::new(1.0, 1.0, ["x"]));
        screen.add(talk.clone());
        assert!(screen.is_listening(&talk));
        screen.remove(&talk);
        assert!(!screen.is_listening(&talk));
    }

    #[test]
    fn choice_wraps_and_confirms() {
        let mut screen = headless();
        let a = handle(Circle::new(0.0, 0.0));
        let b = handle(Circle::new(0.0, 0.0));
        let c = handle(Circle::new(0.0, 0.0));
        let menu = handle(
            Choice::new(
                30.0,
                8.0,
                vec![("a".into(), a), ("b".into(), b.clone()), ("c".into(), c.clone())],
            )
            .starting_at(1),
        );
        screen.add(menu.clone());
        assert_eq!(menu.borrow().index(), 1);

        dispatch(&mut *menu.borrow_mut(), InputEvent::Right, &mut screen);
        dispatch(&mut *menu.borrow_mut(), InputEvent::Right, &mut screen);
        assert_eq!(menu.borrow().index(), 0);
        dispatch(&mut *menu.borrow_mut(), InputEvent::Left, &mut screen);
        assert_eq!(menu.borrow().index(), 2);

        dispatch(&mut *menu.borrow_mut(), InputEvent::Enter, &mut screen);
        assert_eq!(menu.borrow().chosen(), Some(2));
        let selected = menu.borrow().selected().unwrap();
        assert!(Rc::ptr_eq(&selected, &c));
        assert_eq!(screen.take_signals(), vec![Signal::NextScene]);

        // Locked once chosen.
        dispatch(&mut *menu.borrow_mut(), InputEvent::Left, &mut screen);
        assert_eq!(menu.borrow().index(), 2);
    }

    #[test]
    fn choice_lays_out_its_entities() {
        let mut screen = headless();
        let a = handle(Circle::new(0.0, 0.0));
        let b = handle(Circle::new(0.0, 0.0));
        let menu = handle(
            Choice::new(30.0, 8.0, vec![("a".into(), a.clone()), ("b".into(), b.clone())])
                .with_spacing(10.0),
        );
        screen.add(menu.clone());
        screen.render().unwrap();

        assert_eq!(a.borrow().body().x, 25.0);
        assert_eq!(b.borrow().body().x, 35.0);
        let menu_coords = menu.borrow().body().coords.clone();
        assert!(a.borrow().body().coords.is_subset(&menu_coords));
    }

    #[test]
    fn group_places_members_relative_to_itself() {
        let mut screen = headless();
        let square: Handle = handle(Square::new(0.0, 0.0).with_size(1.0));
        let text = handle(Text::new(0.0, 0.0, "=4"));
        let mut group = Group::new(10.0, 5.0).with_velocity(1.0, 0.0);
        group.push(0.0, 0.0, square.clone());
        group.push(4.0, 0.0, text.clone());
        let group = handle(group);
        screen.add(group.clone());

        screen.render().unwrap();
        assert_eq!(text.borrow().body().x, 15.0);
        assert_eq!(square.borrow().body().x, 11.0);
        assert!(group.borrow().body().coords.contains(&(15, 5)));
        assert_eq!(group.borrow().body().all_kids().len(), 2);
    }
}
