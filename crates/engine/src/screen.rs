//! The screen: live object list, double buffer, listeners and frame pacing.
//!
//! One [`Screen`] is shared by every game of a session. Each frame the game
//! loop calls [`Screen::render`] (motion, redraw, cull, flush), then the
//! controller's tick (signals, scene logic, input), then [`Screen::pace`].

use std::collections::VecDeque;
use std::fmt::Display;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::border::{Border, StatusLine};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::input::{InputSource, KeyCode, ScriptedInput};
use crate::object::{same, Body, Handle};
use crate::term::{FramePacer, RecordingTarget, RenderTarget, ScreenBuffer};
use crate::types::{Cell, Color, Extent};

/// Requests an object raises for whoever drives the scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    NextScene,
    ResetScene,
    ExitGame,
}

pub struct Screen {
    extent: Extent,
    buffer: ScreenBuffer,
    target: Box<dyn RenderTarget>,
    input: Box<dyn InputSource>,
    objects: Vec<Handle>,
    listeners: Vec<Handle>,
    signals: VecDeque<Signal>,
    // Objects removed while borrowed; their kids are dropped after the pass.
    deferred: Vec<Handle>,
    border: Option<Border>,
    renders: u64,
    resize_interval: u64,
    // A forced rebuild could not read the size; retry next frame.
    rebuild_pending: bool,
    pacer: FramePacer,
    debug: bool,
    rng: StdRng,
}

impl Screen {
    /// Screen over a real target. The border comes from `config`.
    pub fn new(
        target: Box<dyn RenderTarget>,
        input: Box<dyn InputSource>,
        config: &EngineConfig,
    ) -> Result<Self> {
        let (width, height) = target.size()?;
        let border = Border::new(config.border_char).with_fps(config.show_fps);
        Ok(Self::build(
            Extent::new(width, height),
            target,
            input,
            Some(border),
            config,
        ))
    }

    /// Borderless screen over a recording target and a scripted key queue.
    /// The returned target and input share state with the screen's.
    pub fn headless(
        width: u16,
        height: u16,
        config: &EngineConfig,
    ) -> (Self, RecordingTarget, ScriptedInput) {
        let target = RecordingTarget::new(width, height);
        let input = ScriptedInput::new();
        let screen = Self::build(
            Extent::new(width, height),
            Box::new(target.clone()),
            Box::new(input.clone()),
            None,
            config,
        );
        (screen, target, input)
    }

    fn build(
        extent: Extent,
        target: Box<dyn RenderTarget>,
        input: Box<dyn InputSource>,
        border: Option<Border>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            extent,
            buffer: ScreenBuffer::new(extent.width, extent.height),
            target,
            input,
            objects: Vec::new(),
            listeners: Vec::new(),
            signals: VecDeque::new(),
            deferred: Vec::new(),
            border,
            renders: 0,
            rebuild_pending: false,
            resize_interval: config.resize_interval(),
            pacer: FramePacer::new(config.fps),
            debug: config.debug,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the random source, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_border(&mut self, border: Option<Border>) {
        self.border = border;
    }

    pub fn border(&self) -> Option<&Border> {
        self.border.as_ref()
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn width(&self) -> u16 {
        self.extent.width
    }

    pub fn height(&self) -> u16 {
        self.extent.height
    }

    /// Frames rendered so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn fps(&self) -> Option<u32> {
        self.pacer.fps()
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // -- objects --

    /// Put an object on screen. Adding one that is already live does nothing.
    /// Objects with a listener capability start receiving input.
    pub fn add(&mut self, obj: Handle) {
        if self.contains(&obj) {
            return;
        }
        let wants_input = match obj.try_borrow_mut() {
            Ok(mut entity) => {
                entity.body_mut().set_me(Rc::downgrade(&obj));
                entity.listener().is_some()
            }
            Err(_) => false,
        };
        if wants_input {
            self.listen(obj.clone());
        }
        self.objects.push(obj);
    }

    /// Add `kid` as a child of `parent` and put it on screen.
    pub fn spawn(&mut self, parent: &mut Body, kid: Handle) {
        if let Ok(mut k) = kid.try_borrow_mut() {
            k.body_mut().parent = parent.me();
        }
        parent.add_kid(kid.clone());
        self.add(kid);
    }

    /// Take an object and, recursively, all of its kids off screen. The kids
    /// are detached on the way out, so re-adding one later leaves it an orphan.
    pub fn remove(&mut self, obj: &Handle) {
        self.objects.retain(|o| !same(o, obj));
        self.unlisten(obj);
        let kids = match obj.try_borrow_mut() {
            Ok(mut entity) => std::mem::take(&mut entity.body_mut().kids),
            Err(_) => {
                self.deferred.push(obj.clone());
                return;
            }
        };
        for kid in &kids {
            if let Ok(mut k) = kid.try_borrow_mut() {
                k.body_mut().parent = None;
            }
            self.remove(kid);
        }
    }

    /// Swap `old` for `new` in place, or add `new` when `old` is not live.
    pub fn replace(&mut self, old: &Handle, new: Handle) {
        let Some(i) = self.objects.iter().position(|o| same(o, old)) else {
            self.add(new);
            return;
        };
        self.unlisten(old);
        self.objects.remove(i);
        self.add(new.clone());
        // `add` appended; move it back into the old slot.
        if let Some(last) = self.objects.pop() {
            self.objects.insert(i, last);
        }
    }

    pub fn contains(&self, obj: &Handle) -> bool {
        self.objects.iter().any(|o| same(o, obj))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Handle] {
        &self.objects
    }

    /// Empty the object and listener lists, and optionally the status line.
    pub fn reset(&mut self, border: bool) {
        self.objects.clear();
        self.listeners.clear();
        self.deferred.clear();
        if border {
            if let Some(b) = self.border.as_mut() {
                b.reset();
            }
        }
    }

    // -- listeners --

    pub fn listen(&mut self, obj: Handle) {
        if !self.is_listening(&obj) {
            self.listeners.push(obj);
        }
    }

    pub fn unlisten(&mut self, obj: &Handle) {
        self.listeners.retain(|l| !same(l, obj));
    }

    pub fn is_listening(&self, obj: &Handle) -> bool {
        self.listeners.iter().any(|l| same(l, obj))
    }

    /// Snapshot of the registered listeners.
    pub fn listeners(&self) -> Vec<Handle> {
        self.listeners.clone()
    }

    // -- signals --

    pub fn signal(&mut self, signal: Signal) {
        self.signals.push_back(signal);
    }

    pub fn take_signals(&mut self) -> Vec<Signal> {
        self.signals.drain(..).collect()
    }

    // -- drawing --

    /// Draw at a real-valued position; colors resolve here, so rainbow
    /// picks a fresh hue per draw.
    pub fn draw(&mut self, x: f64, y: f64, ch: char, color: Option<Color>) {
        let color = color.map(|c| self.resolve(c));
        self.buffer.draw(x, y, ch, color);
    }

    pub fn put(&mut self, (x, y): Cell, ch: char, color: Option<Color>) {
        let color = color.map(|c| self.resolve(c));
        self.buffer.put(x, y, ch, color);
    }

    fn resolve(&mut self, color: Color) -> Color {
        if color.is_rainbow() {
            Color::RAINBOW.choose(&mut self.rng).copied().unwrap_or(Color::Red)
        } else {
            color
        }
    }

    // -- border / status --

    pub fn set_title(&mut self, title: &str) {
        if let Some(b) = self.border.as_mut() {
            if b.title != title {
                b.title = title.to_string();
            }
        }
    }

    pub fn status_mut(&mut self) -> Option<&mut StatusLine> {
        self.border.as_mut().map(|b| &mut b.status)
    }

    pub fn set_status(&mut self, key: &str, value: impl Display) {
        if let Some(status) = self.status_mut() {
            status.set(key, value);
        }
    }

    pub fn clear_status(&mut self, key: &str) {
        if let Some(status) = self.status_mut() {
            status.remove(key);
        }
    }

    pub fn status(&self, key: &str) -> Option<&str> {
        self.border.as_ref().and_then(|b| b.status.get(key))
    }

    /// Status entry that only shows in debug mode.
    pub fn debug_info(&mut self, key: &str, value: impl Display) {
        if self.debug {
            self.set_status(key, value);
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
        debug!("debug overlay {}", if self.debug { "on" } else { "off" });
        if !self.debug {
            if let Some(b) = self.border.as_mut() {
                b.reset();
            }
        }
    }

    // -- input --

    /// Next raw key, or `None` when nothing is queued. Never blocks.
    pub fn key(&mut self) -> Option<KeyCode> {
        self.input.next_key()
    }

    pub fn interrupted(&self) -> bool {
        self.input.interrupted()
    }

    // -- frame --

    /// Check the terminal size and rebuild on change (or always, if
    /// `force`). A rebuild wipes the terminal and asks for a scene reset.
    pub fn resize_screen(&mut self, force: bool) -> Result<()> {
        let (width, height) = self.target.size()?;
        if !force && width == self.extent.width && height == self.extent.height {
            return Ok(());
        }
        debug!(
            "screen {}x{} -> {width}x{height}",
            self.extent.width, self.extent.height
        );
        self.extent = Extent::new(width, height);
        self.buffer = ScreenBuffer::new(width, height);
        self.target.clear()?;
        self.signal(Signal::ResetScene);
        Ok(())
    }

    /// [`Screen::resize_screen`], except that outside debug mode a failure
    /// keeps the current extent and is retried on the next frame.
    fn check_size(&mut self, force: bool) -> Result<()> {
        match self.resize_screen(force) {
            Ok(()) => {
                self.rebuild_pending = false;
                Ok(())
            }
            Err(err) if !self.debug => {
                warn!(
                    "cannot resize, keeping {}x{}: {err}",
                    self.extent.width, self.extent.height
                );
                self.rebuild_pending |= force;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Render one frame: move and redraw every visible object, cull expired
    /// and out-of-bounds ones, draw the border, flush the diff.
    pub fn render(&mut self) -> Result<()> {
        if self.rebuild_pending || self.renders % self.resize_interval == 0 {
            self.check_size(self.rebuild_pending)?;
        }
        self.buffer.clear();

        let snapshot = self.objects.clone();
        for obj in &snapshot {
            // Something earlier in the pass may have removed it.
            if !self.contains(obj) {
                continue;
            }
            let cull = {
                let Ok(mut entity) = obj.try_borrow_mut() else {
                    continue;
                };
                if entity.body().visible {
                    entity.render(self);
                } else {
                    entity.body_mut().coords.clear();
                }
                let body = entity.body();
                body.expired || (!body.protected && entity.is_out())
            };
            if cull {
                self.cull(obj);
            }
        }
        self.settle_deferred();

        if let Some(mut border) = self.border.take() {
            if border.shows_fps() {
                if let Some(fps) = self.fps() {
                    border.status.set("FPS", fps);
                }
            }
            if self.debug {
                border.status.set("objects", self.objects.len());
                border.status.set("listeners", self.listeners.len());
            }
            border.render(self);
            self.border = Some(border);
        }

        let flushed = self.buffer.render(self.target.as_mut());
        self.renders += 1;
        if let Err(err) = flushed {
            if self.debug {
                return Err(err.into());
            }
            warn!("render failed, rebuilding screen: {err}");
            self.check_size(true)?;
        }
        Ok(())
    }

    /// Sleep out the rest of a frame that started at `frame_started`.
    pub fn pace(&mut self, frame_started: Instant) {
        self.pacer.pace(frame_started.elapsed());
    }

    fn cull(&mut self, obj: &Handle) {
        let parent = match obj.try_borrow() {
            Ok(entity) => entity.body().parent.as_ref().and_then(|p| p.upgrade()),
            Err(_) => None,
        };
        if let Some(parent) = parent {
            if let Ok(mut p) = parent.try_borrow_mut() {
                p.body_mut().remove_kid(obj);
            }
        }
        self.remove(obj);
    }

    fn settle_deferred(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        for obj in &deferred {
            self.remove(obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{handle, Entity, Marker};

    fn screen(w: u16, h: u16) -> (Screen, RecordingTarget, ScriptedInput) {
        Screen::headless(w, h, &EngineConfig::default())
    }

    #[test]
    fn add_is_idempotent() {
        let (mut s, _, _) = screen(10, 10);
        let m: Handle = handle(Marker::new(1.0, 1.0));
        s.add(m.clone());
        s.add(m.clone());
        assert_eq!(s.len(), 1);
        assert!(s.contains(&m));
    }

    #[test]
    fn removing_a_parent_removes_descendants() {
        let (mut s, _, _) = screen(10, 10);
        let parent = handle(Marker::new(1.0, 1.0));
        let kid = handle(Marker::new(2.0, 2.0));
        let grandkid: Handle = handle(Marker::new(3.0, 3.0));
        kid.borrow_mut().body_mut().add_kid(grandkid.clone());
        parent.borrow_mut().body_mut().add_kid(kid.clone());
        s.add(parent.clone());
        s.add(kid.clone());
        s.add(grandkid.clone());

        let parent: Handle = parent;
        s.remove(&parent);
        assert!(s.is_empty());
    }

    #[test]
    fn re_added_kid_stays_an_orphan() {
        let (mut s, _, _) = screen(10, 10);
        let parent: Handle = handle(Marker::new(1.0, 1.0));
        let kid: Handle = handle(Marker::new(2.0, 2.0));
        s.add(parent.clone());
        s.spawn(parent.borrow_mut().body_mut(), kid.clone());
        assert!(kid.borrow().body().parent.is_some());

        s.remove(&parent);
        s.add(kid.clone());
        assert!(s.contains(&kid));
        assert!(!s.contains(&parent));
        assert!(parent.borrow().body().kids.is_empty());
        assert!(kid.borrow().body().parent.is_none());

        // The old parent no longer reaches it.
        s.remove(&parent);
        assert!(s.contains(&kid));
    }

    #[test]
    fn entity_reset_takes_kids_off_screen() {
        let (mut s, _, _) = screen(10, 10);
        let parent = handle(Marker::new(1.0, 1.0));
        let kid: Handle = handle(Marker::new(2.0, 2.0));
        let grandkid: Handle = handle(Marker::new(3.0, 3.0));
        kid.borrow_mut().body_mut().add_kid(grandkid.clone());
        s.add(parent.clone());
        s.add(kid.clone());
        s.add(grandkid.clone());
        parent.borrow_mut().body_mut().add_kid(kid.clone());

        parent.borrow_mut().reset(&mut s);
        let parent: Handle = parent;
        assert!(s.contains(&parent));
        assert!(!s.contains(&kid));
        assert!(!s.contains(&grandkid));
        assert!(parent.borrow().body().kids.is_empty());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn replace_keeps_position() {
        let (mut s, _, _) = screen(10, 10);
        let a: Handle = handle(Marker::new(0.0, 0.0));
        let b: Handle = handle(Marker::new(0.0, 0.0));
        let c: Handle = handle(Marker::new(0.0, 0.0));
        s.add(a.clone());
        s.add(b.clone());
        s.replace(&a, c.clone());
        assert!(same(&s.objects()[0], &c));
        assert!(same(&s.objects()[1], &b));
        assert!(!s.contains(&a));
    }

    #[test]
    fn expired_objects_are_culled_and_detached() {
        let (mut s, _, _) = screen(10, 10);
        let parent = handle(Marker::new(1.0, 1.0));
        let kid = handle(Marker::new(2.0, 2.0));
        let kid_handle: Handle = kid.clone();
        s.add(parent.clone());
        s.spawn(parent.borrow_mut().body_mut(), kid_handle.clone());
        assert_eq!(parent.borrow().body().kids.len(), 1);

        kid.borrow_mut().body_mut().expired = true;
        s.render().unwrap();
        assert!(!s.contains(&kid_handle));
        assert!(parent.borrow().body().kids.is_empty());
    }

    #[test]
    fn out_of_bounds_objects_are_culled_unless_protected() {
        let (mut s, _, _) = screen(10, 10);
        let gone = handle(Marker::new(-5.0, 5.0));
        let kept = handle(Marker::new(-5.0, 5.0));
        kept.borrow_mut().body_mut().protected = true;
        let gone_h: Handle = gone.clone();
        let kept_h: Handle = kept.clone();
        s.add(gone_h.clone());
        s.add(kept_h.clone());

        s.render().unwrap();
        assert!(!s.contains(&gone_h));
        assert!(s.contains(&kept_h));
    }

    #[test]
    fn invisible_objects_do_not_occupy_cells() {
        let (mut s, _, _) = screen(10, 10);
        let m = handle(Marker::new(1.0, 1.0));
        m.borrow_mut().body_mut().coords.insert((1, 1));
        m.borrow_mut().body_mut().visible = false;
        s.add(m.clone());
        s.render().unwrap();
        assert!(m.borrow().body().coords.is_empty());
    }

    #[test]
    fn resize_rebuilds_and_requests_scene_reset() {
        let (mut s, target, _) = screen(10, 10);
        s.render().unwrap();
        assert!(s.take_signals().is_empty());

        target.set_size(20, 8);
        // The size is checked on the first frame of every interval.
        for _ in 0..EngineConfig::default().resize_interval() {
            s.render().unwrap();
        }
        assert_eq!((s.width(), s.height()), (20, 8));
        assert_eq!(target.clears(), 1);
        assert_eq!(s.take_signals(), vec![Signal::ResetScene]);
    }

    #[test]
    fn failed_flush_is_recovered_outside_debug() {
        let (mut s, target, _) = screen(10, 10);
        target.fail_next_flush();
        s.render().unwrap();
        assert_eq!(target.clears(), 1);
        assert_eq!(s.take_signals(), vec![Signal::ResetScene]);
    }

    #[test]
    fn unreadable_size_keeps_the_extent_until_it_reads_again() {
        let config = EngineConfig {
            resize_check_frames: Some(1),
            ..EngineConfig::default()
        };
        let (mut s, target, _) = Screen::headless(10, 10, &config);
        target.fail_next_size();
        s.render().unwrap();
        assert_eq!((s.width(), s.height()), (10, 10));
        assert!(s.take_signals().is_empty());

        target.set_size(20, 8);
        s.render().unwrap();
        assert_eq!((s.width(), s.height()), (20, 8));
        assert_eq!(s.take_signals(), vec![Signal::ResetScene]);
    }

    #[test]
    fn rebuild_after_a_failed_flush_is_retried() {
        let (mut s, target, _) = screen(10, 10);
        s.render().unwrap();

        target.fail_next_flush();
        target.fail_next_size();
        s.render().unwrap();
        assert_eq!(target.clears(), 0);
        assert!(s.take_signals().is_empty());

        s.render().unwrap();
        assert_eq!(target.clears(), 1);
        assert_eq!(s.take_signals(), vec![Signal::ResetScene]);
    }

    #[test]
    fn unreadable_size_propagates_in_debug() {
        let config = EngineConfig {
            debug: true,
            ..EngineConfig::default()
        };
        let (mut s, target, _) = Screen::headless(10, 10, &config);
        target.fail_next_size();
        assert!(s.render().is_err());
    }

    #[test]
    fn failed_flush_propagates_in_debug() {
        let config = EngineConfig {
            debug: true,
            ..EngineConfig::default()
        };
        let (mut s, target, _) = Screen::headless(10, 10, &config);
        target.fail_next_flush();
        assert!(s.render().is_err());
    }

    #[test]
    fn rainbow_resolves_to_a_concrete_color() {
        let (s, _, _) = screen(10, 10);
        let mut s = s.with_seed(7);
        s.put((1, 1), '#', Some(Color::Rainbow));
        let glyph = s.buffer().pending(1, 1).unwrap();
        let color = glyph.color.unwrap();
        assert!(Color::RAINBOW.contains(&color));
    }

    #[test]
    fn border_draws_title_and_status() {
        let (mut s, _, _) = screen(30, 5);
        let mut border = Border::new('*').with_fps(false);
        border.title = "Geo".into();
        s.set_border(Some(border));
        s.set_status("score", 4);
        s.render().unwrap();

        let buf = s.buffer();
        assert_eq!(buf.committed(0, 0).map(|g| g.ch), Some('*'));
        assert_eq!(buf.committed(29, 4).map(|g| g.ch), Some('*'));
        assert_eq!(buf.committed(3, 0).map(|g| g.ch), Some('G'));
        assert_eq!(buf.committed(3, 4).map(|g| g.ch), Some('s'));
    }

    #[test]
    fn toggling_debug_off_clears_status() {
        let (mut s, _, _) = screen(10, 10);
        s.set_border(Some(Border::new('*')));
        s.toggle_debug();
        s.debug_info("x", 1);
        assert_eq!(s.status("x"), Some("1"));
        s.toggle_debug();
        assert_eq!(s.status("x"), None);
    }
}
