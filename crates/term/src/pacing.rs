use std::collections::VecDeque;
use std::time::Duration;

use crate::types::FPS_WINDOW;

/// Caps the frame rate and tracks the achieved rate.
#[derive(Debug, Clone)]
pub struct FramePacer {
    fps_limit: u32,
    frame_times: VecDeque<Duration>,
}

impl FramePacer {
    pub fn new(fps_limit: u32) -> Self {
        Self {
            fps_limit: fps_limit.max(1),
            frame_times: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    pub fn fps_limit(&self) -> u32 {
        self.fps_limit
    }

    /// Time budget of one frame.
    pub fn budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps_limit as f64)
    }

    /// How long to sleep after a frame that took `render_time`.
    ///
    /// Sleeping is skipped when the remaining budget is under a tenth of a
    /// frame, since the sleep would overshoot more than it helps.
    pub fn sleep_for(&self, render_time: Duration) -> Option<Duration> {
        let budget = self.budget();
        let remaining = budget.checked_sub(render_time)?;
        if remaining > budget.mul_f64(0.1) {
            Some(remaining)
        } else {
            None
        }
    }

    /// Record the full duration of a frame, sleep included.
    pub fn record(&mut self, frame_time: Duration) {
        if self.frame_times.len() == FPS_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
    }

    /// Sleep out the rest of the frame and record it.
    pub fn pace(&mut self, render_time: Duration) {
        let mut frame_time = render_time;
        if let Some(sleep) = self.sleep_for(render_time) {
            std::thread::sleep(sleep);
            frame_time += sleep;
        }
        self.record(frame_time);
    }

    /// Rolling average frame rate, `None` before the first frame.
    pub fn fps(&self) -> Option<u32> {
        if self.frame_times.is_empty() {
            return None;
        }
        let total: Duration = self.frame_times.iter().sum();
        let avg = total.as_secs_f64() / self.frame_times.len() as f64;
        if avg <= 0.0 {
            return None;
        }
        Some((1.0 / avg).round() as u32)
    }
}
