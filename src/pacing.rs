//! Frame pacing against a monotonic clock.
//!
//! Instead of sleeping a fixed interval per frame (which drifts with
//! render cost and sleep granularity), the pacer measures each frame's
//! actual duration and only sleeps the remainder of the frame budget.

use instant::{Duration, Instant};

#[derive(Debug)]
pub struct FramePacer {
    target: Duration,
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(target_fps: u32) -> Self {
        let target = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        };
        Self {
            target,
            frame_start: Instant::now(),
        }
    }

    /// Mark the start of a frame.
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Time left in the current frame's budget.
    pub fn remaining(&self) -> Duration {
        self.target.saturating_sub(self.frame_start.elapsed())
    }

    /// Sleep off the rest of the frame budget, if any.
    pub fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}
