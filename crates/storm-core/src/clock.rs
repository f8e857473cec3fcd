//! Monotonic time source for the frame loop.
//!
//! `Clock` is driven with explicit timestamps so ticks can be replayed with
//! synthetic times in tests; `WallClock` supplies real ones.

use instant::Instant;

/// Timing handed to every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the first observed timestamp.
    pub elapsed: f32,
    /// Seconds since the previous tick (0 on the first tick).
    pub delta: f32,
    /// Zero-based tick counter.
    pub frame: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Clock {
    origin: Option<f64>,
    last: f64,
    frame: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to an absolute timestamp in seconds. Timestamps that go
    /// backwards are treated as "no time passed".
    pub fn advance_to(&mut self, now_sec: f64) -> FrameTime {
        let origin = *self.origin.get_or_insert(now_sec);
        let now = (now_sec - origin).max(self.last);
        let delta = if self.frame == 0 { 0.0 } else { now - self.last };
        self.last = now;
        let ft = FrameTime {
            elapsed: now as f32,
            delta: delta as f32,
            frame: self.frame,
        };
        self.frame += 1;
        ft
    }

    /// Advance by a fixed step, for scripted playback.
    pub fn advance_by(&mut self, dt_sec: f64) -> FrameTime {
        let base = self.origin.unwrap_or(0.0) + self.last;
        let next = if self.frame == 0 {
            base
        } else {
            base + dt_sec.max(0.0)
        };
        self.advance_to(next)
    }

    pub fn elapsed(&self) -> f32 {
        self.last as f32
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }
}

/// Wall-clock timestamps relative to construction.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_sec(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}
