use std::time::{Duration, Instant};

/// Longest frame step handed to the camera.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Monotonic frame clock with a rolling history of frame times.
pub struct FrameClock {
    last: Instant,
    history: Vec<Duration>,
    index: usize,
    filled: bool,
    frames: u64,
}

impl FrameClock {
    pub fn new(capacity: usize) -> Self {
        Self::starting_at(Instant::now(), capacity)
    }

    pub fn starting_at(start: Instant, capacity: usize) -> Self {
        Self {
            last: start,
            history: vec![Duration::ZERO; capacity.max(1)],
            index: 0,
            filled: false,
            frames: 0,
        }
    }

    /// Start a new frame and return the elapsed seconds since the previous one.
    pub fn tick(&mut self) -> f32 {
        self.advance(Instant::now())
    }

    pub fn advance(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.record(elapsed);
        elapsed.as_secs_f32().min(MAX_FRAME_DT)
    }

    fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
        self.frames += 1;
    }

    fn recorded(&self) -> &[Duration] {
        let count = if self.filled {
            self.history.len()
        } else {
            self.index
        };
        &self.history[..count]
    }

    /// Total frames since the clock started.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn average(&self) -> Duration {
        let recorded = self.recorded();
        if recorded.is_empty() {
            return Duration::ZERO;
        }
        recorded.iter().sum::<Duration>() / recorded.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.recorded().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.recorded().iter().copied().min().unwrap_or(Duration::ZERO)
    }
}
