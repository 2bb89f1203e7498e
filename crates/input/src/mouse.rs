/// Turns absolute cursor positions into look deltas.
///
/// The first sample only seeds the tracker so the camera does not jump when
/// the cursor first enters the window.
#[derive(Debug, Clone, Default)]
pub struct MouseTracker {
    last: Option<(f64, f64)>,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cursor position and return the `(dx, dy)` since the previous one.
    ///
    /// `dy` is inverted: window y grows downwards, pitch grows upwards.
    pub fn track(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        let delta = self
            .last
            .map(|(last_x, last_y)| ((x - last_x) as f32, (last_y - y) as f32));
        self.last = Some((x, y));
        delta
    }

    /// Forget the last position; the next sample is treated as the first.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
