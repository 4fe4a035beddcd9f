use std::time::Duration;

/// Rolling window of frame durations for the diagnostics overlay.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    fn recorded(&self) -> &[Duration] {
        let count = if self.filled { self.capacity } else { self.index };
        &self.history[..count]
    }

    pub fn average(&self) -> Duration {
        let samples = self.recorded();
        if samples.is_empty() {
            return Duration::ZERO;
        }
        samples.iter().sum::<Duration>() / samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.recorded().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    /// Frames per second over the window, 0 when nothing is recorded.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}
