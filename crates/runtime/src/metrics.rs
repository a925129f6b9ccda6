/// Frame-time aggregation for periodic log lines.
///
/// Values are milliseconds. `take_report` returns the window and starts a new one.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FrameStats {
    pub count: u64,
    pub sum_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame_ms: f64) {
        if self.count == 0 {
            self.min_ms = frame_ms;
            self.max_ms = frame_ms;
        } else {
            self.min_ms = self.min_ms.min(frame_ms);
            self.max_ms = self.max_ms.max(frame_ms);
        }
        self.count += 1;
        self.sum_ms += frame_ms;
    }

    pub fn mean_ms(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_ms / self.count as f64)
    }

    pub fn fps(&self) -> Option<f64> {
        self.mean_ms().filter(|m| *m > 0.0).map(|m| 1000.0 / m)
    }

    pub fn take_report(&mut self) -> FrameStats {
        std::mem::take(self)
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mean_ms() {
            Some(mean) => write!(
                f,
                "{} frames, mean {mean:.2}ms, min {:.2}ms, max {:.2}ms",
                self.count, self.min_ms, self.max_ms
            ),
            None => write!(f, "no frames"),
        }
    }
}
