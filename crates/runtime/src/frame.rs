use foundation::time::Time;

/// Largest frame delta fed to the simulation. Longer gaps (a backgrounded tab,
/// a debugger pause) are treated as a single slow frame.
pub const MAX_FRAME_DT_S: f64 = 0.1;

/// Frame metadata handed to everything that advances per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds), clamped to
    /// [`MAX_FRAME_DT_S`].
    pub dt_s: f64,
    /// Measured gap since the previous frame (milliseconds), unclamped.
    pub elapsed_ms: f64,
    /// Wall time at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64, time: Time) -> Self {
        Self {
            index,
            dt_s,
            elapsed_ms: dt_s * 1000.0,
            time,
        }
    }

    /// Fixed-timestep successor, used when replaying without a browser clock.
    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s, Time(self.time.0 + self.dt_s))
    }
}

/// Turns animation-frame timestamps into [`Frame`]s.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance using a timestamp in milliseconds.
    ///
    /// The first tick reports `dt_s == 0`. Timestamps that go backwards are
    /// treated as zero-length frames.
    pub fn tick(&mut self, now_ms: f64) -> Frame {
        let elapsed_ms = match self.last_ms {
            None => 0.0,
            Some(last) => (now_ms - last).max(0.0),
        };
        self.last_ms = Some(now_ms);

        let dt_s = (elapsed_ms / 1000.0).min(MAX_FRAME_DT_S);
        let frame = Frame {
            elapsed_ms,
            ..Frame::new(self.index, dt_s, Time::from_millis(now_ms))
        };
        self.index += 1;
        frame
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameClock, MAX_FRAME_DT_S};
    use foundation::time::Time;

    #[test]
    fn next_advances_index_and_time() {
        let f0 = Frame::new(0, 0.5, Time(0.0));
        let f1 = f0.next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
    }

    #[test]
    fn first_tick_has_zero_dt() {
        let mut clock = FrameClock::new();
        let f = clock.tick(1000.0);
        assert_eq!(f.index, 0);
        assert_eq!(f.dt_s, 0.0);
        assert_eq!(f.time, Time(1.0));
    }

    #[test]
    fn tick_measures_delta_and_clamps_gaps() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        let f = clock.tick(16.0);
        assert!((f.dt_s - 0.016).abs() < 1e-12);
        assert_eq!(f.index, 1);

        let f = clock.tick(10_000.0);
        assert_eq!(f.dt_s, MAX_FRAME_DT_S);
        // The measured gap survives for reporting.
        assert_eq!(f.elapsed_ms, 9_984.0);

        let f = clock.tick(5_000.0);
        assert_eq!(f.dt_s, 0.0);
        assert_eq!(f.elapsed_ms, 0.0);
        assert_eq!(clock.frames_elapsed(), 4);
    }
}
