/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    pub fn as_millis(self) -> f64 {
        self.0 * 1000.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    pub fn duration(&self) -> f64 {
        (self.end.0 - self.start.0).max(0.0)
    }

    pub fn contains(&self, t: Time) -> bool {
        t.0 >= self.start.0 && t.0 <= self.end.0
    }

    /// Linear progress through the span at `t`, clamped to `[0, 1]`.
    ///
    /// Zero-length spans report `0` before `start` and `1` from `start` on.
    pub fn fraction_at(&self, t: Time) -> f64 {
        let d = self.duration();
        if d <= 0.0 {
            return if t.0 < self.start.0 { 0.0 } else { 1.0 };
        }
        ((t.0 - self.start.0) / d).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Time, TimeSpan};

    #[test]
    fn millis_conversion() {
        assert_eq!(Time::from_millis(1500.0), Time(1.5));
        assert_eq!(Time(2.0).as_millis(), 2000.0);
    }

    #[test]
    fn fraction_is_clamped() {
        let span = TimeSpan::new(Time(10.0), Time(20.0));
        assert_eq!(span.fraction_at(Time(5.0)), 0.0);
        assert_eq!(span.fraction_at(Time(15.0)), 0.5);
        assert_eq!(span.fraction_at(Time(25.0)), 1.0);
        assert!(span.contains(Time(20.0)));
        assert!(!span.contains(Time(20.5)));
    }

    #[test]
    fn instant_span_jumps_at_start() {
        let span = TimeSpan::instant(Time(3.0));
        assert_eq!(span.duration(), 0.0);
        assert_eq!(span.fraction_at(Time(2.0)), 0.0);
        assert_eq!(span.fraction_at(Time(3.0)), 1.0);
    }
}
