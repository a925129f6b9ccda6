//! When each marker departs and how long its flight takes.

use foundation::{Time, TimeSpan};
use rand::Rng;

use crate::config::FlightsConfig;

/// Where `speed_scaling` sits between `speed_min` and `speed_max`, in `[0, 1]`.
pub fn speed_factor(config: &FlightsConfig) -> f64 {
    let span = config.speed_max - config.speed_min;
    if span <= 0.0 {
        return 0.0;
    }
    ((config.speed_scaling - config.speed_min) / span).clamp(0.0, 1.0)
}

/// Longer arcs take longer; a faster speed setting shortens every flight.
pub fn flight_duration_ms(distance: f64, config: &FlightsConfig) -> f64 {
    (1.0 - speed_factor(config)) * distance * config.duration_ms_per_unit
}

fn jitter_ms<R: Rng + ?Sized>(max_ms: f64, rng: &mut R) -> f64 {
    if max_ms > 0.0 {
        rng.gen_range(0.0..max_ms)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSchedule {
    spans: Vec<TimeSpan>,
    durations_ms: Vec<f64>,
    start_jitter_ms: f64,
}

impl FlightSchedule {
    /// One span per distance, each starting a random moment after `now_ms`.
    pub fn new<R: Rng + ?Sized>(
        distances: &[f64],
        now_ms: f64,
        config: &FlightsConfig,
        rng: &mut R,
    ) -> Self {
        let durations_ms: Vec<f64> = distances
            .iter()
            .map(|d| flight_duration_ms(*d, config))
            .collect();
        let spans = durations_ms
            .iter()
            .map(|duration| {
                let start = now_ms + jitter_ms(config.start_jitter_ms, rng);
                TimeSpan::new(Time::from_millis(start), Time::from_millis(start + duration))
            })
            .collect();
        Self {
            spans,
            durations_ms,
            start_jitter_ms: config.start_jitter_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span(&self, index: usize) -> Option<TimeSpan> {
        self.spans.get(index).copied()
    }

    pub fn duration_ms(&self, index: usize) -> Option<f64> {
        self.durations_ms.get(index).copied()
    }

    /// Completed fraction of flight `index`; `0` until departure.
    pub fn progress(&self, index: usize, now_ms: f64) -> f64 {
        self.spans
            .get(index)
            .map(|span| span.fraction_at(Time::from_millis(now_ms)))
            .unwrap_or(0.0)
    }

    /// Send every landed flight off again. Returns how many were restarted.
    pub fn reschedule_finished<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> usize {
        let now = Time::from_millis(now_ms);
        let mut restarted = 0;
        for (span, duration) in self.spans.iter_mut().zip(&self.durations_ms) {
            if now > span.end {
                let start = now_ms + jitter_ms(self.start_jitter_ms, rng);
                *span = TimeSpan::new(Time::from_millis(start), Time::from_millis(start + duration));
                restarted += 1;
            }
        }
        restarted
    }
}
