use std::time::{Duration, Instant};

/// Wall-clock frame timer for real-time drivers.
///
/// `tick()` yields the seconds elapsed since the clock started, suitable to
/// pass straight into [`SceneEngine::update`](crate::SceneEngine::update).
/// Per-tick deltas are clamped so debugger pauses, minimized windows, and
/// stalls cannot feed pathological deltas downstream; the clamp shifts the
/// reported timeline rather than the raw `Instant`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: f64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: 0.0,
            dt_min,
            dt_max,
        }
    }

    /// Reset the baseline without rewinding the reported timeline. Useful
    /// when resuming after a suspension.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advance and return the clamped timeline position in seconds.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let mut dt = now.saturating_duration_since(self.last);
        if dt < self.dt_min {
            dt = self.dt_min;
        } else if dt > self.dt_max {
            dt = self.dt_max;
        }
        self.last = now;
        self.elapsed += dt.as_secs_f64();
        self.elapsed
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
