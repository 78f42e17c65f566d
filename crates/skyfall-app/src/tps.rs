use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Client ticks per second over a sliding window.
pub struct TickCounter {
    timestamps: VecDeque<Instant>,
    window: Duration,
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl TickCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            timestamps: VecDeque::new(),
            window,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.timestamps.push_back(now);
        let Some(cutoff) = now.checked_sub(self.window) else {
            return;
        };
        while self.timestamps.front().is_some_and(|&t| t < cutoff) {
            self.timestamps.pop_front();
        }
    }

    /// `0.0` until two ticks have been seen.
    pub fn tps(&self) -> f64 {
        if self.timestamps.len() < 2 {
            return 0.0;
        }
        self.timestamps.len() as f64 / self.window.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_two_ticks() {
        let mut counter = TickCounter::default();
        assert_eq!(counter.tps(), 0.0);
        counter.tick(Instant::now());
        assert_eq!(counter.tps(), 0.0);
    }

    #[test]
    fn counts_ticks_inside_the_window() {
        let mut counter = TickCounter::default();
        let start = Instant::now();
        for i in 0..10 {
            counter.tick(start + Duration::from_millis(i * 100));
        }
        assert!((counter.tps() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn old_ticks_fall_out() {
        let mut counter = TickCounter::default();
        let start = Instant::now();
        for i in 0..5 {
            counter.tick(start + Duration::from_millis(i * 100));
        }
        counter.tick(start + Duration::from_secs(5));
        counter.tick(start + Duration::from_millis(5100));
        assert!((counter.tps() - 2.0).abs() < f64::EPSILON);
    }
}
