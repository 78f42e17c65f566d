//! Interval-gated process sampling over `sysinfo`.
//!
//! HUD frames arrive far more often than sysinfo can produce meaningful CPU
//! deltas, so [`TelemetryCollector::maybe_refresh`] only refreshes once per
//! interval and otherwise keeps serving the previous sample.

use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessesToUpdate, System};

#[derive(Debug, Clone)]
pub struct ProcessSample {
    /// Whole-machine CPU usage, NaN until the first refresh.
    pub cpu_global: f32,
    pub mem_total: u64,
    pub mem_used: u64,
    /// Resident set size of the host process.
    pub self_rss: Option<u64>,
    pub self_cpu: Option<f32>,
}

impl Default for ProcessSample {
    fn default() -> Self {
        Self {
            cpu_global: f32::NAN,
            mem_total: 0,
            mem_used: 0,
            self_rss: None,
            self_cpu: None,
        }
    }
}

pub struct TelemetryCollector {
    sys: System,
    self_pid: Pid,
    interval: Duration,
    last_refresh: Option<Instant>,
    sample: ProcessSample,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    pub fn with_interval(interval: Duration) -> Self {
        let mut sys = System::new();
        // The first CPU reading is always zero; take it now.
        sys.refresh_cpu_usage();

        Self {
            sys,
            self_pid: Pid::from_u32(std::process::id()),
            interval,
            last_refresh: None,
            sample: ProcessSample::default(),
        }
    }

    /// Refresh when `interval` has passed since the last refresh. Returns
    /// whether a refresh happened.
    pub fn maybe_refresh(&mut self, now: Instant) -> bool {
        let due = match self.last_refresh {
            None => true,
            Some(last) => now
                .checked_duration_since(last)
                .is_some_and(|elapsed| elapsed >= self.interval),
        };
        if !due {
            return false;
        }
        self.last_refresh = Some(now);

        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.sys
            .refresh_processes(ProcessesToUpdate::Some(&[self.self_pid]), false);

        self.sample.cpu_global = self.sys.global_cpu_usage();
        self.sample.mem_total = self.sys.total_memory();
        self.sample.mem_used = self.sys.used_memory();
        let process = self.sys.process(self.self_pid);
        self.sample.self_rss = process.map(|p| p.memory());
        self.sample.self_cpu = process.map(|p| p.cpu_usage());

        true
    }

    pub fn sample(&self) -> &ProcessSample {
        &self.sample
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_is_gated_by_interval() {
        let mut c = TelemetryCollector::with_interval(Duration::from_secs(60));
        let now = Instant::now();
        assert!(c.maybe_refresh(now));
        assert!(!c.maybe_refresh(now));
        assert!(c.maybe_refresh(now + Duration::from_secs(61)));
    }

    #[test]
    fn sample_is_empty_before_first_refresh() {
        let c = TelemetryCollector::new();
        assert!(c.sample().cpu_global.is_nan());
        assert!(c.sample().self_rss.is_none());
    }

    #[test]
    fn own_process_is_found() {
        let mut c = TelemetryCollector::new();
        c.maybe_refresh(Instant::now());
        assert!(c.sample().mem_total > 0);
        assert!(c.sample().self_rss.is_some());
    }
}
