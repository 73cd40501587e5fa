use indicatif::ProgressBar;
use std::time::{Duration, Instant};

/// Minimum time between two progress reports of the exporter.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Receives the running number of processed messages.
pub trait Progress {
    fn processed(&mut self, count: u64);
}

impl Progress for ProgressBar {
    fn processed(&mut self, count: u64) {
        self.set_message(format!("Processed {} emails...", count));
        self.tick();
    }
}

/// Forwards at most one report per interval.
pub struct Throttled<P> {
    inner: P,
    interval: Duration,
    last: Instant,
}

impl<P: Progress> Throttled<P> {
    pub fn new(inner: P, interval: Duration) -> Self {
        Throttled {
            inner,
            interval,
            last: Instant::now(),
        }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn processed_at(&mut self, count: u64, now: Instant) {
        if now.duration_since(self.last) >= self.interval {
            self.inner.processed(count);
            self.last = now;
        }
    }
}

impl<P: Progress> Progress for Throttled<P> {
    fn processed(&mut self, count: u64) {
        self.processed_at(count, Instant::now());
    }
}

pub fn create_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    }
}
