use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Shared counters for a batch of builds
#[derive(Clone, Default)]
pub struct BuildProgress {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    files_total: AtomicUsize,
    files_built: AtomicUsize,
    plugin_errors: AtomicUsize,
    failures: AtomicUsize,
    clock: Mutex<Clock>,
}

#[derive(Default)]
struct Clock {
    started_at: Option<Instant>,
    /// Frozen at `finish`
    elapsed: Option<Duration>,
}

/// Point-in-time view of a batch, printed as the build summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub files_total: usize,
    pub files_built: usize,
    pub plugin_errors: usize,
    pub failures: usize,
    pub elapsed_ms: u64,
}

impl ProgressSnapshot {
    /// Files that produced a document
    pub fn succeeded(&self) -> usize {
        self.files_built.saturating_sub(self.failures)
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Built {} of {} files in {} ms ({} plugin errors)",
            self.succeeded(),
            self.files_total,
            self.elapsed_ms,
            self.plugin_errors
        )
    }
}

impl BuildProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, total_files: usize) {
        self.inner.files_total.store(total_files, Ordering::Release);
        self.inner.files_built.store(0, Ordering::Release);
        self.inner.plugin_errors.store(0, Ordering::Release);
        self.inner.failures.store(0, Ordering::Release);
        if let Ok(mut clock) = self.inner.clock.lock() {
            *clock = Clock {
                started_at: Some(Instant::now()),
                elapsed: None,
            };
        }
    }

    /// Records a successful build and the plugin errors it collected
    pub fn inc(&self, plugin_errors: usize) {
        self.inner.files_built.fetch_add(1, Ordering::Relaxed);
        self.inner
            .plugin_errors
            .fetch_add(plugin_errors, Ordering::Relaxed);
    }

    /// Records a build that failed fatally
    pub fn inc_failure(&self) {
        self.inner.files_built.fetch_add(1, Ordering::Relaxed);
        self.inner.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Stops the clock; later snapshots report the batch duration
    pub fn finish(&self) {
        if let Ok(mut clock) = self.inner.clock.lock() {
            clock.elapsed = clock.started_at.map(|t| t.elapsed());
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let elapsed_ms = self
            .inner
            .clock
            .lock()
            .ok()
            .and_then(|clock| clock.elapsed.or_else(|| clock.started_at.map(|t| t.elapsed())))
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        ProgressSnapshot {
            files_total: self.inner.files_total.load(Ordering::Acquire),
            files_built: self.inner.files_built.load(Ordering::Acquire),
            plugin_errors: self.inner.plugin_errors.load(Ordering::Acquire),
            failures: self.inner.failures.load(Ordering::Acquire),
            elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_counts_builds_and_failures() {
        let progress = BuildProgress::new();
        progress.start(4);
        progress.inc(0);
        progress.inc(2);
        progress.inc_failure();

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.files_built, 3);
        assert_eq!(snapshot.plugin_errors, 2);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.succeeded(), 2);
    }

    #[test]
    fn test_start_resets_counters() {
        let progress = BuildProgress::new();
        progress.start(1);
        progress.inc_failure();
        progress.finish();
        progress.start(2);

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.files_built, 0);
        assert_eq!(snapshot.failures, 0);
        assert_eq!(snapshot.files_total, 2);
    }

    #[test]
    fn test_finish_freezes_elapsed() {
        let progress = BuildProgress::new();
        let clone = progress.clone();
        progress.start(1);
        clone.inc(0);
        clone.finish();

        let first = progress.snapshot();
        thread::sleep(Duration::from_millis(20));
        let second = progress.snapshot();

        assert_eq!(first.files_built, 1);
        assert_eq!(first.elapsed_ms, second.elapsed_ms);
    }

    #[test]
    fn test_summary_line() {
        let snapshot = ProgressSnapshot {
            files_total: 5,
            files_built: 5,
            plugin_errors: 1,
            failures: 2,
            elapsed_ms: 40,
        };

        assert_eq!(
            snapshot.to_string(),
            "Built 3 of 5 files in 40 ms (1 plugin errors)"
        );
    }
}
