//! Counters for staleness checks, batches and syncs

/// Metrics collected by the scheduler and the owner console
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForkMetrics {
    /// Checks started
    pub checks_attempted: usize,

    /// Checks that produced a result
    pub checks_succeeded: usize,

    /// Checks that failed (including timeouts)
    pub checks_failed: usize,

    /// Checks abandoned because they hit the timeout
    pub checks_timed_out: usize,

    /// Successful checks that found the source had moved on
    pub updates_found: usize,

    /// Check results dropped because a newer result reached the cache first
    pub results_superseded: usize,

    /// Candidates skipped because a fresh cached result existed
    pub skipped_cached: usize,

    /// Candidates skipped because a check was already running
    pub skipped_in_flight: usize,

    /// Trees skipped because they carry no provenance
    pub skipped_not_clone: usize,

    /// Batches dispatched
    pub batches_dispatched: usize,

    /// Syncs that overwrote a clone
    pub syncs_completed: usize,
}

impl ForkMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Add another set of counters to this one
    pub fn merge(&mut self, other: &ForkMetrics) {
        self.checks_attempted += other.checks_attempted;
        self.checks_succeeded += other.checks_succeeded;
        self.checks_failed += other.checks_failed;
        self.checks_timed_out += other.checks_timed_out;
        self.updates_found += other.updates_found;
        self.results_superseded += other.results_superseded;
        self.skipped_cached += other.skipped_cached;
        self.skipped_in_flight += other.skipped_in_flight;
        self.skipped_not_clone += other.skipped_not_clone;
        self.batches_dispatched += other.batches_dispatched;
        self.syncs_completed += other.syncs_completed;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Fork Metrics Summary".to_string(),
            "====================".to_string(),
            format!("Batches dispatched: {}", self.batches_dispatched),
            format!(
                "Checks: {} attempted, {} succeeded, {} failed ({} timed out)",
                self.checks_attempted, self.checks_succeeded, self.checks_failed, self.checks_timed_out
            ),
            format!("Updates found: {}", self.updates_found),
            format!("Results superseded: {}", self.results_superseded),
            format!(
                "Skipped: {} cached, {} in flight, {} not clones",
                self.skipped_cached, self.skipped_in_flight, self.skipped_not_clone
            ),
            format!("Syncs completed: {}", self.syncs_completed),
        ];

        lines.join("\n")
    }
}
