//! Metrics collection for sweep cycles

use carrel_domain::ViolationType;
use std::collections::HashMap;
use std::time::Duration;

/// Metrics collected during sweep cycles
///
/// A cycle returns its own metrics; the janitor folds them into a running
/// total with [`absorb`](Self::absorb).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JanitorMetrics {
    /// Bookings expired, by the violation they were penalized for
    pub expired: HashMap<ViolationType, usize>,

    /// Checked-in bookings closed as completed by the sweep
    pub completed: usize,

    /// Per-user penalties applied
    pub penalties_applied: usize,

    /// Bookings whose status changed before the sweep could act
    pub skipped: usize,

    /// Bookings a dry run would have changed
    pub planned: usize,

    /// Bookings that failed and were left for the next cycle
    pub failures: usize,

    /// Total sweep iterations completed
    pub sweep_count: usize,

    /// Total time spent sweeping
    pub total_runtime: Duration,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an expired booking and the users penalized for it
    pub fn record_expiry(&mut self, kind: ViolationType, penalized: usize) {
        *self.expired.entry(kind).or_insert(0) += 1;
        self.penalties_applied += penalized;
    }

    /// Record a booking closed as completed
    pub fn record_completion(&mut self) {
        self.completed += 1;
    }

    /// Record a booking that was no longer in the observed status
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Record a change a dry run left unapplied
    pub fn record_planned(&mut self) {
        self.planned += 1;
    }

    /// Record a booking that could not be processed
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Record a sweep cycle completion
    pub fn record_sweep(&mut self, runtime: Duration) {
        self.sweep_count += 1;
        self.total_runtime += runtime;
    }

    /// Total bookings expired
    pub fn total_expired(&self) -> usize {
        self.expired.values().sum()
    }

    /// Bookings expired for one violation type
    pub fn expired_for(&self, kind: ViolationType) -> usize {
        self.expired.get(&kind).copied().unwrap_or(0)
    }

    /// Add another set of metrics into this one
    pub fn absorb(&mut self, other: &JanitorMetrics) {
        for (kind, count) in &other.expired {
            *self.expired.entry(*kind).or_insert(0) += count;
        }
        self.completed += other.completed;
        self.penalties_applied += other.penalties_applied;
        self.skipped += other.skipped;
        self.planned += other.planned;
        self.failures += other.failures;
        self.sweep_count += other.sweep_count;
        self.total_runtime += other.total_runtime;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "=======================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Total runtime: {}ms", self.total_runtime.as_millis()),
            String::new(),
        ];

        if !self.expired.is_empty() {
            lines.push("Expirations by violation:".to_string());
            for kind in [ViolationType::Checkin, ViolationType::Checkout] {
                let count = self.expired_for(kind);
                if count > 0 {
                    lines.push(format!("  {}: {}", kind.as_str(), count));
                }
            }
            lines.push(format!("  Total: {}", self.total_expired()));
            lines.push(String::new());
        }

        lines.push(format!("Completed: {}", self.completed));
        lines.push(format!("Penalties applied: {}", self.penalties_applied));
        lines.push(format!("Skipped (changed concurrently): {}", self.skipped));
        lines.push(format!("Failures: {}", self.failures));
        if self.planned > 0 {
            lines.push(format!("Planned (dry run): {}", self.planned));
        }

        lines.join("\n")
    }
}
