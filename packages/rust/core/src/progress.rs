//! Progress reporting for batch runs.

/// Receives batch status as rows are processed.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the processed share of rows reaches a new whole percent.
    fn percent(&self, value: u8);
    /// Called for every row that ends up in the error table.
    fn row_failed(&self, name: &str, errors: &[String]);
    /// Called once after the last row.
    fn done(&self, enriched: usize, failed: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn percent(&self, _value: u8) {}
    fn row_failed(&self, _name: &str, _errors: &[String]) {}
    fn done(&self, _enriched: usize, _failed: usize) {}
}

/// Throttles percentage emissions to whole-point increases.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: usize,
    last: u8,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self { total, last: 0 }
    }

    /// Record that `processed` rows are complete.
    ///
    /// Returns the percentage to emit, or `None` when it has not risen by a
    /// full point since the previous emission. The final row always emits.
    pub fn advance(&mut self, processed: usize) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let pct = (processed.min(self.total) * 100 / self.total) as u8;
        if processed >= self.total || pct > self.last {
            self.last = pct;
            Some(pct)
        } else {
            None
        }
    }
}
