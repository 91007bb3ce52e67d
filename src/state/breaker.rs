/// Consecutive-failure counter that halts a crawl run
///
/// Any successful fetch resets the streak. Once the streak reaches the
/// threshold the breaker stays tripped for the rest of the run.
#[derive(Debug, Clone)]
pub struct FailureBreaker {
    threshold: u32,
    consecutive: u32,
    total: usize,
}

impl FailureBreaker {
    /// Creates a breaker that trips after `threshold` consecutive failures
    ///
    /// A threshold of zero is treated as one.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive: 0,
            total: 0,
        }
    }

    /// Records a failed fetch and returns true if the breaker is now tripped
    pub fn record_failure(&mut self) -> bool {
        self.consecutive += 1;
        self.total += 1;
        self.is_tripped()
    }

    /// Records a successful fetch
    pub fn record_success(&mut self) {
        if !self.is_tripped() {
            self.consecutive = 0;
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.consecutive >= self.threshold
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive
    }

    /// Failures recorded over the whole run
    pub fn total_failures(&self) -> usize {
        self.total
    }
}
