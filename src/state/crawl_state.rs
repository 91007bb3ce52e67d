/// Crawl run state definitions
///
/// A run moves `Idle -> Running` and then ends in `Done` (frontier exhausted or
/// page ceiling reached) or `Aborted` (circuit breaker tripped).
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the lifecycle state of one documentation crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlState {
    /// Session created, nothing fetched yet
    Idle,

    /// Processing the frontier
    Running,

    /// Frontier exhausted or page ceiling reached
    Done,

    /// Halted by too many consecutive fetch failures
    Aborted,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Checks whether moving from `self` to `next` is allowed
    ///
    /// Valid transitions:
    /// - Idle -> Running
    /// - Idle -> Done (nothing to crawl)
    /// - Running -> Done
    /// - Running -> Aborted
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Done)
                | (Self::Running, Self::Done)
                | (Self::Running, Self::Aborted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
