use std::time::{Duration, Instant};

/// Wall-clock budget shared by both phases of a run
///
/// Cancellation is purely cooperative: the controller checks the budget
/// between discrete units of work (pages, URLs) and stops a phase early once
/// the remaining time falls under that phase's safety margin. Link
/// collection keeps a larger margin than extraction because an abandoned
/// page costs a whole page re-fetch, while an abandoned extraction only
/// loses one URL.
#[derive(Debug, Clone, Copy)]
pub struct RunBudget {
    started: Instant,
    max_runtime: Duration,
    collect_margin: Duration,
    extract_margin: Duration,
}

impl RunBudget {
    /// Starts the budget clock now
    pub fn start(max_runtime: Duration, collect_margin: Duration, extract_margin: Duration) -> Self {
        Self {
            started: Instant::now(),
            max_runtime,
            collect_margin,
            extract_margin,
        }
    }

    /// Time elapsed since the run started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// True once link collection must stop
    pub fn collect_exhausted(&self) -> bool {
        self.elapsed() + self.collect_margin >= self.max_runtime
    }

    /// True once field extraction must stop
    pub fn extract_exhausted(&self) -> bool {
        self.elapsed() + self.extract_margin >= self.max_runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_budget_is_not_exhausted() {
        let budget = RunBudget::start(
            Duration::from_secs(3600),
            Duration::from_secs(600),
            Duration::from_secs(300),
        );
        assert!(!budget.collect_exhausted());
        assert!(!budget.extract_exhausted());
    }

    #[test]
    fn test_margin_exhausts_collection_first() {
        // Runtime smaller than the collect margin but larger than extract
        let budget = RunBudget::start(
            Duration::from_secs(500),
            Duration::from_secs(600),
            Duration::from_secs(300),
        );
        assert!(budget.collect_exhausted());
        assert!(!budget.extract_exhausted());
    }

    #[test]
    fn test_zero_runtime_exhausts_both() {
        let budget = RunBudget::start(Duration::ZERO, Duration::ZERO, Duration::ZERO);
        assert!(budget.collect_exhausted());
        assert!(budget.extract_exhausted());
    }
}
