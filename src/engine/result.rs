// Tue Jan 13 2026 - Alex

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    Completed { exit_code: Option<i32>, streamed: bool },
    SpawnFailed(String),
    Abandoned,
}

impl HostOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, HostOutcome::Completed { .. })
    }

    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, HostOutcome::SpawnFailed(_))
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, HostOutcome::Abandoned)
    }
}

#[derive(Debug, Clone)]
pub struct HostResult {
    pub host: String,
    pub outcome: HostOutcome,
    pub tick: u64,
}

/// Every host of a run, in the order its final state was observed.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<HostResult>,
    pub ticks: u64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, host: &str, outcome: HostOutcome, tick: u64) {
        self.results.push(HostResult {
            host: host.to_string(),
            outcome,
            tick,
        });
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn hosts(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.host.as_str()).collect()
    }

    pub fn completed(&self) -> Vec<&str> {
        self.matching(HostOutcome::is_completed)
    }

    pub fn spawn_failed(&self) -> Vec<&str> {
        self.matching(HostOutcome::is_spawn_failure)
    }

    pub fn abandoned(&self) -> Vec<&str> {
        self.matching(HostOutcome::is_abandoned)
    }

    pub fn get(&self, host: &str) -> Option<&HostResult> {
        self.results.iter().find(|r| r.host == host)
    }

    pub fn failed_exit_count(&self) -> usize {
        self.results.iter()
            .filter(|r| matches!(r.outcome, HostOutcome::Completed { exit_code, .. } if exit_code != Some(0)))
            .count()
    }

    fn matching(&self, predicate: fn(&HostOutcome) -> bool) -> Vec<&str> {
        self.results.iter()
            .filter(|r| predicate(&r.outcome))
            .map(|r| r.host.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_partitions_hosts() {
        let mut summary = RunSummary::new();
        summary.record("a", HostOutcome::Completed { exit_code: Some(0), streamed: false }, 1);
        summary.record("b", HostOutcome::SpawnFailed("not found".to_string()), 0);
        summary.record("c", HostOutcome::Completed { exit_code: Some(1), streamed: true }, 70);
        summary.record("d", HostOutcome::Abandoned, 121);

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.hosts(), vec!["a", "b", "c", "d"]);
        assert_eq!(summary.completed(), vec!["a", "c"]);
        assert_eq!(summary.spawn_failed(), vec!["b"]);
        assert_eq!(summary.abandoned(), vec!["d"]);
        assert_eq!(summary.failed_exit_count(), 1);
        assert_eq!(summary.get("d").map(|r| r.tick), Some(121));
    }
}
