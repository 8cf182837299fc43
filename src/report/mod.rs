use crate::types::RunResult;

/// Results of one pass, one entry per namespace in the order they were swept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub namespaces: Vec<RunResult>,
}

/// Totals across all namespaces of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub pods_checked: usize,
    pub killed_for_lifetime: usize,
    pub killed_for_eviction: usize,
    pub skipped_by_cap: usize,
}

impl PassReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_namespace_result(&mut self, result: RunResult) {
        self.namespaces.push(result);
    }

    pub fn summary(&self) -> ReportSummary {
        self.namespaces
            .iter()
            .fold(ReportSummary::default(), |acc, r| ReportSummary {
                pods_checked: acc.pods_checked + r.pods_checked,
                killed_for_lifetime: acc.killed_for_lifetime + r.killed_for_lifetime,
                killed_for_eviction: acc.killed_for_eviction + r.killed_for_eviction,
                skipped_by_cap: acc.skipped_by_cap + r.skipped_by_cap,
            })
    }
}

impl ReportSummary {
    pub fn pods_killed(&self) -> usize {
        self.killed_for_lifetime + self.killed_for_eviction
    }

    pub fn cap_reached(&self) -> bool {
        self.skipped_by_cap > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(
        namespace: &str,
        checked: usize,
        lifetime: usize,
        eviction: usize,
        skipped: usize,
    ) -> RunResult {
        RunResult {
            namespace: namespace.to_string(),
            pods_checked: checked,
            killed_for_lifetime: lifetime,
            killed_for_eviction: eviction,
            skipped_by_cap: skipped,
        }
    }

    #[test]
    fn test_empty_report_summary() {
        let summary = PassReport::new().summary();
        assert_eq!(summary, ReportSummary::default());
        assert_eq!(summary.pods_killed(), 0);
        assert!(!summary.cap_reached());
    }

    #[test]
    fn test_summary_adds_up_namespaces() {
        let mut report = PassReport::new();
        report.add_namespace_result(result("a", 10, 2, 1, 0));
        report.add_namespace_result(result("b", 5, 3, 0, 2));

        let summary = report.summary();
        assert_eq!(summary.pods_checked, 15);
        assert_eq!(summary.killed_for_lifetime, 5);
        assert_eq!(summary.killed_for_eviction, 1);
        assert_eq!(summary.pods_killed(), 6);
        assert!(summary.cap_reached());
        assert_eq!(report.namespaces[1].pods_killed(), 3);
    }
}
