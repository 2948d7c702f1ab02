//! Batch aggregation over per-file results.

use super::FileValidationResult;

#[derive(Debug, Clone, Default)]
/// Ordered per-file results of a batch run.
pub struct BatchReport {
    pub results: Vec<FileValidationResult>,
    /// Set when an interrupt stopped the batch before every file ran.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn push(&mut self, result: FileValidationResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn failing_paths(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.path.as_str())
            .collect()
    }

    /// Share of `count` in the batch, 0.0 for an empty batch.
    pub fn percent(&self, count: usize) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            count as f64 / self.total() as f64 * 100.0
        }
    }

    /// True iff every file passed and the run was not interrupted.
    pub fn success(&self) -> bool {
        !self.cancelled && self.failed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(path: &str) -> FileValidationResult {
        FileValidationResult::from_steps(path, None, Vec::new())
    }

    #[test]
    fn test_one_failure_in_batch() {
        let mut report = BatchReport::default();
        report.push(ok("a.lua"));
        report.push(FileValidationResult::input_failure("b.lua", "missing"));
        report.push(ok("c.lua"));
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failing_paths(), vec!["b.lua"]);
        assert!(!report.success());
        assert!((report.percent(report.passed()) - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_cancelled_batch_is_not_success() {
        let mut report = BatchReport::default();
        report.push(ok("a.lua"));
        assert!(report.success());
        report.cancelled = true;
        assert!(!report.success());
    }
}
