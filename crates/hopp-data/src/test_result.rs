use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectResult {
    pub status: ExpectStatus,
    pub message: String,
}

/// Report produced by a test script run
///
/// Stored and replaced as a whole by the session; only the counters below
/// look inside it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub description: String,
    #[serde(default)]
    pub expect_results: Vec<ExpectResult>,
    #[serde(default)]
    pub tests: Vec<TestReport>,
    #[serde(default)]
    pub script_error: bool,
    #[serde(default)]
    pub console: Vec<String>,
}

impl TestReport {
    pub fn passed(&self) -> usize {
        self.count(ExpectStatus::Pass)
    }

    pub fn failed(&self) -> usize {
        self.count(ExpectStatus::Fail) + self.count(ExpectStatus::Error)
    }

    fn count(&self, status: ExpectStatus) -> usize {
        let own = self
            .expect_results
            .iter()
            .filter(|r| r.status == status)
            .count();
        own + self.tests.iter().map(|t| t.count(status)).sum::<usize>()
    }
}
