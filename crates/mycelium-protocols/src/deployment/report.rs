//! Outcome of one deployment batch.

use super::Locator;
use crate::error::DeployError;

/// What happened to every locator handed to one `deploy` call.
///
/// Unit failures are collected here instead of being returned as an error:
/// one failing unit never fails the batch.
#[derive(Debug, Default)]
pub struct DeployReport {
    /// Units that activated successfully.
    pub deployed: Vec<Locator>,
    /// Units no deployer accepted.
    pub skipped: Vec<Locator>,
    /// Units whose activation failed, with the captured failure.
    pub failed: Vec<(Locator, DeployError)>,
}

impl DeployReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.deployed.len() + self.skipped.len() + self.failed.len()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: DeployReport) {
        self.deployed.extend(other.deployed);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    pub fn failure(&self, locator: &Locator) -> Option<&DeployError> {
        self.failed
            .iter()
            .find(|(l, _)| l == locator)
            .map(|(_, e)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut report = DeployReport {
            deployed: vec![Locator::new("a")],
            ..Default::default()
        };
        report.merge(DeployReport {
            failed: vec![(Locator::new("b"), DeployError::Custom("boom".into()))],
            skipped: vec![Locator::new("c")],
            ..Default::default()
        });

        assert_eq!(report.total(), 3);
        assert!(!report.is_success());
        assert!(report.failure(&Locator::new("b")).is_some());
        assert!(report.failure(&Locator::new("a")).is_none());
    }
}
