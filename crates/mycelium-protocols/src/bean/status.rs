//! Bean lifecycle status.

use serde::{Deserialize, Serialize};

/// Status of a bean inside the registry.
///
/// Transitions only move forward:
/// `NotStarted -> Started -> Stopping -> Stopped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeanStatus {
    #[default]
    NotStarted,
    Started,
    Stopping,
    Stopped,
}

impl BeanStatus {
    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    ///
    /// Re-applying the current status is allowed.
    pub fn can_transition_to(self, next: BeanStatus) -> bool {
        next >= self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(BeanStatus::NotStarted.can_transition_to(BeanStatus::Started));
        assert!(BeanStatus::Started.can_transition_to(BeanStatus::Stopping));
        assert!(BeanStatus::Stopping.can_transition_to(BeanStatus::Stopped));
        assert!(BeanStatus::NotStarted.can_transition_to(BeanStatus::Stopped));
    }

    #[test]
    fn test_same_status_is_allowed() {
        assert!(BeanStatus::Started.can_transition_to(BeanStatus::Started));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!BeanStatus::Stopped.can_transition_to(BeanStatus::Started));
        assert!(!BeanStatus::Stopping.can_transition_to(BeanStatus::NotStarted));
    }

    #[test]
    fn test_default_is_not_started() {
        assert_eq!(BeanStatus::default(), BeanStatus::NotStarted);
    }
}
