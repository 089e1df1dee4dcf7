//! Accounts whose usage is tracked against a quota.

use serde::Serialize;

use super::policy::Limits;
use crate::error::PolicyError;

/// An account and its storage usage, in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Consumer {
    pub identity: String,
    pub used: u64,
    soft_limit: Option<u64>,
    hard_limit: Option<u64>,
}

impl Consumer {
    /// A consumer with no limits of its own.
    pub fn new(identity: impl Into<String>, used: u64) -> Self {
        Self {
            identity: identity.into(),
            used,
            soft_limit: None,
            hard_limit: None,
        }
    }

    /// Attach limits. Rejects `soft > hard` without modifying anything.
    pub fn with_limits(mut self, soft: u64, hard: u64) -> Result<Self, PolicyError> {
        let limits = Limits::new(soft, hard)?;
        self.soft_limit = Some(limits.soft);
        self.hard_limit = Some(limits.hard);
        Ok(self)
    }

    /// Attach a hard limit only; the soft limit falls back to it.
    pub fn with_hard_limit(mut self, hard: u64) -> Self {
        self.soft_limit = None;
        self.hard_limit = Some(hard);
        self
    }

    /// The consumer's own limits, if a non-zero hard limit is set.
    ///
    /// A missing soft limit falls back to the hard limit.
    pub fn limits(&self) -> Option<Limits> {
        let hard = self.hard_limit.filter(|&h| h > 0)?;
        let soft = self.soft_limit.unwrap_or(hard);
        Some(Limits { soft, hard })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_limits_rejects_inverted_pair() {
        let err = Consumer::new("alice", 0).with_limits(20, 10).unwrap_err();
        assert_eq!(err, PolicyError::ValidationRejected { soft: 20, hard: 10 });
    }

    #[test]
    fn test_limits() {
        let c = Consumer::new("alice", 5).with_limits(500, 1000).unwrap();
        assert_eq!(c.limits(), Some(Limits { soft: 500, hard: 1000 }));

        assert_eq!(Consumer::new("bob", 5).limits(), None);

        let zero = Consumer::new("carol", 5).with_hard_limit(0);
        assert_eq!(zero.limits(), None);

        let hard_only = Consumer::new("dave", 5).with_hard_limit(100);
        assert_eq!(hard_only.limits(), Some(Limits { soft: 100, hard: 100 }));
    }

    #[test]
    fn test_rejected_limits_leave_consumer_unchanged() {
        let c = Consumer::new("erin", 5).with_limits(50, 100).unwrap();
        assert!(c.clone().with_limits(200, 100).is_err());
        assert_eq!(c.limits(), Some(Limits { soft: 50, hard: 100 }));

        // A tight pair is kept as given.
        let tight = Consumer::new("frank", 5).with_limits(100, 100).unwrap();
        assert_eq!(tight.limits(), Some(Limits { soft: 100, hard: 100 }));
    }
}
