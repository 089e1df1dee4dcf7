//! Named quota policies and default resolution.
//!
//! A [`PolicyBook`] holds every policy the backend knows about, ordered by
//! name. At most one policy carries the default flag; [`PolicyBook::upsert`]
//! keeps it that way when a policy is edited into the default.

use serde::Serialize;

use quotawatch_types::PolicyEntry;

use super::consumer::Consumer;
use super::size::megabytes_to_bytes;
use crate::error::PolicyError;

/// A validated `(soft, hard)` limit pair, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub soft: u64,
    pub hard: u64,
}

impl Limits {
    /// Validate a limit pair. `soft > hard` is rejected.
    pub fn new(soft: u64, hard: u64) -> Result<Self, PolicyError> {
        if soft > hard {
            return Err(PolicyError::ValidationRejected { soft, hard });
        }
        Ok(Self { soft, hard })
    }

    /// Validate limits submitted by an operator, which must also be non-zero.
    pub fn validate_request(soft: u64, hard: u64) -> Result<Self, PolicyError> {
        if soft == 0 || hard == 0 {
            return Err(PolicyError::InvalidLimits);
        }
        Self::new(soft, hard)
    }
}

/// A named limit pair assignable to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub id: u64,
    pub name: String,
    pub soft_limit: u64,
    pub hard_limit: u64,
    pub is_default: bool,
    pub description: Option<String>,
}

impl Policy {
    pub fn limits(&self) -> Result<Limits, PolicyError> {
        Limits::new(self.soft_limit, self.hard_limit)
    }
}

impl From<PolicyEntry> for Policy {
    /// Policy limits arrive in megabytes.
    fn from(entry: PolicyEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.policy_name,
            soft_limit: megabytes_to_bytes(entry.soft_limit as f64),
            hard_limit: megabytes_to_bytes(entry.hard_limit as f64),
            is_default: entry.is_default,
            description: entry.description,
        }
    }
}

/// All known policies, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyBook {
    policies: Vec<Policy>,
}

impl PolicyBook {
    /// Build a book, validating every policy before accepting any.
    pub fn from_policies(policies: Vec<Policy>) -> Result<Self, PolicyError> {
        let mut book = Self { policies: Vec::with_capacity(policies.len()) };
        for policy in policies {
            policy.limits()?;
            if book.policies.iter().any(|p| p.name == policy.name) {
                return Err(PolicyError::DuplicateName(policy.name));
            }
            if policy.is_default && book.default_policy().is_some() {
                return Err(PolicyError::MultipleDefaults);
            }
            book.policies.push(policy);
        }
        book.policies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(book)
    }

    pub fn list_policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn default_policy(&self) -> Option<&Policy> {
        self.policies.iter().find(|p| p.is_default)
    }

    /// Resolve an explicit selection, or the default when there is none.
    ///
    /// `NotFound` with no selection means the caller has to ask for limits.
    pub fn resolve(&self, selection: Option<u64>) -> Result<&Policy, PolicyError> {
        match selection {
            Some(id) => self.policies.iter().find(|p| p.id == id),
            None => self.default_policy(),
        }
        .ok_or(PolicyError::NotFound)
    }

    /// Insert or replace a policy (matched by id).
    ///
    /// Validation happens before anything changes. A default policy clears
    /// the flag on every other policy.
    pub fn upsert(&mut self, policy: Policy) -> Result<(), PolicyError> {
        policy.limits()?;
        if self
            .policies
            .iter()
            .any(|p| p.name == policy.name && p.id != policy.id)
        {
            return Err(PolicyError::DuplicateName(policy.name));
        }

        if policy.is_default {
            for p in &mut self.policies {
                p.is_default = false;
            }
        }

        match self.policies.iter_mut().find(|p| p.id == policy.id) {
            Some(existing) => *existing = policy,
            None => self.policies.push(policy),
        }
        self.policies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(())
    }

    /// The limits that apply to a consumer: its own, else the default policy's.
    ///
    /// A default policy with a zero hard limit imposes no quota.
    pub fn effective_limits(&self, consumer: &Consumer) -> Option<Limits> {
        consumer.limits().or_else(|| {
            self.default_policy()
                .and_then(|p| p.limits().ok())
                .filter(|l| l.hard > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(id: u64, name: &str, soft: u64, hard: u64, is_default: bool) -> Policy {
        Policy {
            id,
            name: name.to_string(),
            soft_limit: soft,
            hard_limit: hard,
            is_default,
            description: None,
        }
    }

    #[test]
    fn test_list_ordered_by_name() {
        let book = PolicyBook::from_policies(vec![
            policy(1, "standard", 50, 100, true),
            policy(2, "large", 500, 1000, false),
            policy(3, "archive", 5, 10, false),
        ])
        .unwrap();

        let names: Vec<_> = book.list_policies().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["archive", "large", "standard"]);
    }

    #[test]
    fn test_resolve() {
        let book = PolicyBook::from_policies(vec![
            policy(1, "standard", 50, 100, true),
            policy(2, "large", 500, 1000, false),
        ])
        .unwrap();

        assert_eq!(book.resolve(None).unwrap().name, "standard");
        assert_eq!(book.resolve(Some(2)).unwrap().name, "large");
        assert_eq!(book.resolve(Some(9)), Err(PolicyError::NotFound));
    }

    #[test]
    fn test_resolve_without_default() {
        let book = PolicyBook::from_policies(vec![policy(2, "large", 500, 1000, false)]).unwrap();
        assert_eq!(book.resolve(None), Err(PolicyError::NotFound));
        assert_eq!(PolicyBook::default().resolve(None), Err(PolicyError::NotFound));
    }

    #[test]
    fn test_from_policies_validates() {
        let err = PolicyBook::from_policies(vec![policy(1, "bad", 200, 100, false)]).unwrap_err();
        assert_eq!(err, PolicyError::ValidationRejected { soft: 200, hard: 100 });

        let err = PolicyBook::from_policies(vec![
            policy(1, "a", 1, 2, true),
            policy(2, "b", 1, 2, true),
        ])
        .unwrap_err();
        assert_eq!(err, PolicyError::MultipleDefaults);

        let err = PolicyBook::from_policies(vec![
            policy(1, "a", 1, 2, false),
            policy(2, "a", 1, 2, false),
        ])
        .unwrap_err();
        assert_eq!(err, PolicyError::DuplicateName("a".into()));
    }

    #[test]
    fn test_upsert_keeps_single_default() {
        let mut book = PolicyBook::from_policies(vec![
            policy(1, "standard", 50, 100, true),
            policy(2, "large", 500, 1000, false),
        ])
        .unwrap();

        book.upsert(policy(2, "large", 500, 1000, true)).unwrap();
        book.upsert(policy(3, "huge", 5000, 10000, false)).unwrap();
        book.upsert(policy(3, "huge", 5000, 10000, true)).unwrap();

        let defaults: Vec<_> = book.list_policies().iter().filter(|p| p.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(book.resolve(None).unwrap().id, 3);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_upsert_rejects_before_mutation() {
        let mut book =
            PolicyBook::from_policies(vec![policy(1, "standard", 50, 100, true)]).unwrap();
        let before = book.clone();

        let err = book.upsert(policy(2, "broken", 300, 100, true)).unwrap_err();
        assert_eq!(err, PolicyError::ValidationRejected { soft: 300, hard: 100 });
        assert_eq!(book, before);

        let err = book.upsert(policy(4, "standard", 1, 2, false)).unwrap_err();
        assert_eq!(err, PolicyError::DuplicateName("standard".into()));
        assert_eq!(book, before);
    }

    #[test]
    fn test_validate_request() {
        assert_eq!(Limits::validate_request(0, 10), Err(PolicyError::InvalidLimits));
        assert_eq!(Limits::validate_request(10, 0), Err(PolicyError::InvalidLimits));
        assert_eq!(
            Limits::validate_request(20, 10),
            Err(PolicyError::ValidationRejected { soft: 20, hard: 10 })
        );
        assert_eq!(Limits::validate_request(10, 20), Ok(Limits { soft: 10, hard: 20 }));
    }

    #[test]
    fn test_effective_limits_falls_back_to_default() {
        let book = PolicyBook::from_policies(vec![policy(1, "standard", 500, 1000, true)]).unwrap();

        let own = Consumer::new("alice", 850).with_limits(10, 20).unwrap();
        assert_eq!(book.effective_limits(&own), Some(Limits { soft: 10, hard: 20 }));

        let bare = Consumer::new("bob", 850);
        assert_eq!(book.effective_limits(&bare), Some(Limits { soft: 500, hard: 1000 }));

        assert_eq!(PolicyBook::default().effective_limits(&bare), None);
    }

    #[test]
    fn test_zero_default_policy_imposes_no_quota() {
        let book = PolicyBook::from_policies(vec![policy(1, "unlimited", 0, 0, true)]).unwrap();
        let alice = Consumer::new("alice", 5);
        assert_eq!(book.effective_limits(&alice), None);

        let own = Consumer::new("bob", 5).with_limits(10, 20).unwrap();
        assert_eq!(book.effective_limits(&own), Some(Limits { soft: 10, hard: 20 }));
    }

    #[test]
    fn test_from_entry_converts_megabytes() {
        let entry = PolicyEntry {
            id: 7,
            policy_name: "standard".into(),
            soft_limit: 5120,
            hard_limit: 10240,
            is_default: true,
            description: Some("Default quota".into()),
        };
        let policy = Policy::from(entry);
        assert_eq!(policy.soft_limit, 5 << 30);
        assert_eq!(policy.hard_limit, 10 << 30);
        assert!(policy.is_default);
    }
}
