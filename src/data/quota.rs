//! Quota evaluation and severity classification.
//!
//! Percentages are always taken against the hard limit. Severity uses fixed
//! thresholds with inclusive lower bounds; [`Severity::classify`] is the only
//! place they are applied, and host gauges reuse it.

use std::fmt;

use serde::Serialize;

use super::consumer::Consumer;
use super::policy::Limits;

/// Lower bound of [`Severity::Warning`], in percent.
pub const WARNING_PERCENT: f64 = 60.0;
/// Lower bound of [`Severity::Critical`], in percent.
pub const CRITICAL_PERCENT: f64 = 80.0;
/// Lower bound of [`Severity::OverLimit`], in percent.
pub const OVER_LIMIT_PERCENT: f64 = 100.0;

/// Usage severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    OverLimit,
}

impl Severity {
    /// Classify a usage percentage.
    pub fn classify(percentage: f64) -> Self {
        if percentage >= OVER_LIMIT_PERCENT {
            Severity::OverLimit
        } else if percentage >= CRITICAL_PERCENT {
            Severity::Critical
        } else if percentage >= WARNING_PERCENT {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARN",
            Severity::Critical => "CRIT",
            Severity::OverLimit => "OVER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
            Severity::OverLimit => "Over Limit",
        }
    }

    pub const ALL: [Severity; 4] = [
        Severity::Ok,
        Severity::Warning,
        Severity::Critical,
        Severity::OverLimit,
    ];
}

/// Percentage used and its severity. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotaStatus {
    pub percentage: f64,
    pub severity: Severity,
}

/// Evaluate usage against a hard limit.
///
/// A zero (or negative) hard limit yields 0%. Negative usage is passed
/// through unchanged and shows up as a negative percentage.
pub fn evaluate(used: f64, _soft_limit: f64, hard_limit: f64) -> QuotaStatus {
    let percentage = if hard_limit > 0.0 {
        used / hard_limit * 100.0
    } else {
        0.0
    };
    QuotaStatus {
        percentage,
        severity: Severity::classify(percentage),
    }
}

/// Operator-facing notice attached to a quota report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuotaNotice {
    HardExceeded,
    SoftExceeded,
    Approaching { percentage: f64 },
}

impl fmt::Display for QuotaNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaNotice::HardExceeded => {
                f.write_str("exceeded hard limit, no more writes allowed")
            }
            QuotaNotice::SoftExceeded => f.write_str("exceeded soft limit, grace period running"),
            QuotaNotice::Approaching { percentage } => {
                write!(f, "approaching quota limit ({:.1}%)", percentage)
            }
        }
    }
}

/// Full quota assessment for one consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaReport {
    pub status: QuotaStatus,
    pub limits: Option<Limits>,
    pub over_soft: bool,
    pub over_hard: bool,
    /// Bytes left before the hard limit. `None` when no limit applies.
    pub available: Option<u64>,
    pub notice: Option<QuotaNotice>,
}

/// Assess a consumer against its effective limits.
pub fn assess(consumer: &Consumer, limits: Option<Limits>) -> QuotaReport {
    // A zero hard limit means no quota.
    let Some(limits) = limits.filter(|l| l.hard > 0) else {
        return QuotaReport {
            status: evaluate(consumer.used as f64, 0.0, 0.0),
            limits: None,
            over_soft: false,
            over_hard: false,
            available: None,
            notice: None,
        };
    };

    let status = evaluate(
        consumer.used as f64,
        limits.soft as f64,
        limits.hard as f64,
    );
    let over_soft = consumer.used >= limits.soft;
    let over_hard = consumer.used >= limits.hard;

    let notice = if over_hard {
        Some(QuotaNotice::HardExceeded)
    } else if over_soft {
        Some(QuotaNotice::SoftExceeded)
    } else if status.percentage >= CRITICAL_PERCENT {
        Some(QuotaNotice::Approaching {
            percentage: status.percentage,
        })
    } else {
        None
    };

    QuotaReport {
        status,
        limits: Some(limits),
        over_soft,
        over_hard,
        available: Some(limits.hard.saturating_sub(consumer.used)),
        notice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hard_limit_is_zero_percent() {
        for used in [0.0, 1.0, 1e12] {
            let status = evaluate(used, 0.0, 0.0);
            assert_eq!(status.percentage, 0.0);
            assert_eq!(status.severity, Severity::Ok);
        }
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(evaluate(59.999, 0.0, 100.0).severity, Severity::Ok);
        assert_eq!(evaluate(60.0, 0.0, 100.0).severity, Severity::Warning);
        assert_eq!(evaluate(79.999, 0.0, 100.0).severity, Severity::Warning);
        assert_eq!(evaluate(80.0, 0.0, 100.0).severity, Severity::Critical);
        assert_eq!(evaluate(99.999, 0.0, 100.0).severity, Severity::Critical);
        assert_eq!(evaluate(100.0, 0.0, 100.0).severity, Severity::OverLimit);
        assert_eq!(evaluate(250.0, 0.0, 100.0).severity, Severity::OverLimit);
    }

    #[test]
    fn test_policy_example() {
        let status = evaluate(850.0, 500.0, 1000.0);
        assert_eq!(status.percentage, 85.0);
        assert_eq!(status.severity, Severity::Critical);
    }

    #[test]
    fn test_negative_usage_passes_through() {
        let status = evaluate(-10.0, 0.0, 100.0);
        assert_eq!(status.percentage, -10.0);
        assert_eq!(status.severity, Severity::Ok);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Ok < Severity::Warning);
        assert!(Severity::Critical < Severity::OverLimit);
        assert_eq!(Severity::ALL.iter().max(), Some(&Severity::OverLimit));
    }

    #[test]
    fn test_assess_without_limits() {
        let report = assess(&Consumer::new("alice", 500), None);
        assert_eq!(report.status.percentage, 0.0);
        assert!(!report.over_soft);
        assert!(report.available.is_none());
        assert!(report.notice.is_none());
    }

    #[test]
    fn test_assess_zero_limits_as_unlimited() {
        let zero = Limits::new(0, 0).unwrap();
        let report = assess(&Consumer::new("alice", 5), Some(zero));
        assert_eq!(report.status.severity, Severity::Ok);
        assert!(report.limits.is_none());
        assert!(!report.over_soft && !report.over_hard);
        assert!(report.available.is_none());
        assert!(report.notice.is_none());
    }

    #[test]
    fn test_assess_notices() {
        let limits = Limits::new(500, 1000).unwrap();

        let report = assess(&Consumer::new("a", 1000), Some(limits));
        assert!(report.over_hard && report.over_soft);
        assert_eq!(report.available, Some(0));
        assert_eq!(report.notice, Some(QuotaNotice::HardExceeded));

        let report = assess(&Consumer::new("b", 600), Some(limits));
        assert!(report.over_soft && !report.over_hard);
        assert_eq!(report.available, Some(400));
        assert_eq!(report.notice, Some(QuotaNotice::SoftExceeded));

        let limits = Limits::new(950, 1000).unwrap();
        let report = assess(&Consumer::new("c", 850), Some(limits));
        assert_eq!(
            report.notice,
            Some(QuotaNotice::Approaching { percentage: 85.0 })
        );
        assert_eq!(
            report.notice.map(|n| n.to_string()).as_deref(),
            Some("approaching quota limit (85.0%)")
        );

        let report = assess(&Consumer::new("d", 100), Some(limits));
        assert!(report.notice.is_none());
    }

    #[test]
    fn test_severity_serializes_upper_case() {
        let json = serde_json::to_string(&Severity::OverLimit).unwrap();
        assert_eq!(json, "\"OVER_LIMIT\"");
    }
}
