//! Account, quota and quota-policy responses.

use serde::{Deserialize, Serialize};

use crate::envelope::bool_or_int;

/// `GET /accounts`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, alias = "users")]
    pub accounts: Vec<AccountEntry>,
}

/// A single account as listed by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountEntry {
    #[serde(alias = "username")]
    pub identity: String,

    /// Human-readable usage, e.g. `"1.5G"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

/// `GET /quota-policies`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoliciesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub policies: Vec<PolicyEntry>,
}

/// A named quota policy. Limits are expressed in megabytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub id: u64,

    #[serde(rename = "policyName", alias = "policy_name")]
    pub policy_name: String,

    #[serde(rename = "softLimit", alias = "soft_limit")]
    pub soft_limit: u64,

    #[serde(rename = "hardLimit", alias = "hard_limit")]
    pub hard_limit: u64,

    #[serde(
        rename = "isDefault",
        alias = "is_default",
        default,
        deserialize_with = "bool_or_int"
    )]
    pub is_default: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `GET /quotas`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuotasResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub quotas: Vec<QuotaEntry>,
}

/// Usage and limits for one account, in megabytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuotaEntry {
    #[serde(alias = "username")]
    pub identity: String,

    #[serde(rename = "usedMB", alias = "used_mb", default)]
    pub used_mb: f64,

    #[serde(rename = "softLimitMB", alias = "soft_limit_mb", default)]
    pub soft_limit_mb: f64,

    #[serde(rename = "hardLimitMB", alias = "hard_limit_mb", default)]
    pub hard_limit_mb: f64,

    /// Percentage as computed by the backend. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,

    /// Remaining grace period reported by the quota tooling, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace: Option<String>,
}
