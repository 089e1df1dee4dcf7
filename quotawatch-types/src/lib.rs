//! # quotawatch-types
//!
//! Response types for the storage console backend. Every endpoint answers
//! with a JSON envelope carrying a `success` flag, an optional `message`,
//! and an endpoint-specific body.
//!
//! Field names follow the console's camelCase schema. Older backends that
//! still emit snake_case names (`username`, `used_mb`, `top_users`, ...) are
//! accepted through serde aliases, so the same types decode both.
//!
//! ## Example
//!
//! ```rust
//! use quotawatch_types::{Envelope, QuotasResponse};
//!
//! let json = r#"{
//!     "success": true,
//!     "quotas": [
//!         { "identity": "alice", "usedMB": 850, "softLimitMB": 500, "hardLimitMB": 1000 }
//!     ]
//! }"#;
//!
//! let response: QuotasResponse = serde_json::from_str(json).unwrap();
//! assert!(response.success());
//! assert_eq!(response.quotas[0].hard_limit_mb, 1000.0);
//! ```

mod envelope;
mod monitoring;
mod quota;

pub use envelope::Envelope;
pub use monitoring::*;
pub use quota::*;
