//! # quotawatch-adapters
//!
//! Client for the storage console backend.
//!
//! [`ConsoleClient`] wraps the read-only endpoints (`/accounts`,
//! `/quota-policies`, `/quotas`, `/monitoring/*`) and returns the typed
//! responses from [`quotawatch_types`]. A response carrying
//! `success: false` becomes [`AdapterError::Backend`], so callers only ever
//! see successful payloads.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quotawatch_adapters::ConsoleClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ConsoleClient::builder()
//!         .endpoint("http://127.0.0.1:5000/api")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let quotas = client.quotas().await?;
//!     println!("{} accounts with quotas", quotas.quotas.len());
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "http")]
pub mod client;

pub use error::AdapterError;

#[cfg(feature = "http")]
pub use client::{ConsoleClient, ConsoleClientBuilder};

pub use quotawatch_types::{
    AccountsResponse, Envelope, PoliciesResponse, QuotasResponse, ServicesResponse,
    StorageResponse, SystemResponse,
};
