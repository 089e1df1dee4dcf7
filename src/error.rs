//! Engine error types.

use thiserror::Error;

use quotawatch_adapters::AdapterError;

/// A single category could not be refreshed.
///
/// Fetch failures are isolated per category: the previous snapshot stays in
/// place and the `Display` text is shown to the operator as a notice.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(#[from] AdapterError),

    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("backend reported: {0}")]
    Backend(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Policy lookup and validation failures.
///
/// These are returned synchronously to the caller and never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// No policy with the given id, or no default when none was selected.
    #[error("no matching quota policy")]
    NotFound,

    #[error("soft limit ({soft}) cannot be greater than hard limit ({hard})")]
    ValidationRejected { soft: u64, hard: u64 },

    #[error("quota limits must be positive")]
    InvalidLimits,

    #[error("policy name already exists: {0}")]
    DuplicateName(String),

    #[error("more than one default policy")]
    MultipleDefaults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        let err = FetchError::from(AdapterError::Timeout);
        assert_eq!(err.to_string(), "Request timed out");

        let err = FetchError::MissingField("metrics");
        assert_eq!(err.to_string(), "response is missing `metrics`");
    }

    #[test]
    fn test_validation_message_names_limits() {
        let err = PolicyError::ValidationRejected { soft: 20, hard: 10 };
        assert_eq!(
            err.to_string(),
            "soft limit (20) cannot be greater than hard limit (10)"
        );
    }
}
