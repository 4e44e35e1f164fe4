//! Error types for the Pangle adapter.
//!
//! Every partner-specific failure is wrapped into [`AdapterError`] at the bridge
//! boundary and surfaced as an [`error_stack::Report`]. Pangle error codes never
//! leak past this crate as partner types.

use derive_more::Display;

/// Errors surfaced to the mediation layer.
#[derive(Debug, Display)]
pub enum AdapterError {
    /// Partner SDK initialization did not complete.
    #[display("Initialization failed: {reason}")]
    InitializationFailure { reason: String },

    /// Credentials are missing or malformed.
    #[display("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// The partner declined to return an ad.
    #[display("No fill for placement '{placement}'")]
    NoFill { placement: String },

    /// The partner reported an error code.
    #[display("Partner error {code}: {message}")]
    PartnerError { code: i32, message: String },

    /// The partner reported success without an ad object.
    #[display("Mismatched ad params: {message}")]
    MismatchedAdParams { message: String },

    /// The requested ad format is not supported by this partner.
    #[display("Unsupported ad format: {format}")]
    UnsupportedAdFormat { format: String },

    /// No partner ad object is attached to the loaded ad.
    #[display("Ad not found")]
    AdNotFound,

    /// The partner ad object does not match the requested format.
    #[display("Wrong resource type")]
    WrongResourceType,

    /// Fullscreen formats need a hosting activity to show.
    #[display("An activity is required to show {format} ads")]
    ActivityRequired { format: String },

    /// The partner never called back within the configured window.
    #[display("Timed out waiting for {operation} after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// Bridge invariant violated (e.g. callback dropped without a result).
    #[display("Internal error: {message}")]
    InternalError { message: String },

    /// Settings could not be loaded or failed validation.
    #[display("Configuration error: {message}")]
    Configuration { message: String },
}

impl core::error::Error for AdapterError {}

impl AdapterError {
    /// Stable code reported to the mediation layer alongside the message.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InitializationFailure { .. } => "CM_INITIALIZATION_FAILURE_UNKNOWN",
            Self::InvalidCredentials { .. } => "CM_INITIALIZATION_FAILURE_INVALID_CREDENTIALS",
            Self::NoFill { .. } => "CM_LOAD_FAILURE_NO_FILL",
            Self::PartnerError { .. } => "CM_PARTNER_ERROR",
            Self::MismatchedAdParams { .. } => "CM_LOAD_FAILURE_MISMATCHED_AD_PARAMS",
            Self::UnsupportedAdFormat { .. } => "CM_LOAD_FAILURE_UNSUPPORTED_AD_FORMAT",
            Self::AdNotFound => "CM_AD_NOT_FOUND",
            Self::WrongResourceType => "CM_SHOW_FAILURE_WRONG_RESOURCE_TYPE",
            Self::ActivityRequired { .. } => "CM_SHOW_FAILURE_ACTIVITY_NOT_FOUND",
            Self::Timeout { .. } => "CM_TIMEOUT",
            Self::InternalError { .. } => "CM_INTERNAL_ERROR",
            Self::Configuration { .. } => "CM_CONFIGURATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::{Report, ResultExt};

    #[test]
    fn test_adapter_error_display() {
        assert_eq!(
            format!(
                "{}",
                AdapterError::PartnerError {
                    code: 40006,
                    message: "slot id error".into()
                }
            ),
            "Partner error 40006: slot id error"
        );
        assert_eq!(
            format!(
                "{}",
                AdapterError::NoFill {
                    placement: "980088188".into()
                }
            ),
            "No fill for placement '980088188'"
        );
        assert_eq!(
            format!(
                "{}",
                AdapterError::Timeout {
                    operation: "load",
                    timeout_ms: 250
                }
            ),
            "Timed out waiting for load after 250ms"
        );
        assert_eq!(format!("{}", AdapterError::AdNotFound), "Ad not found");
    }

    #[test]
    fn test_adapter_error_codes_are_distinct() {
        let errors = [
            AdapterError::InitializationFailure { reason: "x".into() },
            AdapterError::InvalidCredentials { message: "x".into() },
            AdapterError::NoFill {
                placement: "x".into(),
            },
            AdapterError::PartnerError {
                code: 1,
                message: "x".into(),
            },
            AdapterError::MismatchedAdParams { message: "x".into() },
            AdapterError::UnsupportedAdFormat { format: "x".into() },
            AdapterError::AdNotFound,
            AdapterError::WrongResourceType,
            AdapterError::ActivityRequired { format: "x".into() },
            AdapterError::Timeout {
                operation: "x",
                timeout_ms: 1,
            },
            AdapterError::InternalError { message: "x".into() },
            AdapterError::Configuration { message: "x".into() },
        ];

        let mut codes: Vec<&str> = errors.iter().map(AdapterError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_report_keeps_underlying_context() {
        let result: Result<(), Report<AdapterError>> = Err(Report::new(
            AdapterError::InvalidCredentials {
                message: "missing application_id".into(),
            },
        ))
        .change_context(AdapterError::InitializationFailure {
            reason: "credentials rejected".into(),
        });

        let report = result.expect_err("should fail");
        assert!(matches!(
            report.current_context(),
            AdapterError::InitializationFailure { .. }
        ));
        assert!(report.contains::<AdapterError>());
        assert!(format!("{:?}", report).contains("missing application_id"));
    }
}
