/// Partner identifier reported to the mediation layer.
pub const PARTNER_ID: &str = "pangle";
pub const PARTNER_DISPLAY_NAME: &str = "Pangle";

/// Credentials key holding the Pangle application id.
pub const APPLICATION_ID_KEY: &str = "application_id";

// Keys and values of the mediation consent map.
pub const CONSENT_KEY_GDPR_CONSENT_GIVEN: &str = "gdpr_consent_given";
pub const CONSENT_KEY_CCPA_OPT_IN: &str = "ccpa_opt_in";
pub const CONSENT_KEY_USP: &str = "us_privacy";
pub const CONSENT_VALUE_GRANTED: &str = "granted";
pub const CONSENT_VALUE_DENIED: &str = "denied";

/// Pangle load error code meaning no ad was available.
pub const PANGLE_ERROR_NO_FILL: i32 = 20001;
