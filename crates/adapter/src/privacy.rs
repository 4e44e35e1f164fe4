//! Translation of generic privacy signals into Pangle's consent codes.
//!
//! [`PrivacySettings`] is owned by the adapter instance. It records the last
//! automatic value for each signal and the integrator overrides. While an
//! override is set, automatic values are still recorded but never pushed to
//! the SDK; clearing the override makes the recorded value effective again.

use crate::constants::{
    CONSENT_KEY_CCPA_OPT_IN, CONSENT_KEY_GDPR_CONSENT_GIVEN, CONSENT_KEY_USP,
    CONSENT_VALUE_DENIED, CONSENT_VALUE_GRANTED,
};
use crate::mediation::{ConsentMap, GdprConsentStatus};
use crate::partner::{PangleChildDirected, PangleDoNotSell, PangleGdprConsent};

#[must_use]
pub fn gdpr_to_pangle(applies: Option<bool>, status: GdprConsentStatus) -> PangleGdprConsent {
    if applies == Some(false) {
        return PangleGdprConsent::Default;
    }
    match status {
        GdprConsentStatus::Granted => PangleGdprConsent::Consent,
        GdprConsentStatus::Denied => PangleGdprConsent::NoConsent,
        GdprConsentStatus::Unknown => PangleGdprConsent::Default,
    }
}

#[must_use]
pub fn ccpa_to_pangle(has_granted_consent: bool) -> PangleDoNotSell {
    if has_granted_consent {
        PangleDoNotSell::Sell
    } else {
        PangleDoNotSell::NotSell
    }
}

#[must_use]
pub fn coppa_to_pangle(is_subject_to_coppa: bool) -> PangleChildDirected {
    if is_subject_to_coppa {
        PangleChildDirected::ChildDirected
    } else {
        PangleChildDirected::NotChildDirected
    }
}

/// Reads the opt-out-of-sale flag (third character) of an IAB US Privacy string.
#[must_use]
pub fn do_not_sell_from_usp(usp: &str) -> Option<PangleDoNotSell> {
    match usp.trim().chars().nth(2).map(|c| c.to_ascii_uppercase()) {
        Some('Y') => Some(PangleDoNotSell::NotSell),
        Some('N') => Some(PangleDoNotSell::Sell),
        _ => None,
    }
}

fn granted_or_denied(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        CONSENT_VALUE_GRANTED => Some(true),
        CONSENT_VALUE_DENIED => Some(false),
        _ => None,
    }
}

/// Signals to push to the SDK after a consent map change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsentUpdate {
    pub gdpr_consent: Option<PangleGdprConsent>,
    pub do_not_sell: Option<PangleDoNotSell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacySettings {
    /// Last automatic GDPR value.
    pub gdpr_consent: PangleGdprConsent,
    /// Last automatic do-not-sell value.
    pub do_not_sell: PangleDoNotSell,
    pub child_directed: PangleChildDirected,
    pub gdpr_consent_override: Option<PangleGdprConsent>,
    pub do_not_sell_override: Option<PangleDoNotSell>,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            gdpr_consent: PangleGdprConsent::Default,
            do_not_sell: PangleDoNotSell::Default,
            child_directed: PangleChildDirected::Default,
            gdpr_consent_override: None,
            do_not_sell_override: None,
        }
    }
}

impl PrivacySettings {
    /// GDPR value the SDK should currently hold.
    #[must_use]
    pub fn effective_gdpr_consent(&self) -> PangleGdprConsent {
        self.gdpr_consent_override.unwrap_or(self.gdpr_consent)
    }

    /// Do-not-sell value the SDK should currently hold.
    #[must_use]
    pub fn effective_do_not_sell(&self) -> PangleDoNotSell {
        self.do_not_sell_override.unwrap_or(self.do_not_sell)
    }

    /// Records an automatic GDPR value. Returns it if it should be pushed.
    pub fn record_gdpr_consent(&mut self, consent: PangleGdprConsent) -> Option<PangleGdprConsent> {
        self.gdpr_consent = consent;
        if self.gdpr_consent_override.is_some() {
            log::debug!("Pangle: GDPR override active, not pushing {:?}", consent);
            return None;
        }
        Some(consent)
    }

    /// Records an automatic do-not-sell value. Returns it if it should be pushed.
    pub fn record_do_not_sell(&mut self, do_not_sell: PangleDoNotSell) -> Option<PangleDoNotSell> {
        self.do_not_sell = do_not_sell;
        if self.do_not_sell_override.is_some() {
            log::debug!(
                "Pangle: do-not-sell override active, not pushing {:?}",
                do_not_sell
            );
            return None;
        }
        Some(do_not_sell)
    }

    /// Computes and records the update for a consent map, honoring overrides.
    pub fn apply_consent_map(&mut self, consents: &ConsentMap) -> ConsentUpdate {
        let mut update = ConsentUpdate::default();

        if let Some(value) = consents.get(CONSENT_KEY_GDPR_CONSENT_GIVEN) {
            match granted_or_denied(value) {
                Some(true) => {
                    update.gdpr_consent = self.record_gdpr_consent(PangleGdprConsent::Consent);
                }
                Some(false) => {
                    update.gdpr_consent = self.record_gdpr_consent(PangleGdprConsent::NoConsent);
                }
                None => log::debug!("Pangle: unrecognized GDPR consent value '{}'", value),
            }
        }

        let do_not_sell = consents
            .get(CONSENT_KEY_CCPA_OPT_IN)
            .and_then(|value| granted_or_denied(value))
            .map(ccpa_to_pangle)
            .or_else(|| {
                consents
                    .get(CONSENT_KEY_USP)
                    .and_then(|usp| do_not_sell_from_usp(usp))
            });

        if let Some(do_not_sell) = do_not_sell {
            update.do_not_sell = self.record_do_not_sell(do_not_sell);
        }

        update
    }

    /// Sets or clears the GDPR override. Returns the value to push.
    ///
    /// Clearing restores the last automatic value.
    pub fn set_gdpr_consent_override(
        &mut self,
        consent: Option<PangleGdprConsent>,
    ) -> PangleGdprConsent {
        self.gdpr_consent_override = consent;
        self.effective_gdpr_consent()
    }

    /// Sets or clears the do-not-sell override. Returns the value to push.
    ///
    /// Clearing restores the last automatic value.
    pub fn set_do_not_sell_override(
        &mut self,
        do_not_sell: Option<PangleDoNotSell>,
    ) -> PangleDoNotSell {
        self.do_not_sell_override = do_not_sell;
        self.effective_do_not_sell()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consent_map(entries: &[(&str, &str)]) -> ConsentMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_gdpr_mapping_table() {
        assert_eq!(
            gdpr_to_pangle(Some(true), GdprConsentStatus::Granted),
            PangleGdprConsent::Consent
        );
        assert_eq!(
            gdpr_to_pangle(Some(true), GdprConsentStatus::Denied),
            PangleGdprConsent::NoConsent
        );
        assert_eq!(
            gdpr_to_pangle(Some(true), GdprConsentStatus::Unknown),
            PangleGdprConsent::Default
        );
        assert_eq!(
            gdpr_to_pangle(None, GdprConsentStatus::Granted),
            PangleGdprConsent::Consent
        );
        assert_eq!(
            gdpr_to_pangle(Some(false), GdprConsentStatus::Granted),
            PangleGdprConsent::Default
        );
    }

    #[test]
    fn test_ccpa_and_coppa_mapping() {
        assert_eq!(ccpa_to_pangle(true), PangleDoNotSell::Sell);
        assert_eq!(ccpa_to_pangle(false), PangleDoNotSell::NotSell);
        assert_eq!(coppa_to_pangle(true), PangleChildDirected::ChildDirected);
        assert_eq!(coppa_to_pangle(false), PangleChildDirected::NotChildDirected);
    }

    #[test]
    fn test_usp_string_parsing() {
        assert_eq!(do_not_sell_from_usp("1YYN"), Some(PangleDoNotSell::NotSell));
        assert_eq!(do_not_sell_from_usp("1YNN"), Some(PangleDoNotSell::Sell));
        assert_eq!(do_not_sell_from_usp("1ynn"), Some(PangleDoNotSell::Sell));
        assert_eq!(do_not_sell_from_usp("1---"), None);
        assert_eq!(do_not_sell_from_usp("1Y"), None);
        assert_eq!(do_not_sell_from_usp(""), None);
    }

    #[test]
    fn test_consent_map_propagation() {
        let mut privacy = PrivacySettings::default();
        let update = privacy.apply_consent_map(&consent_map(&[
            (CONSENT_KEY_GDPR_CONSENT_GIVEN, "granted"),
            (CONSENT_KEY_USP, "1YYN"),
        ]));

        assert_eq!(update.gdpr_consent, Some(PangleGdprConsent::Consent));
        assert_eq!(update.do_not_sell, Some(PangleDoNotSell::NotSell));
        assert_eq!(privacy.gdpr_consent, PangleGdprConsent::Consent);
        assert_eq!(privacy.do_not_sell, PangleDoNotSell::NotSell);
    }

    #[test]
    fn test_ccpa_opt_in_takes_precedence_over_usp() {
        let mut privacy = PrivacySettings::default();
        let update = privacy.apply_consent_map(&consent_map(&[
            (CONSENT_KEY_CCPA_OPT_IN, "granted"),
            (CONSENT_KEY_USP, "1YYN"),
        ]));

        assert_eq!(update.do_not_sell, Some(PangleDoNotSell::Sell));
    }

    #[test]
    fn test_unrecognized_values_are_ignored() {
        let mut privacy = PrivacySettings::default();
        let update = privacy.apply_consent_map(&consent_map(&[
            (CONSENT_KEY_GDPR_CONSENT_GIVEN, "maybe"),
            (CONSENT_KEY_USP, "1---"),
        ]));

        assert_eq!(update, ConsentUpdate::default());
        assert_eq!(privacy, PrivacySettings::default());
    }

    #[test]
    fn test_override_then_auto_skips_overridden_signal() {
        let mut privacy = PrivacySettings::default();
        assert_eq!(
            privacy.set_gdpr_consent_override(Some(PangleGdprConsent::NoConsent)),
            PangleGdprConsent::NoConsent
        );

        let update = privacy.apply_consent_map(&consent_map(&[
            (CONSENT_KEY_GDPR_CONSENT_GIVEN, "granted"),
            (CONSENT_KEY_CCPA_OPT_IN, "denied"),
        ]));

        assert_eq!(update.gdpr_consent, None);
        assert_eq!(update.do_not_sell, Some(PangleDoNotSell::NotSell));
        assert_eq!(privacy.effective_gdpr_consent(), PangleGdprConsent::NoConsent);
        assert_eq!(privacy.gdpr_consent, PangleGdprConsent::Consent);
    }

    #[test]
    fn test_auto_then_override_wins() {
        let mut privacy = PrivacySettings::default();
        privacy.apply_consent_map(&consent_map(&[(CONSENT_KEY_USP, "1YNN")]));
        assert_eq!(privacy.effective_do_not_sell(), PangleDoNotSell::Sell);

        privacy.set_do_not_sell_override(Some(PangleDoNotSell::NotSell));
        let update = privacy.apply_consent_map(&consent_map(&[(CONSENT_KEY_USP, "1YNN")]));

        assert_eq!(update.do_not_sell, None);
        assert_eq!(privacy.effective_do_not_sell(), PangleDoNotSell::NotSell);
    }

    #[test]
    fn test_cleared_override_restores_automatic_value() {
        let mut privacy = PrivacySettings::default();
        privacy.record_gdpr_consent(PangleGdprConsent::Consent);
        privacy.set_gdpr_consent_override(Some(PangleGdprConsent::NoConsent));
        assert_eq!(privacy.record_gdpr_consent(PangleGdprConsent::Consent), None);

        assert_eq!(
            privacy.set_gdpr_consent_override(None),
            PangleGdprConsent::Consent
        );
        assert_eq!(privacy.effective_gdpr_consent(), PangleGdprConsent::Consent);

        privacy.set_do_not_sell_override(Some(PangleDoNotSell::NotSell));
        assert_eq!(
            privacy.set_do_not_sell_override(None),
            PangleDoNotSell::Default
        );
    }

    #[test]
    fn test_cleared_override_resumes_propagation() {
        let mut privacy = PrivacySettings::default();
        privacy.set_gdpr_consent_override(Some(PangleGdprConsent::NoConsent));
        privacy.set_gdpr_consent_override(None);

        let update = privacy.apply_consent_map(&consent_map(&[(
            CONSENT_KEY_GDPR_CONSENT_GIVEN,
            "granted",
        )]));
        assert_eq!(update.gdpr_consent, Some(PangleGdprConsent::Consent));
    }
}
