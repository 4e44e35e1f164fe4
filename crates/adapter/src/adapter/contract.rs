//! Trait definition for mediation partner adapters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use error_stack::Report;

use crate::error::AdapterError;
use crate::mediation::{
    Activity, AdPlacementRequest, ConsentMap, GdprConsentStatus, LoadedAd, PartnerAdListener,
    PartnerConfiguration,
};

/// Contract the mediation layer uses to drive a partner network.
///
/// Every asynchronous operation resolves exactly once. Nothing is retried
/// inside the adapter; retry policy belongs to the caller.
#[async_trait]
pub trait PartnerAdapter: Send + Sync {
    /// Unique identifier for this partner (e.g., "pangle").
    fn partner_id(&self) -> &'static str;

    fn partner_display_name(&self) -> &'static str;

    fn partner_sdk_version(&self) -> String;

    fn adapter_version(&self) -> &'static str;

    /// Initialize the partner SDK from the credentials in `config`.
    ///
    /// Callers serialize setup themselves; the adapter adds no lock around
    /// the SDK's global init.
    async fn setup(&self, config: &PartnerConfiguration) -> Result<(), Report<AdapterError>>;

    /// Collect pre-bid tokens for a programmatic auction.
    async fn fetch_bidder_information(
        &self,
        request: &AdPlacementRequest,
    ) -> Result<HashMap<String, String>, Report<AdapterError>>;

    /// Load an ad. `listener` receives the ad's show-time events.
    async fn load(
        &self,
        request: &AdPlacementRequest,
        listener: Arc<dyn PartnerAdListener>,
    ) -> Result<LoadedAd, Report<AdapterError>>;

    /// Show a previously loaded ad.
    async fn show(
        &self,
        activity: Option<&Activity>,
        ad: &LoadedAd,
    ) -> Result<LoadedAd, Report<AdapterError>>;

    /// Release a loaded ad.
    async fn invalidate(&self, ad: &LoadedAd) -> Result<LoadedAd, Report<AdapterError>>;

    fn set_gdpr(&self, applies: Option<bool>, status: GdprConsentStatus);

    fn set_ccpa_consent(&self, has_granted_consent: bool);

    fn set_user_subject_to_coppa(&self, is_subject_to_coppa: bool);

    /// Propagate a consent map from the mediation layer's consent management.
    fn set_consents(&self, consents: &ConsentMap);
}
