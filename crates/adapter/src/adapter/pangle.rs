//! Pangle implementation of [`PartnerAdapter`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use error_stack::{Report, ResultExt};

use crate::callbacks::{
    BannerLoadCallbacks, FullscreenLoadCallbacks, FullscreenShowCallbacks, InitCallbacks, Outcome,
};
use crate::constants::{APPLICATION_ID_KEY, PARTNER_DISPLAY_NAME, PARTNER_ID};
use crate::error::AdapterError;
use crate::mediation::{
    Activity, AdFormat, AdPlacementRequest, ConsentMap, GdprConsentStatus, LoadedAd, PartnerAd,
    PartnerAdListener, PartnerConfiguration,
};
use crate::partner::{
    FullscreenLoadListener, PangleDoNotSell, PangleGdprConsent, PangleInitConfig, PangleSdk,
};
use crate::privacy::{ccpa_to_pangle, coppa_to_pangle, gdpr_to_pangle, PrivacySettings};
use crate::registry::ListenerRegistry;
use crate::resolver;
use crate::settings::Settings;

use super::banner::pangle_banner_size;
use super::contract::PartnerAdapter;

/// Bridges mediation calls onto a [`PangleSdk`].
pub struct PangleAdapter {
    sdk: Arc<dyn PangleSdk>,
    settings: Settings,
    listeners: ListenerRegistry,
    privacy: Mutex<PrivacySettings>,
}

impl PangleAdapter {
    #[must_use]
    pub fn new(sdk: Arc<dyn PangleSdk>, settings: Settings) -> Self {
        Self {
            sdk,
            settings,
            listeners: ListenerRegistry::new(),
            privacy: Mutex::new(PrivacySettings::default()),
        }
    }

    #[must_use]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Snapshot of the current consent state and overrides.
    #[must_use]
    pub fn privacy_settings(&self) -> PrivacySettings {
        self.privacy().clone()
    }

    /// Pins the GDPR consent sent to Pangle, or clears the pin with `None`.
    ///
    /// While pinned, GDPR values from [`PartnerAdapter::set_gdpr`] and
    /// [`PartnerAdapter::set_consents`] are recorded but not forwarded.
    /// Clearing the pin pushes the last of those values.
    pub fn set_gdpr_consent_override(&self, consent: Option<PangleGdprConsent>) {
        let pushed = self.privacy().set_gdpr_consent_override(consent);
        match consent {
            Some(_) => log::info!("Pangle: GDPR consent override set to {:?}", pushed),
            None => log::info!("Pangle: GDPR consent override cleared, restoring {:?}", pushed),
        }
        self.sdk.set_gdpr_consent(pushed);
    }

    /// Pins the do-not-sell value sent to Pangle, or clears the pin with `None`.
    pub fn set_do_not_sell_override(&self, do_not_sell: Option<PangleDoNotSell>) {
        let pushed = self.privacy().set_do_not_sell_override(do_not_sell);
        match do_not_sell {
            Some(_) => log::info!("Pangle: do-not-sell override set to {:?}", pushed),
            None => log::info!("Pangle: do-not-sell override cleared, restoring {:?}", pushed),
        }
        self.sdk.set_do_not_sell(pushed);
    }

    fn privacy(&self) -> MutexGuard<'_, PrivacySettings> {
        self.privacy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn application_id(config: &PartnerConfiguration) -> Result<String, Report<AdapterError>> {
        config
            .credentials
            .get(APPLICATION_ID_KEY)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|app_id| !app_id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Report::new(AdapterError::InvalidCredentials {
                    message: format!("Missing or empty '{}'", APPLICATION_ID_KEY),
                })
            })
    }

    async fn load_banner(
        &self,
        request: &AdPlacementRequest,
        listener: Arc<dyn PartnerAdListener>,
    ) -> Result<LoadedAd, Report<AdapterError>> {
        let size = pangle_banner_size(request.size);
        log::debug!(
            "Pangle: banner '{}' requested {:?}, using {}",
            request.placement_id,
            request.size,
            size
        );

        let (resolver, pending) = resolver::channel("banner load");
        self.sdk.load_banner(
            &request.placement_id,
            size,
            Box::new(BannerLoadCallbacks {
                request: request.clone(),
                listener,
                resolver,
            }),
        );

        let banner = pending
            .wait(self.settings.timeouts.load())
            .await?
            .map_err(Report::new)?;

        Ok(LoadedAd::new(Some(PartnerAd::Banner(banner)), request.clone()))
    }

    /// Shared load flow for interstitial and rewarded ads.
    ///
    /// The listener is registered before the SDK call and removed again if
    /// the load fails.
    async fn load_fullscreen<A>(
        &self,
        request: &AdPlacementRequest,
        listener: Arc<dyn PartnerAdListener>,
        start_load: impl FnOnce(Box<dyn FullscreenLoadListener<A>>),
    ) -> Result<Arc<A>, Report<AdapterError>>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        self.listeners.insert(&request.placement_id, listener);

        let (loaded, loaded_pending) = resolver::channel("fullscreen load");
        let (cached, cached_pending) = resolver::channel("fullscreen cache");
        start_load(Box::new(FullscreenLoadCallbacks {
            placement_id: request.placement_id.clone(),
            loaded,
            cached,
        }));

        let outcome: Result<Outcome<Arc<A>>, _> =
            loaded_pending.wait(self.settings.timeouts.load()).await;
        let ad = match outcome.and_then(|outcome| outcome.map_err(Report::new)) {
            Ok(ad) => ad,
            Err(report) => {
                self.listeners.remove(&request.placement_id);
                return Err(report);
            }
        };

        if self.sdk.emits_cache_events() {
            if let Err(report) = cached_pending.wait(self.settings.timeouts.cache()).await {
                log::warn!(
                    "Pangle: '{}' loaded but not reported cached ({}), using the loaded ad",
                    request.placement_id,
                    report.current_context()
                );
            }
        }

        Ok(ad)
    }
}

#[async_trait]
impl PartnerAdapter for PangleAdapter {
    fn partner_id(&self) -> &'static str {
        PARTNER_ID
    }

    fn partner_display_name(&self) -> &'static str {
        PARTNER_DISPLAY_NAME
    }

    fn partner_sdk_version(&self) -> String {
        self.sdk.sdk_version()
    }

    fn adapter_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    async fn setup(&self, config: &PartnerConfiguration) -> Result<(), Report<AdapterError>> {
        let app_id =
            Self::application_id(config).change_context(AdapterError::InitializationFailure {
                reason: "Pangle credentials rejected".to_string(),
            })?;

        let privacy = self.privacy_settings();
        let init_config = PangleInitConfig {
            app_id,
            support_multi_process: self.settings.pangle.support_multi_process,
            debug_log: self.settings.pangle.debug_log,
            gdpr_consent: privacy.effective_gdpr_consent(),
            do_not_sell: privacy.effective_do_not_sell(),
            child_directed: privacy.child_directed,
        };

        log::info!(
            "Pangle: initializing SDK {} (app id: {}, multi-process: {})",
            self.sdk.sdk_version(),
            init_config.app_id,
            init_config.support_multi_process
        );

        let (resolver, pending) = resolver::channel("init");
        self.sdk.init(init_config, Box::new(InitCallbacks { resolver }));

        pending
            .wait(self.settings.timeouts.init())
            .await
            .change_context(AdapterError::InitializationFailure {
                reason: "Pangle init did not complete".to_string(),
            })?
            .map_err(Report::new)?;

        log::info!("Pangle: SDK initialized");
        Ok(())
    }

    async fn fetch_bidder_information(
        &self,
        request: &AdPlacementRequest,
    ) -> Result<HashMap<String, String>, Report<AdapterError>> {
        log::debug!(
            "Pangle: no bidder information for '{}', bidding is not supported",
            request.placement_id
        );
        Ok(HashMap::new())
    }

    async fn load(
        &self,
        request: &AdPlacementRequest,
        listener: Arc<dyn PartnerAdListener>,
    ) -> Result<LoadedAd, Report<AdapterError>> {
        log::info!(
            "Pangle: loading {} ad for placement '{}' (load id: {})",
            request.format,
            request.placement_id,
            request.identifier
        );

        let result = match request.format {
            AdFormat::Banner => self.load_banner(request, listener).await,
            AdFormat::Interstitial => self
                .load_fullscreen(request, listener, |callbacks| {
                    self.sdk
                        .load_interstitial(&request.placement_id, callbacks);
                })
                .await
                .map(|ad| {
                    LoadedAd::new(Some(PartnerAd::Interstitial(ad)), request.clone())
                }),
            AdFormat::Rewarded => self
                .load_fullscreen(request, listener, |callbacks| {
                    self.sdk.load_rewarded(&request.placement_id, callbacks);
                })
                .await
                .map(|ad| LoadedAd::new(Some(PartnerAd::Rewarded(ad)), request.clone())),
            unsupported @ (AdFormat::RewardedInterstitial | AdFormat::Native) => {
                Err(Report::new(AdapterError::UnsupportedAdFormat {
                    format: unsupported.to_string(),
                }))
            }
        };

        match &result {
            Ok(_) => log::info!(
                "Pangle: loaded {} ad for placement '{}'",
                request.format,
                request.placement_id
            ),
            Err(report) => log::error!(
                "Pangle: failed to load {} ad for placement '{}': {}",
                request.format,
                request.placement_id,
                report.current_context()
            ),
        }

        result
    }

    async fn show(
        &self,
        activity: Option<&Activity>,
        ad: &LoadedAd,
    ) -> Result<LoadedAd, Report<AdapterError>> {
        let request = &ad.request;
        let listener = self.listeners.take(&request.placement_id);

        // Banners are visible as soon as they load.
        if request.format == AdFormat::Banner {
            return Ok(ad.clone());
        }
        if !request.format.is_fullscreen() {
            return Err(Report::new(AdapterError::UnsupportedAdFormat {
                format: request.format.to_string(),
            }));
        }

        let Some(activity) = activity else {
            log::error!(
                "Pangle: cannot show {} '{}' without an activity",
                request.format,
                request.placement_id
            );
            return Err(Report::new(AdapterError::ActivityRequired {
                format: request.format.to_string(),
            }));
        };

        let Some(partner_ad) = &ad.ad else {
            return Err(Report::new(AdapterError::AdNotFound));
        };
        if partner_ad.format() != request.format {
            return Err(
                Report::new(AdapterError::WrongResourceType).attach(format!(
                    "requested {} but holds a {} ad",
                    request.format,
                    partner_ad.format()
                )),
            );
        }

        let (shown, pending) = resolver::channel("show");
        let callbacks = FullscreenShowCallbacks::new(request.clone(), listener, shown);
        match partner_ad {
            PartnerAd::Interstitial(interstitial) => {
                interstitial.set_interaction_listener(Box::new(callbacks));
                interstitial.show(activity);
            }
            PartnerAd::Rewarded(rewarded) => {
                rewarded.set_interaction_listener(Box::new(callbacks));
                rewarded.show(activity);
            }
            PartnerAd::Banner(_) => return Err(Report::new(AdapterError::WrongResourceType)),
        }

        pending
            .wait(self.settings.timeouts.show())
            .await?
            .map_err(Report::new)?;

        log::info!(
            "Pangle: showed {} ad for placement '{}' in '{}'",
            request.format,
            request.placement_id,
            activity.name()
        );
        Ok(ad.clone())
    }

    async fn invalidate(&self, ad: &LoadedAd) -> Result<LoadedAd, Report<AdapterError>> {
        let request = &ad.request;
        log::debug!(
            "Pangle: invalidating {} ad for placement '{}'",
            request.format,
            request.placement_id
        );

        if request.format == AdFormat::Banner {
            return match &ad.ad {
                Some(PartnerAd::Banner(banner)) => {
                    banner.destroy();
                    Ok(ad.clone())
                }
                _ => Err(Report::new(AdapterError::AdNotFound)),
            };
        }

        // Pangle has no destroy call for fullscreen ads.
        self.listeners.remove(&request.placement_id);
        Ok(ad.clone())
    }

    fn set_gdpr(&self, applies: Option<bool>, status: GdprConsentStatus) {
        let consent = gdpr_to_pangle(applies, status);
        let pushed = self.privacy().record_gdpr_consent(consent);

        if let Some(consent) = pushed {
            log::debug!("Pangle: setting GDPR consent to {:?}", consent);
            self.sdk.set_gdpr_consent(consent);
        }
    }

    fn set_ccpa_consent(&self, has_granted_consent: bool) {
        let do_not_sell = ccpa_to_pangle(has_granted_consent);
        let pushed = self.privacy().record_do_not_sell(do_not_sell);

        if let Some(do_not_sell) = pushed {
            log::debug!("Pangle: setting do-not-sell to {:?}", do_not_sell);
            self.sdk.set_do_not_sell(do_not_sell);
        }
    }

    fn set_user_subject_to_coppa(&self, is_subject_to_coppa: bool) {
        let child_directed = coppa_to_pangle(is_subject_to_coppa);
        self.privacy().child_directed = child_directed;

        log::debug!("Pangle: setting child-directed to {:?}", child_directed);
        self.sdk.set_child_directed(child_directed);
    }

    fn set_consents(&self, consents: &ConsentMap) {
        let update = self.privacy().apply_consent_map(consents);

        if let Some(consent) = update.gdpr_consent {
            log::debug!("Pangle: consent map sets GDPR consent to {:?}", consent);
            self.sdk.set_gdpr_consent(consent);
        }
        if let Some(do_not_sell) = update.do_not_sell {
            log::debug!("Pangle: consent map sets do-not-sell to {:?}", do_not_sell);
            self.sdk.set_do_not_sell(do_not_sell);
        }
    }
}
