//! Inbound domain model shared with the mediation layer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::partner::{PangleBannerAd, PangleInterstitialAd, PangleRewardedAd};

/// Ad formats the mediation layer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdFormat {
    Banner,
    Interstitial,
    Rewarded,
    RewardedInterstitial,
    Native,
}

impl AdFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Interstitial => "interstitial",
            Self::Rewarded => "rewarded",
            Self::RewardedInterstitial => "rewarded_interstitial",
            Self::Native => "native",
        }
    }

    /// Fullscreen formats report show-time events after load.
    #[must_use]
    pub fn is_fullscreen(self) -> bool {
        matches!(self, Self::Interstitial | Self::Rewarded)
    }
}

impl fmt::Display for AdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested banner size in density-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerSize {
    pub width: u32,
    pub height: u32,
}

/// A request for one ad slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdPlacementRequest {
    /// Partner placement id, unique per request.
    pub placement_id: String,
    pub format: AdFormat,
    /// Size hint, banners only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<BannerSize>,
    /// Mediation load id used to correlate log lines.
    pub identifier: String,
}

impl AdPlacementRequest {
    #[must_use]
    pub fn new(placement_id: impl Into<String>, format: AdFormat) -> Self {
        Self {
            placement_id: placement_id.into(),
            format,
            size: None,
            identifier: String::new(),
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some(BannerSize { width, height });
        self
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }
}

/// The partner ad object behind a [`LoadedAd`].
#[derive(Clone)]
pub enum PartnerAd {
    Banner(Arc<dyn PangleBannerAd>),
    Interstitial(Arc<dyn PangleInterstitialAd>),
    Rewarded(Arc<dyn PangleRewardedAd>),
}

impl PartnerAd {
    #[must_use]
    pub fn format(&self) -> AdFormat {
        match self {
            Self::Banner(_) => AdFormat::Banner,
            Self::Interstitial(_) => AdFormat::Interstitial,
            Self::Rewarded(_) => AdFormat::Rewarded,
        }
    }
}

impl fmt::Debug for PartnerAd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Banner(banner) => f.debug_tuple("Banner").field(&banner.view()).finish(),
            Self::Interstitial(_) => f.write_str("Interstitial"),
            Self::Rewarded(_) => f.write_str("Rewarded"),
        }
    }
}

/// Record of a successfully loaded ad.
#[derive(Debug, Clone)]
pub struct LoadedAd {
    pub ad: Option<PartnerAd>,
    /// Partner-specific metadata, empty unless the partner reports some.
    pub details: HashMap<String, String>,
    pub request: AdPlacementRequest,
}

impl LoadedAd {
    #[must_use]
    pub fn new(ad: Option<PartnerAd>, request: AdPlacementRequest) -> Self {
        Self {
            ad,
            details: HashMap::new(),
            request,
        }
    }

    #[must_use]
    pub fn placement_id(&self) -> &str {
        &self.request.placement_id
    }
}

/// Opaque reference to the platform UI host used to present fullscreen ads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    name: String,
}

impl Activity {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Configuration handed to the adapter at setup time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerConfiguration {
    /// Partner credentials as delivered by the mediation backend.
    #[serde(default)]
    pub credentials: serde_json::Map<String, serde_json::Value>,
}

/// Generic GDPR consent status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GdprConsentStatus {
    Granted,
    Denied,
    Unknown,
}

/// Consent map delivered by the mediation layer's consent management.
pub type ConsentMap = HashMap<String, String>;

/// Receives show-time events for an ad.
///
/// Implemented by the mediation layer. Events for a placement are only
/// delivered while a listener for it is held by the adapter.
pub trait PartnerAdListener: Send + Sync {
    fn on_impression(&self, request: &AdPlacementRequest);
    fn on_clicked(&self, request: &AdPlacementRequest);
    fn on_rewarded(&self, request: &AdPlacementRequest);
    fn on_dismissed(&self, request: &AdPlacementRequest);
}
