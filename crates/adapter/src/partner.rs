//! Outbound seam to the Pangle SDK.
//!
//! The native SDK is callback based: every asynchronous entry point takes a
//! listener object that the SDK invokes later, on a thread of its choosing.
//! The traits here describe that surface so [`crate::adapter::PangleAdapter`]
//! can drive any implementation of it (the real binding in the host app, or
//! the mocks in [`crate::test_support`]).
//!
//! Nothing in this module enforces exactly-once delivery. Implementations may
//! call a listener zero, one or many times; the bridge guards against all
//! three.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::PANGLE_ERROR_NO_FILL;
use crate::error::AdapterError;
use crate::mediation::Activity;

/// GDPR consent codes understood by the Pangle SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PangleGdprConsent {
    Consent,
    NoConsent,
    Default,
}

impl PangleGdprConsent {
    /// Integer value passed to the SDK's global setter.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Consent => 1,
            Self::NoConsent => 0,
            Self::Default => -1,
        }
    }
}

/// CCPA "do not sell" codes understood by the Pangle SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PangleDoNotSell {
    Sell,
    NotSell,
    Default,
}

impl PangleDoNotSell {
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Sell => 0,
            Self::NotSell => 1,
            Self::Default => -1,
        }
    }
}

/// COPPA child-directed codes understood by the Pangle SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PangleChildDirected {
    ChildDirected,
    NotChildDirected,
    Default,
}

impl PangleChildDirected {
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::ChildDirected => 1,
            Self::NotChildDirected => 0,
            Self::Default => -1,
        }
    }
}

/// Banner sizes the Pangle SDK can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PangleBannerSize {
    W320H50,
    W728H90,
    W300H250,
}

impl PangleBannerSize {
    #[must_use]
    pub fn width(self) -> u32 {
        match self {
            Self::W320H50 => 320,
            Self::W728H90 => 728,
            Self::W300H250 => 300,
        }
    }

    #[must_use]
    pub fn height(self) -> u32 {
        match self {
            Self::W320H50 => 50,
            Self::W728H90 => 90,
            Self::W300H250 => 250,
        }
    }
}

impl fmt::Display for PangleBannerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width(), self.height())
    }
}

/// Config object handed to the SDK's init entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PangleInitConfig {
    pub app_id: String,
    pub support_multi_process: bool,
    pub debug_log: bool,
    pub gdpr_consent: PangleGdprConsent,
    pub do_not_sell: PangleDoNotSell,
    pub child_directed: PangleChildDirected,
}

/// Opaque handle to a rendered banner view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Reward granted by a rewarded ad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PangleRewardItem {
    pub amount: i32,
    pub name: String,
}

/// Init completion callback.
pub trait InitCallback: Send + Sync {
    fn on_success(&self);
    fn on_failure(&self, code: i32, message: &str);
}

/// Load callback for banner ads.
pub trait BannerLoadListener: Send + Sync {
    /// The SDK may report a load with no ad object attached.
    fn on_ad_loaded(&self, ad: Option<Arc<dyn PangleBannerAd>>);
    fn on_error(&self, code: i32, message: &str);
}

/// Load callback for fullscreen ads (interstitial and rewarded).
///
/// Some SDK revisions report the ad object and the "fully cached" signal as
/// two separate events; others only ever call [`Self::on_ad_loaded`]. See
/// [`PangleSdk::emits_cache_events`].
pub trait FullscreenLoadListener<A: ?Sized>: Send + Sync {
    fn on_ad_loaded(&self, ad: Option<Arc<A>>);
    fn on_ad_cached(&self);
    fn on_error(&self, code: i32, message: &str);
}

/// Show-time events for banners.
pub trait BannerInteractionListener: Send + Sync {
    fn on_ad_showed(&self);
    fn on_ad_clicked(&self);
    fn on_ad_dismissed(&self);
}

/// Show-time events for interstitials.
pub trait FullscreenInteractionListener: Send + Sync {
    fn on_ad_showed(&self);
    /// Only newer SDK revisions report show failures.
    fn on_ad_show_failed(&self, _code: i32, _message: &str) {}
    fn on_ad_clicked(&self);
    fn on_ad_dismissed(&self);
}

/// Show-time events for rewarded ads.
pub trait RewardedInteractionListener: FullscreenInteractionListener {
    fn on_user_earned_reward(&self, reward: &PangleRewardItem);
    fn on_user_earned_reward_fail(&self, code: i32, message: &str);
}

/// A loaded Pangle banner.
pub trait PangleBannerAd: Send + Sync {
    fn view(&self) -> ViewHandle;
    fn set_interaction_listener(&self, listener: Box<dyn BannerInteractionListener>);
    /// Releases the partner resources held by this banner.
    fn destroy(&self);
}

/// A loaded Pangle interstitial.
pub trait PangleInterstitialAd: Send + Sync {
    fn set_interaction_listener(&self, listener: Box<dyn FullscreenInteractionListener>);
    fn show(&self, activity: &Activity);
}

/// A loaded Pangle rewarded ad.
pub trait PangleRewardedAd: Send + Sync {
    fn set_interaction_listener(&self, listener: Box<dyn RewardedInteractionListener>);
    fn show(&self, activity: &Activity);
}

/// The Pangle SDK's process-wide entry points.
pub trait PangleSdk: Send + Sync {
    /// Version string of the native SDK.
    fn sdk_version(&self) -> String;

    /// Whether fullscreen loads report a separate "cached" event.
    fn emits_cache_events(&self) -> bool {
        true
    }

    fn init(&self, config: PangleInitConfig, callback: Box<dyn InitCallback>);

    fn set_gdpr_consent(&self, consent: PangleGdprConsent);
    fn set_do_not_sell(&self, do_not_sell: PangleDoNotSell);
    fn set_child_directed(&self, child_directed: PangleChildDirected);

    fn load_banner(
        &self,
        placement_id: &str,
        size: PangleBannerSize,
        listener: Box<dyn BannerLoadListener>,
    );

    fn load_interstitial(
        &self,
        placement_id: &str,
        listener: Box<dyn FullscreenLoadListener<dyn PangleInterstitialAd>>,
    );

    fn load_rewarded(
        &self,
        placement_id: &str,
        listener: Box<dyn FullscreenLoadListener<dyn PangleRewardedAd>>,
    );
}

/// Wraps a Pangle load error code into the adapter taxonomy.
pub(crate) fn load_error(placement_id: &str, code: i32, message: &str) -> AdapterError {
    if code == PANGLE_ERROR_NO_FILL {
        AdapterError::NoFill {
            placement: placement_id.to_string(),
        }
    } else {
        AdapterError::PartnerError {
            code,
            message: message.to_string(),
        }
    }
}
