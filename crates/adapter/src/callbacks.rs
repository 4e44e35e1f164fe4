//! Pangle listener implementations that feed resolvers and mediation listeners.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AdapterError;
use crate::mediation::{AdPlacementRequest, PartnerAdListener};
use crate::partner::{
    load_error, BannerInteractionListener, BannerLoadListener, FullscreenInteractionListener,
    FullscreenLoadListener, InitCallback, PangleBannerAd, PangleRewardItem,
    RewardedInteractionListener,
};
use crate::resolver::{Resolution, Resolver};

pub(crate) type Outcome<T> = Result<T, AdapterError>;

pub(crate) struct InitCallbacks {
    pub(crate) resolver: Resolver<Outcome<()>>,
}

impl InitCallback for InitCallbacks {
    fn on_success(&self) {
        self.resolver.resolve(Ok(()));
    }

    fn on_failure(&self, code: i32, message: &str) {
        self.resolver
            .resolve(Err(AdapterError::InitializationFailure {
                reason: format!("Pangle init failed with code {code}: {message}"),
            }));
    }
}

pub(crate) struct BannerLoadCallbacks {
    pub(crate) request: AdPlacementRequest,
    pub(crate) listener: Arc<dyn PartnerAdListener>,
    pub(crate) resolver: Resolver<Outcome<Arc<dyn PangleBannerAd>>>,
}

impl BannerLoadListener for BannerLoadCallbacks {
    fn on_ad_loaded(&self, ad: Option<Arc<dyn PangleBannerAd>>) {
        let Some(ad) = ad else {
            self.resolver.resolve(Err(AdapterError::NoFill {
                placement: self.request.placement_id.clone(),
            }));
            return;
        };

        match self.resolver.try_resolve(Ok(Arc::clone(&ad))) {
            Resolution::Delivered => {
                ad.set_interaction_listener(Box::new(BannerInteractionForwarder {
                    request: self.request.clone(),
                    listener: Arc::clone(&self.listener),
                }));
            }
            Resolution::Duplicate(_) => {}
            Resolution::Abandoned(_) => {
                log::warn!(
                    "Pangle: destroying banner for '{}' that loaded after the load failed",
                    self.request.placement_id
                );
                ad.destroy();
            }
        }
    }

    fn on_error(&self, code: i32, message: &str) {
        log::error!(
            "Pangle: banner load failed for '{}': {} {}",
            self.request.placement_id,
            code,
            message
        );
        self.resolver
            .resolve(Err(load_error(&self.request.placement_id, code, message)));
    }
}

struct BannerInteractionForwarder {
    request: AdPlacementRequest,
    listener: Arc<dyn PartnerAdListener>,
}

impl BannerInteractionListener for BannerInteractionForwarder {
    fn on_ad_showed(&self) {
        self.listener.on_impression(&self.request);
    }

    fn on_ad_clicked(&self) {
        self.listener.on_clicked(&self.request);
    }

    fn on_ad_dismissed(&self) {
        log::debug!(
            "Pangle: banner '{}' dismissed",
            self.request.placement_id
        );
    }
}

/// Load callbacks shared by interstitial and rewarded ads.
///
/// `loaded` resolves on the first ad-object or error event; `cached` resolves
/// on the "fully cached" event, which not every SDK revision emits.
pub(crate) struct FullscreenLoadCallbacks<A: ?Sized> {
    pub(crate) placement_id: String,
    pub(crate) loaded: Resolver<Outcome<Arc<A>>>,
    pub(crate) cached: Resolver<()>,
}

impl<A: ?Sized + Send + Sync> FullscreenLoadListener<A> for FullscreenLoadCallbacks<A> {
    fn on_ad_loaded(&self, ad: Option<Arc<A>>) {
        let outcome = ad.ok_or_else(|| AdapterError::MismatchedAdParams {
            message: format!(
                "Pangle reported a loaded ad without an ad object for '{}'",
                self.placement_id
            ),
        });
        self.loaded.resolve(outcome);
    }

    fn on_ad_cached(&self) {
        self.cached.resolve(());
    }

    fn on_error(&self, code: i32, message: &str) {
        log::error!(
            "Pangle: fullscreen load failed for '{}': {} {}",
            self.placement_id,
            code,
            message
        );
        self.loaded
            .resolve(Err(load_error(&self.placement_id, code, message)));
    }
}

/// Show-time callbacks for interstitial and rewarded ads.
///
/// Resolves `shown` once, then forwards clicks, rewards and the dismissal to
/// the listener claimed from the registry. Events are only forwarded after
/// the caller received a successful "shown" and before the dismissal; a show
/// that failed or timed out forwards nothing.
pub(crate) struct FullscreenShowCallbacks {
    pub(crate) request: AdPlacementRequest,
    pub(crate) listener: Option<Arc<dyn PartnerAdListener>>,
    pub(crate) shown: Resolver<Outcome<()>>,
    pub(crate) live: AtomicBool,
    pub(crate) dismissed: AtomicBool,
}

impl FullscreenShowCallbacks {
    pub(crate) fn new(
        request: AdPlacementRequest,
        listener: Option<Arc<dyn PartnerAdListener>>,
        shown: Resolver<Outcome<()>>,
    ) -> Self {
        Self {
            request,
            listener,
            shown,
            live: AtomicBool::new(false),
            dismissed: AtomicBool::new(false),
        }
    }

    fn forward(&self, event: &str, notify: impl FnOnce(&dyn PartnerAdListener)) {
        if !self.live.load(Ordering::Acquire) {
            log::debug!(
                "Pangle: dropping {} for '{}', show did not succeed",
                event,
                self.request.placement_id
            );
            return;
        }
        if self.dismissed.load(Ordering::Acquire) {
            log::debug!(
                "Pangle: dropping {} for '{}' after dismissal",
                event,
                self.request.placement_id
            );
            return;
        }
        self.notify(event, notify);
    }

    fn notify(&self, event: &str, notify: impl FnOnce(&dyn PartnerAdListener)) {
        match &self.listener {
            Some(listener) => notify(listener.as_ref()),
            None => log::warn!(
                "Pangle: no listener for {} on '{}'",
                event,
                self.request.placement_id
            ),
        }
    }
}

impl FullscreenInteractionListener for FullscreenShowCallbacks {
    fn on_ad_showed(&self) {
        if self.shown.resolve(Ok(())) {
            self.live.store(true, Ordering::Release);
            self.forward("impression", |listener| listener.on_impression(&self.request));
        }
    }

    fn on_ad_show_failed(&self, code: i32, message: &str) {
        log::error!(
            "Pangle: show failed for '{}': {} {}",
            self.request.placement_id,
            code,
            message
        );
        self.shown.resolve(Err(AdapterError::PartnerError {
            code,
            message: message.to_string(),
        }));
    }

    fn on_ad_clicked(&self) {
        self.forward("click", |listener| listener.on_clicked(&self.request));
    }

    fn on_ad_dismissed(&self) {
        if !self.live.load(Ordering::Acquire) {
            log::debug!(
                "Pangle: dropping dismiss for '{}', show did not succeed",
                self.request.placement_id
            );
            return;
        }
        if self.dismissed.swap(true, Ordering::AcqRel) {
            log::debug!(
                "Pangle: ignoring repeated dismiss for '{}'",
                self.request.placement_id
            );
            return;
        }
        self.notify("dismiss", |listener| listener.on_dismissed(&self.request));
    }
}

impl RewardedInteractionListener for FullscreenShowCallbacks {
    fn on_user_earned_reward(&self, reward: &PangleRewardItem) {
        log::debug!(
            "Pangle: reward {} x{} for '{}'",
            reward.name,
            reward.amount,
            self.request.placement_id
        );
        self.forward("reward", |listener| listener.on_rewarded(&self.request));
    }

    fn on_user_earned_reward_fail(&self, code: i32, message: &str) {
        log::warn!(
            "Pangle: reward failed for '{}': {} {}",
            self.request.placement_id,
            code,
            message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediation::AdFormat;
    use crate::resolver::channel;
    use crate::test_support::tests::{ListenerEvent, RecordingListener};
    use std::time::Duration;

    fn show_callbacks(
        listener: Option<Arc<dyn PartnerAdListener>>,
    ) -> (FullscreenShowCallbacks, crate::resolver::Pending<Outcome<()>>) {
        let (shown, pending) = channel("show");
        let request = AdPlacementRequest::new("reward-1", AdFormat::Rewarded);
        (FullscreenShowCallbacks::new(request, listener, shown), pending)
    }

    #[tokio::test]
    async fn test_show_callbacks_forward_until_dismissed() {
        let listener = RecordingListener::new();
        let (callbacks, pending) = show_callbacks(Some(listener.clone()));

        callbacks.on_ad_showed();
        callbacks.on_ad_showed();
        callbacks.on_ad_clicked();
        callbacks.on_user_earned_reward(&PangleRewardItem {
            amount: 10,
            name: "coins".into(),
        });
        callbacks.on_ad_dismissed();
        callbacks.on_ad_clicked();
        callbacks.on_ad_dismissed();

        assert!(pending
            .wait(Duration::from_millis(50))
            .await
            .expect("should resolve")
            .is_ok());
        assert_eq!(
            listener.events(),
            vec![
                ListenerEvent::Impression("reward-1".into()),
                ListenerEvent::Clicked("reward-1".into()),
                ListenerEvent::Rewarded("reward-1".into()),
                ListenerEvent::Dismissed("reward-1".into()),
            ]
        );
    }

    #[test]
    fn test_show_events_after_abandoned_wait_are_dropped() {
        let listener = RecordingListener::new();
        let (callbacks, pending) = show_callbacks(Some(listener.clone()));
        drop(pending);

        callbacks.on_ad_showed();
        callbacks.on_ad_clicked();
        callbacks.on_user_earned_reward(&PangleRewardItem {
            amount: 10,
            name: "coins".into(),
        });
        callbacks.on_ad_dismissed();

        assert!(listener.events().is_empty());
    }

    #[tokio::test]
    async fn test_show_failure_resolves_with_partner_error() {
        let (callbacks, pending) = show_callbacks(None);

        callbacks.on_ad_show_failed(-4, "ad expired");
        callbacks.on_ad_showed();

        let outcome = pending
            .wait(Duration::from_millis(50))
            .await
            .expect("should resolve");
        assert!(matches!(
            outcome,
            Err(AdapterError::PartnerError { code: -4, .. })
        ));
    }

    #[test]
    fn test_events_without_listener_are_dropped() {
        let (callbacks, _pending) = show_callbacks(None);
        callbacks.on_ad_showed();
        callbacks.on_ad_clicked();
        callbacks.on_ad_dismissed();
    }

    #[tokio::test]
    async fn test_init_failure_carries_partner_code() {
        let (resolver, pending) = channel("init");
        let callbacks = InitCallbacks { resolver };

        callbacks.on_failure(4000, "app id invalid");
        callbacks.on_success();

        let outcome = pending
            .wait(Duration::from_millis(50))
            .await
            .expect("should resolve");
        let reason = match outcome {
            Err(AdapterError::InitializationFailure { reason }) => reason,
            _ => String::new(),
        };
        assert!(reason.contains("4000"));
        assert!(reason.contains("app id invalid"));
    }
}
