use crate::mediation::BannerSize;
use crate::partner::PangleBannerSize;

/// Picks the Pangle banner bucket for a requested size.
///
/// Only the height is considered. Requests without a size, or shorter than
/// 90, get the standard 320x50 banner.
#[must_use]
pub fn pangle_banner_size(size: Option<BannerSize>) -> PangleBannerSize {
    match size.map(|size| size.height) {
        Some(height) if height >= 250 => PangleBannerSize::W300H250,
        Some(height) if height >= 90 => PangleBannerSize::W728H90,
        _ => PangleBannerSize::W320H50,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn height(height: u32) -> Option<BannerSize> {
        Some(BannerSize { width: 0, height })
    }

    #[test]
    fn test_size_buckets() {
        assert_eq!(pangle_banner_size(height(70)), PangleBannerSize::W320H50);
        assert_eq!(pangle_banner_size(height(150)), PangleBannerSize::W728H90);
        assert_eq!(pangle_banner_size(height(260)), PangleBannerSize::W300H250);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(pangle_banner_size(height(50)), PangleBannerSize::W320H50);
        assert_eq!(pangle_banner_size(height(89)), PangleBannerSize::W320H50);
        assert_eq!(pangle_banner_size(height(90)), PangleBannerSize::W728H90);
        assert_eq!(pangle_banner_size(height(249)), PangleBannerSize::W728H90);
        assert_eq!(pangle_banner_size(height(250)), PangleBannerSize::W300H250);
    }

    #[test]
    fn test_missing_or_small_size_defaults() {
        assert_eq!(pangle_banner_size(None), PangleBannerSize::W320H50);
        assert_eq!(pangle_banner_size(height(0)), PangleBannerSize::W320H50);
        assert_eq!(pangle_banner_size(height(30)), PangleBannerSize::W320H50);
    }
}
