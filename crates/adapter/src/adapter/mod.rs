//! The Pangle partner adapter.
//!
//! [`PartnerAdapter`] is the contract the mediation layer drives;
//! [`PangleAdapter`] implements it over any [`crate::partner::PangleSdk`].

pub mod banner;
pub mod contract;
pub mod pangle;

pub use banner::pangle_banner_size;
pub use contract::PartnerAdapter;
pub use pangle::PangleAdapter;
