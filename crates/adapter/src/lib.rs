//! Pangle mediation adapter.
//!
//! Bridges a mediation layer's async load/show contract onto the callback
//! driven Pangle SDK, and translates privacy signals into Pangle's consent
//! codes.
//!
//! # Modules
//!
//! - [`adapter`]: The [`adapter::PartnerAdapter`] contract and its Pangle implementation
//! - [`constants`]: Partner identity, credential keys and consent map keys
//! - [`error`]: Error types and error handling utilities
//! - [`logging`]: Logger setup for hosts without their own `log` backend
//! - [`mediation`]: Types shared with the mediation layer
//! - [`partner`]: Pangle SDK surface: codes, ad objects and callback traits
//! - [`privacy`]: GDPR/CCPA/COPPA translation and consent overrides
//! - [`registry`]: Placement-keyed mediation listener registry
//! - [`resolver`]: One-shot bridge from partner callbacks to `async` callers
//! - [`settings`]: Configuration management and validation
//! - [`test_support`]: Testing utilities and mocks

pub mod adapter;
mod callbacks;
pub mod constants;
pub mod error;
pub mod logging;
pub mod mediation;
pub mod partner;
pub mod privacy;
pub mod registry;
pub mod resolver;
pub mod settings;

pub use adapter::{PangleAdapter, PartnerAdapter};
pub use error::AdapterError;
pub use settings::Settings;
