//! Storefront session core
//!
//! In-memory state behind a small storefront client, owned by one session.
//!
//! ## Features
//! - Cart with per-product quantities and decimal totals
//! - Favorites list
//! - Order history filled by a confirmed checkout
//! - Checkout handoff to WhatsApp, confirmed when the user comes back
//! - Persisted dark/light theme
//! - Catalog and user profile collaborators (Postgres or in-memory)

pub mod checkout;
pub mod config;
pub mod domain;
pub mod runtime;
pub mod services;
pub mod session;
pub mod telemetry;
pub mod theme;

pub use checkout::{Checkout, CheckoutError, CheckoutPhase, ConfirmationPolicy};
pub use config::{Config, ConfigError};
pub use domain::aggregates::{Cart, CartEntry, Favorites, Order, OrderDraft, OrderHistory, OrderId, OrderLine, Product, ProductSnapshot};
pub use domain::events::{AttemptId, CheckoutEvent, Notification, NotificationLevel};
pub use domain::value_objects::{format_brl, Price, ProductId, Quantity, ValueError};
pub use runtime::{SessionClosed, SessionHandle, SessionRuntime, SessionSnapshot};
pub use session::{ContextError, Providers, Session, SessionEvent};
pub use theme::{JsonFilePreferences, MemoryPreferences, PreferenceError, PreferenceStore, Theme};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Checkout: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Channel: {0}")]
    Channel(#[from] services::channel::ChannelError),

    #[error("Catalog: {0}")]
    Catalog(#[from] services::catalog::CatalogError),

    #[error("Profile: {0}")]
    Profile(#[from] services::profile::ProfileError),

    #[error("Preferences: {0}")]
    Preference(#[from] PreferenceError),

    #[error("Config: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid value: {0}")]
    Value(#[from] ValueError),

    #[error(transparent)]
    Closed(#[from] SessionClosed),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
