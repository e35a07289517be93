//! Session: one instance of every store, plus the checkout workflow.
//!
//! Stores are installed as providers. Reaching for a store that was not
//! provided is a programming error and fails fast with [`ContextError`]
//! instead of handing back an empty default.

use chrono::Utc;
use thiserror::Error;
use tokio::time::Instant;
use crate::checkout::{Checkout, CheckoutError, ConfirmationPolicy};
use crate::config::Config;
use crate::domain::aggregates::{Cart, Favorites, Order, OrderHistory, ProductSnapshot};
use crate::domain::events::{AttemptId, CheckoutEvent};
use crate::domain::value_objects::ProductId;
use crate::services::channel::{compose_order_summary, whatsapp_link, ExternalChannel};
use crate::services::identity::{CustomerInfo, IdentitySource};
use crate::theme::Theme;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("{accessor} must be used within a {provider}")]
    MissingProvider { accessor: &'static str, provider: &'static str },
}

macro_rules! accessors {
    ($field:ident: $ty:ty, $get:ident, $get_mut:ident, $provider:literal) => {
        pub fn $get(&self) -> std::result::Result<&$ty, ContextError> {
            self.$field.as_ref().ok_or(ContextError::MissingProvider { accessor: stringify!($get), provider: $provider })
        }
        pub fn $get_mut(&mut self) -> std::result::Result<&mut $ty, ContextError> {
            self.$field.as_mut().ok_or(ContextError::MissingProvider { accessor: stringify!($get), provider: $provider })
        }
    };
}

/// Store slots owned by the session.
#[derive(Debug, Default)]
pub struct Providers {
    cart: Option<Cart>,
    favorites: Option<Favorites>,
    orders: Option<OrderHistory>,
    theme: Option<Theme>,
}

impl Providers {
    /// Every store installed, empty.
    pub fn all(theme: Theme) -> Self {
        Self { cart: Some(Cart::new()), favorites: Some(Favorites::new()), orders: Some(OrderHistory::new()), theme: Some(theme) }
    }

    pub fn with_cart(mut self, cart: Cart) -> Self { self.cart = Some(cart); self }
    pub fn with_favorites(mut self, favorites: Favorites) -> Self { self.favorites = Some(favorites); self }
    pub fn with_orders(mut self, orders: OrderHistory) -> Self { self.orders = Some(orders); self }
    pub fn with_theme(mut self, theme: Theme) -> Self { self.theme = Some(theme); self }

    accessors!(cart: Cart, use_cart, use_cart_mut, "CartProvider");
    accessors!(favorites: Favorites, use_favorites, use_favorites_mut, "FavoritesProvider");
    accessors!(orders: OrderHistory, use_orders, use_orders_mut, "OrderProvider");
    accessors!(theme: Theme, use_theme, use_theme_mut, "ThemeProvider");
}

/// Everything a UI can ask the session to do.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    AddToCart(ProductSnapshot),
    RemoveFromCart(ProductId),
    UpdateQuantity(ProductId, i64),
    ClearCart,
    AddFavorite(ProductSnapshot),
    RemoveFavorite(ProductId),
    ClearFavorites,
    ToggleTheme,
    Finalize,
    /// Control came back to the application (window focus, app resume).
    FocusRegained,
    FocusLost,
    /// Manual "I'm back" button.
    RequestConfirmation(AttemptId),
    Confirm(AttemptId),
    Cancel(AttemptId),
    AbandonCheckout,
}

pub struct Session {
    providers: Providers,
    checkout: Checkout,
    identity: Box<dyn IdentitySource>,
    channel: Box<dyn ExternalChannel>,
    whatsapp_number: Option<String>,
    events: Vec<CheckoutEvent>,
}

impl Session {
    pub fn new(config: &Config, theme: Theme, identity: Box<dyn IdentitySource>, channel: Box<dyn ExternalChannel>) -> Self {
        Self::with_providers(Providers::all(theme), config.confirmation, config.whatsapp_number.clone(), identity, channel)
    }

    pub fn with_providers(
        providers: Providers,
        policy: ConfirmationPolicy,
        whatsapp_number: Option<String>,
        identity: Box<dyn IdentitySource>,
        channel: Box<dyn ExternalChannel>,
    ) -> Self {
        Self { providers, checkout: Checkout::new(policy), identity, channel, whatsapp_number, events: Vec::new() }
    }

    pub fn providers(&self) -> &Providers { &self.providers }
    pub fn providers_mut(&mut self) -> &mut Providers { &mut self.providers }
    pub fn checkout(&self) -> &Checkout { &self.checkout }

    pub fn handle(&mut self, event: SessionEvent, now: Instant) -> Result<()> {
        match event {
            SessionEvent::AddToCart(product) => self.providers.use_cart_mut()?.add(product),
            SessionEvent::RemoveFromCart(id) => self.providers.use_cart_mut()?.remove(&id),
            SessionEvent::UpdateQuantity(id, quantity) => self.providers.use_cart_mut()?.update_quantity(&id, quantity),
            SessionEvent::ClearCart => self.providers.use_cart_mut()?.clear(),
            SessionEvent::AddFavorite(product) => { self.providers.use_favorites_mut()?.add(product); }
            SessionEvent::RemoveFavorite(id) => { self.providers.use_favorites_mut()?.remove(&id); }
            SessionEvent::ClearFavorites => self.providers.use_favorites_mut()?.clear(),
            SessionEvent::ToggleTheme => { self.providers.use_theme_mut()?.toggle(); }
            SessionEvent::Finalize => { self.finalize(now)?; }
            SessionEvent::FocusRegained => { self.checkout.focus_regained(now); }
            SessionEvent::FocusLost => self.checkout.focus_lost(),
            SessionEvent::RequestConfirmation(attempt) => {
                self.checkout.request_confirmation(attempt)?;
                self.events.push(CheckoutEvent::ConfirmationRequested { attempt });
            }
            SessionEvent::Confirm(attempt) => { self.confirm(attempt)?; }
            SessionEvent::Cancel(attempt) => self.cancel(attempt)?,
            SessionEvent::AbandonCheckout => self.abandon(),
        }
        Ok(())
    }

    /// Snapshots the cart into a pending draft and hands its summary to the
    /// external channel.
    pub fn finalize(&mut self, now: Instant) -> Result<AttemptId> {
        let cart = self.providers.use_cart()?;
        let customer = CustomerInfo::resolve(self.identity.as_ref());
        let attempt = match self.checkout.begin(cart, &customer, now) {
            Ok(attempt) => attempt,
            Err(e) => {
                match &e {
                    CheckoutError::EmptyCart => self.events.push(CheckoutEvent::CartEmpty),
                    CheckoutError::InProgress(current) => {
                        tracing::debug!(attempt = current.value(), "finalize ignored, checkout already in progress");
                        self.events.push(CheckoutEvent::AlreadyInProgress { attempt: *current });
                    }
                    _ => {}
                }
                return Err(e.into());
            }
        };

        let Some(draft) = self.checkout.draft() else { return Err(CheckoutError::StaleAttempt(attempt).into()) };
        let total = draft.total;
        let uri = whatsapp_link(self.whatsapp_number.as_deref(), &compose_order_summary(draft));

        if let Err(e) = self.channel.open(&uri) {
            tracing::warn!(attempt = attempt.value(), error = %e, "order handoff failed");
            self.checkout.handoff_failed(attempt);
            self.events.push(CheckoutEvent::HandoffFailed { attempt, reason: e.to_string() });
            return Err(e.into());
        }
        self.events.push(CheckoutEvent::HandedOff { attempt, uri, total });
        Ok(attempt)
    }

    /// Commits the pending draft and empties the whole cart.
    pub fn confirm(&mut self, attempt: AttemptId) -> Result<Order> {
        self.providers.use_orders()?;
        self.providers.use_cart()?;
        let draft = self.checkout.confirm(attempt)?;

        let order = self.providers.use_orders_mut()?.add(draft, Utc::now());
        self.providers.use_cart_mut()?.clear();
        tracing::info!(attempt = attempt.value(), order_id = %order.id(), "checkout committed");
        self.events.push(CheckoutEvent::Committed { attempt, order_id: order.id(), total: order.total() });
        Ok(order)
    }

    /// Drops the pending draft; cart and orders stay as they were.
    pub fn cancel(&mut self, attempt: AttemptId) -> Result<()> {
        self.checkout.cancel(attempt)?;
        tracing::info!(attempt = attempt.value(), "checkout discarded by user");
        self.events.push(CheckoutEvent::Discarded { attempt });
        Ok(())
    }

    pub fn abandon(&mut self) {
        if let Some(attempt) = self.checkout.abandon() {
            tracing::info!(attempt = attempt.value(), "checkout abandoned");
            self.events.push(CheckoutEvent::Abandoned { attempt });
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> { self.checkout.next_deadline() }

    pub fn poll(&mut self, now: Instant) {
        if let Some(event) = self.checkout.poll(now) { self.events.push(event); }
    }

    pub fn take_events(&mut self) -> Vec<CheckoutEvent> { std::mem::take(&mut self.events) }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("providers", &self.providers)
            .field("checkout", &self.checkout)
            .field("whatsapp_number", &self.whatsapp_number)
            .finish_non_exhaustive()
    }
}
