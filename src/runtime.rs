//! Event loop owning a [`Session`].
//!
//! One task applies UI events, focus signals and checkout deadlines in
//! order. Observers read state through a watch channel of
//! [`SessionSnapshot`]s and receive user-facing notifications on a
//! bounded queue. Notifications that do not fit are dropped with a warning.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use crate::checkout::CheckoutPhase;
use crate::domain::aggregates::{CartEntry, Order, ProductSnapshot};
use crate::domain::events::{AttemptId, Notification};
use crate::session::{Session, SessionEvent};

pub const NOTIFICATION_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session task has stopped")]
pub struct SessionClosed;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartSummary {
    pub entries: Vec<CartEntry>,
    pub total_items: u64,
    pub total_price: Decimal,
}

/// Read model published after every step. Stores without a provider are `None`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub cart: Option<CartSummary>,
    pub favorites: Option<Vec<ProductSnapshot>>,
    pub orders: Option<Vec<Order>>,
    pub dark_mode: Option<bool>,
    pub checkout: CheckoutPhase,
    pub attempt: Option<AttemptId>,
}

impl SessionSnapshot {
    pub fn of(session: &Session) -> Self {
        let providers = session.providers();
        Self {
            cart: providers.use_cart().ok().map(|cart| CartSummary {
                entries: cart.entries().to_vec(),
                total_items: cart.total_items(),
                total_price: cart.total_price(),
            }),
            favorites: providers.use_favorites().ok().map(|f| f.items().to_vec()),
            orders: providers.use_orders().ok().map(|o| o.orders().to_vec()),
            dark_mode: providers.use_theme().ok().map(|t| t.is_dark()),
            checkout: session.checkout().phase(),
            attempt: session.checkout().attempt(),
        }
    }
}

/// Cloneable front end of a running session. The task stops once every
/// handle is dropped.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub fn send(&self, event: SessionEvent) -> Result<(), SessionClosed> {
        self.events.send(event).map_err(|_| SessionClosed)
    }

    pub fn snapshot(&self) -> SessionSnapshot { self.snapshot.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> { self.snapshot.clone() }
}

pub struct SessionRuntime;

impl SessionRuntime {
    /// Moves the session onto its own task. The join handle yields the
    /// session back when the loop ends.
    pub fn spawn(session: Session) -> (SessionHandle, mpsc::Receiver<Notification>, JoinHandle<Session>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::channel(NOTIFICATION_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::of(&session));

        let task = tokio::spawn(run(session, event_rx, notify_tx, snapshot_tx));
        (SessionHandle { events: event_tx, snapshot: snapshot_rx }, notify_rx, task)
    }
}

async fn run(
    mut session: Session,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    notifications: mpsc::Sender<Notification>,
    snapshot: watch::Sender<SessionSnapshot>,
) -> Session {
    tracing::debug!("session runtime started");
    loop {
        let deadline = session.next_deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if let Err(e) = session.handle(event, Instant::now()) {
                        tracing::debug!(error = %e, "session event rejected");
                    }
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                session.poll(Instant::now());
            }
        }

        for event in session.take_events() {
            let Some(notification) = event.notification() else { continue };
            match notifications.try_send(notification) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(dropped)) => {
                    tracing::warn!(message = %dropped.message, "notification queue full, dropping notification");
                }
            }
        }
        snapshot.send_replace(SessionSnapshot::of(&session));
    }
    tracing::debug!("session runtime stopped, all handles dropped");
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::aggregates::Product;
    use crate::services::channel::{ChannelError, ExternalChannel};
    use crate::services::identity::StaticIdentity;
    use crate::theme::{MemoryPreferences, Theme};

    struct Noop;
    impl ExternalChannel for Noop {
        fn open(&self, _uri: &str) -> Result<(), ChannelError> { Ok(()) }
    }

    fn session() -> Session {
        Session::new(&Config::default(), Theme::load(Box::<MemoryPreferences>::default()), Box::new(StaticIdentity(None)), Box::new(Noop))
    }

    #[tokio::test]
    async fn test_snapshot_follows_events() {
        let (handle, _notifications, task) = SessionRuntime::spawn(session());
        let mut rx = handle.subscribe();

        let product = Product::new("7", "Caneca", Decimal::new(3500, 2)).snapshot().unwrap();
        handle.send(SessionEvent::AddToCart(product.clone())).unwrap();
        handle.send(SessionEvent::AddToCart(product)).unwrap();
        handle.send(SessionEvent::ToggleTheme).unwrap();

        let snap = rx.wait_for(|s| s.dark_mode == Some(true)).await.unwrap().clone();
        let cart = snap.cart.unwrap();
        assert_eq!(cart.total_items, 2);
        assert_eq!(cart.total_price, Decimal::new(7000, 2));
        assert_eq!(snap.checkout, CheckoutPhase::Idle);

        drop(rx);
        drop(handle);
        let session = task.await.unwrap();
        assert_eq!(session.providers().use_cart().unwrap().total_items(), 2);
    }

    #[tokio::test]
    async fn test_empty_finalize_notifies() {
        let (handle, mut notifications, _task) = SessionRuntime::spawn(session());
        handle.send(SessionEvent::Finalize).unwrap();
        let notification = notifications.recv().await.unwrap();
        assert_eq!(notification.level, crate::NotificationLevel::Error);
        assert_eq!(handle.snapshot().checkout, CheckoutPhase::Idle);
    }

    #[tokio::test]
    async fn test_undrained_notifications_are_capped() {
        let (handle, mut notifications, _task) = SessionRuntime::spawn(session());
        let mut rx = handle.subscribe();
        for _ in 0..NOTIFICATION_BUFFER + 10 {
            handle.send(SessionEvent::Finalize).unwrap();
        }
        handle.send(SessionEvent::ToggleTheme).unwrap();
        rx.wait_for(|s| s.dark_mode == Some(true)).await.unwrap();

        let mut queued = 0;
        while notifications.try_recv().is_ok() { queued += 1; }
        assert_eq!(queued, NOTIFICATION_BUFFER);
    }
}
