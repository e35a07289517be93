//! Order finalization workflow.
//!
//! ```text
//! Idle ──begin──▶ AwaitingExternalAction ──focus + debounce──▶ AwaitingConfirmation
//!   ▲                      │ timeout                            │ confirm / cancel
//!   └──────────────────────┴────────────────────────────────────┘
//! ```
//!
//! The machine holds no timers of its own. It records deadlines and the
//! runtime wakes it through [`Checkout::poll`]. Deadlines live inside the
//! attempt's state, so a terminal transition drops them together with the
//! draft and nothing scheduled for attempt N can fire during attempt N + 1.

use serde::Serialize;
use thiserror::Error;
use tokio::time::{Duration, Instant};
use crate::domain::aggregates::{Cart, OrderDraft};
use crate::domain::events::{AttemptId, CheckoutEvent};
use crate::services::identity::CustomerInfo;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Delay between regaining focus and prompting.
    pub debounce: Duration,
    /// How long to wait for the user to come back before dropping the draft.
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self { Self { debounce: DEFAULT_DEBOUNCE, timeout: DEFAULT_TIMEOUT } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CheckoutPhase { Idle, AwaitingExternalAction, AwaitingConfirmation }

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("checkout attempt {} is still in progress", .0.value())]
    InProgress(AttemptId),
    #[error("checkout attempt {} is no longer current", .0.value())]
    StaleAttempt(AttemptId),
    #[error("checkout attempt {} is not awaiting confirmation", .0.value())]
    NotAwaitingConfirmation(AttemptId),
}

#[derive(Debug)]
enum Phase {
    Idle,
    AwaitingExternalAction { attempt: AttemptId, draft: OrderDraft, expires_at: Instant, prompt_at: Option<Instant> },
    AwaitingConfirmation { attempt: AttemptId, draft: OrderDraft },
}

#[derive(Debug)]
pub struct Checkout {
    phase: Phase,
    policy: ConfirmationPolicy,
    last_attempt: u64,
}

impl Checkout {
    pub fn new(policy: ConfirmationPolicy) -> Self { Self { phase: Phase::Idle, policy, last_attempt: 0 } }

    pub fn policy(&self) -> ConfirmationPolicy { self.policy }

    pub fn phase(&self) -> CheckoutPhase {
        match self.phase {
            Phase::Idle => CheckoutPhase::Idle,
            Phase::AwaitingExternalAction { .. } => CheckoutPhase::AwaitingExternalAction,
            Phase::AwaitingConfirmation { .. } => CheckoutPhase::AwaitingConfirmation,
        }
    }

    pub fn attempt(&self) -> Option<AttemptId> {
        match &self.phase {
            Phase::Idle => None,
            Phase::AwaitingExternalAction { attempt, .. } | Phase::AwaitingConfirmation { attempt, .. } => Some(*attempt),
        }
    }

    pub fn draft(&self) -> Option<&OrderDraft> {
        match &self.phase {
            Phase::Idle => None,
            Phase::AwaitingExternalAction { draft, .. } | Phase::AwaitingConfirmation { draft, .. } => Some(draft),
        }
    }

    /// Snapshots the cart into a pending draft. Only valid from `Idle`.
    pub fn begin(&mut self, cart: &Cart, customer: &CustomerInfo, now: Instant) -> Result<AttemptId, CheckoutError> {
        if let Some(current) = self.attempt() { return Err(CheckoutError::InProgress(current)); }
        let draft = OrderDraft::from_cart(cart, customer.name.as_str(), customer.email.as_str()).ok_or(CheckoutError::EmptyCart)?;

        self.last_attempt += 1;
        let attempt = AttemptId(self.last_attempt);
        tracing::info!(attempt = attempt.value(), items = draft.total_items(), total = %draft.total, "checkout started");
        self.phase = Phase::AwaitingExternalAction { attempt, draft, expires_at: now + self.policy.timeout, prompt_at: None };
        Ok(attempt)
    }

    /// The handoff could not even be started; drop the draft.
    pub fn handoff_failed(&mut self, attempt: AttemptId) -> Option<OrderDraft> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingExternalAction { attempt: current, draft, .. } if current == attempt => Some(draft),
            other => { self.phase = other; None }
        }
    }

    /// Arms (or re-arms) the confirmation prompt after the debounce delay.
    pub fn focus_regained(&mut self, now: Instant) -> bool {
        let debounce = self.policy.debounce;
        match &mut self.phase {
            Phase::AwaitingExternalAction { prompt_at, .. } => { *prompt_at = Some(now + debounce); true }
            _ => false,
        }
    }

    /// Focus fired before the user actually left; disarm the prompt.
    pub fn focus_lost(&mut self) {
        if let Phase::AwaitingExternalAction { prompt_at, .. } = &mut self.phase { *prompt_at = None; }
    }

    /// Manual "I'm back" fallback for hosts without a focus signal.
    pub fn request_confirmation(&mut self, attempt: AttemptId) -> Result<(), CheckoutError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingExternalAction { attempt: current, draft, .. } if current == attempt => {
                self.phase = Phase::AwaitingConfirmation { attempt, draft };
                Ok(())
            }
            other => {
                let err = Self::mismatch(&other, attempt);
                self.phase = other;
                Err(err)
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.phase {
            Phase::AwaitingExternalAction { expires_at, prompt_at, .. } => Some(prompt_at.unwrap_or(*expires_at)),
            _ => None,
        }
    }

    /// Fires whatever deadline is due. An armed prompt suspends the timeout:
    /// the user came back inside the window.
    pub fn poll(&mut self, now: Instant) -> Option<CheckoutEvent> {
        let Phase::AwaitingExternalAction { expires_at, prompt_at, .. } = &self.phase else { return None };
        let prompt_due = prompt_at.is_some_and(|p| p <= now);
        let expired = prompt_at.is_none() && *expires_at <= now;
        if !prompt_due && !expired { return None; }

        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingExternalAction { attempt, draft, .. } if prompt_due => {
                tracing::debug!(attempt = attempt.value(), "prompting for confirmation");
                self.phase = Phase::AwaitingConfirmation { attempt, draft };
                Some(CheckoutEvent::ConfirmationRequested { attempt })
            }
            Phase::AwaitingExternalAction { attempt, .. } => {
                tracing::info!(attempt = attempt.value(), "checkout abandoned, no return from messaging app");
                Some(CheckoutEvent::Abandoned { attempt })
            }
            other => { self.phase = other; None }
        }
    }

    /// "I sent it": hands the draft back for commit.
    pub fn confirm(&mut self, attempt: AttemptId) -> Result<OrderDraft, CheckoutError> {
        self.resolve(attempt)
    }

    /// "I didn't send it": the draft is dropped, stores stay untouched.
    pub fn cancel(&mut self, attempt: AttemptId) -> Result<(), CheckoutError> {
        self.resolve(attempt).map(drop)
    }

    /// Drops any pending attempt, e.g. when the user navigates away.
    pub fn abandon(&mut self) -> Option<AttemptId> {
        let attempt = self.attempt();
        self.phase = Phase::Idle;
        attempt
    }

    fn resolve(&mut self, attempt: AttemptId) -> Result<OrderDraft, CheckoutError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingConfirmation { attempt: current, draft } if current == attempt => Ok(draft),
            other => {
                let err = Self::mismatch(&other, attempt);
                self.phase = other;
                Err(err)
            }
        }
    }

    fn mismatch(phase: &Phase, attempt: AttemptId) -> CheckoutError {
        match phase {
            Phase::AwaitingExternalAction { attempt: current, .. } | Phase::AwaitingConfirmation { attempt: current, .. } if *current == attempt => {
                CheckoutError::NotAwaitingConfirmation(attempt)
            }
            _ => CheckoutError::StaleAttempt(attempt),
        }
    }
}

impl Default for Checkout {
    fn default() -> Self { Self::new(ConfirmationPolicy::default()) }
}
