//! Authenticated identity, as far as the session needs it.
//!
//! Sign-in and sign-up belong to the hosted auth provider; the session only
//! reads the current user to name the customer on an order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NOT_PROVIDED: &str = "not provided";
pub const FALLBACK_DISPLAY_NAME: &str = "User";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    /// Name chosen in the profile, possibly blank.
    pub full_name: Option<String>,
    /// Provider metadata, filled at sign-up.
    #[serde(default)]
    pub metadata: IdentityMetadata,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

pub trait IdentitySource: Send {
    fn current_user(&self) -> Result<Option<Identity>, IdentityError>;
}

/// Fixed identity, for hosts that resolve the user once at startup.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentity(pub Option<Identity>);

impl IdentitySource for StaticIdentity {
    fn current_user(&self) -> Result<Option<Identity>, IdentityError> { Ok(self.0.clone()) }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Picks the first usable name: profile full name, metadata full name,
/// metadata name, the local part of the email, then a fixed fallback.
pub fn resolve_display_name(identity: Option<&Identity>) -> String {
    let Some(identity) = identity else { return FALLBACK_DISPLAY_NAME.to_string() };
    let candidates = [
        non_blank(identity.full_name.as_deref()),
        non_blank(identity.metadata.full_name.as_deref()),
        non_blank(identity.metadata.name.as_deref()),
        non_blank(identity.email.as_deref().and_then(|e| e.split('@').next())),
    ];
    candidates.into_iter().flatten().next().unwrap_or(FALLBACK_DISPLAY_NAME).to_string()
}

/// Customer fields stamped on an order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
}

impl CustomerInfo {
    pub fn not_provided() -> Self { Self { name: NOT_PROVIDED.to_string(), email: NOT_PROVIDED.to_string() } }

    pub fn from_identity(identity: &Identity) -> Self {
        let name = [
            non_blank(identity.full_name.as_deref()),
            non_blank(identity.metadata.full_name.as_deref()),
            non_blank(identity.metadata.name.as_deref()),
        ].into_iter().flatten().next().unwrap_or(NOT_PROVIDED).to_string();
        let email = non_blank(identity.email.as_deref()).unwrap_or(NOT_PROVIDED).to_string();
        Self { name, email }
    }

    /// Never fails: a missing user or a provider fault yields placeholders.
    pub fn resolve(source: &dyn IdentitySource) -> Self {
        match source.current_user() {
            Ok(Some(identity)) => Self::from_identity(&identity),
            Ok(None) => Self::not_provided(),
            Err(e) => {
                tracing::warn!(error = %e, "identity lookup failed, using placeholder customer");
                Self::not_provided()
            }
        }
    }
}
