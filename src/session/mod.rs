//! Session state and anti-forgery token handling.

mod store;
mod token;

pub use store::SessionStore;
pub use token::TokenIssuer;

use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session found for the presented id")]
    NotFound,
    #[error("failed to generate a session token")]
    TokenGeneration,
}

/// Server-side state for one client interaction, keyed by the opaque id the
/// hosting layer assigns.
///
/// The token is minted once when the session is created and never changes
/// for the session's lifetime; forms issued earlier in the session stay
/// valid until logout or expiry.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    token: String,
    authenticated: bool,
    created_at: Instant,
    expires_at: Instant,
}

impl Session {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}
