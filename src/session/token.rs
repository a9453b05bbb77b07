use super::{SessionError, SessionStore};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Mint a fresh anti-forgery token: 32 bytes from the OS RNG, URL-safe
/// base64 without padding. The raw value only lives in the store and in the
/// client's cookie.
pub(super) fn generate_token() -> Result<String, SessionError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| SessionError::TokenGeneration)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Issues and checks per-session anti-forgery tokens.
pub struct TokenIssuer {
    store: Arc<SessionStore>,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Token for `session_id`, creating a pending session when none exists.
    ///
    /// Repeat calls within the session's lifetime return the same token.
    pub fn issue(&self, session_id: &str) -> Result<String, SessionError> {
        Ok(self.store.get_or_create(session_id)?.token().to_string())
    }

    /// True iff a live session exists for `session_id` and its stored token
    /// matches `presented`. Comparison runs in constant time.
    #[must_use]
    pub fn validate(&self, session_id: &str, presented: &str) -> bool {
        self.store.get(session_id).is_some_and(|session| {
            bool::from(session.token().as_bytes().ct_eq(presented.as_bytes()))
        })
    }
}
