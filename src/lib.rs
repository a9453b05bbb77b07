//! # Mammba (member session & registration service)
//!
//! `mammba` is the backend for the Mammba member API. It issues per-session
//! anti-forgery tokens, tracks session authentication state, and registers
//! member records against an external user store.
//!
//! ## Sessions
//!
//! Session state lives in a sharded in-process map keyed by the opaque
//! session id the hosting layer assigns to each client. A session is
//! `pending` from the first `/init` call, `authenticated` after `/login`,
//! and fully discarded on `/logout`. Expiry is enforced on read; a
//! background sweep only bounds memory.
//!
//! ## Anti-forgery tokens
//!
//! Each session gets exactly one token for its entire lifetime, minted from
//! 32 OS-random bytes. Validation compares in constant time and fails for
//! any invalidated or expired session.
//!
//! ## Registration
//!
//! Member records are persisted through the `UserStore` capability. Store
//! conflicts and outages never escape raw: they surface as the domain
//! errors `DuplicateUser` and `StoreUnavailable`.

pub mod api;
pub mod cli;
pub mod member;
pub mod session;

pub const GIT_COMMIT_HASH: &str = env!("MAMMBA_BUILD_GIT_SHA");

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
