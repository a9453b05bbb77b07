use super::token::generate_token;
use super::{Session, SessionError};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

const SHARD_COUNT: usize = 16;

/// Concurrent session map, sharded by session id hash.
///
/// Every operation on one id hits the same shard, so operations on a single
/// session serialize against each other while unrelated sessions proceed on
/// other shards. No lock is ever held across an await point.
pub struct SessionStore {
    shards: Vec<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let shards = (0..SHARD_COUNT)
            .map(|_| RwLock::new(HashMap::new()))
            .collect();

        Self { shards, ttl }
    }

    fn shard(&self, id: &str) -> &RwLock<HashMap<String, Session>> {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let index = usize::try_from(hasher.finish()).unwrap_or(usize::MAX) % SHARD_COUNT;
        &self.shards[index]
    }

    /// Return the live session for `id`, creating a pending one when absent.
    ///
    /// An expired entry counts as absent and is replaced, so the caller
    /// never sees a stale token.
    pub fn get_or_create(&self, id: &str) -> Result<Session, SessionError> {
        let now = Instant::now();
        let mut shard = self
            .shard(id)
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(session) = shard.get(id) {
            if !session.is_expired(now) {
                return Ok(session.clone());
            }
        }

        let session = Session {
            id: id.to_string(),
            token: generate_token()?,
            authenticated: false,
            created_at: now,
            expires_at: now + self.ttl,
        };
        shard.insert(id.to_string(), session.clone());

        Ok(session)
    }

    /// Live session for `id`, `None` when absent or expired.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        let now = Instant::now();
        let shard = self.shard(id).read().unwrap_or_else(PoisonError::into_inner);

        shard
            .get(id)
            .filter(|session| !session.is_expired(now))
            .cloned()
    }

    /// Flip the session to authenticated.
    ///
    /// # Errors
    ///
    /// `SessionError::NotFound` when no live session exists for `id`.
    pub fn mark_authenticated(&self, id: &str) -> Result<(), SessionError> {
        let now = Instant::now();
        let mut shard = self
            .shard(id)
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(session) = shard.get_mut(id) {
            if !session.is_expired(now) {
                session.authenticated = true;
                return Ok(());
            }
        } else {
            return Err(SessionError::NotFound);
        }

        // The entry exists but expired; drop it on the way out.
        shard.remove(id);
        Err(SessionError::NotFound)
    }

    /// Discard all state for `id`. Invalidating a missing id is a no-op.
    pub fn invalidate(&self, id: &str) {
        let mut shard = self
            .shard(id)
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        shard.remove(id);
    }

    /// Drop every expired session, returning how many were removed.
    ///
    /// Correctness never depends on this; reads already treat expired
    /// entries as absent.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for shard in &self.shards {
            let mut shard = shard.write().unwrap_or_else(PoisonError::into_inner);
            let before = shard.len();
            shard.retain(|_, session| !session.is_expired(now));
            removed += before - shard.len();
        }
        removed
    }

    /// Number of sessions currently held, expired entries included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
