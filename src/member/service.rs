use super::store::{StoreError, UserStore};
use super::{Member, UserSummary};
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

const USERNAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]{0,63}$";

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("{0}")]
    Validation(String),
    #[error("username already registered")]
    DuplicateUser,
    #[error("user store unavailable")]
    StoreUnavailable,
}

/// Validates registration input and delegates persistence to the configured
/// `UserStore`. The store is wired in at construction; there is no ambient
/// lookup.
pub struct RegistrationService {
    store: Arc<dyn UserStore>,
}

impl RegistrationService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Register a new member.
    ///
    /// The payload is validated before the store is consulted; an invalid
    /// payload never reaches it. Store conflicts come back as
    /// `DuplicateUser`, store outages as `StoreUnavailable`.
    pub async fn register(&self, member: Member) -> Result<(), RegisterError> {
        let member = normalize(member);
        validate(&member)?;

        match self.store.insert(&member).await {
            Ok(()) => Ok(()),
            Err(StoreError::Duplicate) => Err(RegisterError::DuplicateUser),
            Err(StoreError::Unavailable(detail)) => {
                error!("member insert failed: {detail}");
                Err(RegisterError::StoreUnavailable)
            }
        }
    }

    /// Summary for `username`, `None` when no such member is registered.
    pub async fn user_info(&self, username: &str) -> Result<Option<UserSummary>, RegisterError> {
        match self.store.find_by_username(username.trim()).await {
            Ok(found) => Ok(found.map(UserSummary::from)),
            Err(err) => {
                error!("member lookup failed: {err}");
                Err(RegisterError::StoreUnavailable)
            }
        }
    }

    /// Store reachability probe for health reporting.
    pub async fn store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}

fn normalize(mut member: Member) -> Member {
    member.username = member.username.trim().to_string();
    member
}

fn validate(member: &Member) -> Result<(), RegisterError> {
    if member.username.is_empty() {
        return Err(RegisterError::Validation(
            "username must not be empty".to_string(),
        ));
    }

    let valid = Regex::new(USERNAME_PATTERN).is_ok_and(|re| re.is_match(&member.username));
    if !valid {
        return Err(RegisterError::Validation(
            "username may only contain letters, digits, '.', '_' or '-' and must start with a letter or digit".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::store::MemoryUserStore;
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn member(username: &str) -> Member {
        serde_json::from_value(json!({ "username": username, "city": "Manila" })).unwrap()
    }

    fn service() -> RegistrationService {
        RegistrationService::new(Arc::new(MemoryUserStore::new()))
    }

    /// Store that counts calls and fails everything, for boundary tests.
    #[derive(Default)]
    struct FailingStore {
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for FailingStore {
        async fn insert(&self, _member: &Member) -> Result<(), StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn find_by_username(&self, _username: &str) -> Result<Option<Member>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn register_accepts_fresh_username() {
        let service = service();
        service.register(member("maria")).await.unwrap();

        let summary = service.user_info("maria").await.unwrap().unwrap();
        assert_eq!(summary.username, "maria");
        assert_eq!(summary.profile.get("city"), Some(&json!("Manila")));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let service = service();
        service.register(member("maria")).await.unwrap();

        let second = service.register(member("maria")).await;
        assert!(matches!(second, Err(RegisterError::DuplicateUser)));
    }

    #[tokio::test]
    async fn register_trims_username_before_storing() {
        let service = service();
        service.register(member("  maria  ")).await.unwrap();
        assert!(service.user_info("maria").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_username_never_reaches_the_store() {
        let store = Arc::new(FailingStore::default());
        let service = RegistrationService::new(store.clone());

        let result = service.register(member("   ")).await;
        assert!(matches!(result, Err(RegisterError::Validation(_))));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_characters_are_rejected() {
        let service = service();
        let result = service.register(member("maria del rosario")).await;
        assert!(matches!(result, Err(RegisterError::Validation(_))));
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_store_unavailable() {
        let service = RegistrationService::new(Arc::new(FailingStore::default()));

        let registered = service.register(member("maria")).await;
        assert!(matches!(registered, Err(RegisterError::StoreUnavailable)));

        let looked_up = service.user_info("maria").await;
        assert!(matches!(looked_up, Err(RegisterError::StoreUnavailable)));

        assert!(!service.store_healthy().await);
    }

    #[tokio::test]
    async fn user_info_misses_return_none() {
        let service = service();
        assert!(service.user_info("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_registration_admits_one_winner() {
        let service = Arc::new(service());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(
                async move { service.register(member("maria")).await },
            ));
        }

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(RegisterError::DuplicateUser) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(duplicates, 7);
    }
}
