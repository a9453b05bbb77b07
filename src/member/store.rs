//! The `UserStore` capability and its implementations.

use super::Member;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{Connection, PgPool, Row};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{error, info_span, Instrument};

/// Errors a `UserStore` implementation may surface.
///
/// Implementations map their native conflict errors to `Duplicate` and
/// everything else to `Unavailable`; no backend error type leaks past this
/// boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a member with this username already exists")]
    Duplicate,
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence capability for member records.
///
/// Username uniqueness is enforced here, not by callers.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, member: &Member) -> Result<(), StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Postgres-backed store. Usernames are unique via the table's primary key;
/// profile fields land in a JSONB column untouched.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, member: &Member) -> Result<(), StoreError> {
        let query = "INSERT INTO members (username, profile) VALUES ($1, $2)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let profile = Value::Object(member.profile.clone());
        match sqlx::query(query)
            .bind(&member.username)
            .bind(&profile)
            .execute(&self.pool)
            .instrument(span)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => {
                error!("Failed to insert member: {err}");
                Err(StoreError::Unavailable(err.to_string()))
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, StoreError> {
        let query = "SELECT username, profile FROM members WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                error!("Failed to look up member: {err}");
                StoreError::Unavailable(err.to_string())
            })?;

        Ok(row.map(|row| {
            let profile: Value = row.get("profile");
            Member {
                username: row.get("username"),
                profile: match profile {
                    Value::Object(map) => map,
                    _ => Map::new(),
                },
            }
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let span = info_span!("db.acquire", db.system = "postgresql", db.operation = "ACQUIRE");
        let mut conn = self
            .pool
            .acquire()
            .instrument(span)
            .await
            .map_err(|err| {
                error!("Failed to acquire database connection: {err}");
                StoreError::Unavailable(err.to_string())
            })?;

        let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(span).await.map_err(|err| {
            error!("Failed to ping database: {err}");
            StoreError::Unavailable(err.to_string())
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// In-memory store for tests and local runs. The duplicate check and insert
/// happen under one lock, so concurrent registrations of the same username
/// admit exactly one winner.
#[derive(Default)]
pub struct MemoryUserStore {
    members: Mutex<HashMap<String, Member>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, member: &Member) -> Result<(), StoreError> {
        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        if members.contains_key(&member.username) {
            return Err(StoreError::Duplicate);
        }
        members.insert(member.username.clone(), member.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, StoreError> {
        let members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(members.get(username).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
