//! Session Gate: credential checks, server-side sessions and role checks.
//!
//! Sessions are opaque tokens (UUID v4, simple form) stored server side and
//! carried by the `arena_session` cookie. Two session backends:
//! - [`RedisSessions`]: `session:<token>` keys with a TTL.
//! - [`MemorySessions`]: DashMap with per-entry deadlines, for local runs
//!   and tests.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use redis::{AsyncCommands, Client as RedisClient};
use uuid::Uuid;

use crate::config::Settings;
use crate::db::models::{Account, NewAccount, Role};
use crate::db::Store;
use crate::error::{ArenaError, Result};

pub const SESSION_COOKIE: &str = "arena_session";

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account: Account,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, account_id: Uuid) -> Result<String>;

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>>;

    async fn destroy(&self, token: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

//////////////////////////////////////////////////
// In-memory sessions
//////////////////////////////////////////////////

pub struct MemorySessions {
    /// token -> (account, expiry)
    sessions: DashMap<String, (Uuid, Instant)>,
    ttl: Duration,
}

impl MemorySessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for MemorySessions {
    fn default() -> Self {
        Self::new(Duration::from_secs(Settings::default().session_ttl))
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn create(&self, account_id: Uuid) -> Result<String> {
        let now = Instant::now();
        self.sessions.retain(|_, (_, expires)| *expires > now);

        let token = new_token();
        self.sessions.insert(token.clone(), (account_id, now + self.ttl));
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        let now = Instant::now();
        // Expired entries are dropped on sight.
        if let Some((_, (account_id, _))) = self
            .sessions
            .remove_if(token, |_, (_, expires)| *expires <= now)
        {
            log::debug!("session for {account_id} expired");
            return Ok(None);
        }
        Ok(self.sessions.get(token).map(|e| e.value().0))
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        self.sessions.remove(token);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

//////////////////////////////////////////////////
// Redis sessions
//////////////////////////////////////////////////

pub struct RedisSessions {
    client: RedisClient,
    ttl: u64,
}

impl RedisSessions {
    pub fn new(client: RedisClient, ttl: u64) -> Self {
        Self { client, ttl }
    }

    fn key(token: &str) -> String {
        format!("session:{token}")
    }
}

fn redis_err(e: redis::RedisError) -> ArenaError {
    ArenaError::Storage(format!("redis: {e}"))
}

#[async_trait]
impl SessionStore for RedisSessions {
    async fn create(&self, account_id: Uuid) -> Result<String> {
        let token = new_token();
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_err)?;
        let _: () = conn
            .set_ex(Self::key(&token), account_id.to_string(), self.ttl)
            .await
            .map_err(redis_err)?;
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_err)?;
        let raw: Option<String> = conn.get(Self::key(token)).await.map_err(redis_err)?;
        // A garbled value is treated like a missing session.
        Ok(raw.and_then(|v| Uuid::parse_str(&v).ok()))
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_err)?;
        let _: () = conn.del(Self::key(token)).await.map_err(redis_err)?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_err)?;
        let _: String = conn.ping().await.map_err(redis_err)?;
        Ok(())
    }
}

//////////////////////////////////////////////////
// Credentials
//////////////////////////////////////////////////

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ArenaError::Storage(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

//////////////////////////////////////////////////
// Gate operations
//////////////////////////////////////////////////

/// Check `credential` for `external_id` and open a session.
///
/// When an admin secret is configured and `credential` matches it, the
/// account is fetched or created by external id alone and promoted to admin.
/// Repeating this is harmless: the same account comes back each time.
pub async fn authenticate(
    store: &dyn Store,
    sessions: &dyn SessionStore,
    settings: &Settings,
    external_id: &str,
    credential: &str,
) -> Result<Session> {
    let external_id = external_id.trim();
    if external_id.is_empty() || credential.is_empty() {
        return Err(ArenaError::InvalidCredentials);
    }

    let bootstrap = settings
        .admin_secret
        .as_deref()
        .is_some_and(|secret| secret == credential);

    let account = if bootstrap {
        let new = NewAccount {
            display_name: external_id.to_string(),
            external_id: external_id.to_string(),
            contact: String::new(),
            password_hash: hash_password(credential)?,
            role: Role::Admin,
        };
        let account = store.upsert_account_role(new, Role::Admin).await?;
        log::info!("admin bootstrap login for {external_id}");
        account
    } else {
        match store.account_by_external_id(external_id).await? {
            Some(a) if verify_password(credential, &a.password_hash) => a,
            _ => {
                log::warn!("failed login for {external_id}");
                return Err(ArenaError::InvalidCredentials);
            }
        }
    };

    let token = sessions.create(account.id).await?;
    Ok(Session { token, account })
}

/// Resolve a session token to its account.
pub async fn require_session(
    store: &dyn Store,
    sessions: &dyn SessionStore,
    token: Option<&str>,
) -> Result<Account> {
    let token = token.ok_or(ArenaError::Unauthenticated)?;
    let account_id = sessions
        .resolve(token)
        .await?
        .ok_or(ArenaError::Unauthenticated)?;
    store
        .account(account_id)
        .await?
        .ok_or(ArenaError::Unauthenticated)
}

pub fn require_role(account: &Account, role: Role) -> Result<()> {
    if account.role == role {
        Ok(())
    } else {
        log::warn!(
            "{} ({}) denied: requires role {}",
            account.external_id,
            account.id,
            role.as_str()
        );
        Err(ArenaError::Forbidden)
    }
}

pub async fn invalidate(sessions: &dyn SessionStore, token: &str) -> Result<()> {
    sessions.destroy(token).await
}
