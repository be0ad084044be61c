//! The single authoritative store behind every core operation.
//!
//! Two backends implement [`Store`]:
//! - [`MemoryStore`]: DashMap tables, used for local runs and the test-suite.
//! - [`PgStore`]: Postgres via `sqlx`, selected when `DATABASE_URL` is set.
//!
//! Each method is one short read-modify-write. The only race-sensitive
//! invariants (unique squad name, unique external id) are enforced inside a
//! single call and reported as [`StoreError::Conflict`].

pub mod memory;
pub mod models;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use models::{Account, ConfigPatch, MatchConfig, Message, NewAccount, Role, Squad, SquadStatus, Standing};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated")]
    Conflict,

    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // ---------- accounts ----------

    /// Insert a new account; `Conflict` if the external id exists.
    async fn insert_account(&self, new: NewAccount) -> StoreResult<Account>;

    /// Fetch the account for `new.external_id`, creating it from `new` when
    /// absent, and force its role to `role`.
    async fn upsert_account_role(&self, new: NewAccount, role: Role) -> StoreResult<Account>;

    async fn account(&self, id: Uuid) -> StoreResult<Option<Account>>;

    async fn account_by_external_id(&self, external_id: &str) -> StoreResult<Option<Account>>;

    /// All accounts, oldest first.
    async fn accounts(&self) -> StoreResult<Vec<Account>>;

    /// Point `id` at `squad` with the given approval. Returns false if the
    /// account does not exist or `squad` names a squad that does not exist;
    /// the existence check and the write are one atomic step.
    async fn set_membership(&self, id: Uuid, squad: Option<Uuid>, approved: bool) -> StoreResult<bool>;

    async fn set_verified(&self, id: Uuid, verified: bool) -> StoreResult<bool>;

    // ---------- squads ----------

    /// Insert a new squad; `Conflict` if the name exists.
    async fn insert_squad(&self, name: &str, leader: Uuid, status: SquadStatus) -> StoreResult<Squad>;

    async fn squad(&self, id: Uuid) -> StoreResult<Option<Squad>>;

    /// Squads with the given status, oldest first.
    async fn squads_by_status(&self, status: SquadStatus) -> StoreResult<Vec<Squad>>;

    async fn set_squad_status(&self, id: Uuid, status: SquadStatus) -> StoreResult<bool>;

    /// Remove the squad and its chat log, clearing membership (and approval)
    /// of every account that referenced it.
    async fn delete_squad(&self, id: Uuid) -> StoreResult<bool>;

    // ---------- chat ----------

    /// Append to the squad's log. Returns false if the squad does not exist.
    async fn append_message(&self, squad: Uuid, msg: Message) -> StoreResult<bool>;

    /// The last `n` messages, oldest first.
    async fn recent_messages(&self, squad: Uuid, n: usize) -> StoreResult<Vec<Message>>;

    // ---------- match config ----------

    /// Return the singleton, creating it from `MatchConfig::default()` if absent.
    async fn ensure_config(&self) -> StoreResult<MatchConfig>;

    async fn update_config(&self, patch: &ConfigPatch) -> StoreResult<MatchConfig>;

    async fn push_standing(&self, standing: Standing) -> StoreResult<()>;

    async fn clear_standings(&self) -> StoreResult<()>;

    /// Cheap liveness probe.
    async fn ping(&self) -> StoreResult<()>;
}
