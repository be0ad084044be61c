//! Postgres backend (runtime-checked `sqlx` queries).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use super::models::{
    Account, ConfigPatch, MatchConfig, Message, NewAccount, Role, Squad, SquadStatus, Standing,
};
use super::{Store, StoreError, StoreResult};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS squads (
           id         UUID PRIMARY KEY,
           name       TEXT NOT NULL UNIQUE,
           leader_id  UUID NOT NULL,
           status     TEXT NOT NULL,
           created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
       )"#,
    r#"CREATE TABLE IF NOT EXISTS accounts (
           id            UUID PRIMARY KEY,
           display_name  TEXT NOT NULL,
           external_id   TEXT NOT NULL UNIQUE,
           contact       TEXT NOT NULL DEFAULT '',
           password_hash TEXT NOT NULL,
           squad_id      UUID REFERENCES squads(id) ON DELETE SET NULL,
           approved      BOOLEAN NOT NULL DEFAULT FALSE,
           verified      BOOLEAN NOT NULL DEFAULT FALSE,
           role          TEXT NOT NULL DEFAULT 'player',
           created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
       )"#,
    r#"CREATE TABLE IF NOT EXISTS squad_messages (
           id       BIGSERIAL PRIMARY KEY,
           squad_id UUID NOT NULL REFERENCES squads(id) ON DELETE CASCADE,
           sender   TEXT NOT NULL,
           body     TEXT NOT NULL,
           sent_at  TIMESTAMPTZ NOT NULL
       )"#,
    r#"CREATE INDEX IF NOT EXISTS squad_messages_squad_idx
           ON squad_messages (squad_id, id)"#,
    r#"CREATE TABLE IF NOT EXISTS match_config (
           id              SMALLINT PRIMARY KEY CHECK (id = 1),
           announcement    TEXT NOT NULL,
           room_id         TEXT NOT NULL,
           room_pass       TEXT NOT NULL,
           live_stream_url TEXT,
           version         BIGINT NOT NULL DEFAULT 1
       )"#,
    r#"CREATE TABLE IF NOT EXISTS standings (
           id        BIGSERIAL PRIMARY KEY,
           team_name TEXT NOT NULL,
           points    INT NOT NULL
       )"#,
];

const ACCOUNT_COLUMNS: &str = "id, display_name, external_id, contact, password_hash, \
                               squad_id, approved, verified, role, created_at";

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    display_name: String,
    external_id: String,
    contact: String,
    password_hash: String,
    squad_id: Option<Uuid>,
    approved: bool,
    verified: bool,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(r: AccountRow) -> StoreResult<Self> {
        Ok(Account {
            id: r.id,
            display_name: r.display_name,
            external_id: r.external_id,
            contact: r.contact,
            password_hash: r.password_hash,
            squad_id: r.squad_id,
            approved: r.approved,
            verified: r.verified,
            role: r.role.parse().map_err(StoreError::Backend)?,
            created_at: r.created_at,
        })
    }
}

#[derive(FromRow)]
struct SquadRow {
    id: Uuid,
    name: String,
    leader_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SquadRow> for Squad {
    type Error = StoreError;

    fn try_from(r: SquadRow) -> StoreResult<Self> {
        Ok(Squad {
            id: r.id,
            name: r.name,
            leader_id: r.leader_id,
            status: r.status.parse().map_err(StoreError::Backend)?,
            created_at: r.created_at,
        })
    }
}

#[derive(FromRow)]
struct ConfigRow {
    announcement: String,
    room_id: String,
    room_pass: String,
    live_stream_url: Option<String>,
    version: i64,
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Unique violations become `Conflict`, everything else `Backend`.
fn classify(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db_err) if db_err.code() == Some("23505".into()) => {
            StoreError::Conflict
        }
        other => backend(other),
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Create the schema if it does not exist yet. Idempotent.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn standings(&self) -> StoreResult<Vec<Standing>> {
        let rows = sqlx::query_as::<_, (String, i32)>(
            "SELECT team_name, points FROM standings ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows
            .into_iter()
            .map(|(team_name, points)| Standing { team_name, points })
            .collect())
    }

    async fn load_config(&self) -> StoreResult<Option<MatchConfig>> {
        let row = sqlx::query_as::<_, ConfigRow>(
            "SELECT announcement, room_id, room_pass, live_stream_url, version
               FROM match_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(MatchConfig {
            announcement: row.announcement,
            room_id: row.room_id,
            room_pass: row.room_pass,
            live_stream_url: row.live_stream_url,
            standings: self.standings().await?,
            version: row.version,
        }))
    }

    async fn bump_version(&self) -> StoreResult<()> {
        self.ensure_config().await?;
        sqlx::query("UPDATE match_config SET version = version + 1 WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_account(&self, new: NewAccount) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO accounts (id, display_name, external_id, contact, password_hash, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new.display_name)
        .bind(&new.external_id)
        .bind(&new.contact)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        row.try_into()
    }

    async fn upsert_account_role(&self, new: NewAccount, role: Role) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO accounts (id, display_name, external_id, contact, password_hash, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (external_id) DO UPDATE SET role = EXCLUDED.role
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new.display_name)
        .bind(&new.external_id)
        .bind(&new.contact)
        .bind(&new.password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        row.try_into()
    }

    async fn account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Account::try_from)
        .transpose()
    }

    async fn account_by_external_id(&self, external_id: &str) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Account::try_from)
        .transpose()
    }

    async fn accounts(&self) -> StoreResult<Vec<Account>> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?
        .into_iter()
        .map(Account::try_from)
        .collect()
    }

    async fn set_membership(&self, id: Uuid, squad: Option<Uuid>, approved: bool) -> StoreResult<bool> {
        // The foreign key check takes a share lock on the squad row, so this
        // either lands before `delete_squad` locks it or fails with 23503.
        let res = sqlx::query("UPDATE accounts SET squad_id = $2, approved = $3 WHERE id = $1")
            .bind(id)
            .bind(squad)
            .bind(approved)
            .execute(&self.pool)
            .await;

        match res {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(db_err)) if db_err.code() == Some("23503".into()) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> StoreResult<bool> {
        let rows = sqlx::query("UPDATE accounts SET verified = $2 WHERE id = $1")
            .bind(id)
            .bind(verified)
            .execute(&self.pool)
            .await
            .map_err(backend)?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn insert_squad(&self, name: &str, leader: Uuid, status: SquadStatus) -> StoreResult<Squad> {
        sqlx::query_as::<_, SquadRow>(
            "INSERT INTO squads (id, name, leader_id, status)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, leader_id, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(leader)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?
        .try_into()
    }

    async fn squad(&self, id: Uuid) -> StoreResult<Option<Squad>> {
        sqlx::query_as::<_, SquadRow>(
            "SELECT id, name, leader_id, status, created_at FROM squads WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Squad::try_from)
        .transpose()
    }

    async fn squads_by_status(&self, status: SquadStatus) -> StoreResult<Vec<Squad>> {
        sqlx::query_as::<_, SquadRow>(
            "SELECT id, name, leader_id, status, created_at
               FROM squads
              WHERE status = $1
              ORDER BY created_at, id",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?
        .into_iter()
        .map(Squad::try_from)
        .collect()
    }

    async fn set_squad_status(&self, id: Uuid, status: SquadStatus) -> StoreResult<bool> {
        let rows = sqlx::query("UPDATE squads SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend)?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn delete_squad(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // Blocks joins until commit; their FK check then fails.
        let found = sqlx::query("SELECT 1 FROM squads WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        if found.is_none() {
            return Ok(false);
        }

        sqlx::query("UPDATE accounts SET squad_id = NULL, approved = FALSE WHERE squad_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        let rows = sqlx::query("DELETE FROM squads WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?
            .rows_affected();

        tx.commit().await.map_err(backend)?;
        Ok(rows > 0)
    }

    async fn append_message(&self, squad: Uuid, msg: Message) -> StoreResult<bool> {
        let res = sqlx::query(
            "INSERT INTO squad_messages (squad_id, sender, body, sent_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(squad)
        .bind(&msg.sender)
        .bind(&msg.text)
        .bind(msg.sent_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(true),
            // squad vanished: foreign key violation
            Err(sqlx::Error::Database(db_err)) if db_err.code() == Some("23503".into()) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    async fn recent_messages(&self, squad: Uuid, n: usize) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
            "SELECT sender, body, sent_at
               FROM squad_messages
              WHERE squad_id = $1
              ORDER BY id DESC
              LIMIT $2",
        )
        .bind(squad)
        .bind(i64::try_from(n).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows
            .into_iter()
            .rev()
            .map(|(sender, text, sent_at)| Message { sender, text, sent_at })
            .collect())
    }

    async fn ensure_config(&self) -> StoreResult<MatchConfig> {
        if let Some(cfg) = self.load_config().await? {
            return Ok(cfg);
        }
        let d = MatchConfig::default();
        sqlx::query(
            "INSERT INTO match_config (id, announcement, room_id, room_pass, live_stream_url, version)
             VALUES (1, $1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&d.announcement)
        .bind(&d.room_id)
        .bind(&d.room_pass)
        .bind(&d.live_stream_url)
        .bind(d.version)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        self.load_config()
            .await?
            .ok_or_else(|| StoreError::Backend("match_config row missing after insert".into()))
    }

    async fn update_config(&self, patch: &ConfigPatch) -> StoreResult<MatchConfig> {
        self.ensure_config().await?;

        let (set_stream, stream) = match &patch.live_stream_url {
            Some(v) => (true, v.clone()),
            None => (false, None),
        };
        sqlx::query(
            "UPDATE match_config
                SET announcement    = COALESCE($1, announcement),
                    room_id         = COALESCE($2, room_id),
                    room_pass       = COALESCE($3, room_pass),
                    live_stream_url = CASE WHEN $4 THEN $5 ELSE live_stream_url END,
                    version         = version + 1
              WHERE id = 1",
        )
        .bind(&patch.announcement)
        .bind(&patch.room_id)
        .bind(&patch.room_pass)
        .bind(set_stream)
        .bind(stream)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        self.load_config()
            .await?
            .ok_or_else(|| StoreError::Backend("match_config row missing".into()))
    }

    async fn push_standing(&self, standing: Standing) -> StoreResult<()> {
        sqlx::query("INSERT INTO standings (team_name, points) VALUES ($1, $2)")
            .bind(&standing.team_name)
            .bind(standing.points)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        self.bump_version().await
    }

    async fn clear_standings(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM standings")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        self.bump_version().await
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
