use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SquadStatus {
    Pending,
    Approved,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Admin => "admin",
        }
    }
}

impl SquadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SquadStatus::Pending => "pending",
            SquadStatus::Approved => "approved",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Role::Player),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

impl FromStr for SquadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SquadStatus::Pending),
            "approved" => Ok(SquadStatus::Approved),
            other => Err(format!("unknown squad status {other:?}")),
        }
    }
}

impl fmt::Display for SquadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub display_name: String,
    pub external_id: String,
    pub contact: String,
    #[serde(skip)]
    pub password_hash: String,
    pub squad_id: Option<Uuid>,
    /// Per-membership approval; only meaningful while `squad_id` is set.
    pub approved: bool,
    pub verified: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when an account is first written.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub display_name: String,
    pub external_id: String,
    pub contact: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct Squad {
    pub id: Uuid,
    pub name: String,
    pub leader_id: Uuid,
    pub status: SquadStatus,
    pub created_at: DateTime<Utc>,
}

/// One chat line. `sender` is a snapshot of the display name at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub sender: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team_name: String,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchConfig {
    pub announcement: String,
    pub room_id: String,
    pub room_pass: String,
    pub live_stream_url: Option<String>,
    /// Insertion order; see `match_config::leaderboard_view` for display order.
    pub standings: Vec<Standing>,
    pub version: i64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            announcement: "Welcome to the tournament!".into(),
            room_id: "TBA".into(),
            room_pass: "TBA".into(),
            live_stream_url: None,
            standings: Vec::new(),
            version: 1,
        }
    }
}

/// Partial update of the scalar config fields. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub announcement: Option<String>,
    pub room_id: Option<String>,
    pub room_pass: Option<String>,
    /// `Some(None)` clears the stream link.
    pub live_stream_url: Option<Option<String>>,
}

impl ConfigPatch {
    pub fn apply(&self, cfg: &mut MatchConfig) {
        if let Some(v) = &self.announcement {
            cfg.announcement = v.clone();
        }
        if let Some(v) = &self.room_id {
            cfg.room_id = v.clone();
        }
        if let Some(v) = &self.room_pass {
            cfg.room_pass = v.clone();
        }
        if let Some(v) = &self.live_stream_url {
            cfg.live_stream_url = v.clone();
        }
    }
}
