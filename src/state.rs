//! Shared handles every request needs.

use std::sync::Arc;
use std::time::Duration;

use crate::chat::ChatPolicy;
use crate::config::Settings;
use crate::db::{MemoryStore, Store};
use crate::gate::{MemorySessions, SessionStore};
use crate::registry::SquadPolicy;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<dyn SessionStore>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, sessions: Arc<dyn SessionStore>, settings: Settings) -> Self {
        Self {
            store,
            sessions,
            settings,
        }
    }

    /// Fully in-memory state (no Postgres, no Redis).
    pub fn in_memory(settings: Settings) -> Self {
        let ttl = Duration::from_secs(settings.session_ttl);
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemorySessions::new(ttl)),
            settings,
        )
    }

    pub fn squad_policy(&self) -> SquadPolicy {
        SquadPolicy {
            auto_approve: self.settings.auto_approve_squads,
        }
    }

    pub fn chat_policy(&self) -> ChatPolicy {
        ChatPolicy {
            require_approval: self.settings.chat_requires_approval,
        }
    }
}
