//! In-memory backend. Every table is a `DashMap`; uniqueness is reserved
//! through the entry API so two racing inserts cannot both win.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    Account, ConfigPatch, MatchConfig, Message, NewAccount, Role, Squad, SquadStatus, Standing,
};
use super::{Store, StoreError, StoreResult};

struct SquadRecord {
    squad: Squad,
    /// Insertion sequence, keeps listings in creation order.
    seq: u64,
    messages: Vec<Message>,
}

pub struct MemoryStore {
    accounts: DashMap<Uuid, (u64, Account)>,
    by_external_id: DashMap<String, Uuid>,
    squads: DashMap<Uuid, SquadRecord>,
    by_name: DashMap<String, Uuid>,
    config: RwLock<Option<MatchConfig>>,
    seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            by_external_id: DashMap::new(),
            squads: DashMap::new(),
            by_name: DashMap::new(),
            config: RwLock::new(None),
            seq: AtomicU64::new(0),
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn build_account(new: NewAccount) -> Account {
        Account {
            id: Uuid::new_v4(),
            display_name: new.display_name,
            external_id: new.external_id,
            contact: new.contact,
            password_hash: new.password_hash,
            squad_id: None,
            approved: false,
            verified: false,
            role: new.role,
            created_at: Utc::now(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_account(&self, new: NewAccount) -> StoreResult<Account> {
        match self.by_external_id.entry(new.external_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                let account = Self::build_account(new);
                self.accounts
                    .insert(account.id, (self.next_seq(), account.clone()));
                slot.insert(account.id);
                Ok(account)
            }
        }
    }

    async fn upsert_account_role(&self, new: NewAccount, role: Role) -> StoreResult<Account> {
        let id = match self.by_external_id.entry(new.external_id.clone()) {
            Entry::Occupied(slot) => *slot.get(),
            Entry::Vacant(slot) => {
                let mut account = Self::build_account(new);
                account.role = role;
                let id = account.id;
                self.accounts.insert(id, (self.next_seq(), account));
                slot.insert(id);
                id
            }
        };

        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend(format!("external id index points at missing account {id}")))?;
        entry.1.role = role;
        Ok(entry.1.clone())
    }

    async fn account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|e| e.value().1.clone()))
    }

    async fn account_by_external_id(&self, external_id: &str) -> StoreResult<Option<Account>> {
        let id = match self.by_external_id.get(external_id) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.account(id).await
    }

    async fn accounts(&self) -> StoreResult<Vec<Account>> {
        let mut rows: Vec<(u64, Account)> =
            self.accounts.iter().map(|e| e.value().clone()).collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, a)| a).collect())
    }

    async fn set_membership(&self, id: Uuid, squad: Option<Uuid>, approved: bool) -> StoreResult<bool> {
        // The squad check runs under the account's shard lock. `delete_squad`
        // removes the squad before sweeping accounts, so it either sees this
        // write or this check sees the squad gone.
        match self.accounts.get_mut(&id) {
            Some(_) if squad.is_some_and(|s| !self.squads.contains_key(&s)) => Ok(false),
            Some(mut e) => {
                e.1.squad_id = squad;
                e.1.approved = approved;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> StoreResult<bool> {
        match self.accounts.get_mut(&id) {
            Some(mut e) => {
                e.1.verified = verified;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_squad(&self, name: &str, leader: Uuid, status: SquadStatus) -> StoreResult<Squad> {
        match self.by_name.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                let squad = Squad {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    leader_id: leader,
                    status,
                    created_at: Utc::now(),
                };
                self.squads.insert(
                    squad.id,
                    SquadRecord {
                        squad: squad.clone(),
                        seq: self.next_seq(),
                        messages: Vec::new(),
                    },
                );
                slot.insert(squad.id);
                Ok(squad)
            }
        }
    }

    async fn squad(&self, id: Uuid) -> StoreResult<Option<Squad>> {
        Ok(self.squads.get(&id).map(|r| r.squad.clone()))
    }

    async fn squads_by_status(&self, status: SquadStatus) -> StoreResult<Vec<Squad>> {
        let mut rows: Vec<(u64, Squad)> = self
            .squads
            .iter()
            .filter(|r| r.squad.status == status)
            .map(|r| (r.seq, r.squad.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, s)| s).collect())
    }

    async fn set_squad_status(&self, id: Uuid, status: SquadStatus) -> StoreResult<bool> {
        match self.squads.get_mut(&id) {
            Some(mut r) => {
                r.squad.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_squad(&self, id: Uuid) -> StoreResult<bool> {
        let (_, record) = match self.squads.remove(&id) {
            Some(r) => r,
            None => return Ok(false),
        };
        self.by_name.remove(&record.squad.name);

        for mut e in self.accounts.iter_mut() {
            let account = &mut e.value_mut().1;
            if account.squad_id == Some(id) {
                account.squad_id = None;
                account.approved = false;
            }
        }
        Ok(true)
    }

    async fn append_message(&self, squad: Uuid, msg: Message) -> StoreResult<bool> {
        match self.squads.get_mut(&squad) {
            Some(mut r) => {
                r.messages.push(msg);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn recent_messages(&self, squad: Uuid, n: usize) -> StoreResult<Vec<Message>> {
        Ok(self
            .squads
            .get(&squad)
            .map(|r| {
                let skip = r.messages.len().saturating_sub(n);
                r.messages[skip..].to_vec()
            })
            .unwrap_or_default())
    }

    async fn ensure_config(&self) -> StoreResult<MatchConfig> {
        if let Some(cfg) = self.config.read().await.as_ref() {
            return Ok(cfg.clone());
        }
        let mut slot = self.config.write().await;
        Ok(slot.get_or_insert_with(MatchConfig::default).clone())
    }

    async fn update_config(&self, patch: &ConfigPatch) -> StoreResult<MatchConfig> {
        let mut slot = self.config.write().await;
        let cfg = slot.get_or_insert_with(MatchConfig::default);
        patch.apply(cfg);
        cfg.version += 1;
        Ok(cfg.clone())
    }

    async fn push_standing(&self, standing: Standing) -> StoreResult<()> {
        let mut slot = self.config.write().await;
        let cfg = slot.get_or_insert_with(MatchConfig::default);
        cfg.standings.push(standing);
        cfg.version += 1;
        Ok(())
    }

    async fn clear_standings(&self) -> StoreResult<()> {
        let mut slot = self.config.write().await;
        let cfg = slot.get_or_insert_with(MatchConfig::default);
        cfg.standings.clear();
        cfg.version += 1;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
