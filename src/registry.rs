//! Squad Registry: creation, membership and the pending → approved machine.

use uuid::Uuid;

use crate::db::models::{Account, Squad, SquadStatus};
use crate::db::{Store, StoreError};
use crate::error::{ArenaError, Result};

/// Squad-creation policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquadPolicy {
    /// New squads (and their creators) start out approved.
    pub auto_approve: bool,
}

/// Create a squad led by `account` and move `account` into it.
///
/// The name is reserved atomically by the store; a collision is `NameTaken`.
/// The squad insert and the membership update are separate writes.
pub async fn create_squad(
    store: &dyn Store,
    policy: SquadPolicy,
    account: &Account,
    name: &str,
) -> Result<Squad> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ArenaError::invalid("squad name is required"));
    }

    let status = if policy.auto_approve {
        SquadStatus::Approved
    } else {
        SquadStatus::Pending
    };

    let squad = match store.insert_squad(name, account.id, status).await {
        Ok(s) => s,
        Err(StoreError::Conflict) => return Err(ArenaError::NameTaken),
        Err(e) => return Err(e.into()),
    };

    if !store
        .set_membership(account.id, Some(squad.id), policy.auto_approve)
        .await?
    {
        log::warn!("squad {} created but leader {} or the squad vanished", squad.id, account.id);
        return Err(ArenaError::NotFound);
    }

    log::info!(
        "squad {:?} ({}) created by {} as {}",
        squad.name,
        squad.id,
        account.external_id,
        squad.status
    );
    Ok(squad)
}

/// Move `account` into `squad_id`. Membership always starts unapproved, even
/// when the squad itself is approved.
///
/// A squad deleted between the lookup and the write is reported as
/// `NotFound`; the store refuses to point an account at a missing squad.
pub async fn join_squad(store: &dyn Store, account: &Account, squad_id: Uuid) -> Result<Squad> {
    let squad = store.squad(squad_id).await?.ok_or(ArenaError::NotFound)?;

    if !store.set_membership(account.id, Some(squad.id), false).await? {
        log::info!("{} could not join squad {squad_id}: gone", account.external_id);
        return Err(ArenaError::NotFound);
    }
    log::info!("{} joined squad {:?}", account.external_id, squad.name);
    Ok(squad)
}

/// Pending → approved. Approving an approved squad is a no-op.
pub async fn approve_squad(store: &dyn Store, squad_id: Uuid) -> Result<()> {
    let squad = store.squad(squad_id).await?.ok_or(ArenaError::NotFound)?;
    if squad.status == SquadStatus::Approved {
        return Ok(());
    }
    if !store.set_squad_status(squad_id, SquadStatus::Approved).await? {
        return Err(ArenaError::NotFound);
    }
    log::info!("squad {:?} approved", squad.name);
    Ok(())
}

/// Remove a squad; every member loses its membership and approval.
pub async fn delete_squad(store: &dyn Store, squad_id: Uuid) -> Result<()> {
    if store.delete_squad(squad_id).await? {
        log::info!("squad {squad_id} deleted");
        Ok(())
    } else {
        Err(ArenaError::NotFound)
    }
}

pub async fn list_by_status(store: &dyn Store, status: SquadStatus) -> Result<Vec<Squad>> {
    Ok(store.squads_by_status(status).await?)
}

pub async fn find(store: &dyn Store, squad_id: Uuid) -> Result<Squad> {
    store.squad(squad_id).await?.ok_or(ArenaError::NotFound)
}
