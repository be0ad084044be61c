//! Admin Console. Each operation checks the admin role before touching the
//! store; a non-admin gets `Forbidden` and nothing is mutated.

use serde::Serialize;
use uuid::Uuid;

use crate::accounts::{self, Contact};
use crate::db::models::{Account, ConfigPatch, MatchConfig, Role, Squad, SquadStatus, Standing};
use crate::db::Store;
use crate::error::{ArenaError, Result};
use crate::gate::require_role;
use crate::{match_config, registry};

#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub pending_squads: Vec<Squad>,
    pub approved_squads: Vec<Squad>,
    pub contacts: Vec<Contact>,
    pub config: MatchConfig,
    pub leaderboard: Vec<Standing>,
}

pub async fn overview(store: &dyn Store, actor: &Account, merge_teams: bool) -> Result<AdminOverview> {
    require_role(actor, Role::Admin)?;
    let config = match_config::get_or_create(store).await?;
    Ok(AdminOverview {
        pending_squads: registry::list_by_status(store, SquadStatus::Pending).await?,
        approved_squads: registry::list_by_status(store, SquadStatus::Approved).await?,
        contacts: accounts::contacts(store).await?,
        leaderboard: match_config::leaderboard_view(&config, merge_teams),
        config,
    })
}

pub async fn update_config(store: &dyn Store, actor: &Account, patch: &ConfigPatch) -> Result<MatchConfig> {
    require_role(actor, Role::Admin)?;
    match_config::update(store, patch).await
}

pub async fn add_standing(store: &dyn Store, actor: &Account, team_name: &str, points: i32) -> Result<()> {
    require_role(actor, Role::Admin)?;
    match_config::add_standing(store, team_name, points).await
}

pub async fn reset_standings(store: &dyn Store, actor: &Account) -> Result<()> {
    require_role(actor, Role::Admin)?;
    match_config::reset_standings(store).await
}

pub async fn approve_squad(store: &dyn Store, actor: &Account, squad_id: Uuid) -> Result<()> {
    require_role(actor, Role::Admin)?;
    registry::approve_squad(store, squad_id).await
}

pub async fn delete_squad(store: &dyn Store, actor: &Account, squad_id: Uuid) -> Result<()> {
    require_role(actor, Role::Admin)?;
    registry::delete_squad(store, squad_id).await
}

/// Give an account the verified badge.
pub async fn verify_account(store: &dyn Store, actor: &Account, account_id: Uuid) -> Result<()> {
    require_role(actor, Role::Admin)?;
    if !store.set_verified(account_id, true).await? {
        return Err(ArenaError::NotFound);
    }
    log::info!("account {account_id} verified by {}", actor.external_id);
    Ok(())
}

/// Confirm an account's current squad membership. Squad approval never does
/// this implicitly.
pub async fn approve_member(store: &dyn Store, actor: &Account, account_id: Uuid) -> Result<()> {
    require_role(actor, Role::Admin)?;
    let account = accounts::find(store, account_id).await?;
    let squad_id = account.squad_id.ok_or(ArenaError::NotInSquad)?;
    if !store.set_membership(account_id, Some(squad_id), true).await? {
        return Err(ArenaError::NotFound);
    }
    log::info!("membership of {} in squad {squad_id} approved", account.external_id);
    Ok(())
}

pub async fn list_contacts(store: &dyn Store, actor: &Account) -> Result<Vec<Contact>> {
    require_role(actor, Role::Admin)?;
    accounts::contacts(store).await
}
