//! Account Directory: registration and lookups.

use serde::Serialize;
use uuid::Uuid;

use crate::config::Settings;
use crate::db::models::{Account, NewAccount, Role};
use crate::db::{Store, StoreError};
use crate::error::{ArenaError, Result};
use crate::gate::hash_password;

#[derive(Debug, Clone)]
pub struct Registration {
    pub display_name: String,
    pub external_id: String,
    pub contact: String,
    pub password: String,
}

/// Outreach row shown to admins.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub account_id: Uuid,
    pub display_name: String,
    pub external_id: String,
    pub contact: String,
    pub squad_id: Option<Uuid>,
    pub approved: bool,
    pub verified: bool,
}

impl From<Account> for Contact {
    fn from(a: Account) -> Self {
        Contact {
            account_id: a.id,
            display_name: a.display_name,
            external_id: a.external_id,
            contact: a.contact,
            squad_id: a.squad_id,
            approved: a.approved,
            verified: a.verified,
        }
    }
}

/// Create a player account. External ids listed in `ADMIN_IDS` start out as
/// admins.
pub async fn register(store: &dyn Store, settings: &Settings, reg: Registration) -> Result<Account> {
    let external_id = reg.external_id.trim().to_string();
    if external_id.is_empty() {
        return Err(ArenaError::invalid("game ID is required"));
    }
    if reg.password.is_empty() {
        return Err(ArenaError::invalid("password is required"));
    }
    let display_name = match reg.display_name.trim() {
        "" => external_id.clone(),
        name => name.to_string(),
    };

    let role = if settings.is_admin_id(&external_id) {
        Role::Admin
    } else {
        Role::Player
    };

    let new = NewAccount {
        display_name,
        external_id,
        contact: reg.contact.trim().to_string(),
        password_hash: hash_password(&reg.password)?,
        role,
    };

    match store.insert_account(new).await {
        Ok(account) => {
            log::info!(
                "registered {} ({}) as {}",
                account.external_id,
                account.id,
                account.role.as_str()
            );
            Ok(account)
        }
        Err(StoreError::Conflict) => Err(ArenaError::AlreadyRegistered),
        Err(e) => Err(e.into()),
    }
}

pub async fn find(store: &dyn Store, id: Uuid) -> Result<Account> {
    store.account(id).await?.ok_or(ArenaError::NotFound)
}

pub async fn contacts(store: &dyn Store) -> Result<Vec<Contact>> {
    Ok(store
        .accounts()
        .await?
        .into_iter()
        .map(Contact::from)
        .collect())
}
