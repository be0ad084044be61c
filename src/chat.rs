//! Squad Chat Log: append-only, per squad, read by polling.

use chrono::Utc;

use crate::db::models::{Account, Message};
use crate::db::Store;
use crate::error::{ArenaError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatPolicy {
    /// Only members with an approved membership may post.
    pub require_approval: bool,
}

/// Append one message from `account` to its squad's log.
pub async fn post_message(
    store: &dyn Store,
    policy: ChatPolicy,
    account: &Account,
    text: &str,
) -> Result<Message> {
    let squad_id = account.squad_id.ok_or(ArenaError::NotInSquad)?;
    if policy.require_approval && !account.approved {
        return Err(ArenaError::NotApproved);
    }

    let text = text.trim();
    if text.is_empty() {
        return Err(ArenaError::invalid("message is empty"));
    }

    let msg = Message {
        sender: account.display_name.clone(),
        text: text.to_string(),
        sent_at: Utc::now(),
    };
    if !store.append_message(squad_id, msg.clone()).await? {
        return Err(ArenaError::NotFound);
    }
    Ok(msg)
}

/// The `n` most recent messages of a squad, most recent last.
pub async fn recent_messages(store: &dyn Store, squad_id: uuid::Uuid, n: usize) -> Result<Vec<Message>> {
    Ok(store.recent_messages(squad_id, n).await?)
}
