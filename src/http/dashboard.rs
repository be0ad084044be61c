//! Personalised player dashboard (poll-on-reload).

use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::db::models::{Account, Message, Squad, SquadStatus, Standing};
use crate::error::ArenaError;
use crate::http::auth::CurrentAccount;
use crate::state::AppState;
use crate::{chat, match_config, registry};

#[derive(Serialize)]
pub struct SquadPanel {
    pub squad: Squad,
    pub is_leader: bool,
    pub can_chat: bool,
    pub messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct RoomAccess {
    pub room_id: String,
    pub room_pass: String,
}

#[derive(Serialize)]
pub struct DashboardView {
    pub account: Account,
    pub squad: Option<SquadPanel>,
    /// Approved squads the player can join.
    pub joinable_squads: Vec<Squad>,
    pub announcement: String,
    pub live_stream_url: Option<String>,
    /// Only for approved members of approved squads.
    pub room: Option<RoomAccess>,
    pub leaderboard: Vec<Standing>,
}

/// GET /dashboard
#[get("/dashboard")]
pub async fn dashboard(
    CurrentAccount(account): CurrentAccount,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    let store = state.store.as_ref();
    let config = match_config::get_or_create(store).await?;

    // A dangling squad id reads as "no squad".
    let squad = match account.squad_id {
        Some(id) => store.squad(id).await?,
        None => None,
    };

    let room = match &squad {
        Some(s) if s.status == SquadStatus::Approved && account.approved => Some(RoomAccess {
            room_id: config.room_id.clone(),
            room_pass: config.room_pass.clone(),
        }),
        _ => None,
    };

    let squad = match squad {
        Some(s) => Some(SquadPanel {
            is_leader: s.leader_id == account.id,
            can_chat: account.approved || !state.settings.chat_requires_approval,
            messages: chat::recent_messages(store, s.id, state.settings.chat_display_limit).await?,
            squad: s,
        }),
        None => None,
    };

    let view = DashboardView {
        joinable_squads: registry::list_by_status(store, SquadStatus::Approved).await?,
        leaderboard: match_config::leaderboard_view(&config, state.settings.merge_standings),
        announcement: config.announcement,
        live_stream_url: config.live_stream_url,
        room,
        squad,
        account,
    };
    Ok(HttpResponse::Ok().json(view))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard);
}
