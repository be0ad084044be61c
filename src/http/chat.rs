//! Squad chat: post a message (history is part of the dashboard).

use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

use crate::chat;
use crate::error::ArenaError;
use crate::http::auth::CurrentAccount;
use crate::http::see_other;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatForm {
    #[serde(alias = "text")]
    pub message: String,
}

/// POST /squad/chat
#[post("/squad/chat")]
pub async fn send(
    CurrentAccount(account): CurrentAccount,
    form: web::Form<ChatForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    chat::post_message(state.store.as_ref(), state.chat_policy(), &account, &form.message).await?;
    Ok(see_other("/dashboard"))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(send);
}
