// src/http/leaderboard.rs

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::error::ArenaError;
use crate::match_config;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LeaderboardParams {
    /// Maximum number of rows to return.
    pub limit: Option<usize>,
}

/// Public standings, highest points first.
#[get("/leaderboard")]
pub async fn leaderboard(
    state: web::Data<AppState>,
    web::Query(params): web::Query<LeaderboardParams>,
) -> Result<HttpResponse, ArenaError> {
    let config = match_config::get_or_create(state.store.as_ref()).await?;
    let mut rows = match_config::leaderboard_view(&config, state.settings.merge_standings);
    if let Some(limit) = params.limit {
        rows.truncate(limit);
    }
    Ok(HttpResponse::Ok().json(rows))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(leaderboard);
}
