//! Admin console routes. Role checks happen in `crate::admin`.

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::admin;
use crate::db::models::ConfigPatch;
use crate::error::ArenaError;
use crate::http::auth::CurrentAccount;
use crate::http::see_other;
use crate::state::AppState;

//////////////////////////////////////////////////
// Forms
//////////////////////////////////////////////////

/// Absent fields keep their stored value. Blank announcement / room fields
/// are ignored too; a blank stream link clears it.
#[derive(Deserialize)]
pub struct ConfigForm {
    pub announcement: Option<String>,
    #[serde(alias = "roomId")]
    pub room_id: Option<String>,
    #[serde(alias = "roomPass")]
    pub room_pass: Option<String>,
    #[serde(alias = "liveStreamUrl")]
    pub live_stream_url: Option<String>,
}

impl From<ConfigForm> for ConfigPatch {
    fn from(f: ConfigForm) -> Self {
        let keep_blank_out = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        ConfigPatch {
            announcement: keep_blank_out(f.announcement),
            room_id: keep_blank_out(f.room_id),
            room_pass: keep_blank_out(f.room_pass),
            live_stream_url: f.live_stream_url.map(|s| {
                let s = s.trim().to_string();
                (!s.is_empty()).then_some(s)
            }),
        }
    }
}

#[derive(Deserialize)]
pub struct StandingForm {
    #[serde(alias = "team", alias = "teamName")]
    pub team_name: String,
    pub points: i32,
}

//////////////////////////////////////////////////
// Handlers
//////////////////////////////////////////////////

/// GET /admin
#[get("/admin")]
pub async fn overview(
    CurrentAccount(actor): CurrentAccount,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    let view = admin::overview(state.store.as_ref(), &actor, state.settings.merge_standings).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// POST /admin/config
#[post("/admin/config")]
pub async fn update_config(
    CurrentAccount(actor): CurrentAccount,
    form: web::Form<ConfigForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    let patch = ConfigPatch::from(form.into_inner());
    admin::update_config(state.store.as_ref(), &actor, &patch).await?;
    Ok(see_other("/admin"))
}

/// POST /admin/standing
#[post("/admin/standing")]
pub async fn add_standing(
    CurrentAccount(actor): CurrentAccount,
    form: web::Form<StandingForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    admin::add_standing(state.store.as_ref(), &actor, &form.team_name, form.points).await?;
    Ok(see_other("/admin"))
}

/// POST /admin/standing/reset
#[post("/admin/standing/reset")]
pub async fn reset_standings(
    CurrentAccount(actor): CurrentAccount,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    admin::reset_standings(state.store.as_ref(), &actor).await?;
    Ok(see_other("/admin"))
}

/// GET /admin/squad/approve/{id}
#[get("/admin/squad/approve/{id}")]
pub async fn approve_squad(
    CurrentAccount(actor): CurrentAccount,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    admin::approve_squad(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(see_other("/admin"))
}

/// GET /admin/squad/delete/{id}
#[get("/admin/squad/delete/{id}")]
pub async fn delete_squad(
    CurrentAccount(actor): CurrentAccount,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    admin::delete_squad(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(see_other("/admin"))
}

/// GET /admin/account/verify/{id}
#[get("/admin/account/verify/{id}")]
pub async fn verify_account(
    CurrentAccount(actor): CurrentAccount,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    admin::verify_account(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(see_other("/admin"))
}

/// GET /admin/account/approve/{id}
#[get("/admin/account/approve/{id}")]
pub async fn approve_member(
    CurrentAccount(actor): CurrentAccount,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    admin::approve_member(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(see_other("/admin"))
}

//////////////////////////////////////////////////
// Mount
//////////////////////////////////////////////////
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(overview)
        .service(update_config)
        .service(add_standing)
        .service(reset_standings)
        .service(approve_squad)
        .service(delete_squad)
        .service(verify_account)
        .service(approve_member);
}
