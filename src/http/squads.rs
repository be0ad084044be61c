//! Player squad actions: create and join.

use actix_web::{post, route, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ArenaError;
use crate::http::auth::CurrentAccount;
use crate::http::see_other;
use crate::registry;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateForm {
    #[serde(alias = "squad_name")]
    pub name: String,
}

/// POST /squad/create
#[post("/squad/create")]
pub async fn create(
    CurrentAccount(account): CurrentAccount,
    form: web::Form<CreateForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    registry::create_squad(state.store.as_ref(), state.squad_policy(), &account, &form.name).await?;
    Ok(see_other("/dashboard"))
}

/// GET|POST /squad/join/{id}
#[route("/squad/join/{id}", method = "GET", method = "POST")]
pub async fn join(
    CurrentAccount(account): CurrentAccount,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    registry::join_squad(state.store.as_ref(), &account, path.into_inner()).await?;
    Ok(see_other("/dashboard"))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create).service(join);
}
