//! Registration, login / logout and the session-cookie extractor.

use actix_web::{
    cookie::{Cookie, SameSite},
    get, post, web, HttpRequest, HttpResponse,
};
use serde::Deserialize;

use crate::accounts::{self, Registration};
use crate::db::models::Role;
use crate::error::ArenaError;
use crate::gate::{self, SESSION_COOKIE};
use crate::http::see_other;
use crate::state::AppState;

//////////////////////////////////////////////////
// Forms
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default, alias = "username")]
    pub display_name: String,
    #[serde(alias = "ff_id")]
    pub external_id: String,
    #[serde(default, alias = "whatsapp")]
    pub contact: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(alias = "ff_id")]
    pub external_id: String,
    pub password: String,
}

//////////////////////////////////////////////////
// ────────────  CurrentAccount extractor  ────────────
//////////////////////////////////////////////////

pub mod extractor {
    use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
    use futures_util::future::LocalBoxFuture;

    use crate::db::models::Account;
    use crate::error::ArenaError;
    use crate::gate::{self, SESSION_COOKIE};
    use crate::state::AppState;

    /// Resolves the session cookie to the logged-in account.
    /// Fails with `Unauthenticated`, which renders as a redirect to `/`.
    #[derive(Debug, Clone)]
    pub struct CurrentAccount(pub Account);

    impl FromRequest for CurrentAccount {
        type Error = ArenaError;
        type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let state = req.app_data::<web::Data<AppState>>().cloned();
            let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

            Box::pin(async move {
                let state = state
                    .ok_or_else(|| ArenaError::Storage("AppState not registered".into()))?;
                let account = gate::require_session(
                    state.store.as_ref(),
                    state.sessions.as_ref(),
                    token.as_deref(),
                )
                .await?;
                Ok(CurrentAccount(account))
            })
        }
    }
}
pub use extractor::CurrentAccount;

//////////////////////////////////////////////////
// POST /register
//////////////////////////////////////////////////
#[post("/register")]
pub async fn register(
    form: web::Form<RegisterForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    let form = form.into_inner();
    accounts::register(
        state.store.as_ref(),
        &state.settings,
        Registration {
            display_name: form.display_name,
            external_id: form.external_id,
            contact: form.contact,
            password: form.password,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().body("Registration successful! You can log in now."))
}

//////////////////////////////////////////////////
// POST /login
//////////////////////////////////////////////////
#[post("/login")]
pub async fn login(
    form: web::Form<LoginForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ArenaError> {
    let session = gate::authenticate(
        state.store.as_ref(),
        state.sessions.as_ref(),
        &state.settings,
        &form.external_id,
        &form.password,
    )
    .await?;

    let landing = match session.account.role {
        Role::Admin => "/admin",
        Role::Player => "/dashboard",
    };
    let cookie = Cookie::build(SESSION_COOKIE, session.token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    let mut resp = see_other(landing);
    resp.add_cookie(&cookie)
        .map_err(|e| ArenaError::Storage(format!("set cookie: {e}")))?;
    Ok(resp)
}

//////////////////////////////////////////////////
// GET /logout
//////////////////////////////////////////////////
#[get("/logout")]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ArenaError> {
    if let Some(c) = req.cookie(SESSION_COOKIE) {
        gate::invalidate(state.sessions.as_ref(), c.value()).await?;
    }

    let mut resp = see_other("/");
    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();
    resp.add_cookie(&removal)
        .map_err(|e| ArenaError::Storage(format!("clear cookie: {e}")))?;
    Ok(resp)
}

//////////////////////////////////////////////////
// Mount
//////////////////////////////////////////////////
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login).service(logout);
}
