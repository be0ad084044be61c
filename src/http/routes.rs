use crate::http;
use actix_web::web;

/// Mount every HTTP sub-module at the root.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(http::auth::init_routes)
        .configure(http::dashboard::init_routes)
        .configure(http::squads::init_routes)
        .configure(http::chat::init_routes)
        .configure(http::admin::init_routes)
        .configure(http::leaderboard::init_routes)
        .configure(http::health::init_routes);
}
