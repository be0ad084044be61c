//! HTTP surface. Each sub-module exposes `init_routes`; `routes` mounts them.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod leaderboard;
pub mod routes;
pub mod squads;

use actix_web::{http::header, HttpResponse};

/// 303 redirect, the reply to every successful form submission.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
