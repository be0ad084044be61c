//! Error taxonomy shared by every core operation and the HTTP layer.

use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::db::StoreError;

pub type Result<T> = std::result::Result<T, ArenaError>;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("invalid ID or password")]
    InvalidCredentials,

    #[error("ID already registered")]
    AlreadyRegistered,

    #[error("squad name already taken")]
    NameTaken,

    #[error("login required")]
    Unauthenticated,

    #[error("access denied")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("you are not in a squad")]
    NotInSquad,

    #[error("your squad membership is not approved yet")]
    NotApproved,

    #[error("{0}")]
    Invalid(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl ArenaError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

impl From<StoreError> for ArenaError {
    fn from(e: StoreError) -> Self {
        match e {
            // Callers that expect a conflict map it to a specific variant
            // before it ever reaches here.
            StoreError::Conflict => ArenaError::Storage("unexpected unique violation".into()),
            StoreError::Backend(detail) => ArenaError::Storage(detail),
        }
    }
}

impl ResponseError for ArenaError {
    fn status_code(&self) -> StatusCode {
        match self {
            ArenaError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ArenaError::AlreadyRegistered | ArenaError::NameTaken => StatusCode::CONFLICT,
            ArenaError::Unauthenticated => StatusCode::SEE_OTHER,
            ArenaError::Forbidden | ArenaError::NotInSquad | ArenaError::NotApproved => {
                StatusCode::FORBIDDEN
            }
            ArenaError::NotFound => StatusCode::NOT_FOUND,
            ArenaError::Invalid(_) => StatusCode::BAD_REQUEST,
            ArenaError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ArenaError::Unauthenticated => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/"))
                .finish(),
            ArenaError::Storage(detail) => {
                log::error!("storage failure: {detail}");
                HttpResponse::InternalServerError()
                    .body("Something went wrong. Please try again.")
            }
            other => HttpResponse::build(other.status_code()).body(other.to_string()),
        }
    }
}
