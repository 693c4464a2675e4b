use std::sync::Arc;

use warp::{reject::Rejection, Filter};

use super::jwt::{verify_jwt_session, SessionData};
use crate::error::{Error, HtmlError};

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn verify_header(header: Option<String>, secret: &str) -> Result<SessionData, Error> {
    let header = header.ok_or_else(|| HtmlError::InvalidSession.default())?;
    let token = bearer_token(&header).ok_or_else(|| HtmlError::InvalidSession.default())?;

    verify_jwt_session(token, secret)
        .map(SessionData::from)
        .map_err(|_| HtmlError::InvalidSession.default())
}

/// Rejects with 401 unless a valid bearer token is present.
pub fn with_session(
    secret: Arc<str>,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let secret = secret.clone();
        async move { verify_header(header, &secret).map_err(Rejection::from) }
    })
}

/// Missing or invalid tokens are treated as an anonymous caller.
pub fn with_possible_session(
    secret: Arc<str>,
) -> impl Filter<Extract = (Option<SessionData>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").map(move |header: Option<String>| {
        match verify_header(header, &secret) {
            Ok(session) => Some(session),
            Err(_) => None,
        }
    })
}
