use crate::{
    authentication::{
        cryptography::{hash_password, verify_password},
        jwt::generate_jwt_session,
    },
    database::error::QueryError,
    error::{Error, HtmlError},
    form::NewUser,
    schema::{User, UserProfile},
};

use serde::Serialize;
use sqlx::{Pool, Postgres};

/// Body returned by signup and signin.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

pub async fn get_user_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

/// Creates a user and signs them in; the stored password is the argon2 hash.
pub async fn register_user(
    user: NewUser,
    secret: &str,
    pool: &Pool<Postgres>,
) -> Result<AuthSession, Error> {
    let password = hash_password(&user.password)?;

    let row: Option<User> = sqlx::query_as(
        "
        INSERT INTO users (username, email, password)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING RETURNING *;
    ",
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(password)
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    let user =
        row.ok_or_else(|| HtmlError::InvalidRequest.new("Username or email already exists"))?;

    log::info!("Registered user {} ({})", user.id, user.username);

    Ok(AuthSession {
        token: generate_jwt_session(&user, secret)?,
        user: UserProfile::from(&user),
    })
}

pub async fn login_user(
    email: &str,
    password: &str,
    secret: &str,
    pool: &Pool<Postgres>,
) -> Result<AuthSession, Error> {
    let invalid = || HtmlError::InvalidSession.new("Invalid login credentials");

    let user = get_user_by_email(pool, email).await?.ok_or_else(invalid)?;

    if !verify_password(password, &user.password)? {
        return Err(invalid());
    }

    Ok(AuthSession {
        token: generate_jwt_session(&user, secret)?,
        user: UserProfile::from(&user),
    })
}
