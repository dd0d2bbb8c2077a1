use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tokio::sync::watch;
use uuid::Uuid;

use crate::model::{
    Session, User, AUTH_EMAIL_TAKEN, AUTH_INVALID_CREDENTIALS, AUTH_INVALID_EMAIL,
    AUTH_WEAK_PASSWORD, GENERIC_FAIL, GENERIC_FAIL_MESSAGE,
};
use crate::time::now_ms;
use crate::{id::new_uuid_v7, AppError, AppResult};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email validation pattern to compile")
});

const MIN_PASSWORD_CHARS: usize = 8;
const SESSION_TTL_MS: i64 = 30 * 24 * 60 * 60 * 1000;

fn wrap_unexpected(err: AppError, operation: &'static str) -> AppError {
    AppError::new(GENERIC_FAIL, GENERIC_FAIL_MESSAGE)
        .with_context("operation", operation)
        .with_cause(err)
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(
            AppError::new(AUTH_INVALID_EMAIL, "That doesn't look like an email address.")
                .with_context("email", email.to_string()),
        )
    }
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() >= MIN_PASSWORD_CHARS {
        Ok(())
    } else {
        Err(AppError::new(
            AUTH_WEAK_PASSWORD,
            "Passwords must be at least 8 characters.",
        ))
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            AppError::new(GENERIC_FAIL, GENERIC_FAIL_MESSAGE)
                .with_context("operation", "hash_password")
                .with_context("error", err.to_string())
        })
}

fn verify_password(stored: &str, password: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn decode_user(row: &SqliteRow) -> AppResult<User> {
    Ok(User {
        id: row.try_get("id").map_err(AppError::from)?,
        email: row.try_get("email").map_err(AppError::from)?,
        full_name: row
            .try_get::<Option<String>, _>("full_name")
            .map_err(AppError::from)?,
        onboard_success: row
            .try_get::<i64, _>("onboard_success")
            .map(|value| value != 0)
            .map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
        updated_at: row.try_get("updated_at").map_err(AppError::from)?,
    })
}

async fn fetch_user_by_email(pool: &SqlitePool, email: &str) -> AppResult<Option<SqliteRow>> {
    sqlx::query("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "user_lookup"))
}

async fn issue_session(pool: &SqlitePool, user_id: &str) -> AppResult<Session> {
    let token = Uuid::new_v4().to_string();
    let now = now_ms();
    let expires_at = now + SESSION_TTL_MS;
    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "session_issue"))?;
    Ok(Session {
        token,
        user_id: user_id.to_string(),
        created_at: now,
        expires_at: Some(expires_at),
    })
}

pub async fn sign_up(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> AppResult<(User, Session)> {
    let email = email.trim().to_ascii_lowercase();
    validate_email(&email)?;
    validate_password(password)?;

    if fetch_user_by_email(pool, &email).await?.is_some() {
        return Err(
            AppError::new(AUTH_EMAIL_TAKEN, "An account with that email already exists.")
                .with_context("email", email),
        );
    }

    let id = new_uuid_v7();
    let now = now_ms();
    let password_hash = hash_password(password)?;
    sqlx::query(
        "INSERT INTO users (id, email, full_name, password_hash, onboard_success, created_at, updated_at) \
         VALUES (?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(&email)
    .bind(full_name)
    .bind(&password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "sign_up"))?;

    let user = User {
        id: id.clone(),
        email,
        full_name: full_name.map(str::to_owned),
        onboard_success: false,
        created_at: now,
        updated_at: now,
    };
    let session = issue_session(pool, &id).await?;
    tracing::info!(target = "housekeepin", event = "auth_sign_up", user_id = %user.id);
    Ok((user, session))
}

pub async fn sign_in(pool: &SqlitePool, email: &str, password: &str) -> AppResult<(User, Session)> {
    let email = email.trim().to_ascii_lowercase();
    let row = fetch_user_by_email(pool, &email).await?.ok_or_else(|| {
        AppError::new(AUTH_INVALID_CREDENTIALS, "Incorrect email or password.")
    })?;

    let stored: String = row
        .try_get("password_hash")
        .map_err(|err| wrap_unexpected(AppError::from(err), "sign_in"))?;
    if !verify_password(&stored, password) {
        return Err(AppError::new(
            AUTH_INVALID_CREDENTIALS,
            "Incorrect email or password.",
        ));
    }

    let user = decode_user(&row)?;
    let session = issue_session(pool, &user.id).await?;
    tracing::info!(target = "housekeepin", event = "auth_sign_in", user_id = %user.id);
    Ok((user, session))
}

pub async fn sign_out(pool: &SqlitePool, token: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "sign_out"))?;
    tracing::info!(target = "housekeepin", event = "auth_sign_out");
    Ok(())
}

/// Resolve a session token to its user. Expired sessions are dropped and
/// treated as absent.
pub async fn current_user(pool: &SqlitePool, token: &str) -> AppResult<Option<User>> {
    let row = sqlx::query(
        "SELECT u.*, s.expires_at AS session_expires_at \
         FROM sessions s JOIN users u ON u.id = s.user_id \
         WHERE s.token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "current_user"))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let expires_at: Option<i64> = row
        .try_get("session_expires_at")
        .map_err(|err| wrap_unexpected(AppError::from(err), "current_user"))?;
    if let Some(expires_at) = expires_at {
        if expires_at <= now_ms() {
            sign_out(pool, token).await?;
            return Ok(None);
        }
    }

    decode_user(&row).map(Some)
}

/// Wraps the session calls and publishes the current-user state to
/// subscribers, so UI layers can react to sign-in and sign-out.
#[derive(Clone)]
pub struct AuthGateway {
    pool: SqlitePool,
    state: watch::Sender<Option<User>>,
}

impl AuthGateway {
    pub fn new(pool: SqlitePool) -> Self {
        let (state, _) = watch::channel(None);
        Self { pool, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> Option<User> {
        self.state.borrow().clone()
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> AppResult<(User, Session)> {
        let (user, session) = sign_up(&self.pool, email, password, full_name).await?;
        self.state.send_replace(Some(user.clone()));
        Ok((user, session))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<(User, Session)> {
        let (user, session) = sign_in(&self.pool, email, password).await?;
        self.state.send_replace(Some(user.clone()));
        Ok((user, session))
    }

    pub async fn sign_out(&self, token: &str) -> AppResult<()> {
        sign_out(&self.pool, token).await?;
        self.state.send_replace(None);
        Ok(())
    }

    /// Re-resolve the session, e.g. on app start; broadcasts the result.
    pub async fn restore(&self, token: &str) -> AppResult<Option<User>> {
        let user = current_user(&self.pool, token).await?;
        self.state.send_replace(user.clone());
        Ok(user)
    }
}
