#![allow(dead_code)]

use anyhow::Result;
use housekeepin::model::{Household, User};
use housekeepin::{auth, migrate, onboarding};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const TEST_PASSWORD: &str = "correct horse battery";

pub async fn memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::query("PRAGMA foreign_keys=ON;").execute(&pool).await?;
    migrate::apply_migrations(&pool).await?;
    Ok(pool)
}

pub async fn sign_up_user(pool: &SqlitePool, email: &str) -> Result<User> {
    let (user, _session) = auth::sign_up(pool, email, TEST_PASSWORD, None).await?;
    Ok(user)
}

/// Owner plus their onboarded household.
pub async fn seed_household(pool: &SqlitePool, email: &str) -> Result<(User, Household)> {
    let owner = sign_up_user(pool, email).await?;
    let household = onboarding::ensure_household(pool, &owner).await?;
    Ok((owner, household))
}

/// Sign up another user and attach them to the household as a plain member.
/// Joining is not part of the public surface (invites are accepted out of
/// band), so tests insert the membership row directly.
pub async fn seed_member(pool: &SqlitePool, household_id: &str, email: &str) -> Result<User> {
    let user = sign_up_user(pool, email).await?;
    sqlx::query(
        "INSERT INTO household_members (household_id, user_id, role, created_at) \
         VALUES (?, ?, 'member', ?)",
    )
    .bind(household_id)
    .bind(&user.id)
    .bind(housekeepin::time::now_ms())
    .execute(pool)
    .await?;
    Ok(user)
}
