use futures::FutureExt;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::db::run_in_tx;
use crate::id::new_uuid_v7;
use crate::model::{
    Household, MemberProfile, Membership, Role, GENERIC_FAIL, GENERIC_FAIL_MESSAGE,
    HOUSEHOLD_LAST_OWNER, HOUSEHOLD_MEMBER_MISSING, HOUSEHOLD_NOT_FOUND, HOUSEHOLD_ROLE_REQUIRED,
};
use crate::time::now_ms;
use crate::{AppError, AppResult};

fn wrap_unexpected(err: AppError, operation: &'static str) -> AppError {
    AppError::new(GENERIC_FAIL, GENERIC_FAIL_MESSAGE)
        .with_context("operation", operation)
        .with_cause(err)
}

fn decode_role(value: &str) -> AppResult<Role> {
    Role::parse(value).ok_or_else(|| {
        AppError::new("HOUSEHOLD/DECODE", "Unknown membership role")
            .with_context("role", value.to_string())
    })
}

fn decode_household(row: &SqliteRow) -> AppResult<Household> {
    Ok(Household {
        id: row.try_get("id").map_err(AppError::from)?,
        name: row.try_get("name").map_err(AppError::from)?,
        created_by: row
            .try_get::<Option<String>, _>("created_by")
            .map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
        updated_at: row.try_get("updated_at").map_err(AppError::from)?,
    })
}

fn decode_membership(row: &SqliteRow) -> AppResult<Membership> {
    let role: String = row.try_get("role").map_err(AppError::from)?;
    Ok(Membership {
        household_id: row.try_get("household_id").map_err(AppError::from)?,
        user_id: row.try_get("user_id").map_err(AppError::from)?,
        role: decode_role(&role)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

/// The resolver: one membership per user is assumed; the earliest wins if
/// the assumption is ever violated.
pub async fn membership_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> AppResult<Option<Membership>> {
    let row = sqlx::query(
        "SELECT household_id, user_id, role, created_at FROM household_members \
         WHERE user_id = ? ORDER BY created_at, household_id LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "membership_lookup"))?;

    row.as_ref().map(decode_membership).transpose()
}

pub async fn get_household(pool: &SqlitePool, household_id: &str) -> AppResult<Option<Household>> {
    let row = sqlx::query("SELECT * FROM households WHERE id = ?")
        .bind(household_id)
        .fetch_optional(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "household_get"))?;
    row.as_ref().map(decode_household).transpose()
}

/// Creates the household and its owner membership in one transaction.
pub async fn create_household(
    pool: &SqlitePool,
    name: &str,
    created_by: &str,
) -> AppResult<Household> {
    let id = new_uuid_v7();
    let now = now_ms();
    let household = Household {
        id: id.clone(),
        name: name.to_string(),
        created_by: Some(created_by.to_string()),
        created_at: now,
        updated_at: now,
    };

    let owner_id = created_by.to_string();
    let hh_name = name.to_string();
    run_in_tx(pool, move |tx| {
        async move {
            sqlx::query(
                "INSERT INTO households (id, name, created_by, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&hh_name)
            .bind(&owner_id)
            .bind(now)
            .bind(now)
            .execute(&mut **tx)
            .await?;
            sqlx::query(
                "INSERT INTO household_members (household_id, user_id, role, created_at) \
                 VALUES (?, ?, 'owner', ?)",
            )
            .bind(&id)
            .bind(&owner_id)
            .bind(now)
            .execute(&mut **tx)
            .await?;
            Ok::<_, sqlx::Error>(())
        }
        .boxed()
    })
    .await
    .map_err(|err: sqlx::Error| wrap_unexpected(err.into(), "household_create"))?;

    tracing::info!(
        target = "housekeepin",
        event = "household_created",
        household_id = %household.id
    );
    Ok(household)
}

/// Memberships joined with user profiles, as the account screen shows them.
pub async fn list_members(pool: &SqlitePool, household_id: &str) -> AppResult<Vec<MemberProfile>> {
    let rows = sqlx::query(
        "SELECT m.user_id, m.role, u.full_name, u.email \
         FROM household_members m JOIN users u ON u.id = m.user_id \
         WHERE m.household_id = ? ORDER BY m.created_at, m.user_id",
    )
    .bind(household_id)
    .fetch_all(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "members_list"))?;

    rows.iter()
        .map(|row| {
            let role: String = row.try_get("role").map_err(AppError::from)?;
            Ok(MemberProfile {
                user_id: row.try_get("user_id").map_err(AppError::from)?,
                role: decode_role(&role)?,
                full_name: row
                    .try_get::<Option<String>, _>("full_name")
                    .map_err(AppError::from)?,
                email: row.try_get("email").map_err(AppError::from)?,
            })
        })
        .collect()
}

/// Owner gate shared by budgets, invitations, and member removal.
pub async fn require_owner(pool: &SqlitePool, household_id: &str, user_id: &str) -> AppResult<()> {
    let role: Option<String> = sqlx::query_scalar(
        "SELECT role FROM household_members WHERE household_id = ? AND user_id = ?",
    )
    .bind(household_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "role_lookup"))?;

    match role.as_deref() {
        Some("owner") => Ok(()),
        Some(other) => Err(AppError::new(
            HOUSEHOLD_ROLE_REQUIRED,
            "Only the household owner can do that.",
        )
        .with_context("household_id", household_id.to_string())
        .with_context("role", other.to_string())),
        None => Err(
            AppError::new(HOUSEHOLD_MEMBER_MISSING, "Membership record not found.")
                .with_context("household_id", household_id.to_string())
                .with_context("user_id", user_id.to_string()),
        ),
    }
}

pub async fn ensure_member(pool: &SqlitePool, household_id: &str, user_id: &str) -> AppResult<()> {
    let exists: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM household_members WHERE household_id = ? AND user_id = ?",
    )
    .bind(household_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "member_lookup"))?;

    if exists.is_some() {
        Ok(())
    } else {
        Err(
            AppError::new(HOUSEHOLD_MEMBER_MISSING, "Membership record not found.")
                .with_context("household_id", household_id.to_string())
                .with_context("user_id", user_id.to_string()),
        )
    }
}

/// Hard delete of the membership row; removed members lose access outright.
/// Owner-only, and the last owner cannot be removed.
pub async fn remove_member(
    pool: &SqlitePool,
    household_id: &str,
    acting_user: &str,
    member_user: &str,
) -> AppResult<()> {
    require_owner(pool, household_id, acting_user).await?;
    ensure_member(pool, household_id, member_user).await?;

    let member_role: Option<String> = sqlx::query_scalar(
        "SELECT role FROM household_members WHERE household_id = ? AND user_id = ?",
    )
    .bind(household_id)
    .bind(member_user)
    .fetch_optional(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "member_remove_role"))?;

    if member_role.as_deref() == Some("owner") {
        let owners: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM household_members WHERE household_id = ? AND role = 'owner'",
        )
        .bind(household_id)
        .fetch_one(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "member_remove_owner_count"))?;
        if owners <= 1 {
            return Err(AppError::new(
                HOUSEHOLD_LAST_OWNER,
                "A household must keep at least one owner.",
            )
            .with_context("household_id", household_id.to_string()));
        }
    }

    sqlx::query("DELETE FROM household_members WHERE household_id = ? AND user_id = ?")
        .bind(household_id)
        .bind(member_user)
        .execute(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "member_remove"))?;

    tracing::info!(
        target = "housekeepin",
        event = "member_removed",
        household_id = %household_id,
        user_id = %member_user
    );
    Ok(())
}

/// Resolver convenience for callers holding only a user id; errors when the
/// user has no household yet.
pub async fn require_household(pool: &SqlitePool, user_id: &str) -> AppResult<Membership> {
    membership_for_user(pool, user_id).await?.ok_or_else(|| {
        AppError::new(HOUSEHOLD_NOT_FOUND, "No household found for this user.")
            .with_context("user_id", user_id.to_string())
    })
}
