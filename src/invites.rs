use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::auth::validate_email;
use crate::household::require_owner;
use crate::id::new_uuid_v7;
use crate::model::{
    Invitation, InvitationStatus, GENERIC_FAIL, GENERIC_FAIL_MESSAGE, INVITES_DUPLICATE,
};
use crate::time::now_ms;
use crate::{AppError, AppResult};

fn wrap_unexpected(err: AppError, operation: &'static str) -> AppError {
    AppError::new(GENERIC_FAIL, GENERIC_FAIL_MESSAGE)
        .with_context("operation", operation)
        .with_cause(err)
}

fn decode_invitation(row: &SqliteRow) -> AppResult<Invitation> {
    let status: String = row.try_get("status").map_err(AppError::from)?;
    Ok(Invitation {
        id: row.try_get("id").map_err(AppError::from)?,
        household_id: row.try_get("household_id").map_err(AppError::from)?,
        invitee_email: row.try_get("invitee_email").map_err(AppError::from)?,
        inviter_id: row.try_get("inviter_id").map_err(AppError::from)?,
        status: InvitationStatus::parse(&status).ok_or_else(|| {
            AppError::new("INVITES/DECODE", "Unknown invitation status")
                .with_context("status", status.clone())
        })?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
        updated_at: row.try_get("updated_at").map_err(AppError::from)?,
    })
}

/// Owner-only. One pending invite per email per household.
pub async fn send_invitation(
    pool: &SqlitePool,
    household_id: &str,
    inviter_id: &str,
    invitee_email: &str,
) -> AppResult<Invitation> {
    require_owner(pool, household_id, inviter_id).await?;
    let invitee_email = invitee_email.trim().to_ascii_lowercase();
    validate_email(&invitee_email)
        .map_err(|err| err.with_context("field", "invitee_email"))?;

    let pending: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM invitations \
         WHERE household_id = ? AND invitee_email = ? AND status = 'pending'",
    )
    .bind(household_id)
    .bind(&invitee_email)
    .fetch_optional(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "invitation_pending_lookup"))?;
    if pending.is_some() {
        return Err(AppError::new(
            INVITES_DUPLICATE,
            "That person already has a pending invitation.",
        )
        .with_context("invitee_email", invitee_email.clone())
        .with_context("household_id", household_id.to_string()));
    }

    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO invitations (id, household_id, invitee_email, inviter_id, status, \
         created_at, updated_at) VALUES (?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(&id)
    .bind(household_id)
    .bind(&invitee_email)
    .bind(inviter_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "invitation_send"))?;

    tracing::info!(
        target = "housekeepin",
        event = "invitation_sent",
        household_id = %household_id
    );
    Ok(Invitation {
        id,
        household_id: household_id.to_string(),
        invitee_email,
        inviter_id: inviter_id.to_string(),
        status: InvitationStatus::Pending,
        created_at: now,
        updated_at: now,
    })
}

/// Invitations this owner has sent for the household. Owner-only; members
/// have no view into pending invites.
pub async fn list_sent(
    pool: &SqlitePool,
    household_id: &str,
    inviter_id: &str,
) -> AppResult<Vec<Invitation>> {
    require_owner(pool, household_id, inviter_id).await?;

    let rows = sqlx::query(
        "SELECT * FROM invitations WHERE household_id = ? AND inviter_id = ? \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(household_id)
    .bind(inviter_id)
    .fetch_all(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "invitations_list"))?;

    rows.iter().map(decode_invitation).collect()
}
