use sqlx::SqlitePool;

use crate::household::{create_household, get_household, membership_for_user};
use crate::model::{
    Household, NewTask, Task, User, GENERIC_FAIL, GENERIC_FAIL_MESSAGE, ONBOARDING_NAME_REQUIRED,
};
use crate::tasks::create_task;
use crate::time::now_ms;
use crate::{AppError, AppResult};

fn wrap_unexpected(err: AppError, operation: &'static str) -> AppError {
    AppError::new(GENERIC_FAIL, GENERIC_FAIL_MESSAGE)
        .with_context("operation", operation)
        .with_cause(err)
}

/// Household name derived from the email's local part, as the wizard does.
fn default_household_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    format!("{local}'s Household")
}

/// Step 1 of the wizard: the welcome screen asks for the user's name.
pub async fn set_profile_name(
    pool: &SqlitePool,
    user_id: &str,
    full_name: &str,
) -> AppResult<()> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::new(
            ONBOARDING_NAME_REQUIRED,
            "Please tell us your name.",
        ));
    }

    let res = sqlx::query("UPDATE users SET full_name = ?, updated_at = ? WHERE id = ?")
        .bind(full_name)
        .bind(now_ms())
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "onboarding_set_name"))?;
    if res.rows_affected() == 0 {
        return Err(
            AppError::new("AUTH/USER_NOT_FOUND", "User record not found.")
                .with_context("user_id", user_id.to_string()),
        );
    }
    Ok(())
}

/// Step 2 of the wizard: return the user's existing household, or create one
/// with the user as owner. Safe to re-run.
pub async fn ensure_household(pool: &SqlitePool, user: &User) -> AppResult<Household> {
    if let Some(membership) = membership_for_user(pool, &user.id).await? {
        if let Some(household) = get_household(pool, &membership.household_id).await? {
            return Ok(household);
        }
        // Membership points at a missing household; fall through and rebuild.
        tracing::warn!(
            target = "housekeepin",
            event = "onboarding_dangling_membership",
            household_id = %membership.household_id,
            user_id = %user.id
        );
    }

    let name = default_household_name(&user.email);
    create_household(pool, &name, &user.id).await
}

/// Step 3: the wizard's starter task.
pub async fn create_first_task(
    pool: &SqlitePool,
    household_id: &str,
    title: &str,
    description: Option<&str>,
    due_date: Option<i64>,
) -> AppResult<Task> {
    create_task(
        pool,
        household_id,
        NewTask {
            title: title.to_string(),
            description: description.map(str::to_owned),
            due_date,
            ..NewTask::default()
        },
    )
    .await
}

/// Final step: flip the user's onboarding flag.
pub async fn complete_onboarding(pool: &SqlitePool, user_id: &str) -> AppResult<()> {
    let res = sqlx::query("UPDATE users SET onboard_success = 1, updated_at = ? WHERE id = ?")
        .bind(now_ms())
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "onboarding_complete"))?;
    if res.rows_affected() == 0 {
        return Err(
            AppError::new("AUTH/USER_NOT_FOUND", "User record not found.")
                .with_context("user_id", user_id.to_string()),
        );
    }
    tracing::info!(
        target = "housekeepin",
        event = "onboarding_complete",
        user_id = %user_id
    );
    Ok(())
}
