use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::household::ensure_member;
use crate::id::new_uuid_v7;
use crate::model::{
    NewTask, Task, TaskUpdate, GENERIC_FAIL, GENERIC_FAIL_MESSAGE, TASKS_NOT_FOUND,
    TASKS_TITLE_REQUIRED,
};
use crate::time::now_ms;
use crate::{AppError, AppResult};

fn wrap_unexpected(err: AppError, operation: &'static str) -> AppError {
    AppError::new(GENERIC_FAIL, GENERIC_FAIL_MESSAGE)
        .with_context("operation", operation)
        .with_cause(err)
}

fn not_found(id: &str, household_id: &str) -> AppError {
    AppError::new(TASKS_NOT_FOUND, "Task not found.")
        .with_context("id", id.to_string())
        .with_context("household_id", household_id.to_string())
}

pub(crate) fn decode_task(row: &SqliteRow) -> AppResult<Task> {
    Ok(Task {
        id: row.try_get("id").map_err(AppError::from)?,
        household_id: row.try_get("household_id").map_err(AppError::from)?,
        title: row.try_get("title").map_err(AppError::from)?,
        description: row
            .try_get::<Option<String>, _>("description")
            .map_err(AppError::from)?,
        due_date: row
            .try_get::<Option<i64>, _>("due_date")
            .map_err(AppError::from)?,
        completed: row
            .try_get::<i64, _>("completed")
            .map(|value| value != 0)
            .map_err(AppError::from)?,
        assigned_to: row
            .try_get::<Option<String>, _>("assigned_to")
            .map_err(AppError::from)?,
        priority: row
            .try_get::<Option<String>, _>("priority")
            .map_err(AppError::from)?,
        status: row
            .try_get::<Option<String>, _>("status")
            .map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
        updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        deleted_at: row
            .try_get::<Option<i64>, _>("deleted_at")
            .map_err(AppError::from)?,
    })
}

pub async fn list_tasks(pool: &SqlitePool, household_id: &str) -> AppResult<Vec<Task>> {
    let rows = sqlx::query(
        "SELECT * FROM tasks WHERE household_id = ? AND deleted_at IS NULL \
         ORDER BY due_date IS NULL, due_date, created_at, id",
    )
    .bind(household_id)
    .fetch_all(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "tasks_list"))?;

    rows.iter().map(decode_task).collect()
}

pub async fn get_task(pool: &SqlitePool, household_id: &str, id: &str) -> AppResult<Option<Task>> {
    let row = sqlx::query(
        "SELECT * FROM tasks WHERE household_id = ? AND id = ? AND deleted_at IS NULL",
    )
    .bind(household_id)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "tasks_get"))?;
    row.as_ref().map(decode_task).transpose()
}

pub async fn create_task(pool: &SqlitePool, household_id: &str, new: NewTask) -> AppResult<Task> {
    let title = new.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::new(TASKS_TITLE_REQUIRED, "Tasks need a title."));
    }

    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO tasks (id, household_id, title, description, due_date, completed, \
         priority, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(household_id)
    .bind(&title)
    .bind(&new.description)
    .bind(new.due_date)
    .bind(&new.priority)
    .bind(&new.status)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "tasks_create"))?;

    Ok(Task {
        id,
        household_id: household_id.to_string(),
        title,
        description: new.description,
        due_date: new.due_date,
        completed: false,
        assigned_to: None,
        priority: new.priority,
        status: new.status,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    })
}

/// Edits from the task dialog. Any member may edit; there is no ownership
/// check on tasks.
pub async fn update_task(
    pool: &SqlitePool,
    household_id: &str,
    id: &str,
    update: TaskUpdate,
) -> AppResult<Task> {
    let mut sets: Vec<&str> = Vec::new();
    let mut query = String::from("UPDATE tasks SET updated_at = ?");
    if update.title.is_some() {
        sets.push("title");
    }
    if update.description.is_some() {
        sets.push("description");
    }
    if update.due_date.is_some() {
        sets.push("due_date");
    }
    if update.priority.is_some() {
        sets.push("priority");
    }
    if update.status.is_some() {
        sets.push("status");
    }
    for col in &sets {
        query.push_str(&format!(", {col} = ?"));
    }
    query.push_str(" WHERE household_id = ? AND id = ? AND deleted_at IS NULL");

    if let Some(title) = &update.title {
        if title.trim().is_empty() {
            return Err(AppError::new(TASKS_TITLE_REQUIRED, "Tasks need a title."));
        }
    }

    let mut q = sqlx::query(&query).bind(now_ms());
    if let Some(title) = &update.title {
        q = q.bind(title.trim().to_string());
    }
    if let Some(description) = &update.description {
        q = q.bind(description.clone());
    }
    if let Some(due_date) = &update.due_date {
        q = q.bind(*due_date);
    }
    if let Some(priority) = &update.priority {
        q = q.bind(priority.clone());
    }
    if let Some(status) = &update.status {
        q = q.bind(status.clone());
    }
    let res = q
        .bind(household_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "tasks_update"))?;
    if res.rows_affected() == 0 {
        return Err(not_found(id, household_id));
    }

    get_task(pool, household_id, id)
        .await?
        .ok_or_else(|| not_found(id, household_id))
}

pub async fn set_completed(
    pool: &SqlitePool,
    household_id: &str,
    id: &str,
    completed: bool,
) -> AppResult<()> {
    let res = sqlx::query(
        "UPDATE tasks SET completed = ?, updated_at = ? \
         WHERE household_id = ? AND id = ? AND deleted_at IS NULL",
    )
    .bind(completed as i64)
    .bind(now_ms())
    .bind(household_id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "tasks_set_completed"))?;
    if res.rows_affected() == 0 {
        return Err(not_found(id, household_id));
    }
    Ok(())
}

/// Assignees must belong to the same household; pass `None` to unassign.
pub async fn assign_task(
    pool: &SqlitePool,
    household_id: &str,
    id: &str,
    assignee: Option<&str>,
) -> AppResult<()> {
    if let Some(user_id) = assignee {
        ensure_member(pool, household_id, user_id)
            .await
            .map_err(|err| {
                if err.code() == crate::model::HOUSEHOLD_MEMBER_MISSING {
                    AppError::new(
                        crate::model::VALIDATION_HOUSEHOLD_MISMATCH,
                        "Assignee is not a member of this household.",
                    )
                    .with_context("user_id", user_id.to_string())
                    .with_context("household_id", household_id.to_string())
                } else {
                    err
                }
            })?;
    }

    let res = sqlx::query(
        "UPDATE tasks SET assigned_to = ?, updated_at = ? \
         WHERE household_id = ? AND id = ? AND deleted_at IS NULL",
    )
    .bind(assignee)
    .bind(now_ms())
    .bind(household_id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "tasks_assign"))?;
    if res.rows_affected() == 0 {
        return Err(not_found(id, household_id));
    }
    Ok(())
}

/// Soft delete; listings filter on `deleted_at IS NULL`.
pub async fn delete_task(pool: &SqlitePool, household_id: &str, id: &str) -> AppResult<()> {
    let now = now_ms();
    let res = sqlx::query(
        "UPDATE tasks SET deleted_at = ?, updated_at = ? \
         WHERE household_id = ? AND id = ? AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(now)
    .bind(household_id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "tasks_delete"))?;
    if res.rows_affected() == 0 {
        return Err(not_found(id, household_id));
    }
    Ok(())
}
