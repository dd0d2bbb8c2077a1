use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::id::new_uuid_v7;
use crate::model::{
    CalendarEvent, CalendarMonth, NewEvent, CALENDAR_INVALID_MONTH, CALENDAR_NOT_FOUND,
    CALENDAR_TITLE_REQUIRED, GENERIC_FAIL, GENERIC_FAIL_MESSAGE,
};
use crate::tasks::decode_task;
use crate::time::now_ms;
use crate::{AppError, AppResult};

fn wrap_unexpected(err: AppError, operation: &'static str) -> AppError {
    AppError::new(GENERIC_FAIL, GENERIC_FAIL_MESSAGE)
        .with_context("operation", operation)
        .with_cause(err)
}

fn decode_event(row: &SqliteRow) -> AppResult<CalendarEvent> {
    Ok(CalendarEvent {
        id: row.try_get("id").map_err(AppError::from)?,
        household_id: row.try_get("household_id").map_err(AppError::from)?,
        title: row.try_get("title").map_err(AppError::from)?,
        event_date: row.try_get("event_date").map_err(AppError::from)?,
        event_location: row
            .try_get::<Option<String>, _>("event_location")
            .map_err(AppError::from)?,
        created_by: row
            .try_get::<Option<String>, _>("created_by")
            .map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
        updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        deleted_at: row
            .try_get::<Option<i64>, _>("deleted_at")
            .map_err(AppError::from)?,
    })
}

/// Inclusive `[start_ms, end_ms]` covering the whole month in UTC.
pub fn month_window(year: i32, month: u32) -> AppResult<(i64, i64)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        AppError::new(CALENDAR_INVALID_MONTH, "Not a valid calendar month.")
            .with_context("year", year.to_string())
            .with_context("month", month.to_string())
    })?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| {
        AppError::new(CALENDAR_INVALID_MONTH, "Not a valid calendar month.")
            .with_context("year", year.to_string())
            .with_context("month", month.to_string())
    })?;

    let start_ms = start
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists")
        .and_utc()
        .timestamp_millis();
    let end_ms = next
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists")
        .and_utc()
        .timestamp_millis()
        - 1;
    Ok((start_ms, end_ms))
}

/// The month view's two queries: tasks due in the window and events
/// scheduled in it, each ordered ascending by date.
pub async fn list_month(
    pool: &SqlitePool,
    household_id: &str,
    year: i32,
    month: u32,
) -> AppResult<CalendarMonth> {
    let (start_ms, end_ms) = month_window(year, month)?;

    let task_rows = sqlx::query(
        "SELECT * FROM tasks \
         WHERE household_id = ? AND deleted_at IS NULL \
           AND due_date IS NOT NULL AND due_date >= ? AND due_date <= ? \
         ORDER BY due_date, id",
    )
    .bind(household_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "calendar_tasks"))?;

    let event_rows = sqlx::query(
        "SELECT * FROM calendar_events \
         WHERE household_id = ? AND deleted_at IS NULL \
           AND event_date >= ? AND event_date <= ? \
         ORDER BY event_date, id",
    )
    .bind(household_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "calendar_events"))?;

    Ok(CalendarMonth {
        tasks: task_rows.iter().map(decode_task).collect::<AppResult<_>>()?,
        events: event_rows
            .iter()
            .map(decode_event)
            .collect::<AppResult<_>>()?,
    })
}

pub async fn create_event(
    pool: &SqlitePool,
    household_id: &str,
    new: NewEvent,
) -> AppResult<CalendarEvent> {
    let title = new.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::new(
            CALENDAR_TITLE_REQUIRED,
            "Events need a title.",
        ));
    }

    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO calendar_events (id, household_id, title, event_date, event_location, \
         created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(household_id)
    .bind(&title)
    .bind(new.event_date)
    .bind(&new.event_location)
    .bind(&new.created_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "calendar_create"))?;

    Ok(CalendarEvent {
        id,
        household_id: household_id.to_string(),
        title,
        event_date: new.event_date,
        event_location: new.event_location,
        created_by: new.created_by,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    })
}

/// Soft delete, same pattern as tasks.
pub async fn delete_event(pool: &SqlitePool, household_id: &str, id: &str) -> AppResult<()> {
    let now = now_ms();
    let res = sqlx::query(
        "UPDATE calendar_events SET deleted_at = ?, updated_at = ? \
         WHERE household_id = ? AND id = ? AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(now)
    .bind(household_id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "calendar_delete"))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new(CALENDAR_NOT_FOUND, "Event not found.")
            .with_context("id", id.to_string())
            .with_context("household_id", household_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_window_is_inclusive_and_contiguous() {
        let (jan_start, jan_end) = month_window(2026, 1).unwrap();
        let (feb_start, feb_end) = month_window(2026, 2).unwrap();
        assert_eq!(jan_end + 1, feb_start);
        assert!(jan_start < jan_end);
        assert!(feb_start < feb_end);
    }

    #[test]
    fn month_window_handles_december_rollover() {
        let (dec_start, dec_end) = month_window(2025, 12).unwrap();
        let (jan_start, _) = month_window(2026, 1).unwrap();
        assert_eq!(dec_end + 1, jan_start);
        assert!(dec_start < dec_end);
    }

    #[test]
    fn month_window_rejects_month_zero_and_thirteen() {
        assert!(month_window(2026, 0).is_err());
        assert!(month_window(2026, 13).is_err());
    }
}
