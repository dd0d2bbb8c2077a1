use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::household::require_owner;
use crate::id::new_uuid_v7;
use crate::model::{
    Budget, BudgetInput, BudgetSummary, Transaction, TransactionType, BUDGET_INVALID_AMOUNT,
    BUDGET_INVALID_RANGE, BUDGET_NOT_FOUND, GENERIC_FAIL, GENERIC_FAIL_MESSAGE,
};
use crate::time::{now_ms, today_str};
use crate::{AppError, AppResult};

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date validation pattern to compile"));

fn wrap_unexpected(err: AppError, operation: &'static str) -> AppError {
    AppError::new(GENERIC_FAIL, GENERIC_FAIL_MESSAGE)
        .with_context("operation", operation)
        .with_cause(err)
}

fn decode_budget(row: &SqliteRow) -> AppResult<Budget> {
    Ok(Budget {
        id: row.try_get("id").map_err(AppError::from)?,
        household_id: row.try_get("household_id").map_err(AppError::from)?,
        name: row.try_get("name").map_err(AppError::from)?,
        start_date: row.try_get("start_date").map_err(AppError::from)?,
        end_date: row.try_get("end_date").map_err(AppError::from)?,
        total_amount: row.try_get("total_amount").map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
        updated_at: row.try_get("updated_at").map_err(AppError::from)?,
    })
}

fn decode_transaction(row: &SqliteRow) -> AppResult<Transaction> {
    let kind: String = row.try_get("transaction_type").map_err(AppError::from)?;
    Ok(Transaction {
        id: row.try_get("id").map_err(AppError::from)?,
        household_id: row.try_get("household_id").map_err(AppError::from)?,
        transaction_type: TransactionType::parse(&kind).ok_or_else(|| {
            AppError::new("BUDGET/DECODE", "Unknown transaction type")
                .with_context("transaction_type", kind.clone())
        })?,
        amount: row.try_get("amount").map_err(AppError::from)?,
        created_by: row
            .try_get::<Option<String>, _>("created_by")
            .map_err(AppError::from)?,
        created_at: row.try_get("created_at").map_err(AppError::from)?,
    })
}

fn validate_period(input: &BudgetInput) -> AppResult<()> {
    for (field, value) in [("start_date", &input.start_date), ("end_date", &input.end_date)] {
        // The pattern pins the zero-padded shape; the parse rejects
        // impossible dates like 2026-13-45.
        if !DATE_PATTERN.is_match(value)
            || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err()
        {
            return Err(AppError::new(
                BUDGET_INVALID_RANGE,
                "Budget dates must be real YYYY-MM-DD dates.",
            )
            .with_context(field, value.clone()));
        }
    }
    // Lexicographic comparison is date order for this format.
    if input.start_date > input.end_date {
        return Err(AppError::new(
            BUDGET_INVALID_RANGE,
            "Budget start must not be after its end.",
        )
        .with_context("start_date", input.start_date.clone())
        .with_context("end_date", input.end_date.clone()));
    }
    if !input.total_amount.is_finite() || input.total_amount < 0.0 {
        return Err(AppError::new(
            BUDGET_INVALID_AMOUNT,
            "Budget totals must be zero or more.",
        )
        .with_context("total_amount", input.total_amount.to_string()));
    }
    Ok(())
}

/// The budget whose period contains `today` (inclusive bounds). Uniqueness
/// of the active row is assumed, not enforced; when several match, the most
/// recently started one wins so the pick is deterministic.
pub async fn active_budget(
    pool: &SqlitePool,
    household_id: &str,
    today: &str,
) -> AppResult<Option<Budget>> {
    let row = sqlx::query(
        "SELECT * FROM budgets \
         WHERE household_id = ? AND start_date <= ? AND end_date >= ? \
         ORDER BY start_date DESC, id DESC LIMIT 1",
    )
    .bind(household_id)
    .bind(today)
    .bind(today)
    .fetch_optional(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "budget_active"))?;

    row.as_ref().map(decode_budget).transpose()
}

/// Owner-only.
pub async fn create_budget(
    pool: &SqlitePool,
    household_id: &str,
    acting_user: &str,
    input: BudgetInput,
) -> AppResult<Budget> {
    require_owner(pool, household_id, acting_user).await?;
    validate_period(&input)?;

    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO budgets (id, household_id, name, start_date, end_date, total_amount, \
         created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(household_id)
    .bind(&input.name)
    .bind(&input.start_date)
    .bind(&input.end_date)
    .bind(input.total_amount)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "budget_create"))?;

    tracing::info!(
        target = "housekeepin",
        event = "budget_created",
        household_id = %household_id,
        budget_id = %id
    );
    Ok(Budget {
        id,
        household_id: household_id.to_string(),
        name: input.name,
        start_date: input.start_date,
        end_date: input.end_date,
        total_amount: input.total_amount,
        created_at: now,
        updated_at: now,
    })
}

/// Owner-only.
pub async fn update_budget(
    pool: &SqlitePool,
    household_id: &str,
    acting_user: &str,
    budget_id: &str,
    input: BudgetInput,
) -> AppResult<Budget> {
    require_owner(pool, household_id, acting_user).await?;
    validate_period(&input)?;

    let now = now_ms();
    let res = sqlx::query(
        "UPDATE budgets SET name = ?, start_date = ?, end_date = ?, total_amount = ?, \
         updated_at = ? WHERE household_id = ? AND id = ?",
    )
    .bind(&input.name)
    .bind(&input.start_date)
    .bind(&input.end_date)
    .bind(input.total_amount)
    .bind(now)
    .bind(household_id)
    .bind(budget_id)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "budget_update"))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new(BUDGET_NOT_FOUND, "Budget not found.")
            .with_context("id", budget_id.to_string())
            .with_context("household_id", household_id.to_string()));
    }

    let row = sqlx::query("SELECT * FROM budgets WHERE id = ?")
        .bind(budget_id)
        .fetch_one(pool)
        .await
        .map_err(|err| wrap_unexpected(err.into(), "budget_update_fetch"))?;
    decode_budget(&row)
}

/// Any member may record a transaction.
pub async fn add_transaction(
    pool: &SqlitePool,
    household_id: &str,
    kind: TransactionType,
    amount: f64,
    created_by: &str,
) -> AppResult<Transaction> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::new(
            BUDGET_INVALID_AMOUNT,
            "Transaction amounts must be greater than zero.",
        )
        .with_context("amount", amount.to_string()));
    }

    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO transactions (id, household_id, transaction_type, amount, created_by, \
         created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(household_id)
    .bind(kind.as_str())
    .bind(amount)
    .bind(created_by)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "transaction_add"))?;

    Ok(Transaction {
        id,
        household_id: household_id.to_string(),
        transaction_type: kind,
        amount,
        created_by: Some(created_by.to_string()),
        created_at: now,
    })
}

/// Newest first, as the ledger table shows them.
pub async fn list_transactions(
    pool: &SqlitePool,
    household_id: &str,
) -> AppResult<Vec<Transaction>> {
    let rows = sqlx::query(
        "SELECT * FROM transactions WHERE household_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(household_id)
    .fetch_all(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "transactions_list"))?;

    rows.iter().map(decode_transaction).collect()
}

/// remaining = total − Σ bills + Σ contributions.
pub fn remaining_balance(total_amount: f64, total_bills: f64, total_contributions: f64) -> f64 {
    total_amount - total_bills + total_contributions
}

/// The one place the balance rule lives: a single aggregate over the
/// canonical `transaction_type` column. The sum spans all household
/// transactions regardless of the active budget's period.
pub async fn budget_summary(
    pool: &SqlitePool,
    household_id: &str,
    today: &str,
) -> AppResult<Option<BudgetSummary>> {
    let Some(budget) = active_budget(pool, household_id, today).await? else {
        return Ok(None);
    };

    let (total_bills, total_contributions): (f64, f64) = sqlx::query_as(
        "SELECT \
           COALESCE(SUM(CASE WHEN transaction_type = 'bill' THEN amount ELSE 0 END), 0), \
           COALESCE(SUM(CASE WHEN transaction_type = 'contribution' THEN amount ELSE 0 END), 0) \
         FROM transactions WHERE household_id = ?",
    )
    .bind(household_id)
    .fetch_one(pool)
    .await
    .map_err(|err| wrap_unexpected(err.into(), "budget_summary"))?;

    let remaining = remaining_balance(budget.total_amount, total_bills, total_contributions);
    Ok(Some(BudgetSummary {
        budget,
        total_bills,
        total_contributions,
        remaining,
    }))
}

/// `budget_summary` against the wall-clock date.
pub async fn current_summary(
    pool: &SqlitePool,
    household_id: &str,
) -> AppResult<Option<BudgetSummary>> {
    budget_summary(pool, household_id, &today_str()).await
}
