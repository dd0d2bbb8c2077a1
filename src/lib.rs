pub mod auth;
pub mod budget;
pub mod calendar;
pub mod db;
mod error;
pub mod household;
pub mod id;
pub mod invites;
pub mod migrate;
pub mod model;
pub mod onboarding;
pub mod state;
pub mod tasks;
pub mod time;

pub use error::{AppError, AppResult};
pub use model::{
    Budget, BudgetSummary, CalendarEvent, CalendarMonth, Household, Invitation, InvitationStatus,
    MemberProfile, Membership, Role, Session, Task, Transaction, TransactionType, User,
};
pub use state::AppState;

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "housekeepin=info,sqlx=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("HOUSEKEEPIN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the stdout subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init_logging() {
    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init();
}

/// File sink variant for long-running use; hold the returned guard for the
/// process lifetime or buffered lines are lost.
pub fn init_file_logging(
    log_dir: &Path,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, "housekeepin.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_target(true)
        .with_writer(writer)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init();
    Ok(guard)
}
