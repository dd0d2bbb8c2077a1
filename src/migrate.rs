use regex::Regex;
use sha2::{Digest, Sha256};
use sqlx::{Executor, Row, SqlitePool};
use std::collections::HashMap;

use crate::time::now_ms;
use tracing::{error, info};

fn preview(sql: &str) -> String {
    let one_line = sql.replace(['\n', '\t'], " ");
    let trimmed = one_line.trim();
    if trimmed.len() > 160 {
        format!("{}…", &trimmed[..160])
    } else {
        trimmed.to_string()
    }
}

pub static MIGRATIONS: &[(&str, &str)] = &[
    (
        "202606101200_initial.sql",
        include_str!("../migrations/202606101200_initial.sql"),
    ),
    (
        "202606101300_domain_tables.sql",
        include_str!("../migrations/202606101300_domain_tables.sql"),
    ),
    (
        "202606151000_sessions.sql",
        include_str!("../migrations/202606151000_sessions.sql"),
    ),
    (
        "202607020900_add_deleted_at.sql",
        include_str!("../migrations/202607020900_add_deleted_at.sql"),
    ),
    (
        "202607101100_indexes.sql",
        include_str!("../migrations/202607101100_indexes.sql"),
    ),
];

fn strip_comments(raw_sql: &str) -> String {
    raw_sql
        .lines()
        .filter(|line| {
            let t = line.trim_start();
            !(t.is_empty() || t.starts_with("--"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn checksum_of(cleaned: &str) -> String {
    format!("{:x}", Sha256::digest(cleaned.as_bytes()))
}

pub async fn apply_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    pool.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (\
           version   TEXT PRIMARY KEY,\
           applied_at INTEGER NOT NULL,\
           checksum TEXT NOT NULL\
         )",
    )
    .await?;

    let rows = sqlx::query("SELECT version, checksum FROM schema_migrations")
        .fetch_all(pool)
        .await?;
    let mut applied: HashMap<String, String> = HashMap::new();
    for r in rows {
        if let (Ok(v), Ok(c)) = (
            r.try_get::<String, _>("version"),
            r.try_get::<String, _>("checksum"),
        ) {
            applied.insert(v, c);
        }
    }
    let add_col_re = Regex::new(r"(?i)^ALTER\s+TABLE\s+(\w+)\s+ADD\s+COLUMN\s+(\w+)").unwrap();

    for (filename, raw_sql) in MIGRATIONS {
        let cleaned = strip_comments(raw_sql);
        let checksum = checksum_of(&cleaned);

        if let Some(stored) = applied.get(*filename) {
            if stored != &checksum {
                anyhow::bail!("migration {} edited after application", filename);
            }
            info!(target = "housekeepin", event = "migration_skip_file", file = %filename);
            continue;
        }

        let mut tx = pool.begin().await?;
        for stmt in cleaned.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            let upper = s.to_ascii_uppercase();
            if upper == "BEGIN" || upper == "COMMIT" {
                continue;
            }
            if let Some(caps) = add_col_re.captures(s) {
                let table = caps.get(1).unwrap().as_str();
                let col = caps.get(2).unwrap().as_str();
                let exists: Option<i64> = sqlx::query_scalar(&format!(
                    "SELECT 1 FROM pragma_table_info('{}') WHERE name='{}'",
                    table, col
                ))
                .fetch_optional(&mut *tx)
                .await?;
                if exists.is_some() {
                    info!(target = "housekeepin", event = "migration_stmt_skip", file = %filename, sql = %preview(s));
                    continue;
                }
            }
            info!(target = "housekeepin", event = "migration_stmt", file = %filename, sql = %preview(s));
            if let Err(e) = sqlx::query(s).execute(&mut *tx).await {
                error!(target = "housekeepin", event = "migration_stmt_error", file = %filename, sql = %preview(s), error = %e);
                return Err(e.into());
            }
        }

        sqlx::query(
            "INSERT INTO schema_migrations (version, applied_at, checksum) VALUES (?, ?, ?)",
        )
        .bind(*filename)
        .bind(now_ms())
        .bind(&checksum)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(target = "housekeepin", event = "migration_file_applied", file = %filename);
    }

    Ok(())
}

/// Applied/pending view used by the CLI.
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<Vec<(String, bool)>> {
    let table_exists: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_migrations'",
    )
    .fetch_optional(pool)
    .await?;

    let mut applied: HashMap<String, String> = HashMap::new();
    if table_exists.is_some() {
        let rows = sqlx::query("SELECT version, checksum FROM schema_migrations")
            .fetch_all(pool)
            .await?;
        for r in rows {
            if let (Ok(v), Ok(c)) = (
                r.try_get::<String, _>("version"),
                r.try_get::<String, _>("checksum"),
            ) {
                applied.insert(v, c);
            }
        }
    }

    Ok(MIGRATIONS
        .iter()
        .map(|(name, _)| (name.to_string(), applied.contains_key(*name)))
        .collect())
}
