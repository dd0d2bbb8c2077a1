use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use housekeepin::{db, migrate};

#[derive(Debug, Parser)]
#[command(name = "housekeepin", about = "Household management database tool", version)]
struct Cli {
    /// Optional explicit DB path
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Schema migration commands.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Database inspection commands.
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum MigrateCommand {
    /// List migrations and show applied/pending.
    List,
    /// Show how many migrations are applied and pending.
    Status,
    /// Apply all pending migrations.
    Up,
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Run the SQLite quick check and report the result.
    Status {
        /// Emit a machine-readable JSON object instead of the text view.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    housekeepin::init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let db_path = match cli.db {
        Some(path) => path,
        None => db::default_db_path()?,
    };

    match cli.command {
        Commands::Migrate(cmd) => handle_migrate(&db_path, cmd).await,
        Commands::Db(cmd) => handle_db(&db_path, cmd).await,
    }
}

async fn open_pool(db_path: &std::path::Path, create: bool) -> Result<SqlitePool> {
    if create {
        if let Some(parent) = db_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    let opts = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(create)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000;")
        .execute(&pool)
        .await
        .ok();
    Ok(pool)
}

async fn handle_migrate(db_path: &std::path::Path, cmd: MigrateCommand) -> Result<i32> {
    match cmd {
        MigrateCommand::List => {
            let pool = open_pool(db_path, false).await?;
            for (name, applied) in migrate::migration_status(&pool).await? {
                let mark = if applied { "applied" } else { "pending" };
                println!("{mark:>8}  {name}");
            }
            Ok(0)
        }
        MigrateCommand::Status => {
            let pool = open_pool(db_path, false).await?;
            let status = migrate::migration_status(&pool).await?;
            let applied = status.iter().filter(|(_, a)| *a).count();
            println!("{applied}/{} migrations applied", status.len());
            Ok(if applied == status.len() { 0 } else { 1 })
        }
        MigrateCommand::Up => {
            let pool = open_pool(db_path, true).await?;
            migrate::apply_migrations(&pool).await?;
            println!("database is up to date");
            Ok(0)
        }
    }
}

async fn handle_db(db_path: &std::path::Path, cmd: DbCommand) -> Result<i32> {
    match cmd {
        DbCommand::Status { json } => {
            let pool = open_pool(db_path, false).await?;
            let quick_check: String = sqlx::query_scalar("PRAGMA quick_check;")
                .fetch_one(&pool)
                .await?;
            let healthy = quick_check.eq_ignore_ascii_case("ok");
            let status = migrate::migration_status(&pool).await?;
            let pending = status.iter().filter(|(_, a)| !*a).count();

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "path": db_path.display().to_string(),
                        "quick_check": quick_check,
                        "healthy": healthy,
                        "migrations_pending": pending,
                    }))?
                );
            } else {
                println!("database:   {}", db_path.display());
                println!("quick_check: {quick_check}");
                println!("pending migrations: {pending}");
            }
            Ok(if healthy && pending == 0 { 0 } else { 1 })
        }
    }
}
