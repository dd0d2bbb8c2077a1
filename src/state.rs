use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthGateway;
use crate::{db, migrate};

/// Shared handles the feature layers borrow from.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: AuthGateway,
    pub db_path: Arc<PathBuf>,
}

impl AppState {
    /// Open (or create) the database, bring the schema up to date, and wire
    /// the auth gateway.
    pub async fn init(db_path: &Path) -> anyhow::Result<Self> {
        let pool = db::open_sqlite_pool(db_path).await?;
        migrate::apply_migrations(&pool).await?;
        let auth = AuthGateway::new(pool.clone());
        Ok(Self {
            pool,
            auth,
            db_path: Arc::new(db_path.to_path_buf()),
        })
    }
}
