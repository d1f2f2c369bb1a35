use std::sync::Arc;

use crate::config::DbConfig;
use crate::db;
use crate::users::{MemoryUserStore, PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init(config: &DbConfig) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        db::migrate(&pool).await?;

        let users = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;
        Ok(Self::from_parts(users))
    }

    pub fn from_parts(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// State backed by [`MemoryUserStore`], no database needed.
    pub fn in_memory() -> Self {
        Self::from_parts(Arc::new(MemoryUserStore::new()))
    }
}
