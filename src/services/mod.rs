pub mod upload;

use crate::config::{database, Config};
use crate::repository::{
    CategoryStore, MemoryCategoryRepository, MemoryProductRepository, MemoryUserRepository,
    PgCategoryRepository, PgProductRepository, PgUserRepository, ProductStore, UserStore,
};
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub products: Arc<dyn ProductStore>,
    pub uploader: Arc<upload::ImageUploader>,
}

impl AppState {
    /// Connects to Postgres when `DATABASE_URL` is configured, otherwise
    /// keeps everything in memory for the lifetime of the process.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let state = match config.database_url.clone() {
            Some(url) => {
                let pool = database::create_pool(&url, config.db_max_connections).await?;
                database::init_db(&pool).await?;
                Self {
                    users: Arc::new(PgUserRepository::new(pool.clone())),
                    categories: Arc::new(PgCategoryRepository::new(pool.clone())),
                    products: Arc::new(PgProductRepository::new(pool)),
                    uploader: Arc::new(upload::ImageUploader::from_config(&config)),
                    config,
                }
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store");
                Self::in_memory(config)
            }
        };

        state.uploader.ensure_dir().await?;
        Ok(state)
    }

    pub fn in_memory(config: Config) -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            categories: Arc::new(MemoryCategoryRepository::new()),
            products: Arc::new(MemoryProductRepository::new()),
            uploader: Arc::new(upload::ImageUploader::from_config(&config)),
            config,
        }
    }
}
