use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use sqlx::PgPool;

use crate::{
    config::AppConfig,
    db,
    error::{AppError, AppResult},
};

/// Status code and body of a request that completed under an idempotency key.
pub type StoredResponse = (u16, Value);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: Option<PgPool>,
    pub idempotency_cache: Cache<String, StoredResponse>,
}

impl AppState {
    pub fn build(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_pool = db::build_pool(&config)?;
        if db_pool.is_none() {
            tracing::warn!("DATABASE_URL is not set; data routes will respond with errors");
        }

        let idempotency_cache = Cache::builder()
            .max_capacity(config.idempotency_max_entries)
            .time_to_live(Duration::from_secs(config.idempotency_ttl_seconds))
            .build();

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            idempotency_cache,
        })
    }

    pub fn db_pool(&self) -> AppResult<&PgPool> {
        self.db_pool.as_ref().ok_or_else(|| {
            AppError::dependency(
                "Database is not configured.",
                "Set DATABASE_URL to enable persistence.",
            )
        })
    }
}
