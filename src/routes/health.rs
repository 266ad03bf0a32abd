use std::time::Duration;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match &state.db_pool {
        Some(pool) => {
            // Bounded so the health check answers even while the first connection hangs.
            match tokio::time::timeout(
                Duration::from_secs(3),
                sqlx::query("SELECT 1").fetch_one(pool),
            )
            .await
            {
                Ok(Ok(_)) => "ok",
                Ok(Err(error)) => {
                    tracing::error!(error = %error, "Health check query failed");
                    "unreachable"
                }
                Err(_) => {
                    tracing::error!("Health check query timed out");
                    "unreachable"
                }
            }
        }
        None => "not_configured",
    };

    let status = if database == "unreachable" { "degraded" } else { "ok" };
    Json(json!({
        "status": status,
        "app": state.config.app_name,
        "now": Utc::now().to_rfc3339(),
        "timezone": state.config.property_timezone.name(),
        "database": database,
    }))
}
