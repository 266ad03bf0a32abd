use std::time::Duration;

use axum::http::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;

/// Browser access for the front-desk UI. The request id is exposed so the
/// UI can show it next to error messages.
pub fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let request_id = HeaderName::from_static("x-request-id");
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static("idempotency-key"),
            request_id.clone(),
        ])
        .expose_headers([request_id, CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(600));

    match allowed_origins(&config.cors_origins) {
        None => layer.allow_origin(Any),
        Some(origins) => layer.allow_origin(origins).allow_credentials(true),
    }
}

/// `None` means any origin; unparsable entries are dropped with a warning.
fn allowed_origins(configured: &[String]) -> Option<Vec<HeaderValue>> {
    if configured.iter().any(|origin| origin.trim() == "*") {
        return None;
    }
    Some(
        configured
            .iter()
            .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::allowed_origins;

    #[test]
    fn wildcard_allows_any_origin() {
        assert!(allowed_origins(&["http://desk.local".to_string(), "*".to_string()]).is_none());
    }

    #[test]
    fn explicit_origins_are_parsed() {
        let origins = allowed_origins(&[
            "http://localhost:3000".to_string(),
            "bad\norigin".to_string(),
        ])
        .unwrap();
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0], "http://localhost:3000");
    }
}
