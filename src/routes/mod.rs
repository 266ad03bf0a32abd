use axum::{routing::get, Router};

use crate::state::AppState;

pub mod bookings;
pub mod customers;
pub mod expenses;
pub mod health;
pub mod reports;
pub mod request_bookings;
pub mod rooms;

pub fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .merge(rooms::router())
        .merge(bookings::router())
        .merge(request_bookings::router())
        .merge(customers::router())
        .merge(expenses::router())
        .merge(reports::router())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::v1_router;
    use crate::{config::test_config, state::AppState};

    fn app() -> Router {
        let state = AppState::build(test_config()).expect("state");
        Router::new().nest("/api", v1_router()).with_state(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn health_reports_missing_database() {
        let (status, body) = send(get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "not_configured");
        assert_eq!(body["timezone"], "Asia/Kolkata");
    }

    #[tokio::test]
    async fn filter_requires_check_in() {
        let (status, body) = send(get("/api/rooms/filter")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "checkInDateTime is required.");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn filter_rejects_unparsable_check_in() {
        let (status, body) = send(get("/api/rooms/filter?checkInDateTime=tomorrow")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "checkInDateTime must be an ISO-8601 timestamp.");
    }

    #[tokio::test]
    async fn persistence_failures_are_server_errors_with_detail() {
        let (status, body) =
            send(get("/api/rooms/filter?checkInDateTime=2025-03-10T09:00:00Z")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Database is not configured.");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn request_availability_validates_date_first() {
        let (status, body) = send(get("/api/request-bookings/availability")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "date is required.");
    }

    #[tokio::test]
    async fn unknown_status_is_rejected_before_touching_storage() {
        let request = Request::builder()
            .method("PATCH")
            .uri("/api/bookings/5/status")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"status":"pending"}"#))
            .expect("request");
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Unknown booking status 'pending'.");
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let (status, _) = send(get("/api/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
