use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::booking_draft::DraftError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{message}")]
    Dependency { message: String, detail: String },
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn dependency(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Dependency {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Dependency { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DraftError> for AppError {
    fn from(error: DraftError) -> Self {
        let message = error.to_string();
        match error {
            DraftError::RoomCountExceeded { .. }
            | DraftError::RoomNotSelectable(_)
            | DraftError::RoomAlreadySelected(_) => Self::Conflict(message),
            DraftError::OccupancyExceeded { .. } => Self::UnprocessableEntity(message),
            DraftError::AvailabilityNotLoaded => Self::Internal(message),
            _ => Self::BadRequest(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Dependency { message, detail } => {
                tracing::error!(error = %detail, "{message}");
                json!({ "message": message, "error": detail })
            }
            Self::Internal(message) => {
                tracing::error!("{message}");
                json!({ "message": message, "error": message })
            }
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use super::AppError;

    async fn body_of(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn client_errors_carry_only_a_message() {
        let (status, body) = body_of(AppError::BadRequest("checkInDateTime is required.".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "checkInDateTime is required.");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn server_errors_carry_message_and_error() {
        let (status, body) =
            body_of(AppError::dependency("Failed to fetch rooms.", "pool timed out")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to fetch rooms.");
        assert_eq!(body["error"], "pool timed out");
    }

    #[test]
    fn draft_rejections_map_to_http_statuses() {
        use crate::services::booking_draft::DraftError;

        let over = AppError::from(DraftError::RoomCountExceeded {
            requested: 3,
            allowed: 2,
        });
        assert_eq!(over.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(DraftError::MissingArrivalSource).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(DraftError::OccupancyExceeded {
                room_number: "101".to_string(),
                occupancy: 2,
            })
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
