use crate::error::AppError;

pub mod bookings;
pub mod customers;
pub mod expenses;
pub mod payments;
pub mod rooms;

pub(crate) fn map_db_error(error: sqlx::Error) -> AppError {
    let message = error.to_string();
    tracing::error!(db_error = %message, "Database query failed");

    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict(
                    "Duplicate value violates a unique constraint.".to_string(),
                )
            }
            Some("23503") => {
                return AppError::BadRequest("Referenced record does not exist.".to_string())
            }
            Some("23514") => {
                return AppError::BadRequest("Value violates a check constraint.".to_string())
            }
            _ => {}
        }
    }
    if matches!(error, sqlx::Error::RowNotFound) {
        return AppError::NotFound("Record not found.".to_string());
    }
    AppError::dependency("Database operation failed.", message)
}

pub(crate) fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, 500)
}

#[cfg(test)]
mod tests {
    use super::{clamp_limit, map_db_error};
    use crate::error::AppError;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            map_db_error(sqlx::Error::RowNotFound),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn pool_timeouts_are_dependency_failures() {
        let mapped = map_db_error(sqlx::Error::PoolTimedOut);
        assert_eq!(mapped.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None, 100), 100);
        assert_eq!(clamp_limit(Some(0), 100), 1);
        assert_eq!(clamp_limit(Some(10_000), 100), 500);
    }
}
