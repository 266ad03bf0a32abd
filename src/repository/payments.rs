use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::{
    error::AppError,
    models::{Payment, PaymentKind, PaymentMethod},
    repository::map_db_error,
};

const PAYMENT_COLUMNS: &str = "id, booking_id, amount, method, transaction_id, kind, created_at";

pub async fn list_payments(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<Vec<Payment>, AppError> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = $1 ORDER BY created_at, id"
    ))
    .bind(booking_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)
}

pub async fn insert_payment(
    conn: &mut PgConnection,
    booking_id: i64,
    amount: f64,
    method: PaymentMethod,
    transaction_id: Option<&str>,
    kind: PaymentKind,
) -> Result<Payment, AppError> {
    sqlx::query_as::<_, Payment>(&format!(
        "INSERT INTO payments (booking_id, amount, method, transaction_id, kind)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {PAYMENT_COLUMNS}"
    ))
    .bind(booking_id)
    .bind(amount)
    .bind(method.as_str())
    .bind(transaction_id)
    .bind(kind.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, sqlx::FromRow)]
pub struct CollectedTotals {
    pub collected: f64,
    pub refunded: f64,
}

/// Money received and refunded in `[from, to)`.
pub async fn collected_between(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<CollectedTotals, AppError> {
    sqlx::query_as::<_, CollectedTotals>(
        "SELECT
             COALESCE(SUM(amount) FILTER (WHERE kind <> 'refund'), 0)::float8 AS collected,
             COALESCE(SUM(amount) FILTER (WHERE kind = 'refund'), 0)::float8 AS refunded
         FROM payments
         WHERE created_at >= $1 AND created_at < $2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}
