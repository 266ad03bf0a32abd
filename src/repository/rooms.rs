use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{
    config::CancelledBookingPolicy,
    error::AppError,
    models::{BookingStatus, Room, StayInterval},
    repository::map_db_error,
};

pub async fn list_active_rooms(conn: &mut PgConnection) -> Result<Vec<Room>, AppError> {
    sqlx::query_as::<_, Room>(
        "SELECT r.id, r.room_number, rt.name AS room_name, f.name AS floor_name,
                r.ac_price, r.non_ac_price, r.online_ac_price, r.online_non_ac_price,
                r.occupancy
         FROM rooms r
         JOIN room_types rt ON rt.id = r.room_type_id
         JOIN floors f ON f.id = r.floor_id
         WHERE r.status = TRUE
         ORDER BY f.id, r.room_number",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)
}

pub async fn count_active_rooms(conn: &mut PgConnection) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::bigint FROM rooms WHERE status = TRUE")
        .fetch_one(&mut *conn)
        .await
        .map_err(map_db_error)
}

/// Booked-room lines that either contain `moment` or start in
/// `(moment, horizon]`, earliest check-in first.
pub async fn list_stay_intervals(
    conn: &mut PgConnection,
    moment: DateTime<Utc>,
    horizon: DateTime<Utc>,
    policy: CancelledBookingPolicy,
    exclude_booking_id: Option<i64>,
) -> Result<Vec<StayInterval>, AppError> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT br.id AS booked_room_id, br.booking_id, b.booking_status, br.room_id,
                br.check_in, br.check_out, br.is_checked_out
         FROM booked_rooms br
         JOIN bookings b ON b.id = br.booking_id
         WHERE br.is_checked_out = FALSE AND ((br.check_in <= ",
    );
    query
        .push_bind(moment)
        .push(" AND br.check_out >= ")
        .push_bind(moment)
        .push(") OR (br.check_in > ")
        .push_bind(moment)
        .push(" AND br.check_in <= ")
        .push_bind(horizon)
        .push("))");

    if policy == CancelledBookingPolicy::Exclude {
        query
            .push(" AND b.booking_status <> ")
            .push_bind(BookingStatus::Cancelled.code());
    }
    if let Some(booking_id) = exclude_booking_id {
        query.push(" AND b.id <> ").push_bind(booking_id);
    }
    query.push(" ORDER BY br.check_in, br.id");

    query
        .build_query_as::<StayInterval>()
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)
}

pub async fn current_extra_bed_price(conn: &mut PgConnection) -> Result<f64, AppError> {
    let price = sqlx::query_scalar::<_, f64>(
        "SELECT price FROM extra_bed_prices ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?;
    Ok(price.unwrap_or(0.0))
}

pub async fn insert_extra_bed_price(pool: &PgPool, price: f64) -> Result<f64, AppError> {
    sqlx::query_scalar::<_, f64>("INSERT INTO extra_bed_prices (price) VALUES ($1) RETURNING price")
        .bind(price)
        .fetch_one(pool)
        .await
        .map_err(map_db_error)
}

/// Locks the given rooms for the rest of the transaction and returns the
/// numbers of those already taken by another live booking in `[check_in, check_out)`.
pub async fn lock_and_find_conflicts(
    conn: &mut PgConnection,
    room_ids: &[i64],
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    exclude_booking_id: Option<i64>,
) -> Result<Vec<String>, AppError> {
    let locked = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM rooms WHERE id = ANY($1) AND status = TRUE ORDER BY id FOR UPDATE",
    )
    .bind(room_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)?;
    if locked.len() != room_ids.len() {
        return Err(AppError::BadRequest(
            "One or more selected rooms do not exist or are inactive.".to_string(),
        ));
    }

    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT r.room_number
         FROM booked_rooms br
         JOIN bookings b ON b.id = br.booking_id
         JOIN rooms r ON r.id = br.room_id
         WHERE br.room_id = ANY($1)
           AND br.is_checked_out = FALSE
           AND b.booking_status IN (1, 2)
           AND br.check_in < $3
           AND br.check_out > $2
           AND ($4::bigint IS NULL OR b.id <> $4)
         ORDER BY r.room_number",
    )
    .bind(room_ids)
    .bind(check_in)
    .bind(check_out)
    .bind(exclude_booking_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)
}
