use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::{BookedRoom, Booking, BookingStatus},
    repository::map_db_error,
    services::{
        availability::{AssignedRoom, PendingRequest},
        booking_draft::{BookingSubmission, OccupantDetails, SubmittedRoom},
    },
};

const BOOKING_COLUMNS: &str = "id, customer_id, booking_status, arrival_from, check_in, check_out,
     is_online, include_tax, tax_percent, requested_rooms, notes, created_at, updated_at";

const BOOKED_ROOM_COLUMNS: &str = "br.id, br.booking_id, br.room_id, r.room_number,
     rt.name AS room_name, br.check_in, br.check_out, br.is_checked_out, br.adults,
     br.children, br.extra_beds, br.is_ac, br.booked_price";

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub customer_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn get_booking(conn: &mut PgConnection, booking_id: i64) -> Result<Booking, AppError> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
    ))
    .bind(booking_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| AppError::NotFound(format!("Booking {booking_id} not found.")))
}

/// Same as `get_booking` but takes a row lock for a status change.
pub async fn get_booking_for_update(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<Booking, AppError> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(booking_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| AppError::NotFound(format!("Booking {booking_id} not found.")))
}

pub async fn list_bookings(
    pool: &PgPool,
    filter: &BookingFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Booking>, AppError> {
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1=1"
    ));
    if let Some(status) = filter.status {
        query.push(" AND booking_status = ").push_bind(status.code());
    }
    if let Some(customer_id) = filter.customer_id {
        query.push(" AND customer_id = ").push_bind(customer_id);
    }
    if let Some(from) = filter.from {
        query.push(" AND check_out > ").push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND check_in < ").push_bind(to);
    }
    query
        .push(" ORDER BY check_in DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset.max(0));

    query
        .build_query_as::<Booking>()
        .fetch_all(pool)
        .await
        .map_err(map_db_error)
}

pub async fn list_booked_rooms(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<Vec<BookedRoom>, AppError> {
    sqlx::query_as::<_, BookedRoom>(&format!(
        "SELECT {BOOKED_ROOM_COLUMNS}
         FROM booked_rooms br
         JOIN rooms r ON r.id = br.room_id
         JOIN room_types rt ON rt.id = r.room_type_id
         WHERE br.booking_id = $1
         ORDER BY br.id"
    ))
    .bind(booking_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)
}

pub async fn update_status(
    conn: &mut PgConnection,
    booking_id: i64,
    status: BookingStatus,
) -> Result<Booking, AppError> {
    sqlx::query_as::<_, Booking>(&format!(
        "UPDATE bookings SET booking_status = $2, updated_at = now()
         WHERE id = $1
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(booking_id)
    .bind(status.code())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| AppError::NotFound(format!("Booking {booking_id} not found.")))
}

pub async fn check_out_all_rooms(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE booked_rooms SET is_checked_out = TRUE
         WHERE booking_id = $1 AND is_checked_out = FALSE",
    )
    .bind(booking_id)
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?;
    Ok(result.rows_affected())
}

/// Flags one booked room as checked out; returns its booking id and whether
/// any room of that booking is still occupied.
pub async fn check_out_room(
    conn: &mut PgConnection,
    booked_room_id: i64,
) -> Result<(i64, bool), AppError> {
    let booking_id = sqlx::query_scalar::<_, i64>(
        "UPDATE booked_rooms SET is_checked_out = TRUE WHERE id = $1 RETURNING booking_id",
    )
    .bind(booked_room_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| AppError::NotFound(format!("Booked room {booked_room_id} not found.")))?;

    let still_occupied = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM booked_rooms WHERE booking_id = $1 AND is_checked_out = FALSE
         )",
    )
    .bind(booking_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)?;

    Ok((booking_id, still_occupied))
}

/// Header row of a booking; booked rooms are inserted separately.
#[derive(Debug, Clone)]
pub struct NewBooking<'a> {
    pub customer_id: i64,
    pub status: BookingStatus,
    pub arrival_from: &'a str,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub is_online: bool,
    pub include_tax: bool,
    pub tax_percent: f64,
    pub requested_rooms: i32,
    pub notes: Option<&'a str>,
}

impl<'a> NewBooking<'a> {
    pub fn checked_in(submission: &'a BookingSubmission) -> Self {
        Self {
            customer_id: submission.customer_id,
            status: BookingStatus::Checkin,
            arrival_from: &submission.arrival_from,
            check_in: submission.check_in,
            check_out: submission.check_out,
            is_online: submission.is_online,
            include_tax: submission.include_tax,
            tax_percent: submission.tax_percent,
            requested_rooms: room_count(submission),
            notes: None,
        }
    }
}

fn room_count(submission: &BookingSubmission) -> i32 {
    i32::try_from(submission.rooms.len()).unwrap_or(i32::MAX)
}

pub async fn insert_booking(
    conn: &mut PgConnection,
    booking: &NewBooking<'_>,
) -> Result<Booking, AppError> {
    sqlx::query_as::<_, Booking>(&format!(
        "INSERT INTO bookings (customer_id, booking_status, arrival_from, check_in, check_out,
                               is_online, include_tax, tax_percent, requested_rooms, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(booking.customer_id)
    .bind(booking.status.code())
    .bind(booking.arrival_from)
    .bind(booking.check_in)
    .bind(booking.check_out)
    .bind(booking.is_online)
    .bind(booking.include_tax)
    .bind(booking.tax_percent)
    .bind(booking.requested_rooms)
    .bind(booking.notes)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)
}

/// Turns a request booking into a confirmed stay, replacing its rooms.
pub async fn convert_request(
    conn: &mut PgConnection,
    request_id: i64,
    submission: &BookingSubmission,
) -> Result<Booking, AppError> {
    sqlx::query("DELETE FROM booked_rooms WHERE booking_id = $1")
        .bind(request_id)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    sqlx::query_as::<_, Booking>(&format!(
        "UPDATE bookings
         SET customer_id = $10, booking_status = $2, arrival_from = $3, check_in = $4,
             check_out = $5, is_online = $6, include_tax = $7, tax_percent = $8,
             requested_rooms = $9, updated_at = now()
         WHERE id = $1
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(request_id)
    .bind(BookingStatus::Checkin.code())
    .bind(&submission.arrival_from)
    .bind(submission.check_in)
    .bind(submission.check_out)
    .bind(submission.is_online)
    .bind(submission.include_tax)
    .bind(submission.tax_percent)
    .bind(room_count(submission))
    .bind(submission.customer_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| AppError::NotFound(format!("Booking {request_id} not found.")))
}

pub async fn insert_booked_room(
    conn: &mut PgConnection,
    booking_id: i64,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    room: &SubmittedRoom,
) -> Result<i64, AppError> {
    let booked_room_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO booked_rooms (booking_id, room_id, check_in, check_out, adults, children,
                                   extra_beds, is_ac, booked_price)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id",
    )
    .bind(booking_id)
    .bind(room.room_id)
    .bind(check_in)
    .bind(check_out)
    .bind(i32::try_from(room.adults).unwrap_or(i32::MAX))
    .bind(i32::try_from(room.children).unwrap_or(i32::MAX))
    .bind(room.extra_bed)
    .bind(room.is_ac)
    .bind(room.booked_price)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)?;

    if let Some(occupant) = &room.occupant {
        insert_occupant(conn, booked_room_id, occupant).await?;
    }
    Ok(booked_room_id)
}

async fn insert_occupant(
    conn: &mut PgConnection,
    booked_room_id: i64,
    occupant: &OccupantDetails,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO occupancy_details (booked_room_id, name, phone, id_number, photo_path)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(booked_room_id)
    .bind(occupant.name.as_deref())
    .bind(occupant.phone.as_deref())
    .bind(occupant.id_number.as_deref())
    .bind(occupant.photo.as_deref())
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct PendingRow {
    id: i64,
    customer_name: String,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    requested_rooms: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct AssignedRow {
    booking_id: i64,
    room_id: i64,
    room_number: String,
}

/// Request bookings (status Advance) whose stay overlaps `[start, end)`.
pub async fn list_pending_requests(
    conn: &mut PgConnection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<PendingRequest>, AppError> {
    let rows = sqlx::query_as::<_, PendingRow>(
        "SELECT b.id, c.name AS customer_name, b.check_in, b.check_out, b.requested_rooms
         FROM bookings b
         JOIN customers c ON c.id = b.customer_id
         WHERE b.booking_status = $1 AND b.check_in < $3 AND b.check_out > $2
         ORDER BY b.check_in, b.id",
    )
    .bind(BookingStatus::Advance.code())
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
    let assigned = sqlx::query_as::<_, AssignedRow>(
        "SELECT br.booking_id, br.room_id, r.room_number
         FROM booked_rooms br
         JOIN rooms r ON r.id = br.room_id
         WHERE br.booking_id = ANY($1)
         ORDER BY br.id",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)?;

    let mut by_booking: HashMap<i64, Vec<AssignedRoom>> = HashMap::new();
    for row in assigned {
        by_booking.entry(row.booking_id).or_default().push(AssignedRoom {
            room_id: row.room_id,
            room_number: row.room_number,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| PendingRequest {
            booking_id: row.id,
            customer_name: row.customer_name,
            check_in: row.check_in,
            check_out: row.check_out,
            requested_rooms: row.requested_rooms,
            assigned_rooms: by_booking.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::NewBooking;
    use crate::{
        models::BookingStatus,
        services::{
            booking_draft::{BookingSubmission, SubmittedRoom},
            pricing::Totals,
        },
    };

    #[test]
    fn confirmed_booking_header_comes_from_the_submission() {
        let check_in = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let line = SubmittedRoom {
            room_id: 4,
            is_ac: true,
            extra_bed: false,
            adults: 2,
            children: 0,
            booked_price: 2000.0,
            occupant: None,
        };
        let submission = BookingSubmission {
            check_in,
            check_out: check_in + Duration::days(2),
            customer_id: 11,
            arrival_from: "Walk-in".to_string(),
            is_online: false,
            include_tax: true,
            tax_percent: 12.0,
            rooms: vec![line.clone(), SubmittedRoom { room_id: 5, ..line }],
            advance: None,
            request_booking_id: None,
            totals: Totals::compute(&[2000.0, 2000.0], 12.0, true, 0.0),
            balance_due: 4480.0,
        };

        let header = NewBooking::checked_in(&submission);
        assert_eq!(header.status, BookingStatus::Checkin);
        assert_eq!(header.customer_id, 11);
        assert_eq!(header.requested_rooms, 2);
        assert_eq!(header.arrival_from, "Walk-in");
        assert!(header.notes.is_none());
    }
}
