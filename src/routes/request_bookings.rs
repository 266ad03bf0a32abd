use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{net_paid, BookingStatus, PaymentKind, PaymentMethod},
    repository::{
        bookings::{
            get_booking, insert_booked_room, insert_booking, list_booked_rooms, list_bookings,
            list_pending_requests, BookingFilter, NewBooking,
        },
        clamp_limit,
        customers::get_customer,
        map_db_error,
        payments::{insert_payment, list_payments},
        rooms::{count_active_rooms, lock_and_find_conflicts},
    },
    routes::bookings::begin_check_in,
    schemas::{
        validate_input, BookingPath, CreateRequestBookingInput, RequestAvailabilityQuery,
        RequestBookingsQuery,
    },
    services::{
        availability::{PendingRequest, RoomStatus},
        availability_query::summary_on,
        booking_draft::{
            stay_nights, BookingDraft, DraftAction, DraftError, SubmittedRoom, MAX_STAY_NIGHTS,
        },
        local_time::{local_day_bounds, parse_date, parse_requested_moment},
        pricing::per_room_total,
    },
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/request-bookings",
            axum::routing::get(list_request_bookings).post(create_request_booking),
        )
        .route(
            "/request-bookings/availability",
            axum::routing::get(request_booking_availability),
        )
        .route(
            "/request-bookings/{booking_id}/draft",
            axum::routing::get(request_booking_draft),
        )
}

async fn list_request_bookings(
    State(state): State<AppState>,
    Query(query): Query<RequestBookingsQuery>,
) -> AppResult<Json<Value>> {
    let status = match query.status.as_deref() {
        Some(raw) => BookingStatus::parse(raw)?,
        None => BookingStatus::Advance,
    };
    let filter = BookingFilter {
        status: Some(status),
        ..BookingFilter::default()
    };
    let rows = list_bookings(
        state.db_pool()?,
        &filter,
        clamp_limit(Some(query.limit), 100),
        0,
    )
    .await?;
    Ok(Json(json!({ "data": rows })))
}

async fn create_request_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateRequestBookingInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let check_in = parse_requested_moment(Some(&payload.check_in_date_time), "checkInDateTime")?;
    let check_out =
        parse_requested_moment(Some(&payload.check_out_date_time), "checkOutDateTime")?;
    if check_out <= check_in {
        return Err(AppError::BadRequest(
            "checkOutDateTime must be after checkInDateTime.".to_string(),
        ));
    }

    let requested = usize::try_from(payload.requested_rooms).unwrap_or(0);
    if payload.room_ids.len() > requested {
        return Err(AppError::BadRequest(format!(
            "{} room(s) assigned but only {requested} requested.",
            payload.room_ids.len()
        )));
    }
    for (position, room_id) in payload.room_ids.iter().enumerate() {
        if payload.room_ids[..position].contains(room_id) {
            return Err(DraftError::RoomAlreadySelected(*room_id).into());
        }
    }

    let advance_amount = payload.advance_amount.unwrap_or(0.0);
    let advance_method = if advance_amount > 0.0 {
        let method = payload
            .payment_method
            .as_deref()
            .map(PaymentMethod::parse)
            .transpose()?
            .ok_or(DraftError::MissingPaymentMethod)?;
        let has_reference = payload
            .transaction_id
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty());
        if method.requires_reference() && !has_reference {
            return Err(DraftError::MissingTransactionReference.into());
        }
        Some(method)
    } else {
        None
    };
    let tax_percent = payload
        .tax_percent
        .unwrap_or(state.config.default_tax_percent);

    let mut tx = state.db_pool()?.begin().await.map_err(map_db_error)?;
    let customer = get_customer(&mut tx, payload.customer_id).await?;
    let summary = summary_on(&mut tx, &state.config, check_in, None).await?;
    if requested > summary.selectable_room_count {
        return Err(DraftError::RoomCountExceeded {
            requested,
            allowed: summary.selectable_room_count,
        }
        .into());
    }

    let nights = stay_nights(check_in, check_out);
    if nights > MAX_STAY_NIGHTS {
        return Err(DraftError::InvalidStay.into());
    }
    let mut assigned = Vec::with_capacity(payload.room_ids.len());
    for room_id in &payload.room_ids {
        let candidate = summary
            .rooms
            .iter()
            .find(|entry| entry.room.id == *room_id && entry.status == RoomStatus::Available)
            .ok_or(DraftError::RoomNotSelectable(*room_id))?;
        assigned.push(SubmittedRoom {
            room_id: *room_id,
            is_ac: payload.is_ac,
            extra_bed: false,
            adults: 1,
            children: 0,
            booked_price: per_room_total(
                &candidate.room,
                payload.is_online,
                payload.is_ac,
                false,
                candidate.extra_bed_price,
                nights,
            ),
            occupant: None,
        });
    }
    if !payload.room_ids.is_empty() {
        let conflicts =
            lock_and_find_conflicts(&mut tx, &payload.room_ids, check_in, check_out, None).await?;
        if !conflicts.is_empty() {
            return Err(AppError::Conflict(format!(
                "Room(s) {} are no longer available for the requested stay.",
                conflicts.join(", ")
            )));
        }
    }

    let booking = insert_booking(
        &mut tx,
        &NewBooking {
            customer_id: customer.id,
            status: BookingStatus::Advance,
            arrival_from: payload.arrival_from.trim(),
            check_in,
            check_out,
            is_online: payload.is_online,
            include_tax: payload.include_tax,
            tax_percent,
            requested_rooms: payload.requested_rooms,
            notes: payload.notes.as_deref(),
        },
    )
    .await?;
    for room in &assigned {
        insert_booked_room(&mut tx, booking.id, check_in, check_out, room).await?;
    }
    if let Some(method) = advance_method {
        insert_payment(
            &mut tx,
            booking.id,
            advance_amount,
            method,
            payload.transaction_id.as_deref().map(str::trim),
            PaymentKind::Advance,
        )
        .await?;
    }
    tx.commit().await.map_err(map_db_error)?;

    tracing::info!(
        booking_id = booking.id,
        requested_rooms = payload.requested_rooms,
        assigned_rooms = assigned.len(),
        advance = advance_amount,
        "Request booking created"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Request booking created.",
            "bookingId": booking.id,
        })),
    ))
}

/// Other pending requests on a local calendar day, shaped for the
/// request-booking form.
fn request_overview(
    total_rooms: i64,
    pending: &[PendingRequest],
    exclude_booking_id: Option<i64>,
) -> Value {
    let bookings = pending
        .iter()
        .filter(|request| Some(request.booking_id) != exclude_booking_id)
        .map(|request| {
            json!({
                "bookingId": request.booking_id,
                "customerName": request.customer_name,
                "checkIn": request.check_in,
                "checkOut": request.check_out,
                "requestedRooms": request.requested_rooms,
                "roomNumbers": request
                    .assigned_rooms
                    .iter()
                    .map(|room| room.room_number.as_str())
                    .collect::<Vec<_>>(),
                "roomCount": request.rooms_consumed(),
            })
        })
        .collect::<Vec<_>>();
    json!({ "totalRooms": total_rooms, "bookings": bookings })
}

async fn request_booking_availability(
    State(state): State<AppState>,
    Query(query): Query<RequestAvailabilityQuery>,
) -> AppResult<Json<Value>> {
    let date = parse_date(query.date.as_deref(), "date")?;
    let (start, end) = local_day_bounds(date, state.config.property_timezone);

    let mut conn = state.db_pool()?.acquire().await.map_err(map_db_error)?;
    let total_rooms = count_active_rooms(&mut conn).await?;
    let pending = list_pending_requests(&mut conn, start, end).await?;
    Ok(Json(request_overview(total_rooms, &pending, query.exclude)))
}

/// Prefilled draft for turning a request booking into a confirmed stay.
async fn request_booking_draft(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
) -> AppResult<Json<Value>> {
    let mut conn = state.db_pool()?.acquire().await.map_err(map_db_error)?;
    let request = get_booking(&mut conn, path.booking_id).await?;
    if request.status()? != BookingStatus::Advance {
        return Err(AppError::UnprocessableEntity(format!(
            "Booking {} is not a pending request booking.",
            request.id
        )));
    }
    let customer = get_customer(&mut conn, request.customer_id).await?;
    let preferred = list_booked_rooms(&mut conn, request.id)
        .await?
        .into_iter()
        .map(|room| room.room_id)
        .collect::<Vec<_>>();
    let advance_paid = net_paid(&list_payments(&mut conn, request.id).await?);

    let mut draft = BookingDraft::from_request(
        &request,
        &customer,
        preferred,
        advance_paid,
        state.config.default_tax_percent,
    );
    let generation = begin_check_in(&mut draft, request.check_in)?;
    let summary = summary_on(&mut conn, &state.config, request.check_in, Some(request.id)).await?;
    draft.apply(DraftAction::ApplyAvailability {
        generation,
        summary,
    })?;

    Ok(Json(json!({
        "draft": draft,
        "availability": draft.availability(),
        "totals": draft.totals(),
    })))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::request_overview;
    use crate::services::availability::{AssignedRoom, PendingRequest};

    fn pending(booking_id: i64, requested_rooms: i32, assigned: &[&str]) -> PendingRequest {
        let check_in = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        PendingRequest {
            booking_id,
            customer_name: format!("Guest {booking_id}"),
            check_in,
            check_out: check_in + Duration::days(2),
            requested_rooms,
            assigned_rooms: assigned
                .iter()
                .enumerate()
                .map(|(index, number)| AssignedRoom {
                    room_id: index as i64 + 1,
                    room_number: (*number).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn overview_lists_other_requests_with_room_counts() {
        let requests = vec![pending(1, 3, &["101"]), pending(2, 1, &[])];
        let overview = request_overview(10, &requests, Some(2));
        assert_eq!(overview["totalRooms"], 10);
        let bookings = overview["bookings"].as_array().unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0]["bookingId"], 1);
        assert_eq!(bookings[0]["roomCount"], 3);
        assert_eq!(bookings[0]["roomNumbers"][0], "101");
    }
}
