use std::collections::HashMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgConnection, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{net_paid, round_money, Booking, BookingStatus, Customer, PaymentKind, PaymentMethod},
    repository::{
        bookings::{
            check_out_all_rooms, check_out_room, convert_request, get_booking,
            get_booking_for_update, insert_booked_room, insert_booking, list_booked_rooms,
            list_bookings, update_status, BookingFilter, NewBooking,
        },
        clamp_limit,
        customers::{create_customer, get_customer, NewCustomer},
        map_db_error,
        payments::{insert_payment, list_payments},
        rooms::lock_and_find_conflicts,
    },
    schemas::{
        validate_input, BookedRoomPath, BookingPath, BookingsQuery, InvoiceQuery,
        RecordPaymentInput, RefundInput, UpdateStatusInput,
    },
    services::{
        availability_query::summary_on,
        booking_draft::{
            AdvancePayment, BookingDraft, BookingSubmission, CustomerRef, DraftAction, DraftError,
            DraftOutcome, LinkedRequest, OccupantDetails,
        },
        invoice::{render_bounded, Invoice},
        local_time::parse_requested_moment,
        photos::{discard_photos, stage_photo, store_photos},
    },
    state::{AppState, StoredResponse},
};

const IDEMPOTENCY_KEY: &str = "idempotency-key";

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/bookings",
            axum::routing::get(list_bookings_handler).post(create_booking),
        )
        .route("/bookings/{booking_id}", axum::routing::get(get_booking_handler))
        .route(
            "/bookings/{booking_id}/status",
            axum::routing::patch(update_booking_status),
        )
        .route(
            "/bookings/{booking_id}/refund",
            axum::routing::post(refund_booking),
        )
        .route(
            "/bookings/{booking_id}/payments",
            axum::routing::post(record_payment),
        )
        .route(
            "/bookings/{booking_id}/invoice",
            axum::routing::get(booking_invoice),
        )
        .route(
            "/booked-rooms/{booked_room_id}/checkout",
            axum::routing::patch(check_out_booked_room),
        )
}

struct UploadedPhoto {
    file_name: Option<String>,
    bytes: Bytes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OccupantInput {
    name: Option<String>,
    phone: Option<String>,
    id_number: Option<String>,
}

/// Multipart booking form. Array fields may arrive as repeated parts
/// (`roomIds[]`), one comma-separated part, or a JSON array.
#[derive(Default)]
struct BookingForm {
    fields: HashMap<String, Vec<String>>,
    photos: HashMap<usize, UploadedPhoto>,
}

impl BookingForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().trim().to_string();
            if let Some(raw_index) = name.strip_prefix("photo_") {
                let index = raw_index.parse::<usize>().map_err(|_| {
                    AppError::BadRequest(format!("Invalid photo field '{name}'."))
                })?;
                let file_name = field.file_name().map(ToOwned::to_owned);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !bytes.is_empty() {
                    form.photos.insert(index, UploadedPhoto { file_name, bytes });
                }
                continue;
            }

            let key = name.trim_end_matches("[]").to_string();
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.entry(key).or_default().push(value);
        }
        Ok(form)
    }

    #[cfg(test)]
    fn from_fields(fields: &[(&str, &str)]) -> Self {
        let mut form = Self::default();
        for (key, value) in fields {
            form.fields
                .entry(key.trim_end_matches("[]").to_string())
                .or_default()
                .push((*value).to_string());
        }
        form
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|values| values.last())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn list(&self, key: &str) -> Vec<String> {
        let Some(values) = self.fields.get(key) else {
            return Vec::new();
        };
        if let [single] = values.as_slice() {
            let trimmed = single.trim();
            if trimmed.starts_with('[') {
                if let Ok(items) = serde_json::from_str::<Vec<Value>>(trimmed) {
                    return items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(text) => text,
                            other => other.to_string(),
                        })
                        .collect();
                }
            }
            return trimmed.split(',').map(|item| item.trim().to_string()).collect();
        }
        values.iter().map(|value| value.trim().to_string()).collect()
    }

    fn flag(&self, key: &str) -> bool {
        self.text(key).is_some_and(parse_flag)
    }

    fn flag_at(&self, key: &str, index: usize, default: bool) -> bool {
        self.list(key)
            .get(index)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map_or(default, parse_flag)
    }

    fn number<T: std::str::FromStr>(&self, key: &str) -> AppResult<Option<T>> {
        self.text(key).map(|raw| parse_number(raw, key)).transpose()
    }

    fn number_at<T: std::str::FromStr>(&self, key: &str, index: usize) -> AppResult<Option<T>> {
        self.list(key)
            .get(index)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|raw| parse_number(raw, key))
            .transpose()
    }

    fn room_ids(&self) -> AppResult<Vec<i64>> {
        let mut ids = Vec::new();
        for raw in self.list("roomIds") {
            if raw.is_empty() {
                continue;
            }
            let id = parse_number::<i64>(&raw, "roomIds")?;
            if ids.contains(&id) {
                return Err(DraftError::RoomAlreadySelected(id).into());
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn occupants(&self) -> AppResult<Vec<Option<OccupantInput>>> {
        match self.text("occupants") {
            Some(raw) => serde_json::from_str(raw).map_err(|error| {
                AppError::BadRequest(format!("occupants must be a JSON array: {error}"))
            }),
            None => Ok(Vec::new()),
        }
    }
}

fn multipart_error(error: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {error}"))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_number<T: std::str::FromStr>(raw: &str, key: &str) -> AppResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::BadRequest(format!("{key} has an invalid value '{raw}'.")))
}

/// Starts a new availability generation for `moment`.
pub(crate) fn begin_check_in(draft: &mut BookingDraft, moment: DateTime<Utc>) -> AppResult<u64> {
    match draft.apply(DraftAction::SetCheckIn(moment))? {
        DraftOutcome::AwaitingAvailability(generation) => Ok(generation),
        other => Err(AppError::Internal(format!(
            "Unexpected draft outcome {other:?} after a check-in change."
        ))),
    }
}

fn reject_clamp(outcome: DraftOutcome) -> AppResult<()> {
    match outcome {
        DraftOutcome::Clamped(error) => Err(AppError::UnprocessableEntity(error.message)),
        _ => Ok(()),
    }
}

/// A pending request booking, locked for conversion, with what was paid on it.
async fn load_linked_request(
    conn: &mut PgConnection,
    request_id: i64,
) -> AppResult<(Booking, f64)> {
    let request = get_booking_for_update(conn, request_id).await?;
    if request.status()? != BookingStatus::Advance {
        return Err(AppError::UnprocessableEntity(format!(
            "Booking {request_id} is not a pending request booking."
        )));
    }
    let paid = net_paid(&list_payments(conn, request_id).await?);
    Ok((request, paid))
}

async fn resolve_customer(
    conn: &mut PgConnection,
    form: &BookingForm,
    linked: Option<&Booking>,
) -> AppResult<Customer> {
    if let Some(customer_id) = form.number::<i64>("customerId")? {
        return get_customer(conn, customer_id).await;
    }
    if let Some(request) = linked {
        return get_customer(conn, request.customer_id).await;
    }
    match (form.text("customerName"), form.text("customerPhone")) {
        (Some(name), Some(phone)) => {
            let customer = create_customer(
                conn,
                &NewCustomer {
                    name: name.to_string(),
                    phone: phone.to_string(),
                    email: None,
                    address: None,
                    id_number: None,
                },
            )
            .await?;
            tracing::info!(customer_id = customer.id, "Customer created with booking");
            Ok(customer)
        }
        _ => Err(DraftError::IncompleteCustomer.into()),
    }
}

async fn create_booking(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = BookingForm::read(multipart).await?;
    let check_in = parse_requested_moment(form.text("checkInDateTime"), "checkInDateTime")?;
    let nights = form.number::<u32>("stay")?.unwrap_or(1);
    let request_booking_id = form.number::<i64>("requestBookingId")?;
    let room_ids = form.room_ids()?;
    let occupants = form.occupants()?;

    let pool = state.db_pool()?;
    let mut tx = pool.begin().await.map_err(map_db_error)?;

    let linked = match request_booking_id {
        Some(request_id) => Some(load_linked_request(&mut tx, request_id).await?),
        None => None,
    };
    let customer =
        resolve_customer(&mut tx, &form, linked.as_ref().map(|(request, _)| request)).await?;
    let summary = summary_on(&mut tx, &state.config, check_in, request_booking_id).await?;

    let mut draft = BookingDraft::new(state.config.default_tax_percent);
    let generation = begin_check_in(&mut draft, check_in)?;
    if let Some((request, advance_paid)) = &linked {
        draft.apply(DraftAction::LinkRequest(LinkedRequest {
            booking_id: request.id,
            advance_paid: *advance_paid,
            preferred_room_ids: Vec::new(),
        }))?;
    }
    draft.apply(DraftAction::ApplyAvailability {
        generation,
        summary,
    })?;
    draft.apply(DraftAction::SetStay(nights))?;
    draft.apply(DraftAction::SetOnline(form.flag("isOnline")))?;
    draft.apply(DraftAction::SetTax {
        include: form.flag("includeTax"),
        percent: form
            .number::<f64>("taxPercent")?
            .unwrap_or(state.config.default_tax_percent),
    })?;
    draft.apply(DraftAction::SetCustomer(CustomerRef {
        id: Some(customer.id),
        name: customer.name.clone(),
        phone: customer.phone.clone(),
    }))?;
    draft.apply(DraftAction::SetArrivalFrom(
        form.text("arrivalFrom").unwrap_or_default().to_string(),
    ))?;
    draft.apply(DraftAction::SetRoomCount(room_ids.len()))?;

    let mut staged_photos = Vec::new();

    for (index, room_id) in room_ids.iter().copied().enumerate() {
        draft.apply(DraftAction::SelectRoom(room_id))?;
        draft.apply(DraftAction::SetAc {
            index,
            is_ac: form.flag_at("isAcs", index, true),
        })?;
        draft.apply(DraftAction::SetExtraBed {
            index,
            extra_bed: form.flag_at("extraBeds", index, false),
        })?;
        let adults = form.number_at::<u32>("adults", index)?.unwrap_or(1);
        let children = form.number_at::<u32>("children", index)?.unwrap_or(0);
        reject_clamp(draft.apply(DraftAction::SetAdults { index, adults })?)?;
        reject_clamp(draft.apply(DraftAction::SetChildren { index, children })?)?;

        let input = occupants.get(index).cloned().flatten().unwrap_or_default();
        let mut details = OccupantDetails {
            name: input.name,
            phone: input.phone,
            id_number: input.id_number,
            photo: None,
        };
        if let Some(photo) = form.photos.get(&index) {
            let staged = stage_photo(
                &state.config.upload_dir,
                &photo.bytes,
                photo.file_name.as_deref(),
            )?;
            details.photo = Some(staged.stored_path());
            staged_photos.push(staged);
        }
        if details != OccupantDetails::default() {
            draft.apply(DraftAction::SetOccupant { index, details })?;
        }
    }

    if let Some(amount) = form.number::<f64>("advanceAmount")? {
        let method = form
            .text("paymentMethod")
            .map(PaymentMethod::parse)
            .transpose()?;
        draft.apply(DraftAction::SetAdvance(AdvancePayment {
            amount,
            method,
            transaction_id: form.text("transactionId").map(ToOwned::to_owned),
        }))?;
    }

    let submission = draft.submit()?;

    let selected = submission
        .rooms
        .iter()
        .map(|room| room.room_id)
        .collect::<Vec<_>>();
    let conflicts = lock_and_find_conflicts(
        &mut tx,
        &selected,
        submission.check_in,
        submission.check_out,
        request_booking_id,
    )
    .await?;
    if !conflicts.is_empty() {
        return Err(AppError::Conflict(format!(
            "Room(s) {} are no longer available for the selected stay.",
            conflicts.join(", ")
        )));
    }

    // Photos hit the disk only once the booking is known to be valid.
    let written_photos = store_photos(&staged_photos).await?;
    let booking = match save_submission(tx, request_booking_id, &submission).await {
        Ok(booking) => booking,
        Err(error) => {
            discard_photos(&written_photos).await;
            return Err(error);
        }
    };

    tracing::info!(
        booking_id = booking.id,
        rooms = submission.rooms.len(),
        converted_request = request_booking_id.is_some(),
        grand_total = submission.totals.grand_total,
        "Booking saved"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking saved successfully.",
            "bookingId": booking.id,
            "totals": submission.totals,
            "balanceDue": submission.balance_due,
        })),
    ))
}

/// Writes the booking header, its rooms and any advance, then commits.
async fn save_submission(
    mut tx: Transaction<'_, Postgres>,
    request_booking_id: Option<i64>,
    submission: &BookingSubmission,
) -> AppResult<Booking> {
    let booking = match request_booking_id {
        Some(request_id) => convert_request(&mut tx, request_id, submission).await?,
        None => insert_booking(&mut tx, &NewBooking::checked_in(submission)).await?,
    };
    for room in &submission.rooms {
        insert_booked_room(
            &mut tx,
            booking.id,
            submission.check_in,
            submission.check_out,
            room,
        )
        .await?;
    }
    if let Some(advance) = &submission.advance {
        let method = advance.method.ok_or(DraftError::MissingPaymentMethod)?;
        insert_payment(
            &mut tx,
            booking.id,
            advance.amount,
            method,
            advance.transaction_id.as_deref(),
            PaymentKind::Advance,
        )
        .await?;
    }
    tx.commit().await.map_err(map_db_error)?;
    Ok(booking)
}

async fn list_bookings_handler(
    State(state): State<AppState>,
    Query(query): Query<BookingsQuery>,
) -> AppResult<Json<Value>> {
    let filter = BookingFilter {
        status: query.status.as_deref().map(BookingStatus::parse).transpose()?,
        customer_id: query.customer_id,
        from: query
            .from
            .as_deref()
            .map(|raw| parse_requested_moment(Some(raw), "from"))
            .transpose()?,
        to: query
            .to
            .as_deref()
            .map(|raw| parse_requested_moment(Some(raw), "to"))
            .transpose()?,
    };
    let rows = list_bookings(
        state.db_pool()?,
        &filter,
        clamp_limit(Some(query.limit), 100),
        query.offset,
    )
    .await?;
    Ok(Json(json!({ "data": rows })))
}

async fn get_booking_handler(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
) -> AppResult<Json<Value>> {
    let mut conn = state.db_pool()?.acquire().await.map_err(map_db_error)?;
    let booking = get_booking(&mut conn, path.booking_id).await?;
    let customer = get_customer(&mut conn, booking.customer_id).await?;
    let rooms = list_booked_rooms(&mut conn, booking.id).await?;
    let payments = list_payments(&mut conn, booking.id).await?;
    let paid = net_paid(&payments);

    Ok(Json(json!({
        "booking": booking,
        "status": booking.status()?.as_str(),
        "customer": customer,
        "rooms": rooms,
        "payments": payments,
        "paid": paid,
    })))
}

async fn update_booking_status(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
    Json(payload): Json<UpdateStatusInput>,
) -> AppResult<Json<Value>> {
    let next = BookingStatus::parse(&payload.status)?;
    let mut tx = state.db_pool()?.begin().await.map_err(map_db_error)?;
    let booking = get_booking_for_update(&mut tx, path.booking_id).await?;
    let current = booking.status()?;
    if !current.can_transition_to(next) {
        return Err(AppError::UnprocessableEntity(format!(
            "Cannot change booking status from {} to {}.",
            current.as_str(),
            next.as_str()
        )));
    }

    let updated = update_status(&mut tx, booking.id, next).await?;
    let rooms_checked_out = if next == BookingStatus::Checkout {
        check_out_all_rooms(&mut tx, booking.id).await?
    } else {
        0
    };
    tx.commit().await.map_err(map_db_error)?;

    tracing::info!(
        booking_id = booking.id,
        from = current.as_str(),
        to = next.as_str(),
        rooms_checked_out,
        "Booking status changed"
    );
    Ok(Json(json!({
        "message": format!("Booking marked as {}.", next.as_str()),
        "booking": updated,
    })))
}

async fn refund_booking(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
    headers: HeaderMap,
    Json(payload): Json<RefundInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| format!("refund:{}:{value}", path.booking_id));

    let (status, body) = match idempotency_key {
        Some(key) => {
            if state.idempotency_cache.contains_key(&key) {
                tracing::info!(
                    booking_id = path.booking_id,
                    "Replaying refund for repeated idempotency key"
                );
            }
            state
                .idempotency_cache
                .try_get_with(key, process_refund(&state, path.booking_id, &payload))
                .await
                .map_err(|error| (*error).clone())?
        }
        None => process_refund(&state, path.booking_id, &payload).await?,
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    Ok((status, Json(body)))
}

async fn process_refund(
    state: &AppState,
    booking_id: i64,
    payload: &RefundInput,
) -> AppResult<StoredResponse> {
    let method = PaymentMethod::parse(&payload.method)?;
    let reference = payload
        .transaction_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if method.requires_reference() && reference.is_none() {
        return Err(AppError::BadRequest(
            "A transaction reference is required for non-cash refunds.".to_string(),
        ));
    }

    let mut tx = state.db_pool()?.begin().await.map_err(map_db_error)?;
    let booking = get_booking_for_update(&mut tx, booking_id).await?;
    if booking.status()? != BookingStatus::Cancelled {
        return Err(AppError::UnprocessableEntity(
            "Only cancelled bookings can be refunded.".to_string(),
        ));
    }

    let refundable = net_paid(&list_payments(&mut tx, booking_id).await?);
    if refundable <= 0.0 {
        return Err(AppError::BadRequest(
            "Booking has no paid amount to refund.".to_string(),
        ));
    }
    let amount = round_money(payload.amount.unwrap_or(refundable));
    if amount > refundable {
        return Err(AppError::BadRequest(format!(
            "Refund of {amount:.2} exceeds the refundable {refundable:.2}."
        )));
    }

    let refund = insert_payment(
        &mut tx,
        booking_id,
        amount,
        method,
        reference,
        PaymentKind::Refund,
    )
    .await?;
    tx.commit().await.map_err(map_db_error)?;

    tracing::info!(booking_id, amount, method = method.as_str(), "Refund recorded");
    Ok((
        StatusCode::CREATED.as_u16(),
        json!({
            "message": "Refund recorded.",
            "refund": refund,
            "remainingRefundable": round_money(refundable - amount),
        }),
    ))
}

fn parse_payment_kind(raw: Option<&str>) -> AppResult<PaymentKind> {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("payment") => Ok(PaymentKind::Payment),
        Some("advance") => Ok(PaymentKind::Advance),
        Some(other) => Err(AppError::BadRequest(format!(
            "Unsupported payment kind '{other}'. Refunds have their own endpoint."
        ))),
    }
}

async fn record_payment(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
    Json(payload): Json<RecordPaymentInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let method = PaymentMethod::parse(&payload.method)?;
    let kind = parse_payment_kind(payload.kind.as_deref())?;
    let reference = payload
        .transaction_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if method.requires_reference() && reference.is_none() {
        return Err(DraftError::MissingTransactionReference.into());
    }

    let mut tx = state.db_pool()?.begin().await.map_err(map_db_error)?;
    let booking = get_booking_for_update(&mut tx, path.booking_id).await?;
    if booking.status()? == BookingStatus::Cancelled {
        return Err(AppError::UnprocessableEntity(
            "Payments cannot be recorded on a cancelled booking.".to_string(),
        ));
    }
    let payment = insert_payment(
        &mut tx,
        booking.id,
        round_money(payload.amount),
        method,
        reference,
        kind,
    )
    .await?;
    tx.commit().await.map_err(map_db_error)?;

    tracing::info!(
        booking_id = booking.id,
        amount = payment.amount,
        kind = kind.as_str(),
        "Payment recorded"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Payment recorded.", "payment": payment })),
    ))
}

async fn booking_invoice(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Response> {
    let mut conn = state.db_pool()?.acquire().await.map_err(map_db_error)?;
    let booking = get_booking(&mut conn, path.booking_id).await?;
    let customer = get_customer(&mut conn, booking.customer_id).await?;
    let rooms = list_booked_rooms(&mut conn, booking.id).await?;
    let payments = list_payments(&mut conn, booking.id).await?;
    drop(conn);

    let invoice = Invoice::build(
        &booking,
        &customer,
        &rooms,
        &payments,
        state.config.property_timezone,
    )?;

    match query.format.as_deref().map(str::trim) {
        Some("text") => {
            let text = render_bounded(
                invoice,
                Duration::from_secs(state.config.invoice_render_timeout_seconds),
            )
            .await?;
            Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
        }
        None | Some("") | Some("json") => Ok(Json(invoice).into_response()),
        Some(other) => Err(AppError::BadRequest(format!(
            "Unsupported invoice format '{other}'."
        ))),
    }
}

async fn check_out_booked_room(
    State(state): State<AppState>,
    Path(path): Path<BookedRoomPath>,
) -> AppResult<Json<Value>> {
    let mut tx = state.db_pool()?.begin().await.map_err(map_db_error)?;
    let (booking_id, still_occupied) = check_out_room(&mut tx, path.booked_room_id).await?;

    let mut booking_checked_out = false;
    if !still_occupied {
        let booking = get_booking_for_update(&mut tx, booking_id).await?;
        if booking.status()? == BookingStatus::Checkin {
            update_status(&mut tx, booking_id, BookingStatus::Checkout).await?;
            booking_checked_out = true;
        }
    }
    tx.commit().await.map_err(map_db_error)?;

    tracing::info!(
        booked_room_id = path.booked_room_id,
        booking_id,
        booking_checked_out,
        "Room checked out"
    );
    Ok(Json(json!({
        "message": "Room checked out.",
        "bookingId": booking_id,
        "bookingCheckedOut": booking_checked_out,
    })))
}
