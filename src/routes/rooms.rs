use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    repository::{map_db_error, rooms},
    schemas::{validate_input, ExtraBedPriceInput, RoomAvailabilityQuery, RoomFilterQuery},
    services::{
        availability::{AvailabilitySummary, RoomAvailability},
        availability_query::{availability_summary, resolve_rooms},
        local_time::parse_requested_moment,
    },
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/rooms/filter", axum::routing::get(filter_rooms))
        .route("/rooms/availability", axum::routing::get(room_availability))
        .route(
            "/extra-bed-price",
            axum::routing::get(get_extra_bed_price).post(set_extra_bed_price),
        )
}

async fn filter_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomFilterQuery>,
) -> AppResult<Json<Vec<RoomAvailability>>> {
    let moment = parse_requested_moment(query.check_in_date_time.as_deref(), "checkInDateTime")?;
    Ok(Json(resolve_rooms(&state, moment).await?))
}

async fn room_availability(
    State(state): State<AppState>,
    Query(query): Query<RoomAvailabilityQuery>,
) -> AppResult<Json<AvailabilitySummary>> {
    let moment = parse_requested_moment(query.check_in_date_time.as_deref(), "checkInDateTime")?;
    let summary = availability_summary(&state, moment, query.exclude).await?;
    tracing::debug!(
        requested_moment = %moment,
        available = summary.available_count,
        reserved = summary.reserved_by_pending_request_count,
        "Computed unified availability"
    );
    Ok(Json(summary))
}

async fn get_extra_bed_price(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let mut conn = state.db_pool()?.acquire().await.map_err(map_db_error)?;
    let price = rooms::current_extra_bed_price(&mut conn).await?;
    Ok(Json(json!({ "price": price })))
}

async fn set_extra_bed_price(
    State(state): State<AppState>,
    Json(payload): Json<ExtraBedPriceInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let price = rooms::insert_extra_bed_price(state.db_pool()?, payload.price).await?;
    tracing::info!(price, "Extra bed price updated");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Extra bed price updated.", "price": price })),
    ))
}
