use chrono::{DateTime, Duration, Utc};
use sqlx::PgConnection;

use crate::{
    config::AppConfig,
    error::AppResult,
    repository::{bookings, map_db_error, rooms},
    services::availability::{
        resolve_room_statuses, summarize, window_end, AvailabilitySummary, ResolveParams,
        RoomAvailability,
    },
    state::AppState,
};

fn blocking_window(config: &AppConfig) -> Duration {
    Duration::hours(config.blocking_window_hours)
}

/// Loads rooms and intervals on `conn` and classifies every room.
pub async fn resolve_on(
    conn: &mut PgConnection,
    config: &AppConfig,
    moment: DateTime<Utc>,
    exclude_booking_id: Option<i64>,
) -> AppResult<Vec<RoomAvailability>> {
    let window = blocking_window(config);
    let room_list = rooms::list_active_rooms(conn).await?;
    let intervals = rooms::list_stay_intervals(
        conn,
        moment,
        window_end(moment, window),
        config.cancelled_booking_policy,
        exclude_booking_id,
    )
    .await?;
    let extra_bed_price = rooms::current_extra_bed_price(conn).await?;

    Ok(resolve_room_statuses(
        &room_list,
        &intervals,
        ResolveParams {
            requested_moment: moment,
            blocking_window: window,
            extra_bed_price,
            cancelled_policy: config.cancelled_booking_policy,
        },
    ))
}

/// Resolver output folded with pending request bookings.
pub async fn summary_on(
    conn: &mut PgConnection,
    config: &AppConfig,
    moment: DateTime<Utc>,
    exclude_booking_id: Option<i64>,
) -> AppResult<AvailabilitySummary> {
    let window = blocking_window(config);
    let resolved = resolve_on(conn, config, moment, exclude_booking_id).await?;
    let pending = bookings::list_pending_requests(
        conn,
        moment,
        window_end(moment, window + Duration::seconds(1)),
    )
    .await?;
    Ok(summarize(
        resolved,
        &pending,
        moment,
        window,
        exclude_booking_id,
    ))
}

pub async fn resolve_rooms(
    state: &AppState,
    moment: DateTime<Utc>,
) -> AppResult<Vec<RoomAvailability>> {
    let mut conn = state.db_pool()?.acquire().await.map_err(map_db_error)?;
    let rooms = resolve_on(&mut conn, &state.config, moment, None).await?;
    tracing::debug!(
        requested_moment = %moment,
        rooms = rooms.len(),
        "Resolved room availability"
    );
    Ok(rooms)
}

pub async fn availability_summary(
    state: &AppState,
    moment: DateTime<Utc>,
    exclude_booking_id: Option<i64>,
) -> AppResult<AvailabilitySummary> {
    let mut conn = state.db_pool()?.acquire().await.map_err(map_db_error)?;
    summary_on(&mut conn, &state.config, moment, exclude_booking_id).await
}
