use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
    config::CancelledBookingPolicy,
    models::{BookingStatus, Room, StayInterval},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Booked,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAvailability {
    #[serde(flatten)]
    pub room: Room,
    pub extra_bed_price: f64,
    pub status: RoomStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_check_in: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_checkout: Option<DateTime<Utc>>,
}

/// Everything the resolver needs for one requested moment.
#[derive(Debug, Clone, Copy)]
pub struct ResolveParams {
    pub requested_moment: DateTime<Utc>,
    pub blocking_window: Duration,
    pub extra_bed_price: f64,
    pub cancelled_policy: CancelledBookingPolicy,
}

#[derive(Debug, Clone, Copy)]
struct Occupation {
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
}

/// Classifies every room against the booked-room intervals.
///
/// Intervals containing the moment take precedence over ones starting within
/// the blocking window; among intervals of the same kind the earliest
/// check-in wins. Checked-out lines never occupy a room.
pub fn resolve_room_statuses(
    rooms: &[Room],
    intervals: &[StayInterval],
    params: ResolveParams,
) -> Vec<RoomAvailability> {
    let moment = params.requested_moment;
    let horizon = window_end(moment, params.blocking_window);

    let mut candidates = intervals
        .iter()
        .filter(|interval| !interval.is_checked_out)
        .filter(|interval| counts_toward_occupancy(interval.booking_status, params.cancelled_policy))
        .collect::<Vec<_>>();
    candidates.sort_by_key(|interval| (interval.check_in, interval.booked_room_id));

    let mut occupancy: HashMap<i64, Occupation> = HashMap::new();
    for interval in candidates
        .iter()
        .filter(|interval| interval.check_in <= moment && moment <= interval.check_out)
    {
        occupancy.entry(interval.room_id).or_insert(Occupation {
            check_in: interval.check_in,
            check_out: interval.check_out,
        });
    }
    for interval in candidates
        .iter()
        .filter(|interval| moment < interval.check_in && interval.check_in <= horizon)
    {
        occupancy.entry(interval.room_id).or_insert(Occupation {
            check_in: interval.check_in,
            check_out: interval.check_out,
        });
    }

    rooms
        .iter()
        .map(|room| {
            let occupation = occupancy.get(&room.id);
            let status = match occupation {
                Some(found) if found.check_in > moment => RoomStatus::Blocked,
                Some(_) => RoomStatus::Booked,
                None => RoomStatus::Available,
            };
            RoomAvailability {
                room: room.clone(),
                extra_bed_price: params.extra_bed_price,
                status,
                expected_check_in: occupation.map(|found| found.check_in),
                expected_checkout: occupation.map(|found| found.check_out),
            }
        })
        .collect()
}

fn counts_toward_occupancy(status_code: i16, policy: CancelledBookingPolicy) -> bool {
    match BookingStatus::from_code(status_code) {
        Ok(BookingStatus::Cancelled) => policy == CancelledBookingPolicy::Include,
        Ok(_) => true,
        Err(_) => {
            tracing::warn!(status_code, "Ignoring booked room with unknown booking status");
            false
        }
    }
}

/// A pending request booking and the rooms already assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub booking_id: i64,
    pub customer_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub requested_rooms: i32,
    pub assigned_rooms: Vec<AssignedRoom>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedRoom {
    pub room_id: i64,
    pub room_number: String,
}

impl PendingRequest {
    /// Rooms this request still holds back without a concrete assignment.
    /// Assigned rooms already surface through the resolver as BOOKED/BLOCKED.
    pub fn unassigned_rooms(&self) -> usize {
        let requested = usize::try_from(self.requested_rooms).unwrap_or(0);
        requested.saturating_sub(self.assigned_rooms.len())
    }

    pub fn rooms_consumed(&self) -> usize {
        let requested = usize::try_from(self.requested_rooms).unwrap_or(0);
        requested.max(self.assigned_rooms.len())
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.check_in < end && self.check_out > start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySummary {
    pub requested_moment: DateTime<Utc>,
    pub rooms: Vec<RoomAvailability>,
    pub available_count: usize,
    pub reserved_by_pending_request_count: usize,
    pub selectable_room_count: usize,
}

/// End of the window starting at `moment`, saturating at the largest
/// representable instant.
pub fn window_end(moment: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    moment
        .checked_add_signed(window)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Folds pending request bookings into the resolver output so callers get
/// one authoritative count of rooms that can still be promised.
pub fn summarize(
    rooms: Vec<RoomAvailability>,
    pending: &[PendingRequest],
    requested_moment: DateTime<Utc>,
    blocking_window: Duration,
    exclude_booking_id: Option<i64>,
) -> AvailabilitySummary {
    let available_count = rooms
        .iter()
        .filter(|room| room.status == RoomStatus::Available)
        .count();
    let reserved_by_pending_request_count = pending
        .iter()
        .filter(|request| Some(request.booking_id) != exclude_booking_id)
        .filter(|request| {
            request.overlaps(
                requested_moment,
                window_end(requested_moment, blocking_window + Duration::seconds(1)),
            )
        })
        .map(PendingRequest::unassigned_rooms)
        .sum::<usize>();

    AvailabilitySummary {
        requested_moment,
        rooms,
        available_count,
        reserved_by_pending_request_count,
        selectable_room_count: available_count.saturating_sub(reserved_by_pending_request_count),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{
        resolve_room_statuses, summarize, window_end, AssignedRoom, PendingRequest,
        ResolveParams, RoomStatus,
    };
    use crate::{
        config::CancelledBookingPolicy,
        models::{Room, StayInterval},
    };

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() + Duration::hours(i64::from(hour))
    }

    fn room(id: i64) -> Room {
        Room {
            id,
            room_number: format!("{}", 100 + id),
            room_name: "Deluxe".to_string(),
            floor_name: "First".to_string(),
            ac_price: 1000.0,
            non_ac_price: 800.0,
            online_ac_price: 1100.0,
            online_non_ac_price: 900.0,
            occupancy: 2,
        }
    }

    fn stay(id: i64, room_id: i64, status: i16, from: u32, to: u32) -> StayInterval {
        StayInterval {
            booked_room_id: id,
            booking_id: id,
            booking_status: status,
            room_id,
            check_in: at(from),
            check_out: at(to),
            is_checked_out: false,
        }
    }

    fn params(moment: DateTime<Utc>) -> ResolveParams {
        ResolveParams {
            requested_moment: moment,
            blocking_window: Duration::hours(24),
            extra_bed_price: 200.0,
            cancelled_policy: CancelledBookingPolicy::Exclude,
        }
    }

    #[test]
    fn rooms_without_conflicts_are_available() {
        let rooms = vec![room(1), room(2)];
        let intervals = vec![stay(1, 1, 1, 0, 10), stay(2, 2, 1, 60, 80)];

        let resolved = resolve_room_statuses(&rooms, &intervals, params(at(20)));

        assert!(resolved.iter().all(|r| r.status == RoomStatus::Available));
        assert!(resolved.iter().all(|r| r.expected_check_in.is_none()));
        assert!(resolved.iter().all(|r| r.extra_bed_price == 200.0));
    }

    #[test]
    fn containing_interval_books_the_room_inclusive_of_edges() {
        let rooms = vec![room(1), room(2)];
        let intervals = vec![stay(1, 1, 1, 10, 20), stay(2, 2, 1, 0, 10)];

        let resolved = resolve_room_statuses(&rooms, &intervals, params(at(10)));

        assert_eq!(resolved[0].status, RoomStatus::Booked);
        assert_eq!(resolved[0].expected_checkout, Some(at(20)));
        assert_eq!(resolved[1].status, RoomStatus::Booked);
    }

    #[test]
    fn upcoming_check_in_within_window_blocks_the_room() {
        let rooms = vec![room(1), room(2)];
        let intervals = vec![stay(1, 1, 2, 34, 50), stay(2, 2, 1, 35, 50)];

        let resolved = resolve_room_statuses(&rooms, &intervals, params(at(10)));

        assert_eq!(resolved[0].status, RoomStatus::Blocked);
        assert_eq!(resolved[0].expected_check_in, Some(at(34)));
        assert_eq!(resolved[0].expected_checkout, Some(at(50)));
        assert_eq!(resolved[1].status, RoomStatus::Available);
    }

    #[test]
    fn current_stay_wins_over_upcoming_booking() {
        let rooms = vec![room(1)];
        let intervals = vec![stay(2, 1, 1, 12, 30), stay(1, 1, 1, 0, 11)];

        let resolved = resolve_room_statuses(&rooms, &intervals, params(at(5)));

        assert_eq!(resolved[0].status, RoomStatus::Booked);
        assert_eq!(resolved[0].expected_check_in, Some(at(0)));
    }

    #[test]
    fn checked_out_lines_free_the_room() {
        let mut finished = stay(1, 1, 0, 0, 20);
        finished.is_checked_out = true;

        let resolved = resolve_room_statuses(&[room(1)], &[finished], params(at(10)));

        assert_eq!(resolved[0].status, RoomStatus::Available);
    }

    #[test]
    fn cancelled_bookings_follow_the_configured_policy() {
        let intervals = vec![stay(1, 1, 3, 0, 20)];

        let excluded = resolve_room_statuses(&[room(1)], &intervals, params(at(10)));
        assert_eq!(excluded[0].status, RoomStatus::Available);

        let mut include = params(at(10));
        include.cancelled_policy = CancelledBookingPolicy::Include;
        let included = resolve_room_statuses(&[room(1)], &intervals, include);
        assert_eq!(included[0].status, RoomStatus::Booked);
    }

    #[test]
    fn resolving_twice_yields_identical_output() {
        let rooms = vec![room(1), room(2), room(3)];
        let intervals = vec![stay(1, 1, 1, 0, 20), stay(2, 2, 2, 15, 40)];

        let first = resolve_room_statuses(&rooms, &intervals, params(at(10)));
        let second = resolve_room_statuses(&rooms, &intervals, params(at(10)));

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn serializes_in_client_shape() {
        let resolved = resolve_room_statuses(&[room(1)], &[stay(1, 1, 2, 30, 40)], params(at(10)));
        let json = serde_json::to_value(&resolved[0]).unwrap();

        assert_eq!(json["roomNumber"], "101");
        assert_eq!(json["floorName"], "First");
        assert_eq!(json["onlineNonAcPrice"], 900.0);
        assert_eq!(json["extraBedPrice"], 200.0);
        assert_eq!(json["status"], "BLOCKED");
        assert!(json.get("expectedCheckIn").is_some());
    }

    fn pending(id: i64, requested: i32, assigned: &[i64]) -> PendingRequest {
        PendingRequest {
            booking_id: id,
            customer_name: "Guest".to_string(),
            check_in: at(0),
            check_out: at(48),
            requested_rooms: requested,
            assigned_rooms: assigned
                .iter()
                .map(|room_id| AssignedRoom {
                    room_id: *room_id,
                    room_number: format!("{}", 100 + room_id),
                })
                .collect(),
        }
    }

    #[test]
    fn summary_subtracts_unassigned_pending_rooms() {
        let rooms = resolve_room_statuses(
            &[room(1), room(2), room(3), room(4)],
            &[stay(1, 1, 2, 0, 48)],
            params(at(10)),
        );
        let requests = vec![pending(1, 2, &[1]), pending(7, 1, &[])];

        let summary = summarize(rooms, &requests, at(10), Duration::hours(24), None);

        assert_eq!(summary.available_count, 3);
        assert_eq!(summary.reserved_by_pending_request_count, 2);
        assert_eq!(summary.selectable_room_count, 1);
    }

    #[test]
    fn summary_can_exclude_the_request_being_edited() {
        let rooms = resolve_room_statuses(&[room(1)], &[], params(at(10)));
        let requests = vec![pending(7, 3, &[])];

        let summary = summarize(rooms, &requests, at(10), Duration::hours(24), Some(7));

        assert_eq!(summary.reserved_by_pending_request_count, 0);
        assert_eq!(summary.selectable_room_count, 1);
    }

    #[test]
    fn summary_never_goes_negative() {
        let rooms = resolve_room_statuses(&[room(1)], &[], params(at(10)));
        let summary = summarize(rooms, &[pending(7, 5, &[])], at(10), Duration::hours(24), None);
        assert_eq!(summary.selectable_room_count, 0);
    }

    #[test]
    fn consumed_rooms_cover_assigned_and_requested() {
        assert_eq!(pending(1, 2, &[1]).rooms_consumed(), 2);
        assert_eq!(pending(1, 1, &[1, 2]).rooms_consumed(), 2);
        assert_eq!(pending(1, 1, &[1, 2]).unassigned_rooms(), 0);
    }

    #[test]
    fn window_end_saturates_near_the_end_of_time() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        assert_eq!(window_end(late, Duration::hours(24)), DateTime::<Utc>::MAX_UTC);
        assert_eq!(window_end(at(10), Duration::hours(24)), at(34));

        let rooms = resolve_room_statuses(&[room(1)], &[], params(late));
        let summary = summarize(rooms, &[], late, Duration::hours(24), None);
        assert_eq!(summary.selectable_room_count, 1);
    }
}
