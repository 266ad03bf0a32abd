//! In-memory booking draft driven by reducer-style actions.
//!
//! The draft holds the whole multi-room booking being assembled at the front
//! desk. Every change goes through [`BookingDraft::apply`], which keeps the
//! guest-count and room-count invariants in one place. Totals are derived on
//! demand and never stored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
    models::{Booking, Customer, PaymentMethod, Room},
    services::{
        availability::{AvailabilitySummary, RoomStatus},
        pricing::{per_room_total, Totals},
    },
};

/// Longest stay the desk books in one go.
pub const MAX_STAY_NIGHTS: u32 = 365;

/// Whole nights covered by a stay, rounding partial days up; never below one.
pub fn stay_nights(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> u32 {
    let hours = (check_out - check_in).num_hours().max(1);
    u32::try_from((hours + 23) / 24).unwrap_or(1).max(1)
}

/// Issues monotonically increasing generations so that only the response to
/// the most recent availability request is applied.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    latest: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GuestField {
    Adults,
    Children,
}

impl GuestField {
    fn label(self) -> &'static str {
        match self {
            Self::Adults => "adults",
            Self::Children => "children",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub room_index: usize,
    pub field: GuestField,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantDetails {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    /// Reference to an uploaded photo (form part name or stored path).
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRoom {
    pub room: Room,
    pub extra_bed_price: f64,
    pub is_ac: bool,
    pub extra_bed: bool,
    pub adults: u32,
    pub children: u32,
    pub occupant: Option<OccupantDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StayWindow {
    pub check_in: Option<DateTime<Utc>>,
    pub nights: u32,
    pub is_online: bool,
}

impl StayWindow {
    pub fn check_out(&self) -> Option<DateTime<Utc>> {
        let stay = Duration::days(i64::from(self.nights));
        self.check_in
            .and_then(|check_in| check_in.checked_add_signed(stay))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSettings {
    pub include: bool,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancePayment {
    pub amount: f64,
    pub method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedRequest {
    pub booking_id: i64,
    pub advance_paid: f64,
    pub preferred_room_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    SetCheckIn(DateTime<Utc>),
    ApplyAvailability {
        generation: u64,
        summary: AvailabilitySummary,
    },
    SetStay(u32),
    SetOnline(bool),
    SetRoomCount(usize),
    SelectRoom(i64),
    DeselectRoom(i64),
    SetAc { index: usize, is_ac: bool },
    SetExtraBed { index: usize, extra_bed: bool },
    SetAdults { index: usize, adults: u32 },
    SetChildren { index: usize, children: u32 },
    SetOccupant { index: usize, details: OccupantDetails },
    SetTax { include: bool, percent: f64 },
    SetAdvance(AdvancePayment),
    SetCustomer(CustomerRef),
    SetArrivalFrom(String),
    LinkRequest(LinkedRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftOutcome {
    Applied,
    AwaitingAvailability(u64),
    StaleDiscarded,
    Clamped(FieldError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("Only {allowed} room(s) can be booked for this slot; {requested} requested.")]
    RoomCountExceeded { requested: usize, allowed: usize },
    #[error("Room availability has not been loaded for the selected check-in.")]
    AvailabilityNotLoaded,
    #[error("Room {0} is not available for the selected check-in.")]
    RoomNotSelectable(i64),
    #[error("Room {0} is already selected.")]
    RoomAlreadySelected(i64),
    #[error("No selected room at position {0}.")]
    RoomIndexOutOfRange(usize),
    #[error("Stay must be between 1 and {MAX_STAY_NIGHTS} nights.")]
    InvalidStay,
    #[error("Tax percentage must be between 0 and 100.")]
    InvalidTaxPercent,
    #[error("Advance amount cannot be negative.")]
    InvalidAdvance,
    #[error("Please select check-in date and time.")]
    MissingCheckIn,
    #[error("Please select at least one room.")]
    NoRoomsSelected,
    #[error("Please select or create a customer with name and phone.")]
    IncompleteCustomer,
    #[error("Please fill the arrival source.")]
    MissingArrivalSource,
    #[error("Please choose a payment method for the advance.")]
    MissingPaymentMethod,
    #[error("A transaction reference is required for non-cash payments.")]
    MissingTransactionReference,
    #[error("Guest count for room {room_number} exceeds its occupancy of {occupancy}.")]
    OccupancyExceeded { room_number: String, occupancy: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRoom {
    pub room_id: i64,
    pub is_ac: bool,
    pub extra_bed: bool,
    pub adults: u32,
    pub children: u32,
    pub booked_price: f64,
    pub occupant: Option<OccupantDetails>,
}

/// Validated payload ready to be persisted as a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub customer_id: i64,
    pub arrival_from: String,
    pub is_online: bool,
    pub include_tax: bool,
    pub tax_percent: f64,
    pub rooms: Vec<SubmittedRoom>,
    pub advance: Option<AdvancePayment>,
    pub request_booking_id: Option<i64>,
    pub totals: Totals,
    pub balance_due: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub stay: StayWindow,
    pub customer: CustomerRef,
    pub arrival_from: String,
    pub rooms: Vec<DraftRoom>,
    pub room_count: usize,
    pub tax: TaxSettings,
    pub payment: AdvancePayment,
    pub linked_request: Option<LinkedRequest>,
    pub field_errors: Vec<FieldError>,
    #[serde(skip)]
    availability: Option<AvailabilitySummary>,
    #[serde(skip)]
    generations: GenerationCounter,
    #[serde(skip)]
    default_tax_percent: f64,
}

impl BookingDraft {
    pub fn new(default_tax_percent: f64) -> Self {
        Self {
            stay: StayWindow {
                check_in: None,
                nights: 1,
                is_online: false,
            },
            customer: CustomerRef::default(),
            arrival_from: String::new(),
            rooms: Vec::new(),
            room_count: 0,
            tax: TaxSettings {
                include: false,
                percent: default_tax_percent,
            },
            payment: AdvancePayment::default(),
            linked_request: None,
            field_errors: Vec::new(),
            availability: None,
            generations: GenerationCounter::default(),
            default_tax_percent,
        }
    }

    /// Prefills a draft for converting a request booking into a stay.
    pub fn from_request(
        request: &Booking,
        customer: &Customer,
        preferred_room_ids: Vec<i64>,
        advance_paid: f64,
        default_tax_percent: f64,
    ) -> Self {
        let mut draft = Self::new(default_tax_percent);
        draft.stay = StayWindow {
            check_in: Some(request.check_in),
            nights: stay_nights(request.check_in, request.check_out),
            is_online: request.is_online,
        };
        draft.customer = CustomerRef {
            id: Some(customer.id),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
        };
        draft.arrival_from = request.arrival_from.clone();
        draft.tax = TaxSettings {
            include: request.include_tax,
            percent: if request.include_tax {
                request.tax_percent
            } else {
                default_tax_percent
            },
        };
        draft.room_count = usize::try_from(request.requested_rooms)
            .unwrap_or(0)
            .max(preferred_room_ids.len());
        draft.linked_request = Some(LinkedRequest {
            booking_id: request.id,
            advance_paid,
            preferred_room_ids,
        });
        draft
    }

    pub fn availability(&self) -> Option<&AvailabilitySummary> {
        self.availability.as_ref()
    }

    pub fn reset(&mut self) {
        let generations = self.generations.clone();
        *self = Self::new(self.default_tax_percent);
        self.generations = generations;
    }

    pub fn apply(&mut self, action: DraftAction) -> Result<DraftOutcome, DraftError> {
        match action {
            DraftAction::SetCheckIn(moment) => {
                self.stay.check_in = Some(moment);
                self.availability = None;
                self.rooms.clear();
                self.field_errors.clear();
                Ok(DraftOutcome::AwaitingAvailability(self.generations.issue()))
            }
            DraftAction::ApplyAvailability {
                generation,
                summary,
            } => {
                if !self.generations.is_latest(generation) {
                    tracing::debug!(generation, "Discarding stale availability response");
                    return Ok(DraftOutcome::StaleDiscarded);
                }
                self.availability = Some(summary);
                self.select_preferred_rooms();
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetStay(nights) => {
                if !(1..=MAX_STAY_NIGHTS).contains(&nights) {
                    return Err(DraftError::InvalidStay);
                }
                self.stay.nights = nights;
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetOnline(is_online) => {
                self.stay.is_online = is_online;
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetRoomCount(count) => {
                let allowed = self.selectable_room_count()?;
                if count > allowed {
                    return Err(DraftError::RoomCountExceeded {
                        requested: count,
                        allowed,
                    });
                }
                self.room_count = count;
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SelectRoom(room_id) => self.select_room(room_id),
            DraftAction::DeselectRoom(room_id) => {
                if let Some(index) = self.rooms.iter().position(|line| line.room.id == room_id) {
                    self.rooms.remove(index);
                    self.field_errors.retain(|error| error.room_index != index);
                    for error in &mut self.field_errors {
                        if error.room_index > index {
                            error.room_index -= 1;
                        }
                    }
                }
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetAc { index, is_ac } => {
                self.room_mut(index)?.is_ac = is_ac;
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetExtraBed { index, extra_bed } => {
                self.room_mut(index)?.extra_bed = extra_bed;
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetAdults { index, adults } => {
                self.set_guests(index, GuestField::Adults, adults)
            }
            DraftAction::SetChildren { index, children } => {
                self.set_guests(index, GuestField::Children, children)
            }
            DraftAction::SetOccupant { index, details } => {
                self.room_mut(index)?.occupant = Some(details);
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetTax { include, percent } => {
                if !(0.0..=100.0).contains(&percent) || percent.is_nan() {
                    return Err(DraftError::InvalidTaxPercent);
                }
                self.tax = TaxSettings { include, percent };
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetAdvance(payment) => {
                if payment.amount < 0.0 || payment.amount.is_nan() {
                    return Err(DraftError::InvalidAdvance);
                }
                self.payment = payment;
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetCustomer(customer) => {
                self.customer = customer;
                Ok(DraftOutcome::Applied)
            }
            DraftAction::SetArrivalFrom(source) => {
                self.arrival_from = source;
                Ok(DraftOutcome::Applied)
            }
            DraftAction::LinkRequest(link) => {
                self.linked_request = Some(link);
                self.select_preferred_rooms();
                Ok(DraftOutcome::Applied)
            }
        }
    }

    pub fn line_total(&self, line: &DraftRoom) -> f64 {
        per_room_total(
            &line.room,
            self.stay.is_online,
            line.is_ac,
            line.extra_bed,
            line.extra_bed_price,
            self.stay.nights,
        )
    }

    pub fn totals(&self) -> Totals {
        let lines = self
            .rooms
            .iter()
            .map(|line| self.line_total(line))
            .collect::<Vec<_>>();
        let advance = self
            .linked_request
            .as_ref()
            .map(|link| link.advance_paid)
            .unwrap_or(0.0);
        Totals::compute(&lines, self.tax.percent, self.tax.include, advance)
    }

    /// Validates the draft and builds the payload. The draft is left as is
    /// either way; callers reset it after a successful save.
    pub fn submit(&self) -> Result<BookingSubmission, DraftError> {
        let check_in = self.stay.check_in.ok_or(DraftError::MissingCheckIn)?;
        let check_out = self.stay.check_out().ok_or(DraftError::InvalidStay)?;
        if self.rooms.is_empty() {
            return Err(DraftError::NoRoomsSelected);
        }
        let customer_id = match self.customer.id {
            Some(id)
                if !self.customer.name.trim().is_empty()
                    && !self.customer.phone.trim().is_empty() =>
            {
                id
            }
            _ => return Err(DraftError::IncompleteCustomer),
        };
        if self.arrival_from.trim().is_empty() {
            return Err(DraftError::MissingArrivalSource);
        }
        for line in &self.rooms {
            let occupancy = u32::try_from(line.room.occupancy).unwrap_or(0);
            if line.adults + line.children > occupancy {
                return Err(DraftError::OccupancyExceeded {
                    room_number: line.room.room_number.clone(),
                    occupancy,
                });
            }
        }

        let advance = if self.payment.amount > 0.0 {
            let method = self.payment.method.ok_or(DraftError::MissingPaymentMethod)?;
            let reference = self
                .payment
                .transaction_id
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty());
            if method.requires_reference() && reference.is_none() {
                return Err(DraftError::MissingTransactionReference);
            }
            Some(AdvancePayment {
                amount: self.payment.amount,
                method: Some(method),
                transaction_id: reference.map(ToOwned::to_owned),
            })
        } else {
            None
        };

        let totals = self.totals();
        let balance_due = crate::models::round_money(
            totals.grand_total - advance.as_ref().map(|paid| paid.amount).unwrap_or(0.0),
        );

        Ok(BookingSubmission {
            check_in,
            check_out,
            customer_id,
            arrival_from: self.arrival_from.trim().to_string(),
            is_online: self.stay.is_online,
            include_tax: self.tax.include,
            tax_percent: self.tax.percent,
            rooms: self
                .rooms
                .iter()
                .map(|line| SubmittedRoom {
                    room_id: line.room.id,
                    is_ac: line.is_ac,
                    extra_bed: line.extra_bed,
                    adults: line.adults,
                    children: line.children,
                    booked_price: self.line_total(line),
                    occupant: line.occupant.clone(),
                })
                .collect(),
            advance,
            request_booking_id: self.linked_request.as_ref().map(|link| link.booking_id),
            totals,
            balance_due,
        })
    }

    fn selectable_room_count(&self) -> Result<usize, DraftError> {
        self.availability
            .as_ref()
            .map(|summary| summary.selectable_room_count)
            .ok_or(DraftError::AvailabilityNotLoaded)
    }

    fn select_room(&mut self, room_id: i64) -> Result<DraftOutcome, DraftError> {
        if self.rooms.iter().any(|line| line.room.id == room_id) {
            return Err(DraftError::RoomAlreadySelected(room_id));
        }
        let allowed = self.selectable_room_count()?;
        if self.rooms.len() + 1 > allowed {
            return Err(DraftError::RoomCountExceeded {
                requested: self.rooms.len() + 1,
                allowed,
            });
        }
        let candidate = self
            .availability
            .as_ref()
            .and_then(|summary| summary.rooms.iter().find(|room| room.room.id == room_id))
            .filter(|room| room.status == RoomStatus::Available)
            .ok_or(DraftError::RoomNotSelectable(room_id))?;

        self.rooms.push(DraftRoom {
            room: candidate.room.clone(),
            extra_bed_price: candidate.extra_bed_price,
            is_ac: true,
            extra_bed: false,
            adults: 1,
            children: 0,
            occupant: None,
        });
        self.room_count = self.room_count.max(self.rooms.len());
        Ok(DraftOutcome::Applied)
    }

    fn select_preferred_rooms(&mut self) {
        let Some(preferred) = self
            .linked_request
            .as_ref()
            .map(|link| link.preferred_room_ids.clone())
        else {
            return;
        };
        if self.availability.is_none() {
            return;
        }
        for room_id in preferred {
            if self.rooms.iter().any(|line| line.room.id == room_id) {
                continue;
            }
            if let Err(error) = self.select_room(room_id) {
                tracing::debug!(room_id, %error, "Preferred room could not be preselected");
            }
        }
    }

    fn room_mut(&mut self, index: usize) -> Result<&mut DraftRoom, DraftError> {
        self.rooms
            .get_mut(index)
            .ok_or(DraftError::RoomIndexOutOfRange(index))
    }

    fn set_guests(
        &mut self,
        index: usize,
        field: GuestField,
        requested: u32,
    ) -> Result<DraftOutcome, DraftError> {
        let line = self.room_mut(index)?;
        let occupancy = u32::try_from(line.room.occupancy).unwrap_or(0);
        let other = match field {
            GuestField::Adults => line.children,
            GuestField::Children => line.adults,
        };
        let max_for_field = occupancy.saturating_sub(other);
        let value = requested.min(max_for_field);
        match field {
            GuestField::Adults => line.adults = value,
            GuestField::Children => line.children = value,
        }

        self.field_errors
            .retain(|error| !(error.room_index == index && error.field == field));
        if requested <= max_for_field {
            return Ok(DraftOutcome::Applied);
        }

        let error = FieldError {
            room_index: index,
            field,
            message: format!(
                "Maximum {max_for_field} {} allowed ({occupancy} total guests)",
                field.label()
            ),
        };
        self.field_errors.push(error.clone());
        Ok(DraftOutcome::Clamped(error))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{
        stay_nights, AdvancePayment, BookingDraft, CustomerRef, DraftAction, DraftError,
        DraftOutcome, GenerationCounter, GuestField, LinkedRequest, MAX_STAY_NIGHTS,
    };
    use crate::{
        config::CancelledBookingPolicy,
        models::{PaymentMethod, Room, StayInterval},
        services::availability::{resolve_room_statuses, summarize, ResolveParams},
    };

    fn room(id: i64, occupancy: i32) -> Room {
        Room {
            id,
            room_number: format!("{}", 100 + id),
            room_name: "Deluxe".to_string(),
            floor_name: "First".to_string(),
            ac_price: 1000.0,
            non_ac_price: 800.0,
            online_ac_price: 1200.0,
            online_non_ac_price: 900.0,
            occupancy,
        }
    }

    fn loaded_draft(rooms: &[Room], intervals: &[StayInterval]) -> BookingDraft {
        let moment = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let mut draft = BookingDraft::new(12.0);
        let DraftOutcome::AwaitingAvailability(generation) =
            draft.apply(DraftAction::SetCheckIn(moment)).unwrap()
        else {
            panic!("expected a generation");
        };
        let resolved = resolve_room_statuses(
            rooms,
            intervals,
            ResolveParams {
                requested_moment: moment,
                blocking_window: Duration::hours(24),
                extra_bed_price: 200.0,
                cancelled_policy: CancelledBookingPolicy::Exclude,
            },
        );
        let summary = summarize(resolved, &[], moment, Duration::hours(24), None);
        assert_eq!(
            draft
                .apply(DraftAction::ApplyAvailability {
                    generation,
                    summary
                })
                .unwrap(),
            DraftOutcome::Applied
        );
        draft
    }

    fn ready_to_submit(draft: &mut BookingDraft) {
        draft
            .apply(DraftAction::SetCustomer(CustomerRef {
                id: Some(9),
                name: "Asha Rao".to_string(),
                phone: "9800000000".to_string(),
            }))
            .unwrap();
        draft
            .apply(DraftAction::SetArrivalFrom("Walk-in".to_string()))
            .unwrap();
    }

    #[test]
    fn generation_counter_tracks_latest() {
        let counter = GenerationCounter::default();
        let first = counter.issue();
        let second = counter.issue();
        assert!(second > first);
        assert!(!counter.is_latest(first));
        assert!(counter.is_latest(second));
    }

    #[test]
    fn stale_availability_is_discarded() {
        let mut draft = BookingDraft::new(12.0);
        let moment = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let DraftOutcome::AwaitingAvailability(stale) =
            draft.apply(DraftAction::SetCheckIn(moment)).unwrap()
        else {
            panic!("expected a generation");
        };
        let DraftOutcome::AwaitingAvailability(fresh) = draft
            .apply(DraftAction::SetCheckIn(moment + Duration::days(1)))
            .unwrap()
        else {
            panic!("expected a generation");
        };
        let summary = summarize(Vec::new(), &[], moment, Duration::hours(24), None);

        let outcome = draft
            .apply(DraftAction::ApplyAvailability {
                generation: stale,
                summary: summary.clone(),
            })
            .unwrap();
        assert_eq!(outcome, DraftOutcome::StaleDiscarded);
        assert!(draft.availability().is_none());

        draft
            .apply(DraftAction::ApplyAvailability {
                generation: fresh,
                summary,
            })
            .unwrap();
        assert!(draft.availability().is_some());
    }

    #[test]
    fn adults_over_occupancy_are_clamped_with_message() {
        let mut draft = loaded_draft(&[room(1, 2)], &[]);
        draft.apply(DraftAction::SelectRoom(1)).unwrap();

        let outcome = draft
            .apply(DraftAction::SetAdults { index: 0, adults: 3 })
            .unwrap();

        assert_eq!(draft.rooms[0].adults, 2);
        assert_eq!(draft.rooms[0].children, 0);
        let DraftOutcome::Clamped(error) = outcome else {
            panic!("expected a clamp");
        };
        assert_eq!(error.message, "Maximum 2 adults allowed (2 total guests)");
        assert_eq!(error.field, GuestField::Adults);
        assert_eq!(draft.field_errors.len(), 1);
    }

    #[test]
    fn children_clamp_accounts_for_adults_and_clears_when_valid() {
        let mut draft = loaded_draft(&[room(1, 3)], &[]);
        draft.apply(DraftAction::SelectRoom(1)).unwrap();
        draft
            .apply(DraftAction::SetAdults { index: 0, adults: 2 })
            .unwrap();

        draft
            .apply(DraftAction::SetChildren {
                index: 0,
                children: 4,
            })
            .unwrap();
        assert_eq!(draft.rooms[0].children, 1);
        assert_eq!(
            draft.field_errors[0].message,
            "Maximum 1 children allowed (3 total guests)"
        );

        draft
            .apply(DraftAction::SetChildren {
                index: 0,
                children: 1,
            })
            .unwrap();
        assert!(draft.field_errors.is_empty());
    }

    #[test]
    fn room_count_above_selectable_is_rejected_without_clamping() {
        let busy = StayInterval {
            booked_room_id: 1,
            booking_id: 1,
            booking_status: 1,
            room_id: 2,
            check_in: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
            is_checked_out: false,
        };
        let mut draft = loaded_draft(&[room(1, 2), room(2, 2)], &[busy]);

        assert_eq!(
            draft.apply(DraftAction::SetRoomCount(2)),
            Err(DraftError::RoomCountExceeded {
                requested: 2,
                allowed: 1
            })
        );
        assert_eq!(draft.room_count, 0);
        assert!(draft.apply(DraftAction::SetRoomCount(1)).is_ok());
        assert_eq!(
            draft.apply(DraftAction::SelectRoom(2)),
            Err(DraftError::RoomNotSelectable(2))
        );
        draft.apply(DraftAction::SelectRoom(1)).unwrap();
        assert_eq!(
            draft.apply(DraftAction::SelectRoom(3)),
            Err(DraftError::RoomCountExceeded {
                requested: 2,
                allowed: 1
            })
        );
    }

    #[test]
    fn booked_rooms_cannot_be_selected() {
        let busy = StayInterval {
            booked_room_id: 1,
            booking_id: 1,
            booking_status: 1,
            room_id: 2,
            check_in: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
            is_checked_out: false,
        };
        let mut draft = loaded_draft(&[room(1, 2), room(2, 2), room(3, 2)], &[busy]);
        assert_eq!(
            draft.apply(DraftAction::SelectRoom(2)),
            Err(DraftError::RoomNotSelectable(2))
        );
        assert!(draft.apply(DraftAction::SelectRoom(1)).is_ok());
        assert_eq!(
            draft.apply(DraftAction::SelectRoom(1)),
            Err(DraftError::RoomAlreadySelected(1))
        );
    }

    #[test]
    fn selecting_requires_loaded_availability() {
        let mut draft = BookingDraft::new(12.0);
        assert_eq!(
            draft.apply(DraftAction::SelectRoom(1)),
            Err(DraftError::AvailabilityNotLoaded)
        );
    }

    #[test]
    fn totals_follow_pricing_rules() {
        let mut draft = loaded_draft(&[room(1, 2)], &[]);
        draft.apply(DraftAction::SelectRoom(1)).unwrap();
        draft.apply(DraftAction::SetStay(3)).unwrap();
        draft
            .apply(DraftAction::SetExtraBed {
                index: 0,
                extra_bed: true,
            })
            .unwrap();
        draft
            .apply(DraftAction::SetTax {
                include: true,
                percent: 12.0,
            })
            .unwrap();

        assert_eq!(draft.line_total(&draft.rooms[0]), 3600.0);
        let totals = draft.totals();
        assert_eq!(totals.taxable_amount, 3600.0);
        assert_eq!(totals.tax_amount, 432.0);
        assert_eq!(totals.grand_total, 4032.0);

        draft.apply(DraftAction::SetOnline(true)).unwrap();
        assert_eq!(draft.line_total(&draft.rooms[0]), 4200.0);
    }

    #[test]
    fn linked_request_advance_is_deducted() {
        let mut draft = loaded_draft(&[room(1, 2)], &[]);
        draft
            .apply(DraftAction::LinkRequest(LinkedRequest {
                booking_id: 5,
                advance_paid: 500.0,
                preferred_room_ids: vec![1],
            }))
            .unwrap();

        assert_eq!(draft.rooms.len(), 1);
        assert_eq!(draft.totals().grand_total, 500.0);
    }

    #[test]
    fn submit_validates_in_order_and_keeps_draft() {
        let mut draft = BookingDraft::new(12.0);
        assert_eq!(draft.submit(), Err(DraftError::MissingCheckIn));

        let mut draft_with_rooms = loaded_draft(&[room(1, 2)], &[]);
        assert_eq!(draft_with_rooms.submit(), Err(DraftError::NoRoomsSelected));
        draft_with_rooms.apply(DraftAction::SelectRoom(1)).unwrap();
        assert_eq!(
            draft_with_rooms.submit(),
            Err(DraftError::IncompleteCustomer)
        );
        draft_with_rooms
            .apply(DraftAction::SetCustomer(CustomerRef {
                id: Some(1),
                name: "Asha".to_string(),
                phone: "98".to_string(),
            }))
            .unwrap();
        assert_eq!(
            draft_with_rooms.submit(),
            Err(DraftError::MissingArrivalSource)
        );
        assert_eq!(draft_with_rooms.rooms.len(), 1);

        draft.reset();
        assert!(draft.rooms.is_empty());
    }

    #[test]
    fn submit_builds_payload_with_advance() {
        let mut draft = loaded_draft(&[room(1, 2), room(2, 2)], &[]);
        ready_to_submit(&mut draft);
        draft.apply(DraftAction::SelectRoom(1)).unwrap();
        draft.apply(DraftAction::SelectRoom(2)).unwrap();
        draft
            .apply(DraftAction::SetAc {
                index: 1,
                is_ac: false,
            })
            .unwrap();
        draft.apply(DraftAction::SetStay(2)).unwrap();
        draft
            .apply(DraftAction::SetAdvance(AdvancePayment {
                amount: 1000.0,
                method: Some(PaymentMethod::Upi),
                transaction_id: None,
            }))
            .unwrap();
        assert_eq!(
            draft.submit(),
            Err(DraftError::MissingTransactionReference)
        );

        draft
            .apply(DraftAction::SetAdvance(AdvancePayment {
                amount: 1000.0,
                method: Some(PaymentMethod::Upi),
                transaction_id: Some("UPI-42".to_string()),
            }))
            .unwrap();
        let submission = draft.submit().unwrap();

        assert_eq!(submission.rooms.len(), 2);
        assert_eq!(submission.rooms[0].booked_price, 2000.0);
        assert_eq!(submission.rooms[1].booked_price, 1600.0);
        assert_eq!(submission.totals.grand_total, 3600.0);
        assert_eq!(submission.balance_due, 2600.0);
        assert_eq!(submission.check_out - submission.check_in, Duration::days(2));
        assert_eq!(submission.customer_id, 9);
    }

    #[test]
    fn deselect_reindexes_field_errors() {
        let mut draft = loaded_draft(&[room(1, 2), room(2, 2)], &[]);
        draft.apply(DraftAction::SelectRoom(1)).unwrap();
        draft.apply(DraftAction::SelectRoom(2)).unwrap();
        draft
            .apply(DraftAction::SetAdults { index: 1, adults: 5 })
            .unwrap();

        draft.apply(DraftAction::DeselectRoom(1)).unwrap();

        assert_eq!(draft.rooms.len(), 1);
        assert_eq!(draft.field_errors[0].room_index, 0);
    }

    #[test]
    fn stays_beyond_a_year_are_rejected_without_panicking() {
        let mut draft = BookingDraft::new(12.0);
        assert_eq!(
            draft.apply(DraftAction::SetStay(4_000_000_000)),
            Err(DraftError::InvalidStay)
        );
        assert_eq!(
            draft.apply(DraftAction::SetStay(MAX_STAY_NIGHTS + 1)),
            Err(DraftError::InvalidStay)
        );
        draft.apply(DraftAction::SetStay(MAX_STAY_NIGHTS)).unwrap();

        draft.stay.check_in = Some(chrono::DateTime::<Utc>::MAX_UTC - Duration::days(1));
        assert_eq!(draft.stay.check_out(), None);
        assert_eq!(draft.submit(), Err(DraftError::InvalidStay));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let mut draft = BookingDraft::new(12.0);
        assert_eq!(draft.apply(DraftAction::SetStay(0)), Err(DraftError::InvalidStay));
        assert_eq!(
            draft.apply(DraftAction::SetTax {
                include: true,
                percent: 140.0
            }),
            Err(DraftError::InvalidTaxPercent)
        );
        assert_eq!(
            draft.apply(DraftAction::SetAdults { index: 0, adults: 1 }),
            Err(DraftError::RoomIndexOutOfRange(0))
        );
    }

    #[test]
    fn stay_nights_round_partial_days_up() {
        let check_in = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(stay_nights(check_in, check_in + Duration::days(3)), 3);
        assert_eq!(stay_nights(check_in, check_in + Duration::hours(25)), 2);
        assert_eq!(stay_nights(check_in, check_in + Duration::minutes(30)), 1);
    }
}
