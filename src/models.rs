use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Booking lifecycle as stored in `bookings.booking_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Checkout,
    Checkin,
    Advance,
    Cancelled,
}

impl BookingStatus {
    pub fn code(self) -> i16 {
        match self {
            Self::Checkout => 0,
            Self::Checkin => 1,
            Self::Advance => 2,
            Self::Cancelled => 3,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, AppError> {
        match code {
            0 => Ok(Self::Checkout),
            1 => Ok(Self::Checkin),
            2 => Ok(Self::Advance),
            3 => Ok(Self::Cancelled),
            other => Err(AppError::Internal(format!(
                "Unknown booking status code {other}."
            ))),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "0" | "checkout" | "checked_out" => Ok(Self::Checkout),
            "1" | "checkin" | "checked_in" => Ok(Self::Checkin),
            "2" | "advance" | "request" => Ok(Self::Advance),
            "3" | "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(AppError::BadRequest(format!(
                "Unknown booking status '{other}'."
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Checkin => "checkin",
            Self::Advance => "advance",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Advance => matches!(next, Self::Checkin | Self::Cancelled),
            Self::Checkin => matches!(next, Self::Checkout | Self::Cancelled),
            Self::Checkout | Self::Cancelled => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Payment,
    Advance,
    Refund,
}

impl PaymentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Advance => "advance",
            Self::Refund => "refund",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
}

impl PaymentMethod {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "bank_transfer" | "bank" | "neft" => Ok(Self::BankTransfer),
            other => Err(AppError::BadRequest(format!(
                "Unsupported payment method '{other}'."
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Upi => "upi",
            Self::BankTransfer => "bank_transfer",
        }
    }

    pub fn requires_reference(self) -> bool {
        !matches!(self, Self::Cash)
    }
}

/// An active room joined with its type and floor names.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub room_number: String,
    pub room_name: String,
    pub floor_name: String,
    pub ac_price: f64,
    pub non_ac_price: f64,
    pub online_ac_price: f64,
    pub online_non_ac_price: f64,
    pub occupancy: i32,
}

/// One booked-room line with the status of the booking it belongs to.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StayInterval {
    pub booked_room_id: i64,
    pub booking_id: i64,
    pub booking_status: i16,
    pub room_id: i64,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub is_checked_out: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub booking_status: i16,
    pub arrival_from: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub is_online: bool,
    pub include_tax: bool,
    pub tax_percent: f64,
    pub requested_rooms: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn status(&self) -> Result<BookingStatus, AppError> {
        BookingStatus::from_code(self.booking_status)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookedRoom {
    pub id: i64,
    pub booking_id: i64,
    pub room_id: i64,
    pub room_number: String,
    pub room_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub is_checked_out: bool,
    pub adults: i32,
    pub children: i32,
    pub extra_beds: bool,
    pub is_ac: bool,
    pub booked_price: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub amount: f64,
    pub method: String,
    pub transaction_id: Option<String>,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub id_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub category: String,
    pub amount: f64,
    pub expense_date: NaiveDate,
    pub payment_method: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Net amount collected on a booking: payments and advances minus refunds.
pub fn net_paid(payments: &[Payment]) -> f64 {
    let total = payments.iter().fold(0.0, |acc, payment| {
        if payment.kind == PaymentKind::Refund.as_str() {
            acc - payment.amount
        } else {
            acc + payment.amount
        }
    });
    round_money(total)
}

pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
