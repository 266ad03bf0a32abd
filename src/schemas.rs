use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::UnprocessableEntity(format!("Validation failed: {errors}")))
}

fn default_true() -> bool {
    true
}
fn default_limit_100() -> i64 {
    100
}
fn default_limit_50() -> i64 {
    50
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomFilterQuery {
    pub check_in_date_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAvailabilityQuery {
    pub check_in_date_time: Option<String>,
    pub exclude: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtraBedPriceInput {
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub customer_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default = "default_limit_100")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingPath {
    pub booking_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookedRoomPath {
    pub booked_room_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerPath {
    pub customer_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefundInput {
    #[validate(length(min = 1, max = 32))]
    pub method: String,
    pub transaction_id: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentInput {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    #[validate(length(min = 1, max = 32))]
    pub method: String,
    pub transaction_id: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBookingInput {
    pub customer_id: i64,
    pub check_in_date_time: String,
    pub check_out_date_time: String,
    #[validate(range(min = 1, max = 500))]
    pub requested_rooms: i32,
    #[serde(default)]
    pub room_ids: Vec<i64>,
    #[validate(length(min = 1, max = 120))]
    pub arrival_from: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default = "default_true")]
    pub is_ac: bool,
    #[serde(default)]
    pub include_tax: bool,
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_percent: Option<f64>,
    #[validate(range(min = 0.0))]
    pub advance_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBookingsQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit_100")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestAvailabilityQuery {
    pub date: Option<String>,
    pub exclude: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomersQuery {
    #[serde(alias = "q")]
    pub search: Option<String>,
    #[serde(default = "default_limit_50")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 5, max = 32))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 64))]
    pub id_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensesQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_limit_100")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseInput {
    #[validate(length(min = 1, max = 80))]
    pub category: String,
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    pub expense_date: String,
    pub payment_method: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevenueQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{validate_input, CreateCustomerInput, CreateRequestBookingInput, RefundInput};

    #[test]
    fn request_booking_defaults() {
        let input: CreateRequestBookingInput = serde_json::from_value(json!({
            "customerId": 4,
            "checkInDateTime": "2025-03-10T12:00:00Z",
            "checkOutDateTime": "2025-03-12T12:00:00Z",
            "requestedRooms": 2,
            "arrivalFrom": "Phone"
        }))
        .unwrap();
        assert!(input.room_ids.is_empty());
        assert!(input.is_ac);
        assert!(!input.include_tax);
        assert!(validate_input(&input).is_ok());
    }

    #[test]
    fn zero_requested_rooms_fail_validation() {
        let input: CreateRequestBookingInput = serde_json::from_value(json!({
            "customerId": 4,
            "checkInDateTime": "2025-03-10T12:00:00Z",
            "checkOutDateTime": "2025-03-12T12:00:00Z",
            "requestedRooms": 0,
            "arrivalFrom": "Phone"
        }))
        .unwrap();
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn customer_email_is_checked_when_present() {
        let mut input = CreateCustomerInput {
            name: "Asha Rao".to_string(),
            phone: "9000000001".to_string(),
            email: None,
            address: None,
            id_number: None,
        };
        assert!(validate_input(&input).is_ok());
        input.email = Some("not-an-email".to_string());
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn refund_amount_must_be_positive() {
        let input: RefundInput =
            serde_json::from_value(json!({ "method": "cash", "amount": 0.0 })).unwrap();
        assert!(validate_input(&input).is_err());
    }
}
