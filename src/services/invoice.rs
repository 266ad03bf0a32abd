use std::fmt::Write as _;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{net_paid, round_money, BookedRoom, Booking, Customer, Payment},
    services::{
        completion::{run_bounded, Completion},
        local_time::format_local,
        pricing::Totals,
    },
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub room_number: String,
    pub room_name: String,
    pub is_ac: bool,
    pub extra_bed: bool,
    pub adults: i32,
    pub children: i32,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub booking_id: i64,
    pub status: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub check_in: String,
    pub check_out: String,
    pub lines: Vec<InvoiceLine>,
    pub totals: Totals,
    pub paid: f64,
    pub balance_due: f64,
}

impl Invoice {
    pub fn build(
        booking: &Booking,
        customer: &Customer,
        rooms: &[BookedRoom],
        payments: &[Payment],
        timezone: Tz,
    ) -> AppResult<Self> {
        let lines = rooms
            .iter()
            .map(|room| InvoiceLine {
                room_number: room.room_number.clone(),
                room_name: room.room_name.clone(),
                is_ac: room.is_ac,
                extra_bed: room.extra_beds,
                adults: room.adults,
                children: room.children,
                amount: round_money(room.booked_price),
            })
            .collect::<Vec<_>>();
        let amounts = lines.iter().map(|line| line.amount).collect::<Vec<_>>();
        let totals = Totals::compute(&amounts, booking.tax_percent, booking.include_tax, 0.0);
        let paid = net_paid(payments);

        Ok(Self {
            booking_id: booking.id,
            status: booking.status()?.as_str().to_string(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            check_in: format_local(booking.check_in, timezone),
            check_out: format_local(booking.check_out, timezone),
            lines,
            totals,
            paid,
            balance_due: round_money(totals.grand_total - paid),
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "INVOICE #{}", self.booking_id);
        let _ = writeln!(out, "Guest: {} ({})", self.customer_name, self.customer_phone);
        let _ = writeln!(out, "Stay: {} to {}", self.check_in, self.check_out);
        let _ = writeln!(out, "Status: {}", self.status);
        let _ = writeln!(out);
        for line in &self.lines {
            let _ = writeln!(
                out,
                "Room {:<6} {:<16} {:<6} {:>3}A {:>3}C {:>12.2}",
                line.room_number,
                line.room_name,
                if line.is_ac { "AC" } else { "Non-AC" },
                line.adults,
                line.children,
                line.amount
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Taxable: {:>12.2}", self.totals.taxable_amount);
        let _ = writeln!(out, "Tax:     {:>12.2}", self.totals.tax_amount);
        let _ = writeln!(out, "Total:   {:>12.2}", self.totals.grand_total);
        let _ = writeln!(out, "Paid:    {:>12.2}", self.paid);
        let _ = writeln!(out, "Balance: {:>12.2}", self.balance_due);
        out
    }
}

/// Renders the printable invoice on a worker task, bounded by `timeout`.
pub async fn render_bounded(invoice: Invoice, timeout: Duration) -> AppResult<String> {
    let booking_id = invoice.booking_id;
    match run_bounded(timeout, move |signal| async move {
        signal.finish(invoice.render_text());
    })
    .await
    {
        Completion::Completed(text) => Ok(text),
        Completion::Cancelled => Err(AppError::Internal(format!(
            "Invoice rendering for booking {booking_id} was cancelled."
        ))),
        Completion::TimedOut => {
            tracing::warn!(booking_id, "Invoice rendering timed out");
            Err(AppError::dependency(
                "Invoice rendering timed out.",
                format!("Booking {booking_id} did not render within {}s.", timeout.as_secs()),
            ))
        }
    }
}
