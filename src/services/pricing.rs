use serde::Serialize;

use crate::models::{round_money, Room};

/// Nightly unit price for a room given the booking channel and AC choice.
pub fn unit_price(room: &Room, is_online: bool, is_ac: bool) -> f64 {
    match (is_online, is_ac) {
        (true, true) => room.online_ac_price,
        (true, false) => room.online_non_ac_price,
        (false, true) => room.ac_price,
        (false, false) => room.non_ac_price,
    }
}

pub fn per_room_total(
    room: &Room,
    is_online: bool,
    is_ac: bool,
    extra_bed: bool,
    extra_bed_price: f64,
    nights: u32,
) -> f64 {
    let extra = if extra_bed { extra_bed_price } else { 0.0 };
    round_money((unit_price(room, is_online, is_ac) + extra) * f64::from(nights))
}

pub fn tax_amount(taxable_amount: f64, tax_percent: f64, include_tax: bool) -> f64 {
    if !include_tax {
        return 0.0;
    }
    round_money(taxable_amount * tax_percent / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub taxable_amount: f64,
    pub tax_amount: f64,
    pub advance_deducted: f64,
    pub grand_total: f64,
}

impl Totals {
    pub fn compute(line_totals: &[f64], tax_percent: f64, include_tax: bool, advance: f64) -> Self {
        let taxable_amount = round_money(line_totals.iter().sum());
        let tax_amount = tax_amount(taxable_amount, tax_percent, include_tax);
        let advance_deducted = round_money(advance.max(0.0));
        Self {
            taxable_amount,
            tax_amount,
            advance_deducted,
            grand_total: round_money(taxable_amount + tax_amount - advance_deducted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{per_room_total, tax_amount, unit_price, Totals};
    use crate::models::Room;

    fn room() -> Room {
        Room {
            id: 1,
            room_number: "101".to_string(),
            room_name: "Deluxe".to_string(),
            floor_name: "Ground".to_string(),
            ac_price: 1000.0,
            non_ac_price: 700.0,
            online_ac_price: 1150.0,
            online_non_ac_price: 850.0,
            occupancy: 2,
        }
    }

    #[test]
    fn picks_price_by_channel_and_ac() {
        let room = room();
        assert_eq!(unit_price(&room, false, true), 1000.0);
        assert_eq!(unit_price(&room, false, false), 700.0);
        assert_eq!(unit_price(&room, true, true), 1150.0);
        assert_eq!(unit_price(&room, true, false), 850.0);
    }

    #[test]
    fn walk_in_ac_room_with_extra_bed_for_three_nights() {
        assert_eq!(per_room_total(&room(), false, true, true, 200.0, 3), 3600.0);
        assert_eq!(per_room_total(&room(), false, true, false, 200.0, 3), 3000.0);
    }

    #[test]
    fn tax_applies_only_when_included() {
        assert_eq!(tax_amount(3600.0, 12.0, true), 432.0);
        assert_eq!(tax_amount(3600.0, 12.0, false), 0.0);
    }

    #[test]
    fn grand_total_adds_tax_and_deducts_advance() {
        let totals = Totals::compute(&[3600.0], 12.0, true, 0.0);
        assert_eq!(totals.taxable_amount, 3600.0);
        assert_eq!(totals.tax_amount, 432.0);
        assert_eq!(totals.grand_total, 4032.0);

        let with_advance = Totals::compute(&[3600.0, 1000.0], 12.0, true, 1500.0);
        assert_eq!(with_advance.tax_amount, 552.0);
        assert_eq!(with_advance.grand_total, 3652.0);
    }
}
