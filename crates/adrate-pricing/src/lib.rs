#![deny(warnings)]

//! Pricing engines for advertising quotes.
//!
//! This crate provides pure, deterministic calculators for:
//! - Fixed-term and BOGOF subscription print advertising
//! - Flat-rate leaflet distribution
//! - Payment plans layered on a finished campaign total
//!
//! Every engine returns `None` instead of failing when the selection is
//! incomplete, so callers can recompute on each input change.

pub mod advertising;
pub mod leafleting;
pub mod payment;

pub use advertising::{calculate_advertising_price, calculate_with_design_fee, AdvertisingSelection};
pub use leafleting::{calculate_leafleting_price, LeafletSelection};
pub use payment::{calculate_payment_amount, payment_plans, quote_payment, PaymentQuote};

use adrate_core::VolumeDiscount;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places money is displayed with.
pub const MONEY_DP: u32 = 2;

/// Round to pence, half-up.
///
/// Example:
/// assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// `pct` percent of `amount`, unrounded.
pub fn percent_of(amount: Decimal, pct: Decimal) -> Decimal {
    amount * pct / Decimal::ONE_HUNDRED
}

/// Clamp a caller-supplied percentage into [0, 100].
pub fn clamp_percent(pct: Decimal) -> Decimal {
    pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Cost per thousand households, rounded to pence. Zero circulation yields 0.
///
/// Example:
/// assert_eq!(cost_per_mille(Decimal::new(150, 0), 10_000), Decimal::new(15, 0));
pub fn cost_per_mille(total: Decimal, circulation: u64) -> Decimal {
    if circulation == 0 {
        return Decimal::ZERO;
    }
    round_money(total * Decimal::ONE_THOUSAND / Decimal::from(circulation))
}

/// Discount percentage of the first tier covering `area_count`, or 0.
pub fn volume_discount_percent(tiers: &[VolumeDiscount], area_count: usize) -> Decimal {
    let Ok(count) = u32::try_from(area_count) else {
        return Decimal::ZERO;
    };
    tiers
        .iter()
        .find(|t| t.contains(count))
        .map(|t| clamp_percent(t.discount_percentage))
        .unwrap_or(Decimal::ZERO)
}

/// Gross amount including VAT, for display only.
pub fn with_vat(amount: Decimal, vat_percent: Decimal) -> Decimal {
    round_money(amount + percent_of(amount, vat_percent))
}
