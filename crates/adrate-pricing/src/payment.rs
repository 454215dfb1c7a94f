//! Installment amounts for a finished campaign total.
//!
//! The total handed in is VAT-exclusive and already includes any design
//! fee; nothing here adds the fee again. Percentages are applied on the
//! exact total and only the resulting amount is rounded to pence.

use crate::{clamp_percent, percent_of, round_money};
use adrate_core::{PaymentCadence, PaymentOption, PricingBreakdown, PricingModel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amount due under one payment option, with the figures shown beside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuote {
    pub option_type: PaymentCadence,
    /// Charge per installment.
    pub amount: Decimal,
    pub installments: u32,
    /// `amount * installments`; may differ from the total by rounding.
    pub total_payable: Decimal,
    /// Reduction against the campaign total for discounted pay-in-full options.
    pub savings: Decimal,
    /// Increase against the campaign total for surcharged options.
    pub surcharge: Decimal,
    /// Design fee already contained in the total.
    pub design_fee: Decimal,
}

/// Number of installments `option` spreads the total across.
///
/// Subscription monthly plans use the option's minimum commitment, falling
/// back to the largest monthly commitment among `all_options`, then 1.
/// Fixed and leaflet monthly plans spread across the campaign's own issues.
pub fn installment_count(
    option: &PaymentOption,
    model: PricingModel,
    duration_multiplier: u32,
    all_options: &[PaymentOption],
) -> u32 {
    if !option.option_type.is_monthly() {
        return 1;
    }
    match model {
        PricingModel::Subscription => {
            if option.minimum_payments > 0 {
                return option.minimum_payments;
            }
            all_options
                .iter()
                .filter(|o| o.option_type.is_monthly())
                .map(|o| o.minimum_payments)
                .max()
                .filter(|&n| n > 0)
                .unwrap_or(1)
        }
        PricingModel::Fixed | PricingModel::Leaflet => duration_multiplier.max(1),
    }
}

/// Amount due per installment, rounded half-up to pence.
///
/// Option percentages are clamped to [0, 100].
pub fn calculate_payment_amount(
    base_total: Decimal,
    option: &PaymentOption,
    model: PricingModel,
    duration_multiplier: u32,
    all_options: &[PaymentOption],
) -> Decimal {
    if option.option_type.is_monthly() {
        let n = installment_count(option, model, duration_multiplier, all_options);
        return round_money(base_total / Decimal::from(n));
    }
    let discount = clamp_percent(option.discount_percentage);
    let fee = clamp_percent(option.additional_fee_percentage);
    let adjusted = if discount > Decimal::ZERO {
        base_total - percent_of(base_total, discount)
    } else if fee > Decimal::ZERO {
        base_total + percent_of(base_total, fee)
    } else {
        base_total
    };
    round_money(adjusted)
}

/// Quote one option against a priced breakdown.
pub fn quote_payment(
    breakdown: &PricingBreakdown,
    option: &PaymentOption,
    all_options: &[PaymentOption],
) -> PaymentQuote {
    let base = breakdown.final_total;
    let installments =
        installment_count(option, breakdown.model, breakdown.duration_multiplier, all_options);
    let amount = calculate_payment_amount(
        base,
        option,
        breakdown.model,
        breakdown.duration_multiplier,
        all_options,
    );
    let total_payable = amount * Decimal::from(installments);
    let (savings, surcharge) = if option.option_type.is_monthly() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let base = round_money(base);
        (
            (base - total_payable).max(Decimal::ZERO),
            (total_payable - base).max(Decimal::ZERO),
        )
    };
    PaymentQuote {
        option_type: option.option_type,
        amount,
        installments,
        total_payable,
        savings,
        surcharge,
        design_fee: breakdown.design_fee,
    }
}

/// Quote every option, in the order given.
pub fn payment_plans(breakdown: &PricingBreakdown, options: &[PaymentOption]) -> Vec<PaymentQuote> {
    options
        .iter()
        .map(|o| quote_payment(breakdown, o, options))
        .collect()
}
