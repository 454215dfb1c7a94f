//! Priced output of the pricing engines.

use crate::model::PricingModel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-area line of a breakdown, priced for a single issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaLine {
    pub area_id: String,
    pub area_name: String,
    pub base_price: Decimal,
    pub multiplied_price: Decimal,
}

/// Itemized campaign quote.
///
/// Derived on demand and snapshotted verbatim by the booking layer, so the
/// serialized form keeps camelCase keys. `final_total` always equals
/// `subtotal_before_design + design_fee`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub model: PricingModel,
    /// Gross media cost across all issues, before any discount. Consumers
    /// that want the figure net of the volume tier read
    /// [`PricingBreakdown::subtotal_after_volume`].
    pub subtotal: Decimal,
    pub volume_discount_percent: Decimal,
    pub volume_discount: Decimal,
    pub duration_discount_percent: Decimal,
    pub duration_discount: Decimal,
    pub agency_discount_percent: Decimal,
    pub agency_discount: Decimal,
    /// Issues the per-issue price was multiplied by.
    pub duration_multiplier: u32,
    /// Paid plus free circulation.
    pub total_circulation: u64,
    pub free_area_count: u32,
    pub design_fee: Decimal,
    pub subtotal_before_design: Decimal,
    pub final_total: Decimal,
    pub area_breakdown: Vec<AreaLine>,
    /// Cost per thousand households, excluding design.
    pub cpm: Decimal,
}

impl PricingBreakdown {
    /// Layer a design fee on top of the media cost.
    ///
    /// Replaces any fee already applied, so calling it twice never
    /// double-charges.
    pub fn with_design_fee(mut self, fee: Decimal) -> Self {
        let fee = fee.max(Decimal::ZERO);
        self.design_fee = fee;
        self.final_total = self.subtotal_before_design + fee;
        self
    }

    /// Media cost after the volume tier, before duration and agency
    /// discounts.
    pub fn subtotal_after_volume(&self) -> Decimal {
        self.subtotal - self.volume_discount
    }

    /// Sum of every discount applied.
    pub fn total_discount(&self) -> Decimal {
        self.volume_discount + self.duration_discount + self.agency_discount
    }

    /// Paid areas priced in this breakdown.
    pub fn paid_area_count(&self) -> usize {
        self.area_breakdown.len()
    }
}
