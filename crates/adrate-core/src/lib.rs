#![deny(warnings)]

//! Core rate-table models and invariants for advertising quotes.
//!
//! This crate defines the serializable value types the pricing engines and
//! the issue resolver operate on, the rate-card bundle that carries them,
//! and validation helpers applied at the ingestion boundary.

pub mod breakdown;
pub mod config;
pub mod model;
pub mod rate_card;
pub mod schedule;

pub use breakdown::{AreaLine, PricingBreakdown};
pub use config::CampaignConfig;
pub use model::{
    AdSize, AdSizeId, Area, AreaId, Duration, DurationId, DurationRecord, FixedDuration,
    LeafletArea, LeafletAreaId, LeafletDuration, LeafletDurationId, PageFormat, PaymentCadence,
    PaymentOption, PricingModel, SubscriptionDuration, VolumeDiscount,
};
pub use rate_card::{RateCard, RateCardError, RateCardRecord};
pub use schedule::{IssueKey, MonthField, ScheduleEntry, ScheduleError, ScheduleRecord};

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors for rate-table invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price, fee or multiplier below zero.
    #[error("negative value for {0}")]
    Negative(&'static str),
    /// Percentage outside [0, 100].
    #[error("{field} must be within [0, 100], got {value}")]
    PercentOutOfRange { field: &'static str, value: Decimal },
    /// Record name is blank.
    #[error("empty name for {0}")]
    EmptyName(String),
    /// Two records of one kind share an id.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    /// Duration row with an unrecognised `duration_type`.
    #[error("unknown duration type: {0}")]
    UnknownDurationType(String),
    /// Duration that would price zero issues.
    #[error("duration {0} has no issues")]
    ZeroIssues(String),
    /// Volume tier whose upper bound is below its lower bound.
    #[error("volume tier [{min}, {max}] is empty")]
    EmptyTier { min: u32, max: u32 },
    /// Two volume tiers cover the same area count.
    #[error("volume tiers overlap at {0} areas")]
    OverlappingTiers(u32),
    /// Pay-in-full option with both a discount and a surcharge.
    #[error("payment option {0} has both a discount and a fee")]
    DiscountAndFee(String),
}

fn check_percent(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::PercentOutOfRange { field, value });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}

/// Validate a print area.
pub fn validate_area(a: &Area) -> Result<(), ValidationError> {
    if a.name.trim().is_empty() {
        return Err(ValidationError::EmptyName(a.id.to_string()));
    }
    for m in [
        a.quarter_page_multiplier,
        a.half_page_multiplier,
        a.full_page_multiplier,
    ]
    .into_iter()
    .flatten()
    {
        check_non_negative("area multiplier", m)?;
    }
    Ok(())
}

/// Validate an advert size.
pub fn validate_ad_size(s: &AdSize) -> Result<(), ValidationError> {
    if s.name.trim().is_empty() {
        return Err(ValidationError::EmptyName(s.id.to_string()));
    }
    check_non_negative("base_price_per_area", s.base_price_per_area)?;
    check_non_negative("base_price_per_month", s.base_price_per_month)?;
    check_non_negative("design_fee", s.design_fee)?;
    Ok(())
}

/// Validate a fixed or subscription duration.
pub fn validate_duration(d: &Duration) -> Result<(), ValidationError> {
    check_percent("duration discount_percentage", d.discount_percentage())?;
    if let Duration::Fixed(f) = d {
        if f.issues == 0 {
            return Err(ValidationError::ZeroIssues(f.id.to_string()));
        }
    }
    Ok(())
}

/// Validate a leaflet area.
pub fn validate_leaflet_area(a: &LeafletArea) -> Result<(), ValidationError> {
    if a.name.trim().is_empty() {
        return Err(ValidationError::EmptyName(a.id.to_string()));
    }
    check_non_negative("price_with_vat", a.price_with_vat)
}

/// Validate a leaflet duration.
pub fn validate_leaflet_duration(d: &LeafletDuration) -> Result<(), ValidationError> {
    if d.issues == 0 {
        return Err(ValidationError::ZeroIssues(d.id.to_string()));
    }
    Ok(())
}

/// Validate volume tiers: each non-empty and no two covering one count.
pub fn validate_volume_discounts(tiers: &[VolumeDiscount]) -> Result<(), ValidationError> {
    for t in tiers {
        check_percent("volume discount_percentage", t.discount_percentage)?;
        if let Some(max) = t.max_areas {
            if max < t.min_areas {
                return Err(ValidationError::EmptyTier {
                    min: t.min_areas,
                    max,
                });
            }
        }
    }
    let mut sorted: Vec<&VolumeDiscount> = tiers.iter().collect();
    sorted.sort_by_key(|t| t.min_areas);
    for pair in sorted.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        match lo.max_areas {
            Some(max) if max < hi.min_areas => {}
            _ => return Err(ValidationError::OverlappingTiers(hi.min_areas)),
        }
    }
    Ok(())
}

/// Validate a payment option.
pub fn validate_payment_option(o: &PaymentOption) -> Result<(), ValidationError> {
    check_percent("payment discount_percentage", o.discount_percentage)?;
    check_non_negative("additional_fee_percentage", o.additional_fee_percentage)?;
    if !o.option_type.is_monthly()
        && o.discount_percentage > Decimal::ZERO
        && o.additional_fee_percentage > Decimal::ZERO
    {
        return Err(ValidationError::DiscountAndFee(o.option_type.to_string()));
    }
    Ok(())
}

/// Validate every table of a rate card.
pub fn validate_rate_card(card: &RateCard) -> Result<(), ValidationError> {
    for a in &card.areas {
        validate_area(a)?;
    }
    for s in &card.ad_sizes {
        validate_ad_size(s)?;
    }
    for d in &card.durations {
        validate_duration(d)?;
    }
    for a in &card.leaflet_areas {
        validate_leaflet_area(a)?;
    }
    for d in &card.leaflet_durations {
        validate_leaflet_duration(d)?;
    }
    validate_volume_discounts(&card.volume_discounts)?;
    for o in &card.payment_options {
        validate_payment_option(o)?;
    }
    check_percent("vat_percent", card.config.vat_percent)?;
    Ok(())
}
