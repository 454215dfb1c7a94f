//! Rate-table records supplied by the rate-table provider.

use crate::schedule::ScheduleEntry;
use crate::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a print distribution area.
    AreaId
);
record_id!(
    /// Identifier of an advert size.
    AdSizeId
);
record_id!(
    /// Identifier of a fixed or subscription duration.
    DurationId
);
record_id!(
    /// Identifier of a leaflet distribution area.
    LeafletAreaId
);
record_id!(
    /// Identifier of a leaflet campaign length.
    LeafletDurationId
);

/// Commercial model a quote is priced under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingModel {
    /// Fixed-term booking for a number of issues.
    Fixed,
    /// Buy-one-get-one-free subscription billed by the month.
    #[serde(alias = "bogof")]
    Subscription,
    /// Flat-rate leaflet distribution.
    Leaflet,
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PricingModel::Fixed => "fixed",
            PricingModel::Subscription => "subscription",
            PricingModel::Leaflet => "leaflet",
        })
    }
}

/// Page fraction an advert occupies; selects the area multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    Quarter,
    Half,
    Full,
}

impl PageFormat {
    /// Infer the format from a catalogue name such as "Quarter Page".
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.contains("quarter") {
            Some(PageFormat::Quarter)
        } else if name.contains("half") {
            Some(PageFormat::Half)
        } else if name.contains("full") {
            Some(PageFormat::Full)
        } else {
            None
        }
    }
}

/// A print distribution area with circulation and size multipliers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    /// Households reached per issue.
    pub circulation: u32,
    #[serde(default)]
    pub quarter_page_multiplier: Option<Decimal>,
    #[serde(default)]
    pub half_page_multiplier: Option<Decimal>,
    #[serde(default)]
    pub full_page_multiplier: Option<Decimal>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

impl Area {
    /// Price multiplier for `format`. Unset multipliers and unknown formats are 1.0.
    pub fn multiplier_for(&self, format: Option<PageFormat>) -> Decimal {
        let m = match format {
            Some(PageFormat::Quarter) => self.quarter_page_multiplier,
            Some(PageFormat::Half) => self.half_page_multiplier,
            Some(PageFormat::Full) => self.full_page_multiplier,
            None => None,
        };
        m.unwrap_or(Decimal::ONE)
    }
}

/// A leaflet drop area sold at a flat price per issue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafletArea {
    pub id: LeafletAreaId,
    pub area_number: u32,
    pub name: String,
    #[serde(default)]
    pub postcodes: Vec<String>,
    pub bimonthly_circulation: u32,
    pub price_with_vat: Decimal,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

fn both_models() -> Vec<PricingModel> {
    vec![PricingModel::Fixed, PricingModel::Subscription]
}

/// An advert size with unit prices for each print model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdSize {
    pub id: AdSizeId,
    pub name: String,
    #[serde(default)]
    pub dimensions: String,
    /// Unit price per area per issue, fixed model.
    pub base_price_per_area: Decimal,
    /// Unit price per area per issue, subscription model.
    pub base_price_per_month: Decimal,
    #[serde(default)]
    pub design_fee: Decimal,
    #[serde(default = "both_models")]
    pub available_for: Vec<PricingModel>,
    /// Explicit format; inferred from `name` when absent.
    #[serde(default)]
    pub format: Option<PageFormat>,
}

impl AdSize {
    pub fn page_format(&self) -> Option<PageFormat> {
        self.format.or_else(|| PageFormat::from_name(&self.name))
    }

    pub fn is_available_for(&self, model: PricingModel) -> bool {
        self.available_for.contains(&model)
    }

    /// Unit price for `model`. Leaflets are not priced by ad size.
    pub fn base_price(&self, model: PricingModel) -> Option<Decimal> {
        match model {
            PricingModel::Fixed => Some(self.base_price_per_area),
            PricingModel::Subscription => Some(self.base_price_per_month),
            PricingModel::Leaflet => None,
        }
    }
}

/// A fixed-term booking length counted in issues.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedDuration {
    pub id: DurationId,
    pub name: String,
    pub issues: u32,
    pub discount_percentage: Decimal,
}

/// A subscription commitment counted in months.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionDuration {
    pub id: DurationId,
    pub name: String,
    pub months: u32,
    pub discount_percentage: Decimal,
}

impl SubscriptionDuration {
    /// Issues published across the commitment, rounding part-periods up.
    pub fn issues(&self, months_per_issue: u32) -> u32 {
        if months_per_issue == 0 {
            return self.months.max(1);
        }
        self.months.div_ceil(months_per_issue).max(1)
    }
}

/// A campaign duration, tagged by the model it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DurationRecord", into = "DurationRecord")]
pub enum Duration {
    Fixed(FixedDuration),
    Subscription(SubscriptionDuration),
}

impl Duration {
    pub fn id(&self) -> &DurationId {
        match self {
            Duration::Fixed(d) => &d.id,
            Duration::Subscription(d) => &d.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Duration::Fixed(d) => &d.name,
            Duration::Subscription(d) => &d.name,
        }
    }

    pub fn model(&self) -> PricingModel {
        match self {
            Duration::Fixed(_) => PricingModel::Fixed,
            Duration::Subscription(_) => PricingModel::Subscription,
        }
    }

    pub fn discount_percentage(&self) -> Decimal {
        match self {
            Duration::Fixed(d) => d.discount_percentage,
            Duration::Subscription(d) => d.discount_percentage,
        }
    }

    /// Number of issues the duration multiplies the per-issue price by.
    pub fn issues(&self, months_per_issue: u32) -> u32 {
        match self {
            Duration::Fixed(d) => d.issues,
            Duration::Subscription(d) => d.issues(months_per_issue),
        }
    }
}

/// Single-table duration row as stored by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRecord {
    pub id: DurationId,
    pub name: String,
    pub duration_value: u32,
    #[serde(default)]
    pub discount_percentage: Decimal,
    pub duration_type: String,
}

impl TryFrom<DurationRecord> for Duration {
    type Error = ValidationError;

    fn try_from(r: DurationRecord) -> Result<Self, Self::Error> {
        match r.duration_type.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Duration::Fixed(FixedDuration {
                id: r.id,
                name: r.name,
                issues: r.duration_value,
                discount_percentage: r.discount_percentage,
            })),
            "subscription" | "bogof" => Ok(Duration::Subscription(SubscriptionDuration {
                id: r.id,
                name: r.name,
                months: r.duration_value,
                discount_percentage: r.discount_percentage,
            })),
            other => Err(ValidationError::UnknownDurationType(other.to_string())),
        }
    }
}

impl From<Duration> for DurationRecord {
    fn from(d: Duration) -> Self {
        match d {
            Duration::Fixed(f) => DurationRecord {
                id: f.id,
                name: f.name,
                duration_value: f.issues,
                discount_percentage: f.discount_percentage,
                duration_type: "fixed".to_string(),
            },
            Duration::Subscription(s) => DurationRecord {
                id: s.id,
                name: s.name,
                duration_value: s.months,
                discount_percentage: s.discount_percentage,
                duration_type: "subscription".to_string(),
            },
        }
    }
}

/// Leaflet campaign length. `issues` drives pricing, `months` is descriptive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafletDuration {
    pub id: LeafletDurationId,
    #[serde(default)]
    pub name: String,
    pub months: u32,
    pub issues: u32,
}

/// Percentage off keyed to the number of paid areas.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDiscount {
    pub min_areas: u32,
    /// `None` leaves the tier open-ended.
    #[serde(default)]
    pub max_areas: Option<u32>,
    pub discount_percentage: Decimal,
}

impl VolumeDiscount {
    pub fn contains(&self, area_count: u32) -> bool {
        area_count >= self.min_areas && self.max_areas.map_or(true, |max| area_count <= max)
    }
}

/// Payment cadence offered at checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentCadence {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "6_months")]
    SixMonths,
    #[serde(rename = "12_months")]
    TwelveMonths,
    #[serde(rename = "upfront", alias = "full")]
    Upfront,
}

impl PaymentCadence {
    pub fn is_monthly(self) -> bool {
        matches!(self, PaymentCadence::Monthly)
    }
}

impl fmt::Display for PaymentCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentCadence::Monthly => "monthly",
            PaymentCadence::SixMonths => "6_months",
            PaymentCadence::TwelveMonths => "12_months",
            PaymentCadence::Upfront => "upfront",
        })
    }
}

/// A payment option. Pay-in-full options carry either a discount or a fee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOption {
    pub option_type: PaymentCadence,
    #[serde(default)]
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub additional_fee_percentage: Decimal,
    /// Installments in the minimum commitment (monthly plans).
    #[serde(default)]
    pub minimum_payments: u32,
}
