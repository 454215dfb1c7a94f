//! The bundle of rate tables one quote is priced against.

use crate::config::CampaignConfig;
use crate::model::{
    AdSize, AdSizeId, Area, AreaId, Duration, DurationId, LeafletArea, LeafletAreaId,
    LeafletDuration, LeafletDurationId, PaymentOption, PricingModel, VolumeDiscount,
};
use crate::{validate_rate_card, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors loading a rate card.
#[derive(Debug, Error)]
pub enum RateCardError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported rate card format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Rate tables as delivered by the provider, before cross-record checks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RateCardRecord {
    #[serde(default)]
    pub config: CampaignConfig,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub ad_sizes: Vec<AdSize>,
    #[serde(default)]
    pub durations: Vec<Duration>,
    #[serde(default)]
    pub volume_discounts: Vec<VolumeDiscount>,
    #[serde(default)]
    pub payment_options: Vec<PaymentOption>,
    #[serde(default)]
    pub leaflet_areas: Vec<LeafletArea>,
    #[serde(default)]
    pub leaflet_durations: Vec<LeafletDuration>,
}

/// Validated, read-only rate tables.
///
/// Records are assumed already filtered to active and sorted by the
/// provider; the card keeps their order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "RateCardRecord")]
pub struct RateCard {
    pub config: CampaignConfig,
    pub areas: Vec<Area>,
    pub ad_sizes: Vec<AdSize>,
    pub durations: Vec<Duration>,
    pub volume_discounts: Vec<VolumeDiscount>,
    pub payment_options: Vec<PaymentOption>,
    pub leaflet_areas: Vec<LeafletArea>,
    pub leaflet_durations: Vec<LeafletDuration>,
}

impl TryFrom<RateCardRecord> for RateCard {
    type Error = ValidationError;

    fn try_from(r: RateCardRecord) -> Result<Self, Self::Error> {
        unique_ids("area", r.areas.iter().map(|a| a.id.0.as_str()))?;
        unique_ids("ad size", r.ad_sizes.iter().map(|s| s.id.0.as_str()))?;
        unique_ids("duration", r.durations.iter().map(|d| d.id().0.as_str()))?;
        unique_ids("leaflet area", r.leaflet_areas.iter().map(|a| a.id.0.as_str()))?;
        unique_ids(
            "leaflet duration",
            r.leaflet_durations.iter().map(|d| d.id.0.as_str()),
        )?;
        let card = RateCard {
            config: r.config,
            areas: r.areas,
            ad_sizes: r.ad_sizes,
            durations: r.durations,
            volume_discounts: r.volume_discounts,
            payment_options: r.payment_options,
            leaflet_areas: r.leaflet_areas,
            leaflet_durations: r.leaflet_durations,
        };
        validate_rate_card(&card)?;
        Ok(card)
    }
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

impl RateCard {
    pub fn from_yaml_str(text: &str) -> Result<Self, RateCardError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, RateCardError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a rate card, choosing the parser from the file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RateCardError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let parse: fn(&str) -> Result<Self, RateCardError> = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str,
            "json" => Self::from_json_str,
            other => return Err(RateCardError::UnsupportedFormat(other.to_string())),
        };
        let card = parse(&fs::read_to_string(path)?)?;
        debug!(
            path = %path.display(),
            areas = card.areas.len(),
            ad_sizes = card.ad_sizes.len(),
            durations = card.durations.len(),
            leaflet_areas = card.leaflet_areas.len(),
            "rate card loaded"
        );
        Ok(card)
    }

    pub fn area(&self, id: &AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| &a.id == id)
    }

    pub fn ad_size(&self, id: &AdSizeId) -> Option<&AdSize> {
        self.ad_sizes.iter().find(|s| &s.id == id)
    }

    pub fn duration(&self, id: &DurationId) -> Option<&Duration> {
        self.durations.iter().find(|d| d.id() == id)
    }

    /// Durations offered under `model`, in provider order.
    pub fn durations_for(&self, model: PricingModel) -> impl Iterator<Item = &Duration> {
        self.durations.iter().filter(move |d| d.model() == model)
    }

    pub fn leaflet_area(&self, id: &LeafletAreaId) -> Option<&LeafletArea> {
        self.leaflet_areas.iter().find(|a| &a.id == id)
    }

    pub fn leaflet_duration(&self, id: &LeafletDurationId) -> Option<&LeafletDuration> {
        self.leaflet_durations.iter().find(|d| &d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CARD: &str = r#"
config:
  vat_percent: 20
areas:
  - id: A
    name: Area A
    circulation: 10000
    quarter_page_multiplier: 1.0
    schedule:
      - { month: "2026-11", copy_deadline: 2026-10-10 }
      - { month: January, year: 2027 }
  - id: B
    name: Area B
    circulation: 5000
    quarter_page_multiplier: 1.2
ad_sizes:
  - id: qp
    name: Quarter Page
    base_price_per_area: 50
    base_price_per_month: 40
    design_fee: 45
durations:
  - { id: f3, name: 3 issues, duration_value: 3, discount_percentage: 0, duration_type: fixed }
  - { id: s6, name: 6 months, duration_value: 6, duration_type: subscription }
volume_discounts:
  - { min_areas: 2, max_areas: 4, discount_percentage: 10 }
  - { min_areas: 5, discount_percentage: 15 }
payment_options:
  - { option_type: monthly, minimum_payments: 6 }
  - { option_type: "12_months", discount_percentage: 5 }
"#;

    #[test]
    fn yaml_rate_card_loads_and_resolves() {
        let card = RateCard::from_yaml_str(CARD).unwrap();
        assert_eq!(card.areas.len(), 2);
        assert_eq!(card.area(&AreaId::from("B")).unwrap().circulation, 5000);
        assert_eq!(card.areas[0].schedule.len(), 2);
        assert_eq!(card.areas[0].schedule[1].key.to_string(), "2027-01");
        assert_eq!(card.ad_size(&AdSizeId::from("qp")).unwrap().design_fee, dec!(45));
        assert_eq!(card.durations_for(PricingModel::Subscription).count(), 1);
        assert!(card.duration(&DurationId::from("nope")).is_none());
        assert_eq!(card.volume_discounts[1].max_areas, None);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = r#"
areas:
  - { id: A, name: one, circulation: 1 }
  - { id: A, name: two, circulation: 2 }
"#;
        let err = RateCard::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate area id"), "{err}");
    }

    #[test]
    fn overlapping_tiers_are_rejected() {
        let yaml = r#"
volume_discounts:
  - { min_areas: 2, max_areas: 4, discount_percentage: 10 }
  - { min_areas: 4, discount_percentage: 15 }
"#;
        assert!(RateCard::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn json_and_yaml_agree() {
        let card = RateCard::from_yaml_str(CARD).unwrap();
        let json = serde_json::to_string(&card).unwrap();
        let back = RateCard::from_json_str(&json).unwrap();
        assert_eq!(back.areas, card.areas);
        assert_eq!(back.durations, card.durations);
        assert_eq!(back.payment_options, card.payment_options);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = RateCard::load("rates.toml").unwrap_err();
        assert!(matches!(err, RateCardError::UnsupportedFormat(ext) if ext == "toml"));
        let err = RateCard::load("/nonexistent/rates.yaml").unwrap_err();
        assert!(matches!(err, RateCardError::Io(_)));
    }
}
