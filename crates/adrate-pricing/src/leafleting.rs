//! Flat-rate leaflet distribution pricing.

use crate::cost_per_mille;
use adrate_core::{AreaLine, LeafletAreaId, LeafletDurationId, PricingBreakdown, PricingModel, RateCard};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inputs for one leaflet quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafletSelection {
    pub area_ids: Vec<LeafletAreaId>,
    pub duration_id: LeafletDurationId,
}

/// Price a leaflet campaign: flat area prices times the duration's issues.
///
/// No volume, duration or agency discount applies to leaflets.
pub fn calculate_leafleting_price(
    selection: &LeafletSelection,
    rates: &RateCard,
) -> Option<PricingBreakdown> {
    if selection.area_ids.is_empty() {
        debug!("no leaflet areas selected");
        return None;
    }
    let Some(duration) = rates
        .leaflet_duration(&selection.duration_id)
        .filter(|d| d.issues > 0)
    else {
        debug!(duration = %selection.duration_id, "no usable leaflet duration");
        return None;
    };

    let mut area_breakdown = Vec::with_capacity(selection.area_ids.len());
    let mut per_issue = Decimal::ZERO;
    let mut total_circulation: u64 = 0;
    for id in &selection.area_ids {
        let Some(area) = rates.leaflet_area(id) else {
            debug!(area = %id, "unknown leaflet area");
            return None;
        };
        per_issue += area.price_with_vat;
        total_circulation += u64::from(area.bimonthly_circulation);
        area_breakdown.push(AreaLine {
            area_id: area.id.to_string(),
            area_name: area.name.clone(),
            base_price: area.price_with_vat,
            multiplied_price: area.price_with_vat,
        });
    }

    let subtotal = per_issue * Decimal::from(duration.issues);
    Some(PricingBreakdown {
        model: PricingModel::Leaflet,
        subtotal,
        volume_discount_percent: Decimal::ZERO,
        volume_discount: Decimal::ZERO,
        duration_discount_percent: Decimal::ZERO,
        duration_discount: Decimal::ZERO,
        agency_discount_percent: Decimal::ZERO,
        agency_discount: Decimal::ZERO,
        duration_multiplier: duration.issues,
        total_circulation,
        free_area_count: 0,
        design_fee: Decimal::ZERO,
        subtotal_before_design: subtotal,
        final_total: subtotal,
        area_breakdown,
        cpm: cost_per_mille(subtotal, total_circulation),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrate_core::{LeafletArea, LeafletDuration, VolumeDiscount};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn rates() -> RateCard {
        let leaflet = |id: &str, number: u32, circulation: u32, price: Decimal| LeafletArea {
            id: LeafletAreaId::from(id),
            area_number: number,
            name: format!("Drop {number}"),
            postcodes: vec![format!("AB{number}")],
            bimonthly_circulation: circulation,
            price_with_vat: price,
            schedule: vec![],
        };
        RateCard {
            leaflet_areas: vec![
                leaflet("L1", 1, 4_000, dec!(120)),
                leaflet("L2", 2, 6_000, dec!(180)),
                leaflet("L3", 3, 2_500, dec!(95.50)),
            ],
            leaflet_durations: vec![
                LeafletDuration {
                    id: LeafletDurationId::from("6m"),
                    name: "6 months".into(),
                    months: 6,
                    issues: 3,
                },
                LeafletDuration {
                    id: LeafletDurationId::from("none"),
                    name: "broken".into(),
                    months: 2,
                    issues: 0,
                },
            ],
            volume_discounts: vec![VolumeDiscount {
                min_areas: 1,
                max_areas: None,
                discount_percentage: dec!(50),
            }],
            ..RateCard::default()
        }
    }

    fn select(areas: &[&str], duration: &str) -> LeafletSelection {
        LeafletSelection {
            area_ids: areas.iter().map(|a| LeafletAreaId::from(*a)).collect(),
            duration_id: LeafletDurationId::from(duration),
        }
    }

    #[test]
    fn issues_not_months_multiply() {
        let b = calculate_leafleting_price(&select(&["L1", "L2"], "6m"), &rates()).unwrap();
        assert_eq!(b.model, PricingModel::Leaflet);
        assert_eq!(b.duration_multiplier, 3);
        assert_eq!(b.subtotal, dec!(900));
        assert_eq!(b.final_total, dec!(900));
        assert_eq!(b.total_circulation, 10_000);
        assert_eq!(b.cpm, dec!(90));
    }

    #[test]
    fn volume_tiers_do_not_apply() {
        let b = calculate_leafleting_price(&select(&["L3"], "6m"), &rates()).unwrap();
        assert_eq!(b.volume_discount, Decimal::ZERO);
        assert_eq!(b.final_total, dec!(286.50));
        assert_eq!(b.area_breakdown[0].multiplied_price, dec!(95.50));
    }

    #[test]
    fn incomplete_selection_yields_none() {
        let r = rates();
        assert!(calculate_leafleting_price(&select(&[], "6m"), &r).is_none());
        assert!(calculate_leafleting_price(&select(&["L1"], "12m"), &r).is_none());
        assert!(calculate_leafleting_price(&select(&["L1"], "none"), &r).is_none());
        assert!(calculate_leafleting_price(&select(&["L1", "L9"], "6m"), &r).is_none());
    }

    proptest! {
        #[test]
        fn reach_and_cost_grow_with_areas(n in 1usize..3) {
            let ids = ["L1", "L2", "L3"];
            let r = rates();
            let fewer = calculate_leafleting_price(&select(&ids[..n], "6m"), &r).unwrap();
            let more = calculate_leafleting_price(&select(&ids[..=n], "6m"), &r).unwrap();
            prop_assert!(more.subtotal >= fewer.subtotal);
            prop_assert!(more.total_circulation >= fewer.total_circulation);
        }
    }
}
