//! Fixed-term and BOGOF subscription print pricing.

use crate::{clamp_percent, cost_per_mille, percent_of, volume_discount_percent};
use adrate_core::{
    AdSizeId, AreaId, AreaLine, DurationId, PricingBreakdown, PricingModel, RateCard,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inputs for one print advertising quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisingSelection {
    /// Areas being paid for. Under BOGOF this excludes the free matches.
    pub area_ids: Vec<AreaId>,
    /// Areas riding free alongside the paid set (BOGOF only).
    #[serde(default)]
    pub free_area_ids: Vec<AreaId>,
    pub ad_size_id: AdSizeId,
    pub duration_id: DurationId,
    pub model: PricingModel,
    /// Negotiated discount from the customer's profile.
    #[serde(default)]
    pub agency_discount_percent: Decimal,
}

/// Price a fixed or subscription campaign.
///
/// The per-issue price of every paid area is summed, multiplied by the
/// duration's issue count, then discounted by volume tier, duration
/// discount (fixed model only) and agency discount, each applied to the
/// running total. Free areas add circulation only.
///
/// Returns `None` when no paid area is selected, any id fails to resolve,
/// the duration belongs to the other model, or the ad size is not sold
/// under the selected model.
pub fn calculate_advertising_price(
    selection: &AdvertisingSelection,
    rates: &RateCard,
) -> Option<PricingBreakdown> {
    if selection.area_ids.is_empty() {
        debug!("no paid areas selected");
        return None;
    }
    let Some(ad_size) = rates.ad_size(&selection.ad_size_id) else {
        debug!(ad_size = %selection.ad_size_id, "unknown ad size");
        return None;
    };
    let Some(base_price) = ad_size.base_price(selection.model) else {
        debug!(model = %selection.model, "model is not priced by ad size");
        return None;
    };
    if !ad_size.is_available_for(selection.model) {
        debug!(ad_size = %ad_size.id, model = %selection.model, "ad size not offered for model");
        return None;
    }
    let Some(duration) = rates
        .duration(&selection.duration_id)
        .filter(|d| d.model() == selection.model)
    else {
        debug!(duration = %selection.duration_id, model = %selection.model, "no matching duration");
        return None;
    };

    let format = ad_size.page_format();
    let mut area_breakdown = Vec::with_capacity(selection.area_ids.len());
    let mut per_issue = Decimal::ZERO;
    let mut total_circulation: u64 = 0;
    for id in &selection.area_ids {
        let Some(area) = rates.area(id) else {
            debug!(area = %id, "unknown paid area");
            return None;
        };
        let multiplied_price = base_price * area.multiplier_for(format);
        per_issue += multiplied_price;
        total_circulation += u64::from(area.circulation);
        area_breakdown.push(AreaLine {
            area_id: area.id.to_string(),
            area_name: area.name.clone(),
            base_price,
            multiplied_price,
        });
    }

    let mut free_area_count: u32 = 0;
    for area in selection.free_area_ids.iter().filter_map(|id| rates.area(id)) {
        total_circulation += u64::from(area.circulation);
        free_area_count += 1;
    }

    let duration_multiplier = duration.issues(rates.config.months_per_issue);
    let subtotal = per_issue * Decimal::from(duration_multiplier);

    let volume_discount_percent =
        volume_discount_percent(&rates.volume_discounts, selection.area_ids.len());
    let volume_discount = percent_of(subtotal, volume_discount_percent);
    let mut running = subtotal - volume_discount;

    let duration_discount_percent = match selection.model {
        PricingModel::Fixed => clamp_percent(duration.discount_percentage()),
        _ => Decimal::ZERO,
    };
    let duration_discount = percent_of(running, duration_discount_percent);
    running -= duration_discount;

    let agency_discount_percent = clamp_percent(selection.agency_discount_percent);
    let agency_discount = percent_of(running, agency_discount_percent);
    running -= agency_discount;

    Some(PricingBreakdown {
        model: selection.model,
        subtotal,
        volume_discount_percent,
        volume_discount,
        duration_discount_percent,
        duration_discount,
        agency_discount_percent,
        agency_discount,
        duration_multiplier,
        total_circulation,
        free_area_count,
        design_fee: Decimal::ZERO,
        subtotal_before_design: running,
        final_total: running,
        area_breakdown,
        cpm: cost_per_mille(running, total_circulation),
    })
}

/// Price a campaign and, when `include_design`, layer the ad size's design fee.
pub fn calculate_with_design_fee(
    selection: &AdvertisingSelection,
    rates: &RateCard,
    include_design: bool,
) -> Option<PricingBreakdown> {
    let breakdown = calculate_advertising_price(selection, rates)?;
    if !include_design {
        return Some(breakdown);
    }
    let fee = rates
        .ad_size(&selection.ad_size_id)
        .map(|s| s.design_fee)
        .unwrap_or(Decimal::ZERO);
    Some(breakdown.with_design_fee(fee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrate_core::{
        AdSize, Area, CampaignConfig, Duration, FixedDuration, SubscriptionDuration,
        VolumeDiscount,
    };
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn area(id: &str, circulation: u32, quarter: Decimal) -> Area {
        Area {
            id: AreaId::from(id),
            name: format!("Area {id}"),
            circulation,
            quarter_page_multiplier: Some(quarter),
            half_page_multiplier: None,
            full_page_multiplier: None,
            schedule: vec![],
        }
    }

    fn rates() -> RateCard {
        RateCard {
            config: CampaignConfig::default(),
            areas: vec![
                area("A", 10_000, dec!(1.0)),
                area("B", 5_000, dec!(1.2)),
                area("C", 8_000, dec!(0.9)),
                area("D", 0, dec!(1.0)),
            ],
            ad_sizes: vec![AdSize {
                id: AdSizeId::from("qp"),
                name: "Quarter Page".into(),
                dimensions: "90x130mm".into(),
                base_price_per_area: dec!(50),
                base_price_per_month: dec!(40),
                design_fee: dec!(45),
                available_for: vec![PricingModel::Fixed, PricingModel::Subscription],
                format: None,
            }],
            durations: vec![
                Duration::Fixed(FixedDuration {
                    id: DurationId::from("f3"),
                    name: "3 issues".into(),
                    issues: 3,
                    discount_percentage: Decimal::ZERO,
                }),
                Duration::Fixed(FixedDuration {
                    id: DurationId::from("f6"),
                    name: "6 issues".into(),
                    issues: 6,
                    discount_percentage: dec!(5),
                }),
                Duration::Subscription(SubscriptionDuration {
                    id: DurationId::from("s6"),
                    name: "6 months".into(),
                    months: 6,
                    discount_percentage: dec!(50),
                }),
            ],
            volume_discounts: vec![],
            payment_options: vec![],
            leaflet_areas: vec![],
            leaflet_durations: vec![],
        }
    }

    fn fixed(areas: &[&str], duration: &str) -> AdvertisingSelection {
        AdvertisingSelection {
            area_ids: areas.iter().map(|a| AreaId::from(*a)).collect(),
            free_area_ids: vec![],
            ad_size_id: AdSizeId::from("qp"),
            duration_id: DurationId::from(duration),
            model: PricingModel::Fixed,
            agency_discount_percent: Decimal::ZERO,
        }
    }

    #[test]
    fn single_area_three_issues() {
        let b = calculate_advertising_price(&fixed(&["A"], "f3"), &rates()).unwrap();
        assert_eq!(b.area_breakdown.len(), 1);
        assert_eq!(b.area_breakdown[0].multiplied_price, dec!(50));
        assert_eq!(b.duration_multiplier, 3);
        assert_eq!(b.subtotal, dec!(150));
        assert_eq!(b.final_total, dec!(150));
        assert_eq!(b.total_circulation, 10_000);
        assert_eq!(b.cpm, dec!(15.0));
    }

    #[test]
    fn volume_tier_applies_to_paid_count() {
        let mut r = rates();
        r.volume_discounts = vec![VolumeDiscount {
            min_areas: 2,
            max_areas: None,
            discount_percentage: dec!(10),
        }];
        let b = calculate_advertising_price(&fixed(&["A", "B"], "f3"), &r).unwrap();
        assert_eq!(b.area_breakdown[1].multiplied_price, dec!(60));
        assert_eq!(b.subtotal, dec!(330));
        assert_eq!(b.volume_discount_percent, dec!(10));
        assert_eq!(b.volume_discount, dec!(33));
        assert_eq!(b.final_total, dec!(297));
        assert_eq!(b.total_circulation, 15_000);
    }

    #[test]
    fn discounts_compound_sequentially() {
        let mut r = rates();
        r.volume_discounts = vec![VolumeDiscount {
            min_areas: 2,
            max_areas: None,
            discount_percentage: dec!(10),
        }];
        let mut sel = fixed(&["A", "B"], "f6");
        sel.agency_discount_percent = dec!(20);
        let b = calculate_advertising_price(&sel, &r).unwrap();
        // 110 per issue * 6 = 660; -10% = 594; -5% = 564.30; -20% = 451.44
        assert_eq!(b.subtotal, dec!(660));
        assert_eq!(b.volume_discount, dec!(66));
        assert_eq!(b.duration_discount, dec!(29.7));
        assert_eq!(b.agency_discount, dec!(112.86));
        assert_eq!(b.final_total, dec!(451.44));
        let additive = b.subtotal * (Decimal::ONE - dec!(0.35));
        assert_ne!(b.final_total, additive);
        assert_eq!(b.total_discount() + b.final_total, b.subtotal);
    }

    #[test]
    fn subscription_uses_monthly_price_and_ignores_duration_discount() {
        let sel = AdvertisingSelection {
            area_ids: vec![AreaId::from("A"), AreaId::from("B")],
            free_area_ids: vec![AreaId::from("C"), AreaId::from("D"), AreaId::from("zz")],
            ad_size_id: AdSizeId::from("qp"),
            duration_id: DurationId::from("s6"),
            model: PricingModel::Subscription,
            agency_discount_percent: Decimal::ZERO,
        };
        let b = calculate_advertising_price(&sel, &rates()).unwrap();
        // (40 + 48) per issue, 6 months bi-monthly = 3 issues
        assert_eq!(b.duration_multiplier, 3);
        assert_eq!(b.subtotal, dec!(264));
        assert_eq!(b.duration_discount, Decimal::ZERO);
        assert_eq!(b.final_total, dec!(264));
        assert_eq!(b.total_circulation, 23_000);
        assert_eq!(b.free_area_count, 2);
        assert_eq!(b.area_breakdown.len(), 2);
    }

    #[test]
    fn incomplete_selection_yields_none() {
        let r = rates();
        assert!(calculate_advertising_price(&fixed(&[], "f3"), &r).is_none());
        assert!(calculate_advertising_price(&fixed(&["A"], "missing"), &r).is_none());
        assert!(calculate_advertising_price(&fixed(&["A", "nope"], "f3"), &r).is_none());
        // Subscription duration under the fixed model.
        assert!(calculate_advertising_price(&fixed(&["A"], "s6"), &r).is_none());
        let mut leaflet = fixed(&["A"], "f3");
        leaflet.model = PricingModel::Leaflet;
        assert!(calculate_advertising_price(&leaflet, &r).is_none());
        let mut bad_size = fixed(&["A"], "f3");
        bad_size.ad_size_id = AdSizeId::from("xx");
        assert!(calculate_advertising_price(&bad_size, &r).is_none());
    }

    #[test]
    fn unavailable_ad_size_yields_none() {
        let mut r = rates();
        r.ad_sizes[0].available_for = vec![PricingModel::Subscription];
        assert!(calculate_advertising_price(&fixed(&["A"], "f3"), &r).is_none());
    }

    #[test]
    fn zero_circulation_has_zero_cpm() {
        let b = calculate_advertising_price(&fixed(&["D"], "f3"), &rates()).unwrap();
        assert_eq!(b.total_circulation, 0);
        assert_eq!(b.cpm, Decimal::ZERO);
        assert_eq!(b.final_total, dec!(150));
    }

    #[test]
    fn design_fee_keeps_totals_consistent() {
        let r = rates();
        let sel = fixed(&["A", "B", "C"], "f6");
        let plain = calculate_with_design_fee(&sel, &r, false).unwrap();
        let b = calculate_with_design_fee(&sel, &r, true).unwrap();
        assert_eq!(plain.design_fee, Decimal::ZERO);
        assert_eq!(b.design_fee, dec!(45));
        assert_eq!(b.subtotal_before_design, plain.final_total);
        assert_eq!(b.subtotal_before_design + b.design_fee, b.final_total);
        assert_eq!(b.cpm, plain.cpm);
    }

    proptest! {
        #[test]
        fn repeated_calls_are_identical(agency in 0i64..10_000, n in 1usize..=4) {
            let ids = ["A", "B", "C", "D"];
            let mut sel = fixed(&ids[..n], "f6");
            sel.agency_discount_percent = Decimal::new(agency, 2);
            let r = rates();
            let a = calculate_advertising_price(&sel, &r);
            let b = calculate_advertising_price(&sel, &r);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn more_areas_never_reduce_gross_or_reach(n in 1usize..4) {
            let ids = ["A", "B", "C", "D"];
            let r = rates();
            let fewer = calculate_advertising_price(&fixed(&ids[..n], "f3"), &r).unwrap();
            let more = calculate_advertising_price(&fixed(&ids[..=n], "f3"), &r).unwrap();
            prop_assert!(more.subtotal >= fewer.subtotal);
            prop_assert!(more.total_circulation >= fewer.total_circulation);
        }

        #[test]
        fn design_fee_invariant_holds(fee_pence in 1i64..100_000, n in 1usize..=4) {
            let ids = ["A", "B", "C", "D"];
            let b = calculate_advertising_price(&fixed(&ids[..n], "f6"), &rates())
                .unwrap()
                .with_design_fee(Decimal::new(fee_pence, 2));
            prop_assert_eq!(b.subtotal_before_design + b.design_fee, b.final_total);
        }
    }
}
