//! Campaign-wide settings carried alongside the rate tables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_months_per_issue() -> u32 {
    2
}

fn default_bogof_first_period_issues() -> usize {
    3
}

fn default_bogof_continuation_offset() -> usize {
    3
}

fn default_bogof_continuation_months() -> u32 {
    6
}

fn default_vat_percent() -> Decimal {
    Decimal::from(20)
}

/// Publication cadence and BOGOF scheduling parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Months between issues (bi-monthly by default).
    #[serde(default = "default_months_per_issue")]
    pub months_per_issue: u32,
    /// Issues in the first BOGOF period (covers six months).
    #[serde(default = "default_bogof_first_period_issues")]
    pub bogof_first_period_issues: usize,
    /// Schedule slots from an area's start to its "month 7 onward" issue.
    #[serde(default = "default_bogof_continuation_offset")]
    pub bogof_continuation_offset: usize,
    /// Calendar months added to the start when that slot is not yet scheduled.
    #[serde(default = "default_bogof_continuation_months")]
    pub bogof_continuation_months: u32,
    /// Applied by display layers only; engines are VAT-exclusive.
    #[serde(default = "default_vat_percent")]
    pub vat_percent: Decimal,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            months_per_issue: default_months_per_issue(),
            bogof_first_period_issues: default_bogof_first_period_issues(),
            bogof_continuation_offset: default_bogof_continuation_offset(),
            bogof_continuation_months: default_bogof_continuation_months(),
            vat_percent: default_vat_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: CampaignConfig = serde_yaml::from_str("vat_percent: 17.5").unwrap();
        assert_eq!(cfg.months_per_issue, 2);
        assert_eq!(cfg.bogof_first_period_issues, 3);
        assert_eq!(cfg.vat_percent, Decimal::new(175, 1));
        let empty: CampaignConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(empty, CampaignConfig::default());
    }
}
