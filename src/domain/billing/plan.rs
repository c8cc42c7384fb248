//! Plans, billing periods and the static price table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::directory::SubscriptionTier;
use crate::domain::foundation::text_enum;

/// Purchasable plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Basic,
    Standard,
    Premium,
}

text_enum!(Plan, "plan", {
    Basic => "basic",
    Standard => "standard",
    Premium => "premium",
});

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Basic, Plan::Standard, Plan::Premium];

    /// Member tier granted while the plan is live.
    pub fn tier(&self) -> SubscriptionTier {
        match self {
            Plan::Basic => SubscriptionTier::Basic,
            Plan::Standard => SubscriptionTier::Standard,
            Plan::Premium => SubscriptionTier::Premium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

text_enum!(BillingPeriod, "period", {
    Monthly => "monthly",
    Yearly => "yearly",
});

impl BillingPeriod {
    pub const ALL: [BillingPeriod; 2] = [BillingPeriod::Monthly, BillingPeriod::Yearly];

    /// Nominal period length used until the processor reports exact bounds.
    pub fn days(&self) -> i64 {
        match self {
            BillingPeriod::Monthly => 30,
            BillingPeriod::Yearly => 365,
        }
    }
}

/// Static (plan, period) → processor price id table.
///
/// Entries may be missing; a missing entry is reported when a checkout for
/// that combination is requested.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<(Plan, BillingPeriod), String>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, skipping blank ids.
    pub fn with_price(mut self, plan: Plan, period: BillingPeriod, price_id: Option<String>) -> Self {
        if let Some(id) = price_id.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
            self.prices.insert((plan, period), id);
        }
        self
    }

    pub fn price_for(&self, plan: Plan, period: BillingPeriod) -> Option<&str> {
        self.prices.get(&(plan, period)).map(String::as_str)
    }

    /// Reverse lookup used when the processor reports a price change.
    pub fn plan_for_price(&self, price_id: &str) -> Option<(Plan, BillingPeriod)> {
        self.prices
            .iter()
            .find(|(_, id)| id.as_str() == price_id)
            .map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PriceTable {
        PriceTable::new()
            .with_price(Plan::Basic, BillingPeriod::Monthly, Some("price_basic_m".into()))
            .with_price(Plan::Premium, BillingPeriod::Yearly, Some("price_premium_y".into()))
            .with_price(Plan::Standard, BillingPeriod::Monthly, Some("  ".into()))
            .with_price(Plan::Standard, BillingPeriod::Yearly, None)
    }

    #[test]
    fn lookup_finds_configured_prices() {
        let t = table();
        assert_eq!(t.price_for(Plan::Basic, BillingPeriod::Monthly), Some("price_basic_m"));
        assert_eq!(t.price_for(Plan::Basic, BillingPeriod::Yearly), None);
    }

    #[test]
    fn blank_and_missing_entries_are_skipped() {
        let t = table();
        assert_eq!(t.len(), 2);
        assert_eq!(t.price_for(Plan::Standard, BillingPeriod::Monthly), None);
    }

    #[test]
    fn reverse_lookup_returns_plan_and_period() {
        assert_eq!(
            table().plan_for_price("price_premium_y"),
            Some((Plan::Premium, BillingPeriod::Yearly))
        );
        assert_eq!(table().plan_for_price("price_unknown"), None);
    }

    #[test]
    fn plans_map_to_paid_tiers() {
        for plan in Plan::ALL {
            assert!(plan.tier().is_paid());
        }
    }

    #[test]
    fn plan_parses_from_request_text() {
        assert_eq!("standard".parse::<Plan>(), Ok(Plan::Standard));
        assert!("gold".parse::<Plan>().is_err());
        assert_eq!("yearly".parse::<BillingPeriod>(), Ok(BillingPeriod::Yearly));
    }
}
