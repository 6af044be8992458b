use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chart windows offered by the period switcher, oldest cutoff last.
pub const PRICE_PERIODS: [PricePeriod; 4] = [
    PricePeriod::OneYear,
    PricePeriod::ThreeYears,
    PricePeriod::FiveYears,
    PricePeriod::Max,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PricePeriod {
    OneYear,
    ThreeYears,
    FiveYears,
    Max,
}

impl PricePeriod {
    pub fn key(self) -> &'static str {
        match self {
            Self::OneYear => "price_1y",
            Self::ThreeYears => "price_3y",
            Self::FiveYears => "price_5y",
            Self::Max => "price_max",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneYear => "1Y",
            Self::ThreeYears => "3Y",
            Self::FiveYears => "5Y",
            Self::Max => "Max",
        }
    }

    pub fn days(self) -> Option<i64> {
        match self {
            Self::OneYear => Some(365),
            Self::ThreeYears => Some(3 * 365),
            Self::FiveYears => Some(5 * 365),
            Self::Max => None,
        }
    }
}

pub const FINANCIAL_CHARTS: [(&str, &str); 6] = [
    ("annual_pl", "Annual Revenue & Profit"),
    ("quarterly", "Quarterly Results"),
    ("margins", "Margins"),
    ("returns", "Return Ratios"),
    ("shareholding", "Shareholding Pattern"),
    ("cashflow", "Cash Flows"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSet {
    pub fragments: BTreeMap<String, String>,
}

impl ChartSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fragments.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, markup: String) {
        self.fragments.insert(key.into(), markup);
    }

    pub fn has_price_charts(&self) -> bool {
        PRICE_PERIODS.iter().any(|p| self.fragments.contains_key(p.key()))
    }
}
