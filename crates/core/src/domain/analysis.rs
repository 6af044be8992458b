use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub key_metrics: KeyMetrics,
    pub profit_loss: Option<ProfitLossTrend>,
    pub quarterly: Option<QuarterlyTrend>,
    pub balance_sheet: Option<BalanceSheetHealth>,
    pub cash_flow: Option<CashFlowQuality>,
    pub shareholding: Option<ShareholdingTrend>,
    pub growth: Vec<GrowthRates>,
    pub valuation: ValuationView,
    pub momentum: MomentumView,
    pub scorecard: Scorecard,
    pub flags: Flags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMetrics {
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub book_value: Option<f64>,
    pub div_yield: Option<f64>,
    pub roce: Option<f64>,
    pub roe: Option<f64>,
    pub face_value: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginTrend {
    Expanding,
    Contracting,
    #[default]
    Stable,
}

impl MarginTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expanding => "expanding",
            Self::Contracting => "contracting",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
    InsufficientData,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
            Self::InsufficientData => "insufficient data",
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Increasing => "↑",
            Self::Decreasing => "↓",
            Self::Stable | Self::InsufficientData => "→",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfitLossTrend {
    pub is_bank: bool,
    pub sales_latest: f64,
    pub net_profit_latest: f64,
    pub opm_latest: f64,
    pub npm_latest: f64,
    pub eps_latest: f64,
    pub interest_latest: f64,
    pub depreciation_latest: f64,
    pub sales_yoy: Vec<f64>,
    pub profit_yoy: Vec<f64>,
    pub sales_cagr_3y: Option<f64>,
    pub sales_cagr_5y: Option<f64>,
    pub profit_cagr_3y: Option<f64>,
    pub profit_cagr_5y: Option<f64>,
    pub margin_trend: MarginTrend,
    /// Share of years with positive profit growth, `None` with fewer than two years.
    pub profit_consistency: Option<f64>,
    pub periods: Vec<String>,
    pub sales_history: Vec<f64>,
    pub profit_history: Vec<f64>,
    pub opm_history: Vec<f64>,
    pub eps_history: Vec<f64>,
    pub dividend_payout_history: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterlyTrend {
    pub sales_latest: f64,
    pub profit_latest: f64,
    pub opm_latest: f64,
    /// Latest quarter against the same quarter a year earlier.
    pub sales_yoy: Option<f64>,
    pub profit_yoy: Option<f64>,
    pub sales_qoq: Vec<f64>,
    pub profit_qoq: Vec<f64>,
    pub improving_margins: bool,
    pub periods: Vec<String>,
    pub sales_history: Vec<f64>,
    pub profit_history: Vec<f64>,
    pub opm_history: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSheetHealth {
    pub shareholder_equity: f64,
    pub borrowings: f64,
    pub total_assets: f64,
    /// `None` when equity is not positive.
    pub debt_to_equity: Option<f64>,
    pub debt_trend: Trend,
    pub borrowings_history: Vec<f64>,
    pub equity_history: Vec<f64>,
    pub cwip: f64,
    pub investments: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashFlowQuality {
    pub cfo_latest: f64,
    pub cfi_latest: f64,
    pub cff_latest: f64,
    pub fcf_latest: f64,
    pub cfo_history: Vec<f64>,
    pub fcf_history: Vec<f64>,
    pub cfo_consistency: f64,
    pub fcf_positive_years: usize,
    pub total_years: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareholdingTrend {
    pub promoter: f64,
    pub fii: f64,
    pub dii: f64,
    pub public: f64,
    pub promoter_trend: Trend,
    pub fii_trend: Trend,
    pub dii_trend: Trend,
    pub num_shareholders: f64,
    pub promoter_history: Vec<f64>,
    pub fii_history: Vec<f64>,
    pub dii_history: Vec<f64>,
    pub public_history: Vec<f64>,
    pub periods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthRates {
    pub category: String,
    pub rates: Vec<(String, Option<f64>)>,
}

impl GrowthRates {
    pub fn get(&self, period: &str) -> Option<f64> {
        self.rates
            .iter()
            .find(|(p, _)| p == period)
            .and_then(|(_, v)| *v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Caution,
    Neutral,
    Info,
}

impl Sentiment {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Bullish => "▲",
            Self::Bearish => "▼",
            Self::Caution => "⚠",
            Self::Neutral => "●",
            Self::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub text: String,
    pub sentiment: Sentiment,
}

impl Signal {
    pub fn new(text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            text: text.into(),
            sentiment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationView {
    pub score: i32,
    pub verdict: String,
    pub signals: Vec<Signal>,
}

impl Default for ValuationView {
    fn default() -> Self {
        Self {
            score: 50,
            verdict: "Fairly Valued".to_string(),
            signals: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumView {
    /// 0 at the 52-week low, 1 at the high. `None` without a usable range.
    pub pos_in_52w: Option<f64>,
    pub pct_from_high: Option<f64>,
    pub pct_from_low: Option<f64>,
    pub signals: Vec<Signal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionScore {
    pub score: i32,
    pub notes: Vec<String>,
}

impl Default for DimensionScore {
    fn default() -> Self {
        Self {
            score: 50,
            notes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Default for Grade {
    fn default() -> Self {
        Self::B
    }
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::APlus
        } else if score >= 70.0 {
            Self::A
        } else if score >= 60.0 {
            Self::BPlus
        } else if score >= 50.0 {
            Self::B
        } else if score >= 35.0 {
            Self::C
        } else {
            Self::D
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::APlus => "#10B981",
            Self::A => "#22C55E",
            Self::BPlus | Self::B => "#F59E0B",
            Self::C => "#EF4444",
            Self::D => "#DC2626",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scorecard {
    pub growth: DimensionScore,
    pub profitability: DimensionScore,
    pub financial_health: DimensionScore,
    pub valuation: DimensionScore,
    pub momentum: DimensionScore,
    pub overall: f64,
    pub grade: Grade,
}

impl Scorecard {
    pub fn dimensions(&self) -> [(&'static str, &DimensionScore); 5] {
        [
            ("Growth", &self.growth),
            ("Profitability", &self.profitability),
            ("Financial Health", &self.financial_health),
            ("Valuation", &self.valuation),
            ("Momentum", &self.momentum),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub green: Vec<String>,
    pub amber: Vec<String>,
    pub red: Vec<String>,
}

impl Flags {
    pub fn is_empty(&self) -> bool {
        self.green.is_empty() && self.amber.is_empty() && self.red.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_cutoffs() {
        assert_eq!(Grade::from_score(80.0), Grade::APlus);
        assert_eq!(Grade::from_score(79.9), Grade::A);
        assert_eq!(Grade::from_score(70.0), Grade::A);
        assert_eq!(Grade::from_score(60.0), Grade::BPlus);
        assert_eq!(Grade::from_score(50.0), Grade::B);
        assert_eq!(Grade::from_score(35.0), Grade::C);
        assert_eq!(Grade::from_score(34.9), Grade::D);
    }

    #[test]
    fn grades_order_from_worst_to_best() {
        assert!(Grade::D < Grade::C);
        assert!(Grade::B < Grade::BPlus);
        assert!(Grade::A < Grade::APlus);
    }

    #[test]
    fn grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::BPlus).unwrap(), "\"B+\"");
        assert_eq!(Grade::APlus.to_string(), "A+");
    }
}
