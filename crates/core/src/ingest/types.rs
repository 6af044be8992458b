use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::charts::PricePeriod;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub ticker: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Daily bars, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bars inside `period`, measured back from the most recent bar.
    pub fn window(&self, period: PricePeriod) -> &[PriceBar] {
        let (Some(days), Some(last)) = (period.days(), self.bars.last()) else {
            return &self.bars;
        };
        let cutoff = last.date - chrono::Duration::days(days);
        let start = self.bars.partition_point(|b| b.date <= cutoff);
        &self.bars[start..]
    }
}
